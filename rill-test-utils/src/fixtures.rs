// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Asynchronous generator streams.
//!
//! Both fixtures emit `n, n - 1, ..., 1` and then end. Each value is pushed
//! on a later turn of the local executor, after which the stream redirects
//! to a fresh countdown for the rest. Every generator invocation is logged,
//! so tests can check how far production went.

use crate::recorder::{Counter, Recorder};
use crate::runtime::defer;
use rill_core::Stream;

/// Countdown from `n` that counts generator invocations in `calls`.
pub fn countdown(n: u32, calls: Counter) -> Stream<u32> {
    Stream::generator(move |push, next| {
        calls.increment();
        if n == 0 {
            push.end();
            return;
        }
        let (push, next, calls) = (push.clone(), next.clone(), calls.clone());
        defer(move || {
            push.value(n);
            next.redirect(countdown(n - 1, calls));
        });
    })
    .with_label(format!("countdown:{n}"))
}

/// Countdown from `n` that records `name` in `calls` on every invocation.
pub fn named_countdown(name: &'static str, n: u32, calls: Recorder<&'static str>) -> Stream<u32> {
    Stream::generator(move |push, next| {
        calls.record(name);
        if n == 0 {
            push.end();
            return;
        }
        let (push, next, calls) = (push.clone(), next.clone(), calls.clone());
        defer(move || {
            push.value(n);
            next.redirect(named_countdown(name, n - 1, calls));
        });
    })
    .with_label(format!("countdown:{name}:{n}"))
}
