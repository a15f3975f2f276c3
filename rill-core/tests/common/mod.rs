// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use rill_core::{Push, Stream, StreamItem};
use std::cell::RefCell;
use std::rc::Rc;

pub type Shared<T> = Rc<RefCell<Vec<T>>>;

pub fn shared<T>() -> Shared<T> {
    Rc::new(RefCell::new(Vec::new()))
}

/// Consume every item of `stream`, `End` included. The returned output
/// still has to be resumed.
pub fn record<T: 'static>(stream: &Stream<T>) -> (Stream<()>, Shared<StreamItem<T>>) {
    let seen = shared();
    let sink = Rc::clone(&seen);
    let out = stream.consume(move |item, _push: &Push<()>, next| {
        let end = item.is_end();
        sink.borrow_mut().push(item);
        if !end {
            next.call();
        }
    });
    (out, seen)
}

/// Read up to `n` values into `seen`, then end and release `stream`.
pub fn take_into<T: 'static>(stream: &Stream<T>, n: usize, seen: &Shared<T>) -> Stream<()> {
    let sink = Rc::clone(seen);
    let mut remaining = n;
    let out = stream.consume(move |item, push: &Push<()>, next| match item {
        StreamItem::Value(x) => {
            sink.borrow_mut().push(x);
            remaining -= 1;
            if remaining == 0 {
                push.end();
            } else {
                next.call();
            }
        }
        StreamItem::Error(_) => next.call(),
        StreamItem::End => push.end(),
    });
    out.resume();
    out
}

/// Apply `f` to every value, forwarding failures and `End`.
pub fn map<T: 'static, U: 'static>(stream: &Stream<T>, f: impl Fn(T) -> U + 'static) -> Stream<U> {
    stream.consume(move |item, push, next| match item {
        StreamItem::Value(x) => {
            push.value(f(x));
            next.call();
        }
        StreamItem::Error(e) => {
            push.error(e);
            next.call();
        }
        StreamItem::End => push.end(),
    })
}
