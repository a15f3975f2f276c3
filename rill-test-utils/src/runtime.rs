// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::channel::oneshot;
use std::future::Future;
use std::time::Duration;
use tokio::task::{self, LocalSet};
use tokio::time::sleep;

/// Run `future` on a fresh [`LocalSet`] so that [`defer`] may be used.
pub async fn run_local<F: Future>(future: F) -> F::Output {
    LocalSet::new().run_until(future).await
}

/// Run `f` on a later turn of the local executor.
///
/// Must be called inside [`run_local`].
pub fn defer<F>(f: F)
where
    F: FnOnce() + 'static,
{
    task::spawn_local(async move {
        task::yield_now().await;
        f();
    });
}

/// Run `f` after `ms` milliseconds on the local executor.
pub fn defer_after<F>(ms: u64, f: F)
where
    F: FnOnce() + 'static,
{
    task::spawn_local(async move {
        sleep(Duration::from_millis(ms)).await;
        f();
    });
}

/// Completes the future returned alongside it by [`completion`].
pub struct Completer<T> {
    sender: oneshot::Sender<T>,
}

impl<T> Completer<T> {
    pub fn complete(self, value: T) {
        // The test may have stopped waiting already
        let _ = self.sender.send(value);
    }
}

/// Bridge a completion callback into an awaitable future.
pub fn completion<T>() -> (Completer<T>, oneshot::Receiver<T>) {
    let (sender, receiver) = oneshot::channel();
    (Completer { sender }, receiver)
}
