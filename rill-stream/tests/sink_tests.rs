// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rill_core::{RillError, Stream, StreamItem};
use rill_stream::prelude::*;
use rill_test_utils::{countdown, recorder, run_local, Counter};

#[test]
fn test_each_visits_values_in_order() {
    // Arrange
    let seen = recorder();
    let sink = seen.clone();

    // Act
    Stream::from(vec!['r', 'i', 'l', 'l']).each(move |c| sink.record(c));

    // Assert
    assert_eq!(seen.take(), vec!['r', 'i', 'l', 'l']);
}

#[test]
#[should_panic(expected = "Unhandled stream failure")]
fn test_each_panics_on_failure() {
    let source = Stream::<i32>::new();
    source.write(StreamItem::Error(RillError::producer_failure("boom")));
    source.each(|_| {});
}

#[test]
#[should_panic(expected = "already being consumed")]
fn test_each_panics_on_consumed_stream() {
    let source = Stream::from(vec![1]);
    let _first = source.map(|x| x);
    source.each(|_| {});
}

#[test]
fn test_done_fires_once_at_the_end() {
    // Arrange
    let finished = Counter::new();
    let done = finished.clone();

    // Act
    Stream::from(vec![1, 2, 3]).done(move || done.increment());

    // Assert
    assert_eq!(finished.get(), 1);
}

#[test]
fn test_done_waits_for_a_manual_end() {
    // Arrange
    let source = Stream::new();
    let finished = Counter::new();
    let done = finished.clone();
    source.clone().map(|x: i32| x).done(move || done.increment());

    // Act
    source.write(StreamItem::Value(1));

    // Assert
    assert_eq!(finished.get(), 0);

    // Act
    source.write(StreamItem::End);

    // Assert
    assert_eq!(finished.get(), 1);
}

#[tokio::test]
async fn test_collect_resolves_with_all_values() -> anyhow::Result<()> {
    // Arrange
    let source = Stream::from(vec![1, 2, 3]);

    // Act
    let values = source.collect().await?;

    // Assert
    assert_eq!(values, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_collect_stops_at_the_first_failure() {
    // Arrange
    let source = Stream::new();
    source.write(StreamItem::Value(1));
    source.write(StreamItem::Error(RillError::producer_failure("lost")));
    source.write(StreamItem::Value(2));

    // Act
    let result = source.collect().await;

    // Assert
    assert!(matches!(result, Err(RillError::ProducerFailure { .. })));
    assert_eq!(source.buffered(), vec![StreamItem::Value(2)]);
}

#[tokio::test]
async fn test_collect_resolves_when_the_stream_is_destroyed() {
    // Arrange
    let source = Stream::<i32>::new();
    let pending = source.collect();

    // Act
    source.destroy();
    drop(source);
    let result = pending.await;

    // Assert
    assert_eq!(result.ok(), Some(Vec::new()));
}

#[tokio::test]
async fn test_collect_over_async_generator() -> anyhow::Result<()> {
    run_local(async {
        // Arrange
        let calls = Counter::new();
        let source = countdown(3, calls.clone());

        // Act
        let values = source.collect().await?;

        // Assert
        assert_eq!(values, vec![3, 2, 1]);
        assert_eq!(calls.get(), 4);
        Ok::<_, anyhow::Error>(())
    })
    .await
}
