// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rill_core::{RillError, Stream, StreamItem};
use rill_stream::prelude::*;
use rill_test_utils::recorder;

#[test]
fn test_map_transforms_every_value() {
    // Arrange
    let seen = recorder();
    let sink = seen.clone();

    // Act
    Stream::from(vec![1, 2, 3])
        .map(|x| x * 2)
        .to_vec(move |xs| sink.record(xs));

    // Assert
    assert_eq!(seen.take(), vec![vec![2, 4, 6]]);
}

#[test]
fn test_map_only_runs_for_demanded_values() {
    // Arrange
    let calls = recorder();
    let log = calls.clone();
    let seen = recorder();
    let sink = seen.clone();

    // Act
    Stream::from(vec![1, 2, 3, 4])
        .map(move |x| {
            log.record(x);
            x * 2
        })
        .take(2)
        .to_vec(move |xs| sink.record(xs));

    // Assert
    assert_eq!(seen.take(), vec![vec![2, 4]]);
    assert_eq!(calls.take(), vec![1, 2]);
}

#[test]
fn test_filter_keeps_matching_values() {
    // Arrange
    let seen = recorder();
    let sink = seen.clone();

    // Act
    Stream::from((1..=10).collect::<Vec<_>>())
        .filter(|x| x % 3 == 0)
        .to_vec(move |xs| sink.record(xs));

    // Assert
    assert_eq!(seen.take(), vec![vec![3, 6, 9]]);
}

#[test]
fn test_take_zero_leaves_source_untouched() {
    // Arrange
    let source = Stream::from(vec!["a", "b"]);
    let (first, rest) = (recorder(), recorder());
    let (a, b) = (first.clone(), rest.clone());

    // Act
    source.take(0).to_vec(move |xs| a.record(xs));
    source.to_vec(move |xs| b.record(xs));

    // Assert
    assert_eq!(first.take(), vec![Vec::<&str>::new()]);
    assert_eq!(rest.take(), vec![vec!["a", "b"]]);
}

#[test]
fn test_take_releases_source_for_the_next_consumer() {
    // Arrange
    let source = Stream::from(vec![1, 2, 3, 4, 5]);
    let seen = recorder();

    // Act
    for _ in 0..3 {
        let sink = seen.clone();
        source.take(2).to_vec(move |xs| sink.record(xs));
    }

    // Assert
    assert_eq!(seen.take(), vec![vec![1, 2], vec![3, 4], vec![5]]);
}

#[test]
fn test_take_does_not_count_failures() {
    // Arrange
    let source = Stream::new();
    source.write(StreamItem::Value(1));
    source.write(StreamItem::Error(RillError::producer_failure("skip")));
    source.write(StreamItem::Value(2));
    source.write(StreamItem::Value(3));
    let (values, failures) = (recorder(), recorder());
    let (v, f) = (values.clone(), failures.clone());

    // Act
    source
        .take(2)
        .errors(move |e, _push| f.record(e.to_string()))
        .each(move |x| v.record(x));

    // Assert
    assert_eq!(values.take(), vec![1, 2]);
    assert_eq!(failures.take(), vec!["Producer failure: skip".to_string()]);
    assert_eq!(source.buffered(), vec![StreamItem::Value(3)]);
}

#[test]
fn test_errors_can_replace_failures_with_values() {
    // Arrange
    let source = Stream::new();
    source.write(StreamItem::Value(10));
    source.write(StreamItem::Error(RillError::producer_failure("gap")));
    source.write(StreamItem::Value(30));
    source.write(StreamItem::End);
    let seen = recorder();
    let sink = seen.clone();

    // Act
    source
        .map(|x| x + 1)
        .errors(|_e, push| {
            push.value(0);
        })
        .to_vec(move |xs| sink.record(xs));

    // Assert
    assert_eq!(seen.take(), vec![vec![11, 0, 31]]);
}

#[test]
fn test_errors_can_rethrow_a_different_failure() {
    // Arrange
    let source = Stream::new();
    source.write(StreamItem::<u8>::Error(RillError::producer_failure("io")));
    source.write(StreamItem::End);
    let seen = recorder();
    let sink = seen.clone();

    // Act
    source
        .errors(|e, push| {
            push.error(RillError::user_error(std::io::Error::other(e.to_string())));
        })
        .errors(move |e, _push| sink.record(e.is_producer_failure()))
        .done(|| {});

    // Assert
    assert_eq!(seen.take(), vec![true]);
}

#[test]
fn test_operators_label_their_output() {
    let source = Stream::from(vec![1]).with_label("numbers");
    let mapped = source.map(|x| x + 1);
    assert_eq!(mapped.label(), "numbers.map");
    assert_eq!(mapped.take(1).label(), "numbers.map.take(1)");
}
