// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rill_core::{Push, RillError, Stream, StreamItem};
use rill_stream::prelude::*;
use rill_test_utils::{defer_after, recorder, run_local};

fn seq(items: Vec<Nested<i32>>) -> Nested<i32> {
    Nested::Seq(items)
}

fn v(x: i32) -> Nested<i32> {
    Nested::Value(x)
}

#[test]
fn test_flatten_nested_vector() {
    // Arrange
    let nested = vec![v(1), seq(vec![v(2), seq(vec![v(3), v(4)]), v(5)]), seq(vec![v(6)])];
    let seen = recorder();
    let sink = seen.clone();

    // Act
    flatten(nested).to_vec(move |xs| sink.record(xs));

    // Assert
    assert_eq!(seen.take(), vec![vec![1, 2, 3, 4, 5, 6]]);
}

#[test]
fn test_flatten_stream_of_nested_values() {
    // Arrange
    let source = Stream::from(vec![v(1), seq(vec![v(2), seq(vec![v(3), v(4)]), v(5)]), seq(vec![v(6)])]);
    let seen = recorder();
    let sink = seen.clone();

    // Act
    source.flatten().to_vec(move |xs| sink.record(xs));

    // Assert
    assert_eq!(seen.take(), vec![vec![1, 2, 3, 4, 5, 6]]);
}

#[test]
fn test_flatten_empty_sequences() {
    // Arrange
    let seen = recorder();
    let sink = seen.clone();

    // Act
    flatten(vec![seq(vec![]), seq(vec![seq(vec![])]), v(7)]).to_vec(move |xs| sink.record(xs));

    // Assert
    assert_eq!(seen.take(), vec![vec![7]]);
}

#[test]
fn test_flatten_nested_generator_streams() {
    // Arrange
    let inner = Stream::generator(|push, _next| {
        push.value(v(2));
        push.end();
    });
    let outer = Stream::generator(move |push, _next| {
        push.value(v(1));
        push.value(Nested::Stream(inner.clone()));
        push.end();
    });
    let seen = recorder();
    let sink = seen.clone();

    // Act
    outer.flatten().to_vec(move |xs| sink.record(xs));

    // Assert
    assert_eq!(seen.take(), vec![vec![1, 2]]);
}

#[test]
fn test_flatten_reads_nested_streams_on_demand() {
    // Arrange
    let inner = Stream::from(vec![v(2), v(3), v(4)]);
    let source = Stream::from(vec![v(1), Nested::Stream(inner.clone())]);
    let seen = recorder();
    let sink = seen.clone();

    // Act
    source.flatten().take(2).to_vec(move |xs| sink.record(xs));

    // Assert
    assert_eq!(seen.take(), vec![vec![1, 2]]);
    let rest = recorder();
    let sink = rest.clone();
    inner.flatten().to_vec(move |xs| sink.record(xs));
    assert_eq!(rest.take(), vec![vec![3, 4]]);
}

#[test]
fn test_flatten_claims_the_outer_stream() {
    // Arrange
    let outer = Stream::from(vec![v(1), seq(vec![v(2)])]).with_label("nested");
    let flat = outer.flatten();

    // Act
    let second = outer.try_consume(|_item, _push: &Push<()>, next| next.call());

    // Assert
    assert!(matches!(
        second,
        Err(RillError::AlreadyConsumed { ref label }) if label == "nested"
    ));
    let seen = recorder();
    let sink = seen.clone();
    flat.to_vec(move |xs| sink.record(xs));
    assert_eq!(seen.take(), vec![vec![1, 2]]);
}

#[test]
fn test_flatten_holds_the_claim_between_reads() {
    // Arrange
    let outer = Stream::from(vec![v(1), v(2), v(3)]);
    let seen = recorder();
    let sink = seen.clone();

    // Act
    outer.flatten().take(1).to_vec(move |xs| sink.record(xs));
    let second = outer.try_pull(|_item| {});

    // Assert
    assert_eq!(seen.take(), vec![vec![1]]);
    assert!(second.is_err());
}

#[test]
fn test_flatten_forwards_failures() {
    // Arrange
    let inner = Stream::new();
    inner.write(StreamItem::Value(v(2)));
    inner.write(StreamItem::Error(RillError::producer_failure("inner")));
    inner.write(StreamItem::End);
    let source = Stream::from(vec![v(1), Nested::Stream(inner), v(3)]);
    let (values, failures) = (recorder(), recorder());
    let (vs, fs) = (values.clone(), failures.clone());

    // Act
    source
        .flatten()
        .errors(move |e, _push| fs.record(e.to_string()))
        .each(move |x| vs.record(x));

    // Assert
    assert_eq!(values.take(), vec![1, 2, 3]);
    assert_eq!(failures.take(), vec!["Producer failure: inner".to_string()]);
}

#[tokio::test]
async fn test_flatten_async_nested_generators() -> anyhow::Result<()> {
    run_local(async {
        // Arrange
        let s3 = Stream::generator(|push, _next| {
            let push = push.clone();
            defer_after(20, move || {
                push.value(v(3));
                push.value(v(4));
                push.end();
            });
        });
        let s2 = Stream::generator(move |push, _next| {
            let (push, s3) = (push.clone(), s3.clone());
            defer_after(5, move || {
                push.value(v(2));
                push.value(Nested::Stream(s3));
                push.value(v(5));
                push.end();
            });
        });
        let s1 = Stream::generator(move |push, _next| {
            push.value(v(1));
            push.value(Nested::Stream(s2.clone()));
            push.value(seq(vec![v(6)]));
            push.end();
        });

        // Act
        let values = s1.flatten().collect().await?;

        // Assert
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
        Ok::<_, anyhow::Error>(())
    })
    .await
}
