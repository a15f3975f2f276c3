// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod common;

use common::{map, record, shared, take_into};
use rill_core::{Stream, StreamItem};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn test_fork_siblings_advance_together() {
    // Arrange
    let source = Stream::from(vec![1, 2, 3, 4]);
    let doubled = map(&source, |x| x * 2);
    let tripled = map(&source.fork(), |x| x * 3);
    let (d2, d3) = (shared(), shared());

    // Act & Assert: nothing flows until both siblings are resumed
    take_into(&doubled, 1, &d2);
    assert!(d2.borrow().is_empty());

    take_into(&tripled, 2, &d3);
    assert_eq!(*d2.borrow(), vec![2]);
    assert_eq!(*d3.borrow(), vec![3]);

    take_into(&doubled, 1, &d2);
    assert_eq!(*d2.borrow(), vec![2, 4]);
    assert_eq!(*d3.borrow(), vec![3, 6]);

    take_into(&tripled, 2, &d3);
    assert_eq!(*d2.borrow(), vec![2, 4]);
    assert_eq!(*d3.borrow(), vec![3, 6]);

    take_into(&doubled, 2, &d2);
    assert_eq!(*d2.borrow(), vec![2, 4, 6, 8]);
    assert_eq!(*d3.borrow(), vec![3, 6, 9, 12]);
}

#[test]
fn test_fork_produces_each_item_once() {
    // Arrange
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut n = 0;
    let source = Stream::generator(move |push, next| {
        counter.set(counter.get() + 1);
        n += 1;
        if n > 3 {
            push.end();
        } else {
            push.value(n);
            next.call();
        }
    });
    let (left, right) = (source.fork(), source.fork());
    let (left_out, left_seen) = record(&left);
    let (right_out, right_seen) = record(&right);

    // Act
    left_out.resume();

    // Assert
    assert!(left_seen.borrow().is_empty());

    // Act
    right_out.resume();

    // Assert
    let expected = vec![
        StreamItem::Value(1),
        StreamItem::Value(2),
        StreamItem::Value(3),
        StreamItem::End,
    ];
    assert_eq!(*left_seen.borrow(), expected);
    assert_eq!(*right_seen.borrow(), expected);
    assert_eq!(calls.get(), 4);
}

#[test]
fn test_observe_follows_primary_without_driving_it() {
    // Arrange
    let source = Stream::from(vec![1, 2, 3, 4]);
    let doubled = map(&source, |x| x * 2);
    let observer = source.observe();
    let tripled = map(&observer, |x| x * 3);
    let (d2, d3) = (shared(), shared());

    // Act & Assert
    take_into(&doubled, 1, &d2);
    assert_eq!(*d2.borrow(), vec![2]);
    assert!(d3.borrow().is_empty());
    assert_eq!(observer.buffered(), vec![StreamItem::Value(1)]);

    take_into(&tripled, 2, &d3);
    assert_eq!(*d2.borrow(), vec![2]);
    assert_eq!(*d3.borrow(), vec![3]);

    take_into(&doubled, 1, &d2);
    assert_eq!(*d2.borrow(), vec![2, 4]);
    assert_eq!(*d3.borrow(), vec![3, 6]);

    take_into(&tripled, 2, &d3);
    assert_eq!(*d2.borrow(), vec![2, 4]);
    assert_eq!(*d3.borrow(), vec![3, 6]);

    take_into(&doubled, 2, &d2);
    assert_eq!(*d2.borrow(), vec![2, 4, 6, 8]);
    assert_eq!(*d3.borrow(), vec![3, 6, 9, 12]);
}

#[test]
fn test_unresumed_observer_accumulates() {
    // Arrange
    let source = Stream::from(vec![1, 2, 3]);
    let observer = source.observe();
    let (out, seen) = record(&source);

    // Act
    out.resume();

    // Assert
    assert_eq!(seen.borrow().len(), 4);
    assert_eq!(
        observer.buffered(),
        vec![
            StreamItem::Value(1),
            StreamItem::Value(2),
            StreamItem::Value(3),
            StreamItem::End
        ]
    );
}

#[test]
fn test_observer_alone_does_not_start_production() {
    // Arrange
    let source = Stream::from(vec![1, 2]);
    let observer = source.observe();
    let (out, seen) = record(&observer);

    // Act
    out.resume();

    // Assert
    assert!(seen.borrow().is_empty());
    assert!(source.is_paused());
}
