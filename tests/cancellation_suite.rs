//! Cancellation Suite - preemption across overlapping pipelines
//!
//! Two layers on one element race unless the older generation is canceled
//! first; these tests pin down both halves of that contract, plus
//! idempotency, generation isolation, and terminal unmount semantics.

mod common;

use common::{descriptor, settle, DeferredPlugin};
use media_enhance::{
    cancel_currently_running_plugins, AnalyticsOptions, EngineError, ImageLayer, MediaTarget,
    MemoryImageElement, StateRegistry, TargetEvent,
};
use std::sync::Arc;

#[tokio::test]
async fn test_cancel_before_settle_commits_only_second_instance() {
    let element = Arc::new(MemoryImageElement::new());

    let first = ImageLayer::mount(
        Some(element.clone()),
        descriptor(),
        vec![Arc::new(DeferredPlugin { width: 800 })],
        AnalyticsOptions::default(),
    )
    .unwrap();
    let second = ImageLayer::mount(
        Some(element.clone()),
        descriptor(),
        vec![Arc::new(DeferredPlugin { width: 480 })],
        AnalyticsOptions::default(),
    )
    .unwrap();

    // Unmount-before-settle: the first pipeline's pending work resolves to
    // the cancellation sentinel and commits nothing.
    cancel_currently_running_plugins(&first.plugin_state());

    element.fire(TargetEvent::Load);
    settle().await;

    assert_eq!(element.set_attribute_calls(), 1);
    assert!(element.source().unwrap().contains("w_480"));
    drop(second);
}

#[tokio::test]
async fn test_without_cancel_both_instances_commit() {
    let element = Arc::new(MemoryImageElement::new());

    let _first = ImageLayer::mount(
        Some(element.clone()),
        descriptor(),
        vec![Arc::new(DeferredPlugin { width: 800 })],
        AnalyticsOptions::default(),
    )
    .unwrap();
    let _second = ImageLayer::mount(
        Some(element.clone()),
        descriptor(),
        vec![Arc::new(DeferredPlugin { width: 480 })],
        AnalyticsOptions::default(),
    )
    .unwrap();

    element.fire(TargetEvent::Load);
    settle().await;

    // No preemption happened, so both pipelines' commits land.
    assert_eq!(element.set_attribute_calls(), 2);
    assert!(element.source().unwrap().contains("w_"));
}

#[tokio::test]
async fn test_repeated_cancellation_is_idempotent() {
    let element = Arc::new(MemoryImageElement::new());
    let layer = ImageLayer::mount(
        Some(element.clone()),
        descriptor(),
        vec![Arc::new(DeferredPlugin { width: 800 })],
        AnalyticsOptions::default(),
    )
    .unwrap();

    let state = layer.plugin_state();
    cancel_currently_running_plugins(&state);
    cancel_currently_running_plugins(&state);

    element.fire(TargetEvent::Load);
    settle().await;
    assert_eq!(element.set_attribute_calls(), 0);
}

#[tokio::test]
async fn test_canceling_old_generation_spares_the_new_one() {
    let element = Arc::new(MemoryImageElement::new());
    let mut layer = ImageLayer::mount(
        Some(element.clone()),
        descriptor(),
        vec![Arc::new(DeferredPlugin { width: 800 })],
        AnalyticsOptions::default(),
    )
    .unwrap();

    let old_state = layer.plugin_state();
    cancel_currently_running_plugins(&old_state);
    layer
        .update(
            descriptor(),
            vec![Arc::new(DeferredPlugin { width: 320 })],
            &[],
        )
        .unwrap();
    assert!(!Arc::ptr_eq(&old_state, &layer.plugin_state()));

    element.fire(TargetEvent::Load);
    settle().await;

    // Only the new generation's plugin commits.
    assert_eq!(element.set_attribute_calls(), 1);
    assert!(element.source().unwrap().contains("w_320"));
}

#[tokio::test]
async fn test_unmount_is_terminal() {
    let element = Arc::new(MemoryImageElement::new());
    let mut layer = ImageLayer::mount(
        Some(element.clone()),
        descriptor(),
        vec![Arc::new(DeferredPlugin { width: 800 })],
        AnalyticsOptions::default(),
    )
    .unwrap();

    layer.unmount();
    layer.unmount();

    let result = layer.update(descriptor(), Vec::new(), &[]);
    assert!(matches!(result, Err(EngineError::Unmounted)));

    element.fire(TargetEvent::Load);
    settle().await;
    assert_eq!(element.set_attribute_calls(), 0);
}

#[tokio::test]
async fn test_registry_tracks_current_generation() {
    let element = Arc::new(MemoryImageElement::new());
    let key = element.key();

    let layer = ImageLayer::mount(
        Some(element.clone()),
        descriptor(),
        Vec::new(),
        AnalyticsOptions::default(),
    )
    .unwrap();

    let current = StateRegistry::global().current(key).unwrap();
    assert!(Arc::ptr_eq(&current, &layer.plugin_state()));

    layer.unmount();
    assert!(StateRegistry::global().current(key).is_none());
}
