//! Target element traits and identity

use enhance_common::{CandidateSource, TargetEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a target element, used to key per-target state.
///
/// Keys are allocated process-wide so two elements never collide; a binding
/// that re-resolves the same underlying element must reuse the key it was
/// handed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetKey(u64);

impl TargetKey {
    /// Allocate a fresh key
    pub fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A mutable media element the engine commits enhancement decisions to.
///
/// The element is supplied externally and is never owned by a layer; several
/// live layers may share one target, which is exactly the situation the
/// cancellation coordinator exists for.
pub trait MediaTarget: Send + Sync {
    /// Stable identity for state-registry lookups
    fn key(&self) -> TargetKey;

    /// Source-setting primitive: assign the element's primary source URL
    fn set_source(&self, url: &str);

    /// Attribute-setting primitive: assign one non-baseline DOM attribute
    fn set_attribute(&self, name: &str, value: &str);

    /// Subscribe to asynchronous element events
    fn events(&self) -> broadcast::Receiver<TargetEvent>;

    /// Whether the given event already fired for the current source.
    ///
    /// Mirrors the `complete` flag of a real image element: a load that
    /// finished before anyone subscribed must still be observable.
    fn event_state(&self, event: TargetEvent) -> bool {
        let _ = event;
        false
    }

    /// Layout width hint in CSS pixels, when the embedding knows it
    fn layout_width(&self) -> Option<u32> {
        None
    }
}

/// A video element: candidate source list and poster on top of the base
/// target surface.
pub trait VideoTarget: MediaTarget {
    /// Replace the element's candidate source list
    fn set_sources(&self, sources: &[CandidateSource]);

    /// Assign the poster image URL
    fn set_poster(&self, url: &str);
}
