//! In-memory target elements
//!
//! Headless implementations of the target traits, usable for server-side
//! rendering and as the test double for the whole suite. Every primitive
//! invocation is recorded in a call log so callers can assert on commit
//! counts and ordering.

use crate::target::{MediaTarget, TargetKey, VideoTarget};
use enhance_common::{CandidateSource, TargetEvent};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// One recorded primitive invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ElementCall {
    SetSource(String),
    SetAttribute(String, String),
    SetSources(Vec<CandidateSource>),
    SetPoster(String),
}

#[derive(Debug, Default)]
struct ElementRecord {
    source: Option<String>,
    attributes: BTreeMap<String, String>,
    sources: Vec<CandidateSource>,
    poster: Option<String>,
    fired: HashSet<TargetEvent>,
    log: Vec<ElementCall>,
}

impl ElementRecord {
    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        // A new resource invalidates previously observed events.
        self.fired.clear();
        self.log.push(ElementCall::SetSource(url.to_string()));
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_string(), value.to_string());
        if name == "src" {
            self.source = Some(value.to_string());
            self.fired.remove(&TargetEvent::Load);
            self.fired.remove(&TargetEvent::Error);
        }
        self.log
            .push(ElementCall::SetAttribute(name.to_string(), value.to_string()));
    }
}

/// In-memory image element
pub struct MemoryImageElement {
    key: TargetKey,
    layout_width: Option<u32>,
    events: broadcast::Sender<TargetEvent>,
    record: Mutex<ElementRecord>,
}

impl MemoryImageElement {
    /// Create an element with no layout information
    pub fn new() -> Self {
        Self::with_layout(None)
    }

    /// Create an element whose layout width is known to the embedding
    pub fn with_layout_width(width: u32) -> Self {
        Self::with_layout(Some(width))
    }

    fn with_layout(layout_width: Option<u32>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            key: TargetKey::next(),
            layout_width,
            events,
            record: Mutex::new(ElementRecord::default()),
        }
    }

    /// Fire an element event: recorded as observed for the current source
    /// and broadcast to live subscribers.
    pub fn fire(&self, event: TargetEvent) {
        self.record.lock().expect("element poisoned").fired.insert(event);
        // No live subscribers is fine; the sticky record above covers them.
        let _ = self.events.send(event);
    }

    /// The element's current source URL, whichever primitive wrote it last
    pub fn source(&self) -> Option<String> {
        self.record.lock().expect("element poisoned").source.clone()
    }

    /// Current value of an attribute
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.record
            .lock()
            .expect("element poisoned")
            .attributes
            .get(name)
            .cloned()
    }

    /// Full primitive call log, in invocation order
    pub fn calls(&self) -> Vec<ElementCall> {
        self.record.lock().expect("element poisoned").log.clone()
    }

    /// Number of source-setting primitive invocations
    pub fn set_source_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ElementCall::SetSource(_)))
            .count()
    }

    /// Number of attribute-setting primitive invocations
    pub fn set_attribute_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ElementCall::SetAttribute(_, _)))
            .count()
    }
}

impl Default for MemoryImageElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaTarget for MemoryImageElement {
    fn key(&self) -> TargetKey {
        self.key
    }

    fn set_source(&self, url: &str) {
        self.record.lock().expect("element poisoned").set_source(url);
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.record
            .lock()
            .expect("element poisoned")
            .set_attribute(name, value);
    }

    fn events(&self) -> broadcast::Receiver<TargetEvent> {
        self.events.subscribe()
    }

    fn event_state(&self, event: TargetEvent) -> bool {
        self.record
            .lock()
            .expect("element poisoned")
            .fired
            .contains(&event)
    }

    fn layout_width(&self) -> Option<u32> {
        self.layout_width
    }
}

/// In-memory video element: candidate source list and poster on top of the
/// image element surface.
pub struct MemoryVideoElement {
    base: MemoryImageElement,
}

impl MemoryVideoElement {
    pub fn new() -> Self {
        Self {
            base: MemoryImageElement::new(),
        }
    }

    /// Fire an element event
    pub fn fire(&self, event: TargetEvent) {
        self.base.fire(event);
    }

    /// Current candidate source list
    pub fn sources(&self) -> Vec<CandidateSource> {
        self.base
            .record
            .lock()
            .expect("element poisoned")
            .sources
            .clone()
    }

    /// Current poster URL
    pub fn poster(&self) -> Option<String> {
        self.base
            .record
            .lock()
            .expect("element poisoned")
            .poster
            .clone()
    }

    /// Current value of an attribute
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.base.attribute(name)
    }

    /// Full primitive call log, in invocation order
    pub fn calls(&self) -> Vec<ElementCall> {
        self.base.calls()
    }

    /// Number of candidate-list assignments
    pub fn set_sources_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ElementCall::SetSources(_)))
            .count()
    }
}

impl Default for MemoryVideoElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaTarget for MemoryVideoElement {
    fn key(&self) -> TargetKey {
        self.base.key
    }

    fn set_source(&self, url: &str) {
        self.base.set_source(url);
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.base.set_attribute(name, value);
    }

    fn events(&self) -> broadcast::Receiver<TargetEvent> {
        self.base.events()
    }

    fn event_state(&self, event: TargetEvent) -> bool {
        self.base.event_state(event)
    }

    fn layout_width(&self) -> Option<u32> {
        self.base.layout_width
    }
}

impl VideoTarget for MemoryVideoElement {
    fn set_sources(&self, sources: &[CandidateSource]) {
        let mut record = self.base.record.lock().expect("element poisoned");
        record.sources = sources.to_vec();
        record.log.push(ElementCall::SetSources(sources.to_vec()));
    }

    fn set_poster(&self, url: &str) {
        let mut record = self.base.record.lock().expect("element poisoned");
        record.poster = Some(url.to_string());
        record.log.push(ElementCall::SetPoster(url.to_string()));
    }
}
