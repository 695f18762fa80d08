//! Enhance Core - plugin execution and cancellation engine
//!
//! This crate provides the core of a plugin-based media enhancement system:
//! an engine that builds an ordered pipeline of asynchronous enhancement
//! plugins for one media element, runs each plugin to settlement or
//! cancellation, and commits the merged enhancement decision (URL +
//! attributes) to the element at the right moment relative to asynchronous
//! load events. Overlapping pipelines on the same element are coordinated
//! through per-generation cleanup state and an idempotent cancellation
//! coordinator.

pub mod decision;
pub mod descriptor;
pub mod element;
pub mod error;
pub mod image;
mod layer;
pub mod plugin;
mod runner;
pub mod state;
pub mod target;
pub mod token;
pub mod video;

pub use decision::EnhancementDecision;
pub use descriptor::TransformSource;
pub use element::{ElementCall, MemoryImageElement, MemoryVideoElement};
pub use error::{EngineError, PluginError};
pub use image::ImageLayer;
pub use plugin::{EnhancementPlugin, EventWait, PluginContext, PluginHint, PluginOutcome};
pub use state::{cancel_currently_running_plugins, PluginState, StateRegistry};
pub use target::{MediaTarget, TargetKey, VideoTarget};
pub use token::{AnalyticsOptions, AnalyticsToken, PluginFeature, SdkMetadata};
pub use video::VideoLayer;
