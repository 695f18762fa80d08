//! Media Enhance - plugin-driven media enhancement engine
//!
//! Facade over the workspace crates: the plugin execution and cancellation
//! engine (`enhance-core`), the shared leaf types and URL builder
//! (`enhance-common`), and the reference plugins (`enhance-plugins`).

pub use enhance_common as common;
pub use enhance_core as engine;
pub use enhance_plugins as plugins;

pub use enhance_common::{
    AssetDescriptor, AssistMode, CandidateSource, PlaceholderStyle, TargetEvent, TransformHints,
    VideoSourceSpec,
};
pub use enhance_core::{
    cancel_currently_running_plugins, AnalyticsOptions, AnalyticsToken, ElementCall, EngineError,
    EnhancementDecision, EnhancementPlugin, EventWait, ImageLayer, MediaTarget,
    MemoryImageElement, MemoryVideoElement, PluginContext, PluginError, PluginFeature,
    PluginHint, PluginOutcome, PluginState, SdkMetadata, StateRegistry, TargetKey,
    TransformSource, VideoLayer, VideoTarget,
};
pub use enhance_plugins::{
    AccessibilityConfig, AccessibilityPlugin, LazyloadPlugin, PlaceholderConfig,
    PlaceholderPlugin, ResponsivePlugin, ResponsiveConfig, StageGate,
};
