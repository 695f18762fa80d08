//! Blur-up placeholder plugin
//!
//! Two-stage: the prime hook self-commits a low-fidelity rendition before
//! any event can fire, then the async stage waits for that rendition's load
//! event, opens the stage gate for dependent plugins, and settles with the
//! final hint. Canceling the pipeline while the load is pending leaves the
//! gate closed.

use async_trait::async_trait;
use enhance_common::{PlaceholderStyle, TargetEvent, TransformHints};
use enhance_core::{
    EngineError, EnhancementPlugin, EventWait, PluginContext, PluginError, PluginFeature,
    PluginHint, PluginOutcome,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::watch;
use tracing::debug;

/// Configuration for the placeholder plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    /// Rendition style used for the low-fidelity stage
    #[serde(default = "default_style")]
    pub style: PlaceholderStyle,
}

fn default_style() -> PlaceholderStyle {
    PlaceholderStyle::Blur
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
        }
    }
}

impl PlaceholderConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

/// Signal by which one plugin sequences itself after the placeholder's
/// load-driven stage. Clones observe the same underlying gate.
#[derive(Debug, Clone)]
pub struct StageGate {
    inner: watch::Receiver<bool>,
}

impl StageGate {
    /// Wait until the gate opens. Returns false if the gate's owner went
    /// away without ever opening it.
    pub async fn opened(&mut self) -> bool {
        self.inner.wait_for(|open| *open).await.is_ok()
    }
}

/// Blur-up placeholder plugin
pub struct PlaceholderPlugin {
    config: PlaceholderConfig,
    gate: watch::Sender<bool>,
}

impl PlaceholderPlugin {
    pub fn new(config: PlaceholderConfig) -> Self {
        let (gate, _) = watch::channel(false);
        Self { config, gate }
    }

    /// Gate that opens once the placeholder rendition has loaded
    pub fn gate(&self) -> StageGate {
        StageGate {
            inner: self.gate.subscribe(),
        }
    }
}

impl Default for PlaceholderPlugin {
    fn default() -> Self {
        Self::new(PlaceholderConfig::default())
    }
}

#[async_trait]
impl EnhancementPlugin for PlaceholderPlugin {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn feature(&self) -> PluginFeature {
        PluginFeature::Placeholder
    }

    fn prime(&self, ctx: &PluginContext) {
        let hints = TransformHints {
            placeholder: Some(self.config.style),
            ..TransformHints::default()
        };
        // Low-fidelity stage: committed directly, before any event fires.
        ctx.target().set_attribute("src", &ctx.url_for(&hints));
    }

    async fn run(&self, ctx: &PluginContext) -> Result<PluginOutcome, PluginError> {
        match ctx.wait_for(TargetEvent::Load).await? {
            EventWait::Canceled => Ok(PluginOutcome::Canceled),
            EventWait::Fired => {
                debug!("placeholder rendition loaded; opening stage gate");
                self.gate.send_replace(true);
                Ok(PluginOutcome::Settled(PluginHint::Placeholder))
            }
        }
    }
}
