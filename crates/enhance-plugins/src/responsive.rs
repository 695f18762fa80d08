//! Responsive resizing plugin

use crate::placeholder::StageGate;
use async_trait::async_trait;
use enhance_core::{
    EngineError, EnhancementPlugin, PluginContext, PluginError, PluginFeature, PluginHint,
    PluginOutcome,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Configuration for the responsive plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsiveConfig {
    /// Width rounding step in CSS pixels. Requested widths round up to the
    /// next step so nearby layouts share cached renditions.
    #[serde(default = "default_step")]
    pub step: u32,

    /// Hard ceiling on the requested width
    #[serde(default)]
    pub max_width: Option<u32>,

    /// Width assumed when the embedding reports no layout information
    #[serde(default = "default_fallback_width")]
    pub fallback_width: u32,
}

fn default_step() -> u32 {
    100
}

fn default_fallback_width() -> u32 {
    640
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            max_width: None,
            fallback_width: default_fallback_width(),
        }
    }
}

impl ResponsiveConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

/// Requests a rendition scaled to the element's layout width.
///
/// Optionally sequenced after another plugin's stage gate: composed with
/// the placeholder plugin, no width-adjusted rendition is requested until
/// the placeholder's own load-driven stage has completed.
pub struct ResponsivePlugin {
    config: ResponsiveConfig,
    after: Option<StageGate>,
}

impl ResponsivePlugin {
    pub fn new(config: ResponsiveConfig) -> Self {
        Self {
            config,
            after: None,
        }
    }

    /// Sequence this plugin after a stage gate
    pub fn after(mut self, gate: StageGate) -> Self {
        self.after = Some(gate);
        self
    }

    fn scaled_width(&self, layout_width: Option<u32>) -> u32 {
        let step = self.config.step.max(1);
        let base = layout_width.unwrap_or(self.config.fallback_width).max(1);
        let rounded = base.div_ceil(step) * step;
        match self.config.max_width {
            Some(max) => rounded.min(max),
            None => rounded,
        }
    }
}

impl Default for ResponsivePlugin {
    fn default() -> Self {
        Self::new(ResponsiveConfig::default())
    }
}

#[async_trait]
impl EnhancementPlugin for ResponsivePlugin {
    fn name(&self) -> &str {
        "responsive"
    }

    fn feature(&self) -> PluginFeature {
        PluginFeature::Responsive
    }

    async fn run(&self, ctx: &PluginContext) -> Result<PluginOutcome, PluginError> {
        let cancel = ctx.cancel_guard();

        if let Some(gate) = &self.after {
            let mut gate = gate.clone();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(PluginOutcome::Canceled),
                opened = gate.opened() => {
                    if !opened {
                        return Err(PluginError::ExecutionFailed(
                            "upstream stage dropped before opening its gate".to_string(),
                        ));
                    }
                }
            }
        }

        if cancel.is_cancelled() {
            return Ok(PluginOutcome::Canceled);
        }

        let width = self.scaled_width(ctx.target().layout_width());
        debug!(width, "settling responsive hint");
        Ok(PluginOutcome::Settled(PluginHint::Responsive { width }))
    }
}
