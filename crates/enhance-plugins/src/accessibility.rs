//! Accessibility plugin

use async_trait::async_trait;
use enhance_common::AssistMode;
use enhance_core::{
    EngineError, EnhancementPlugin, PluginContext, PluginError, PluginFeature, PluginHint,
    PluginOutcome,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the accessibility plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessibilityConfig {
    /// Vision-assist rendering mode applied to the delivered resource
    #[serde(default = "default_mode")]
    pub mode: AssistMode,
}

fn default_mode() -> AssistMode {
    AssistMode::DarkMode
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
        }
    }
}

impl AccessibilityConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

/// Applies a vision-assist rendering mode to the delivered resource.
///
/// No external events are involved; the plugin settles as soon as it runs,
/// unless the pipeline was already canceled by then.
#[derive(Debug, Default)]
pub struct AccessibilityPlugin {
    config: AccessibilityConfig,
}

impl AccessibilityPlugin {
    pub fn new(config: AccessibilityConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EnhancementPlugin for AccessibilityPlugin {
    fn name(&self) -> &str {
        "accessibility"
    }

    fn feature(&self) -> PluginFeature {
        PluginFeature::Accessibility
    }

    async fn run(&self, ctx: &PluginContext) -> Result<PluginOutcome, PluginError> {
        if ctx.cancel_guard().is_cancelled() {
            return Ok(PluginOutcome::Canceled);
        }
        Ok(PluginOutcome::Settled(PluginHint::Accessibility {
            mode: self.config.mode,
        }))
    }
}
