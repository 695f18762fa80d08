//! Shared helpers for the integration suites

use async_trait::async_trait;
use media_enhance::{
    AssetDescriptor, EnhancementPlugin, EventWait, PluginContext, PluginError, PluginFeature,
    PluginHint, PluginOutcome, TargetEvent,
};
use std::sync::Arc;

pub fn descriptor() -> Arc<AssetDescriptor> {
    Arc::new(AssetDescriptor::new(
        "https://media.example.com/demo",
        "sample",
        "jpg",
    ))
}

/// Let spawned plugin tasks run to their next suspension point
pub async fn settle() {
    for _ in 0..6 {
        tokio::task::yield_now().await;
    }
}

/// Settles with a fixed-width responsive hint once the load event fires;
/// resolves to the cancellation sentinel if preempted first.
pub struct DeferredPlugin {
    pub width: u32,
}

#[async_trait]
impl EnhancementPlugin for DeferredPlugin {
    fn name(&self) -> &str {
        "deferred"
    }

    fn feature(&self) -> PluginFeature {
        PluginFeature::Responsive
    }

    async fn run(&self, ctx: &PluginContext) -> Result<PluginOutcome, PluginError> {
        match ctx.wait_for(TargetEvent::Load).await? {
            EventWait::Canceled => Ok(PluginOutcome::Canceled),
            EventWait::Fired => Ok(PluginOutcome::Settled(PluginHint::Responsive {
                width: self.width,
            })),
        }
    }
}
