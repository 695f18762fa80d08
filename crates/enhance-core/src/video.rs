//! Video enhancement layer

use crate::descriptor::TransformSource;
use crate::error::EngineError;
use crate::image::token_for;
use crate::layer::LayerShared;
use crate::plugin::{EnhancementPlugin, PluginContext};
use crate::runner::spawn_plugin;
use crate::state::{cancel_currently_running_plugins, PluginState, StateRegistry};
use crate::target::{MediaTarget, TargetKey, VideoTarget};
use crate::token::{AnalyticsOptions, AnalyticsToken};
use enhance_common::{CandidateSource, TransformHints, VideoSourceSpec};
use std::sync::Arc;
use tracing::{debug, info};

/// Enhancement pipeline bound to one video element.
///
/// The commit step specializes to playback: the baseline assigns the
/// candidate source list (one entry per requested container format, every
/// URL carrying the analytics token) and binding-supplied attributes,
/// `poster` included. The `update` surface takes new props without
/// reconstructing the instance; as with images, canceling the superseded
/// generation is the caller's responsibility.
pub struct VideoLayer {
    shared: Arc<LayerShared>,
    video: Arc<dyn VideoTarget>,
    state: Arc<PluginState>,
    key: TargetKey,
    options: AnalyticsOptions,
}

impl VideoLayer {
    /// Mount a pipeline on a video element
    pub fn mount(
        target: Option<Arc<dyn VideoTarget>>,
        descriptor: Arc<dyn TransformSource>,
        sources: Vec<VideoSourceSpec>,
        plugins: Vec<Arc<dyn EnhancementPlugin>>,
        attrs: &[(String, String)],
        options: AnalyticsOptions,
    ) -> Result<Self, EngineError> {
        let video = target.ok_or(EngineError::MissingTarget)?;
        let media: Arc<dyn MediaTarget> = video.clone();
        let token = token_for(&options, &plugins);
        let key = media.key();
        let shared = Arc::new(LayerShared::new(media, descriptor, token));
        let state = StateRegistry::global().begin_generation(key);

        let layer = Self {
            shared,
            video,
            state,
            key,
            options,
        };
        layer.start_pipeline(sources, plugins, attrs);
        Ok(layer)
    }

    /// Re-render with new props: fresh candidate list, fresh generation,
    /// new plugin pipeline. Never cancels the previous generation itself.
    pub fn update(
        &mut self,
        descriptor: Arc<dyn TransformSource>,
        sources: Vec<VideoSourceSpec>,
        plugins: Vec<Arc<dyn EnhancementPlugin>>,
        attrs: &[(String, String)],
    ) -> Result<(), EngineError> {
        if self.shared.is_unmounted() {
            return Err(EngineError::Unmounted);
        }

        self.state = StateRegistry::global().begin_generation(self.key);
        let token = token_for(&self.options, &plugins);
        self.shared.rebaseline(descriptor, token);
        self.start_pipeline(sources, plugins, attrs);
        Ok(())
    }

    /// Cancel this layer's pending plugin work and stop committing.
    /// Terminal; repeated calls are no-ops.
    pub fn unmount(&self) {
        if self.shared.mark_unmounted() {
            return;
        }
        cancel_currently_running_plugins(&self.state);
        StateRegistry::global().release(self.key, &self.state);
        debug!(target_key = self.key.as_u64(), "video layer unmounted");
    }

    /// The current generation's cleanup state, for external cancellation
    pub fn plugin_state(&self) -> Arc<PluginState> {
        Arc::clone(&self.state)
    }

    fn start_pipeline(
        &self,
        sources: Vec<VideoSourceSpec>,
        plugins: Vec<Arc<dyn EnhancementPlugin>>,
        attrs: &[(String, String)],
    ) {
        let (descriptor, token) = self.shared.context_parts();

        let candidates = build_candidates(&*descriptor, &token, &sources);
        self.video.set_sources(&candidates);
        for (name, value) in attrs {
            if name == "poster" {
                self.video.set_poster(value);
            } else {
                self.video.set_attribute(name, value);
            }
        }
        info!(
            candidates = candidates.len(),
            plugins = plugins.len(),
            "video enhancement pipeline started"
        );

        let contexts: Vec<PluginContext> = plugins
            .iter()
            .map(|_| {
                PluginContext::new(
                    Arc::clone(self.shared.target()),
                    Arc::clone(&descriptor),
                    Arc::clone(&self.state),
                    token.clone(),
                )
            })
            .collect();

        for (plugin, ctx) in plugins.iter().zip(&contexts) {
            plugin.prime(ctx);
        }
        for (plugin, ctx) in plugins.into_iter().zip(contexts) {
            spawn_plugin(plugin, ctx, Arc::clone(&self.shared));
        }
    }
}

fn build_candidates(
    descriptor: &dyn TransformSource,
    token: &AnalyticsToken,
    sources: &[VideoSourceSpec],
) -> Vec<CandidateSource> {
    let hints = TransformHints::default();
    let mut candidates = Vec::with_capacity(sources.len());
    for spec in sources {
        candidates.push(CandidateSource {
            mime_type: spec.mime_type(),
            url: token.decorate(&descriptor.to_url_with_format(&hints, &spec.format)),
        });
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MemoryVideoElement;
    use enhance_common::AssetDescriptor;

    fn descriptor() -> Arc<AssetDescriptor> {
        Arc::new(AssetDescriptor::new(
            "https://media.example.com/demo",
            "clip",
            "mp4",
        ))
    }

    fn specs() -> Vec<VideoSourceSpec> {
        vec![
            VideoSourceSpec::new("mp4").with_codecs(vec!["avc1".to_string()]),
            VideoSourceSpec::new("webm"),
        ]
    }

    #[tokio::test]
    async fn test_candidate_list_carries_token_per_format() {
        let element = Arc::new(MemoryVideoElement::new());
        let _layer = VideoLayer::mount(
            Some(element.clone()),
            descriptor(),
            specs(),
            Vec::new(),
            &[],
            AnalyticsOptions::default(),
        )
        .unwrap();

        let candidates = element.sources();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].mime_type, "video/mp4; codecs=avc1");
        assert!(candidates[0].url.contains("clip.mp4?_a="));
        assert_eq!(candidates[1].mime_type, "video/webm");
        assert!(candidates[1].url.contains("clip.webm?_a="));
        assert_eq!(element.set_sources_calls(), 1);
    }

    #[tokio::test]
    async fn test_poster_attribute_routes_to_poster_primitive() {
        let element = Arc::new(MemoryVideoElement::new());
        let _layer = VideoLayer::mount(
            Some(element.clone()),
            descriptor(),
            specs(),
            Vec::new(),
            &[
                ("poster".to_string(), "https://x/poster.jpg".to_string()),
                ("muted".to_string(), "true".to_string()),
            ],
            AnalyticsOptions::default(),
        )
        .unwrap();

        assert_eq!(element.poster().as_deref(), Some("https://x/poster.jpg"));
        assert_eq!(element.attribute("muted").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_update_replaces_candidates_without_canceling_previous() {
        let element = Arc::new(MemoryVideoElement::new());
        let mut layer = VideoLayer::mount(
            Some(element.clone()),
            descriptor(),
            specs(),
            Vec::new(),
            &[],
            AnalyticsOptions::default(),
        )
        .unwrap();

        let previous_state = layer.plugin_state();
        layer
            .update(descriptor(), vec![VideoSourceSpec::new("webm")], Vec::new(), &[])
            .unwrap();

        assert_eq!(element.set_sources_calls(), 2);
        assert_eq!(element.sources().len(), 1);
        assert!(!Arc::ptr_eq(&previous_state, &layer.plugin_state()));
    }

    #[tokio::test]
    async fn test_missing_video_target_is_rejected() {
        let result = VideoLayer::mount(
            None,
            descriptor(),
            specs(),
            Vec::new(),
            &[],
            AnalyticsOptions::default(),
        );
        assert!(matches!(result, Err(EngineError::MissingTarget)));
    }
}
