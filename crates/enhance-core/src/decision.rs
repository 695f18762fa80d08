//! Accumulated enhancement decision and the per-settlement merge

use crate::descriptor::TransformSource;
use crate::plugin::PluginHint;
use crate::token::AnalyticsToken;
use std::collections::BTreeMap;
use enhance_common::TransformHints;

/// The merged result of all settled plugin outputs for one pipeline run:
/// current hints, the committed URL, and the attribute map.
///
/// Results fold in one at a time as plugins settle; there is no batching.
/// When two plugins both override the URL, the later settlement wins.
#[derive(Debug, Clone)]
pub struct EnhancementDecision {
    hints: TransformHints,
    url: String,
    attributes: BTreeMap<String, String>,
}

impl EnhancementDecision {
    /// Baseline decision: no plugin hints applied, URL token-decorated
    pub fn baseline(descriptor: &dyn TransformSource, token: &AnalyticsToken) -> Self {
        let hints = TransformHints::default();
        let url = token.decorate(&descriptor.to_url(&hints));
        Self {
            hints,
            url,
            attributes: BTreeMap::new(),
        }
    }

    /// The currently committed URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Attribute entries committed so far
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Fold one settled hint into the decision; returns the attribute
    /// writes the adapter must commit for it.
    pub fn merge(
        &mut self,
        hint: &PluginHint,
        descriptor: &dyn TransformSource,
        token: &AnalyticsToken,
    ) -> Vec<(String, String)> {
        let writes = match hint {
            PluginHint::Lazyload => {
                vec![("loading".to_string(), "lazy".to_string())]
            }
            PluginHint::Responsive { width } => {
                self.hints.width = Some(*width);
                self.url = token.decorate(&descriptor.to_url(&self.hints));
                vec![("src".to_string(), self.url.clone())]
            }
            PluginHint::Placeholder => {
                // Placeholder stage is over; recommit the canonical rendition.
                self.hints.placeholder = None;
                self.url = token.decorate(&descriptor.to_url(&self.hints));
                vec![("src".to_string(), self.url.clone())]
            }
            PluginHint::Accessibility { mode } => {
                self.hints.assist = Some(*mode);
                self.url = token.decorate(&descriptor.to_url(&self.hints));
                vec![("src".to_string(), self.url.clone())]
            }
        };

        for (name, value) in &writes {
            self.attributes.insert(name.clone(), value.clone());
        }
        writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::SdkMetadata;
    use enhance_common::{AssetDescriptor, AssistMode};

    fn descriptor() -> AssetDescriptor {
        AssetDescriptor::new("https://media.example.com/demo", "sample", "jpg")
    }

    fn token() -> AnalyticsToken {
        AnalyticsToken::compute(
            &SdkMetadata {
                sdk_code: 'R',
                major: 0,
                minor: 1,
            },
            [],
        )
    }

    #[test]
    fn test_baseline_carries_token_and_no_hints() {
        let decision = EnhancementDecision::baseline(&descriptor(), &token());
        assert!(decision.url().starts_with("https://media.example.com/demo/sample.jpg?_a="));
        assert!(decision.attributes().is_empty());
    }

    #[test]
    fn test_responsive_merge_rewrites_source() {
        let descriptor = descriptor();
        let token = token();
        let mut decision = EnhancementDecision::baseline(&descriptor, &token);

        let writes = decision.merge(
            &PluginHint::Responsive { width: 800 },
            &descriptor,
            &token,
        );
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "src");
        assert!(writes[0].1.contains("/w_800/"));
        assert_eq!(decision.attributes().get("src"), Some(&writes[0].1));
    }

    #[test]
    fn test_lazyload_merge_is_attribute_only() {
        let descriptor = descriptor();
        let token = token();
        let mut decision = EnhancementDecision::baseline(&descriptor, &token);
        let baseline_url = decision.url().to_string();

        let writes = decision.merge(&PluginHint::Lazyload, &descriptor, &token);
        assert_eq!(
            writes,
            vec![("loading".to_string(), "lazy".to_string())]
        );
        assert_eq!(decision.url(), baseline_url);
    }

    #[test]
    fn test_later_settlement_wins_url() {
        let descriptor = descriptor();
        let token = token();
        let mut decision = EnhancementDecision::baseline(&descriptor, &token);

        decision.merge(
            &PluginHint::Accessibility {
                mode: AssistMode::Colorblind,
            },
            &descriptor,
            &token,
        );
        let writes = decision.merge(
            &PluginHint::Responsive { width: 640 },
            &descriptor,
            &token,
        );

        // Both hints survive in the URL; the later write is what lands last.
        assert!(writes[0].1.contains("w_640"));
        assert!(writes[0].1.contains("e_assist_colorblind"));
    }
}
