//! Interface to the URL-generation collaborator

use enhance_common::{AssetDescriptor, TransformHints};

/// Source of delivery URLs for one media resource.
///
/// Implementations must be deterministic: identical hints yield identical
/// URLs, independent of call timing. The engine only reads through this
/// trait; it never mutates the underlying descriptor.
pub trait TransformSource: Send + Sync {
    /// Delivery URL for the resource under the given hints
    fn to_url(&self, hints: &TransformHints) -> String;

    /// Delivery URL in an alternate container format (video candidates).
    ///
    /// Defaults to the primary format for sources without format variants.
    fn to_url_with_format(&self, hints: &TransformHints, format: &str) -> String {
        let _ = format;
        self.to_url(hints)
    }
}

impl TransformSource for AssetDescriptor {
    fn to_url(&self, hints: &TransformHints) -> String {
        self.url_for(hints)
    }

    fn to_url_with_format(&self, hints: &TransformHints, format: &str) -> String {
        self.url_for_format(hints, format)
    }
}
