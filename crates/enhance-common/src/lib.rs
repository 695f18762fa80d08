//! Common types shared across the media enhancement crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing hint values out of configuration strings
#[derive(Debug, Error)]
pub enum HintParseError {
    #[error("unknown placeholder style: {0}")]
    UnknownPlaceholderStyle(String),

    #[error("unknown accessibility assist mode: {0}")]
    UnknownAssistMode(String),
}

/// Low-fidelity rendition used while the full resource loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderStyle {
    /// Heavy blur at minimum quality
    Blur,

    /// Coarse pixelation
    Pixelate,

    /// Vector trace of the dominant shapes
    Vectorize,

    /// Single predominant-color fill
    PredominantColor,
}

impl PlaceholderStyle {
    /// URL transformation segment for this style
    pub fn transform_segment(&self) -> &'static str {
        match self {
            PlaceholderStyle::Blur => "e_blur:2000,q_1",
            PlaceholderStyle::Pixelate => "e_pixelate,q_1",
            PlaceholderStyle::Vectorize => "e_vectorize,q_1",
            PlaceholderStyle::PredominantColor => "w_1,h_1",
        }
    }
}

impl FromStr for PlaceholderStyle {
    type Err = HintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blur" => Ok(PlaceholderStyle::Blur),
            "pixelate" => Ok(PlaceholderStyle::Pixelate),
            "vectorize" => Ok(PlaceholderStyle::Vectorize),
            "predominant-color" => Ok(PlaceholderStyle::PredominantColor),
            other => Err(HintParseError::UnknownPlaceholderStyle(other.to_string())),
        }
    }
}

/// Vision-assist rendering mode applied for accessibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssistMode {
    DarkMode,
    BrightMode,
    Monochrome,
    Colorblind,
}

impl AssistMode {
    /// URL transformation segment for this mode
    pub fn transform_segment(&self) -> &'static str {
        match self {
            AssistMode::DarkMode => "e_tint:75:black",
            AssistMode::BrightMode => "e_brightness:30",
            AssistMode::Monochrome => "e_grayscale",
            AssistMode::Colorblind => "e_assist_colorblind",
        }
    }
}

impl FromStr for AssistMode {
    type Err = HintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark-mode" => Ok(AssistMode::DarkMode),
            "bright-mode" => Ok(AssistMode::BrightMode),
            "monochrome" => Ok(AssistMode::Monochrome),
            "colorblind" => Ok(AssistMode::Colorblind),
            other => Err(HintParseError::UnknownAssistMode(other.to_string())),
        }
    }
}

/// Accumulated transformation hints applied when deriving a delivery URL.
///
/// Segment order is fixed (width, placeholder, assist) so that identical
/// hints always produce identical URLs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformHints {
    /// Scaled width in CSS pixels
    pub width: Option<u32>,

    /// Low-fidelity placeholder rendition
    pub placeholder: Option<PlaceholderStyle>,

    /// Accessibility assist mode
    pub assist: Option<AssistMode>,
}

impl TransformHints {
    /// Render the hints as ordered URL transformation segments
    pub fn segments(&self) -> Vec<String> {
        let mut segments = Vec::with_capacity(3);
        if let Some(width) = self.width {
            segments.push(format!("w_{width}"));
        }
        if let Some(style) = self.placeholder {
            segments.push(style.transform_segment().to_string());
        }
        if let Some(mode) = self.assist {
            segments.push(mode.transform_segment().to_string());
        }
        segments
    }
}

/// Asynchronous events observable on a target element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEvent {
    /// The current resource finished loading
    Load,

    /// The current resource failed to load
    Error,

    /// The element entered the viewport
    Visible,
}

impl fmt::Display for TargetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetEvent::Load => write!(f, "load"),
            TargetEvent::Error => write!(f, "error"),
            TargetEvent::Visible => write!(f, "visible"),
        }
    }
}

/// Requested container format for one video candidate source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSourceSpec {
    /// Container format, e.g. "mp4" or "webm"
    pub format: String,

    /// Optional codec list advertised in the MIME type
    pub codecs: Option<Vec<String>>,
}

impl VideoSourceSpec {
    /// Create a spec with no codec constraints
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            codecs: None,
        }
    }

    /// Attach a codec list
    pub fn with_codecs(mut self, codecs: Vec<String>) -> Self {
        self.codecs = Some(codecs);
        self
    }

    /// MIME type advertised for this candidate, e.g. `video/mp4; codecs=avc1`
    pub fn mime_type(&self) -> String {
        match &self.codecs {
            Some(codecs) if !codecs.is_empty() => {
                format!("video/{}; codecs={}", self.format, codecs.join(", "))
            }
            _ => format!("video/{}", self.format),
        }
    }
}

/// One resolved entry of a video element's candidate source list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSource {
    pub mime_type: String,
    pub url: String,
}

/// Handle to a deliverable media resource.
///
/// Owned by the URL-generation side of the system; the enhancement engine
/// only reads it. Given identical hints the same descriptor always yields
/// the same URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Delivery base, e.g. `https://media.example.com/demo`
    pub delivery_base: String,

    /// Public identifier of the asset within the delivery base
    pub public_id: String,

    /// Default container format / file extension
    pub format: String,
}

impl AssetDescriptor {
    /// Create a descriptor
    pub fn new(
        delivery_base: impl Into<String>,
        public_id: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            delivery_base: delivery_base.into(),
            public_id: public_id.into(),
            format: format.into(),
        }
    }

    /// Delivery URL under the given hints, in the default format
    pub fn url_for(&self, hints: &TransformHints) -> String {
        self.url_for_format(hints, &self.format)
    }

    /// Delivery URL under the given hints, in an alternate container format
    pub fn url_for_format(&self, hints: &TransformHints, format: &str) -> String {
        let segments = hints.segments();
        if segments.is_empty() {
            format!("{}/{}.{}", self.delivery_base, self.public_id, format)
        } else {
            format!(
                "{}/{}/{}.{}",
                self.delivery_base,
                segments.join(","),
                self.public_id,
                format
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> AssetDescriptor {
        AssetDescriptor::new("https://media.example.com/demo", "sample", "jpg")
    }

    #[test]
    fn test_plain_url_has_no_transform_segment() {
        let url = descriptor().url_for(&TransformHints::default());
        assert_eq!(url, "https://media.example.com/demo/sample.jpg");
    }

    #[test]
    fn test_segment_order_is_stable() {
        let hints = TransformHints {
            width: Some(800),
            placeholder: Some(PlaceholderStyle::Blur),
            assist: Some(AssistMode::Colorblind),
        };
        assert_eq!(
            descriptor().url_for(&hints),
            "https://media.example.com/demo/w_800,e_blur:2000,q_1,e_assist_colorblind/sample.jpg"
        );
    }

    #[test]
    fn test_alternate_format_url() {
        let url = descriptor().url_for_format(&TransformHints::default(), "webm");
        assert_eq!(url, "https://media.example.com/demo/sample.webm");
    }

    #[test]
    fn test_video_source_mime_type() {
        let spec = VideoSourceSpec::new("mp4").with_codecs(vec!["avc1".to_string()]);
        assert_eq!(spec.mime_type(), "video/mp4; codecs=avc1");

        let bare = VideoSourceSpec::new("webm");
        assert_eq!(bare.mime_type(), "video/webm");
    }

    #[test]
    fn test_hints_serialization_round_trip() {
        let hints = TransformHints {
            width: Some(640),
            placeholder: Some(PlaceholderStyle::Pixelate),
            assist: None,
        };
        let json = serde_json::to_string(&hints).unwrap();
        let back: TransformHints = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hints);
    }

    #[test]
    fn test_placeholder_style_from_str() {
        assert_eq!(
            "blur".parse::<PlaceholderStyle>().unwrap(),
            PlaceholderStyle::Blur
        );
        assert!("sparkle".parse::<PlaceholderStyle>().is_err());
    }
}
