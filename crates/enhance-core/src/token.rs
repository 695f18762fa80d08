//! Analytics token encoding
//!
//! Every committed URL carries a short `_a=<token>` query parameter
//! recording which SDK produced it and which enhancement kinds were active
//! in the pipeline. The token is five characters from a fixed 64-symbol
//! alphabet:
//!
//! ```text
//! [algorithm version][sdk id][version major][version minor][feature bits]
//! ```
//!
//! Feature bits are OR-combined, so the token is a pure function of
//! {SDK metadata, active plugin set} and never depends on plugin execution
//! order or timing.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const TOKEN_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

const ALGORITHM_VERSION: char = 'A';

fn symbol(value: u8) -> char {
    TOKEN_ALPHABET[(value & 0x3f) as usize] as char
}

/// Enhancement kinds recognized in the token's feature bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginFeature {
    Responsive,
    Placeholder,
    Accessibility,
    Lazyload,
}

impl PluginFeature {
    fn bit(self) -> u8 {
        match self {
            PluginFeature::Responsive => 1 << 0,
            PluginFeature::Placeholder => 1 << 1,
            PluginFeature::Accessibility => 1 << 2,
            PluginFeature::Lazyload => 1 << 3,
        }
    }
}

/// Identity of the SDK build stamped into tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkMetadata {
    /// Single-character SDK identifier
    pub sdk_code: char,

    /// SDK major version
    pub major: u8,

    /// SDK minor version
    pub minor: u8,
}

impl Default for SdkMetadata {
    fn default() -> Self {
        let mut parts = env!("CARGO_PKG_VERSION").split('.');
        let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Self {
            sdk_code: 'R',
            major,
            minor,
        }
    }
}

/// Analytics configuration supplied at layer construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOptions {
    /// Whether committed URLs carry a token at all
    pub enabled: bool,

    /// SDK identity stamped into tokens
    #[serde(default)]
    pub sdk: SdkMetadata,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            sdk: SdkMetadata::default(),
        }
    }
}

impl AnalyticsOptions {
    /// Options that suppress the token entirely
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            sdk: SdkMetadata::default(),
        }
    }

    /// Load options from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        let options = serde_yaml::from_str(&contents)?;
        Ok(options)
    }
}

/// Encoded analytics token, appended to generated URLs as `_a=<token>`.
///
/// An empty token (analytics disabled) decorates URLs as the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsToken(String);

impl AnalyticsToken {
    /// Compute the token for an SDK identity and the set of active features
    pub fn compute<I>(sdk: &SdkMetadata, features: I) -> Self
    where
        I: IntoIterator<Item = PluginFeature>,
    {
        let mut bits = 0u8;
        for feature in features {
            bits |= feature.bit();
        }

        let mut token = String::with_capacity(5);
        token.push(ALGORITHM_VERSION);
        token.push(sdk.sdk_code);
        token.push(symbol(sdk.major));
        token.push(symbol(sdk.minor));
        token.push(symbol(bits));
        Self(token)
    }

    /// The disabled token
    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append the token to a URL as the `_a` query parameter
    pub fn decorate(&self, url: &str) -> String {
        if self.0.is_empty() {
            return url.to_string();
        }
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}_a={}", self.0)
    }
}
