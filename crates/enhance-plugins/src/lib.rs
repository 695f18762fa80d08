//! Reference enhancement plugins
//!
//! One module per recognized enhancement kind. Each plugin exercises the
//! full contract of the core engine: cooperative cancellation through the
//! context's guard, self-commits for multi-stage work, and plugin-level
//! sequencing via gates where one plugin must wait on another.

pub mod accessibility;
pub mod lazyload;
pub mod placeholder;
pub mod responsive;

pub use accessibility::{AccessibilityConfig, AccessibilityPlugin};
pub use lazyload::LazyloadPlugin;
pub use placeholder::{PlaceholderConfig, PlaceholderPlugin, StageGate};
pub use responsive::{ResponsiveConfig, ResponsivePlugin};
