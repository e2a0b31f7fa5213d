//! Narrative Data Model
//!
//! Immutable, content-addressed building blocks for temporal emotion
//! narratives.
//!
//! # Core Concepts
//!
//! - [`EmotionEvent`]: one time-stamped observation with an uninterpreted label
//! - [`EmotionTimeline`]: chronologically ordered events of one subject,
//!   addressed by a structural [`Fingerprint`]
//! - [`TimeWindow`]: a half-open `[start, end)` interval
//! - [`Episode`]: a window plus the events inside it, addressed by a
//!   content-sensitive identifier
//! - [`Identified`]: the sealed trait shared by every fingerprinted entity
//!
//! # Example
//!
//! ```rust,ignore
//! use narrative_model::{EmotionEvent, EmotionTimeline};
//!
//! let timeline = EmotionTimeline::from_events("subject-1", events, None);
//! println!("fingerprint: {}", timeline.fingerprint());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod episode;
mod error;
mod event;
mod hash;
mod identity;
mod timeline;
mod window;

pub mod time;

pub use episode::Episode;
pub use error::{ModelError, ModelResult};
pub use event::EmotionEvent;
pub use hash::{Fingerprint, HashError, FINGERPRINT_HEX_LEN, FINGERPRINT_LEN};
pub use identity::Identified;
pub use timeline::EmotionTimeline;
pub use window::TimeWindow;

/// Sealed trait support for entity kinds defined in sibling crates.
/// **Note:** This is only for workspace use and may change.
#[doc(hidden)]
pub mod __private {
    pub use super::identity::private::Sealed;
}

/// Schema version stamped on every payload leaving the system
pub const SCHEMA_VERSION: &str = "1.0";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
