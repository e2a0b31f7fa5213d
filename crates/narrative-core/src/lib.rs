//! Narrative Core
//!
//! Composition root of the narrative workspace:
//! - [`NarrativeConfig`]: thresholds and storage settings, loaded from TOML
//! - [`Observation`]: raw input records from an external data source
//! - [`NarrativePipeline`]: observations → timeline → episodes → graph →
//!   frontend payload, with derived payloads cached by fingerprint
//!
//! # Example
//!
//! ```rust,ignore
//! use narrative_core::{parse_observations, NarrativeConfig, NarrativePipeline};
//!
//! let pipeline = NarrativePipeline::new(NarrativeConfig::load("narrative.toml")?)?;
//! let payload = pipeline.derive("subject-1", parse_observations(&json)?)?;
//! println!("{} episodes", payload.node_count);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod observation;
pub mod pipeline;

pub use config::NarrativeConfig;
pub use error::{NarrativeError, NarrativeResult};
pub use observation::{parse_observations, Observation};
pub use pipeline::NarrativePipeline;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the narrative pipeline
    pub use crate::{NarrativeConfig, NarrativeError, NarrativePipeline, Observation};
    pub use narrative_analytics::{FrontendGraphPayload, ProximityRelation, TemporalNarrativeGraph};
    pub use narrative_model::{EmotionEvent, EmotionTimeline, Episode, Fingerprint};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
