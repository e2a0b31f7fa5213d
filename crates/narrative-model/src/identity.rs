//! Identified entities
//!
//! Defines the [`Identified`] trait shared by every entity that can be
//! addressed by a [`Fingerprint`]: timelines, episodes and narrative graphs.
//! The trait is sealed; implementations live in this workspace only.

use crate::hash::Fingerprint;
use std::fmt::Debug;

/// Entity addressable by a content fingerprint
///
/// # Contract
/// - `identifier` must be deterministic (same content, same fingerprint)
/// - `identifier` must not depend on memory addresses or insertion history
/// - `TYPE_ID` is stable and unique per entity kind
pub trait Identified: Debug + Send + Sync + private::Sealed {
    /// Entity kind, e.g. `timeline`
    const TYPE_ID: &'static str;

    /// Compute the fingerprint of this entity
    fn identifier(&self) -> Fingerprint;

    /// Check a stored fingerprint against a recomputation
    #[inline]
    fn verify(&self, expected: &Fingerprint) -> bool {
        self.identifier() == *expected
    }
}

/// Sealed trait - prevents implementations outside the workspace
#[doc(hidden)]
pub mod private {
    /// Sealed trait marker
    pub trait Sealed {}
}
