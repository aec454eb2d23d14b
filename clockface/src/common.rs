//! Contains common, primitive key types used across the crate.
//!
//! Using distinct slotmap key types instead of bare integers improves type
//! safety: a key handed out by one registry can never be confused with a key
//! from another.

use slotmap::new_key_type;

new_key_type! {
    /// Uniquely and safely identifies a registered animation.
    ///
    /// This key is returned when an animation spec is added to an
    /// `AnimationSet`. It is guaranteed to be unique and will not be reused,
    /// preventing stale ID bugs when specs are swapped out at runtime.
    pub struct AnimationId;
}
