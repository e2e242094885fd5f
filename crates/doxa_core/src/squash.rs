//! Bounded squashing functions
//!
//! Raw signal magnitudes arrive unbounded (upstream producers are not trusted
//! to pre-normalize). Everything downstream assumes [0,1] or [-1,1], so the
//! squash happens exactly once, at ingestion, through a monotone bounded map.
//! The tanh family is used for both axes: one precision story, odd symmetry
//! for valence.

/// Squash an arbitrary finite value into [0,1]. Monotone non-decreasing;
/// negative inputs collapse to 0. Saturates to exactly 1.0 at f32 precision
/// for large inputs, which the closed-interval invariant allows.
#[inline]
pub fn squash_unit(x: f32) -> f32 {
    x.max(0.0).tanh()
}

/// Squash an arbitrary finite value into [-1,1]. Monotone and odd.
#[inline]
pub fn squash_signed(x: f32) -> f32 {
    x.tanh()
}
