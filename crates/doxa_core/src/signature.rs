//! Emotional signature based on Russell's Circumplex Model
//!
//! Instead of discrete emotion labels, every signal and belief carries a
//! continuous 2D coordinate: Valence × Arousal. Aggregation (cluster averages,
//! baseline drift) stays well-defined because both axes are bounded.

use serde::{Deserialize, Serialize};

/// A point in the Valence × Arousal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalSignature {
    /// Valence: positive/negative (-1.0 to 1.0)
    pub valence: f32,

    /// Arousal: calm/activated (0.0 to 1.0)
    pub arousal: f32,
}

impl Default for EmotionalSignature {
    fn default() -> Self {
        Self {
            valence: 0.0,
            arousal: 0.3, // Slightly calm baseline
        }
    }
}

impl EmotionalSignature {
    pub fn new(valence: f32, arousal: f32) -> Self {
        Self {
            valence: valence.clamp(-1.0, 1.0),
            arousal: arousal.clamp(0.0, 1.0),
        }
    }

    pub fn neutral() -> Self {
        Self::default()
    }

    /// Emotional intensity: distance from the neutral origin.
    pub fn intensity(&self) -> f32 {
        (self.valence.powi(2) + (self.arousal * 2.0 - 1.0).powi(2)).sqrt()
    }

    /// Interpolate toward another signature.
    pub fn lerp(&self, other: &EmotionalSignature, t: f32) -> EmotionalSignature {
        let t = t.clamp(0.0, 1.0);
        EmotionalSignature {
            valence: self.valence + (other.valence - self.valence) * t,
            arousal: self.arousal + (other.arousal - self.arousal) * t,
        }
    }

    /// Confidence-weighted mean of two signatures. Falls back to a plain
    /// midpoint when both weights are zero.
    pub fn weighted_mean(
        a: &EmotionalSignature,
        wa: f32,
        b: &EmotionalSignature,
        wb: f32,
    ) -> EmotionalSignature {
        let total = wa + wb;
        if total <= f32::EPSILON {
            return a.lerp(b, 0.5);
        }
        EmotionalSignature::new(
            (a.valence * wa + b.valence * wb) / total,
            (a.arousal * wa + b.arousal * wb) / total,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_values() {
        let sig = EmotionalSignature::new(5.0, -3.0);
        assert_eq!(sig.valence, 1.0);
        assert_eq!(sig.arousal, 0.0);

        let sig2 = EmotionalSignature::new(-5.0, 10.0);
        assert_eq!(sig2.valence, -1.0);
        assert_eq!(sig2.arousal, 1.0);
    }

    #[test]
    fn test_intensity() {
        let neutral = EmotionalSignature::new(0.0, 0.5);
        assert!(neutral.intensity() < 1e-6);

        let extreme = EmotionalSignature::new(1.0, 1.0);
        assert!(extreme.intensity() > 0.9);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = EmotionalSignature::new(0.8, 0.6);
        let b = EmotionalSignature::new(-0.7, 0.2);

        let at_zero = a.lerp(&b, 0.0);
        assert!((at_zero.valence - a.valence).abs() < 1e-6);

        let at_one = a.lerp(&b, 1.0);
        assert!((at_one.valence - b.valence).abs() < 1e-6);
        assert!((at_one.arousal - b.arousal).abs() < 1e-6);
    }

    #[test]
    fn test_weighted_mean_symmetry() {
        let a = EmotionalSignature::new(0.6, 0.8);
        let b = EmotionalSignature::new(-0.4, 0.2);
        let ab = EmotionalSignature::weighted_mean(&a, 0.7, &b, 0.3);
        let ba = EmotionalSignature::weighted_mean(&b, 0.3, &a, 0.7);
        assert!((ab.valence - ba.valence).abs() < 1e-6);
        assert!((ab.arousal - ba.arousal).abs() < 1e-6);
    }

    #[test]
    fn test_weighted_mean_zero_weights() {
        let a = EmotionalSignature::new(1.0, 1.0);
        let b = EmotionalSignature::new(-1.0, 0.0);
        let mid = EmotionalSignature::weighted_mean(&a, 0.0, &b, 0.0);
        assert!((mid.valence - 0.0).abs() < 1e-6);
        assert!((mid.arousal - 0.5).abs() < 1e-6);
    }
}
