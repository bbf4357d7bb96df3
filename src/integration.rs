//! Global force and damping settings applied to every dynamic body
//!
//! Damping is expressed as a per-second decay fraction: a value of 0.03 means
//! a free body keeps 97% of its velocity after one second. The solver applies
//! damping multiplicatively every substep, so the decay is substep-count
//! invariant; [`damping_coefficient`] converts the fraction into the
//! exponential coefficient the solver expects.

use glam::Vec3;

/// Gravity and velocity damping applied during integration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationSettings {
    /// Gravity acceleration added to linear velocity each substep
    pub gravity: Vec3,
    /// Fraction of linear velocity lost per second
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f32,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -10.0, 0.0),
            linear_damping: 0.03,
            angular_damping: 0.8,
        }
    }
}

impl IntegrationSettings {
    /// Solver-side linear damping coefficient
    #[must_use]
    pub fn linear_coefficient(&self) -> f32 {
        damping_coefficient(self.linear_damping)
    }

    /// Solver-side angular damping coefficient
    #[must_use]
    pub fn angular_coefficient(&self) -> f32 {
        damping_coefficient(self.angular_damping)
    }
}

/// Convert a per-second decay fraction into an exponential damping
/// coefficient `d` such that `e^(-d * t) == (1 - decay)^t`
#[must_use]
pub fn damping_coefficient(decay_per_second: f32) -> f32 {
    -(1.0 - decay_per_second.clamp(0.0, 1.0 - f32::EPSILON)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_decay_is_zero_coefficient() {
        assert!(damping_coefficient(0.0).abs() < 1e-6);
    }

    #[test]
    fn test_coefficient_matches_decay_after_one_second() {
        for decay in [0.03, 0.3, 0.8] {
            let d = damping_coefficient(decay);
            assert!(((-d).exp() - (1.0 - decay)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_coefficient_monotonic() {
        assert!(damping_coefficient(0.8) > damping_coefficient(0.03));
        assert!(damping_coefficient(0.03) > damping_coefficient(0.0));
    }

    #[test]
    fn test_default_settings() {
        let s = IntegrationSettings::default();

        assert!((s.gravity - Vec3::new(0.0, -10.0, 0.0)).length() < 1e-6);
        assert!((s.linear_damping - 0.03).abs() < 1e-6);
        assert!((s.angular_damping - 0.8).abs() < 1e-6);
        assert!(s.angular_coefficient() > s.linear_coefficient());
    }
}
