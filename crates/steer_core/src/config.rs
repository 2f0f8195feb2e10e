//! Steering configuration
//!
//! All values are plain tuning numbers, fixed for the duration of a run.
//! Velocities are in world units per second and steering forces in world
//! units per second squared.

use crate::error::{Result, SteeringError};
use serde::{Deserialize, Serialize};

/// Finite stand-in for "overrides every other force".
///
/// Separation and obstacle avoidance scale their unit direction by this so
/// that, once summed with ordinary forces and clamped by the compositor,
/// their direction dominates.
pub const DOMINANT_WEIGHT: f32 = 1.0e4;

/// Points sampled along the avoidance ray
pub const DEFAULT_PRECISION: usize = 10;

/// Per-agent speed and force limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentLimits {
    /// Maximum speed
    pub max_velocity: f32,
    /// Maximum magnitude of the net steering force
    pub max_steering_force: f32,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_velocity: 16.0,
            // reaches full speed from rest in under 1.5 s
            max_steering_force: 12.0,
        }
    }
}

impl AgentLimits {
    pub fn new(max_velocity: f32, max_steering_force: f32) -> Self {
        Self {
            max_velocity,
            max_steering_force,
        }
    }
}

/// Obstacle avoidance tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Length of the look-ahead ray
    pub aversion_distance: f32,
    /// Radius of the close-range fallback sphere
    pub aversion_radius: f32,
    /// Number of points sampled along the ray
    pub precision: usize,
    /// Magnitude of a non-zero avoidance force
    pub weight: f32,
    /// Keep a blocking hit between frames instead of re-casting
    pub cache_hits: bool,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            aversion_distance: 5.0,
            aversion_radius: 2.0,
            precision: DEFAULT_PRECISION,
            weight: DOMINANT_WEIGHT,
            cache_hits: false,
        }
    }
}

/// Flocking tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockingConfig {
    /// Radius for alignment and cohesion
    pub neighbourhood_radius: f32,
    /// Radius for separation
    pub separation_radius: f32,
    /// Magnitude of a non-zero separation force
    pub separation_weight: f32,
}

impl Default for FlockingConfig {
    fn default() -> Self {
        Self {
            neighbourhood_radius: 3.0,
            separation_radius: 2.0,
            separation_weight: DOMINANT_WEIGHT,
        }
    }
}

/// Wander tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Full cone of heading change per frame, in degrees
    pub wander_angle: f32,
    /// Radius of the area the wanderer is kept inside
    pub wander_circle_radius: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            wander_angle: 240.0,
            wander_circle_radius: 40.0,
        }
    }
}

/// Pursuit / evasion look-ahead.
///
/// `delta = horizon * min(1, distance / falloff_distance)`; the predicted
/// target position is `target.position + target.velocity * delta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    pub horizon: f32,
    pub falloff_distance: f32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            horizon: 150.0,
            falloff_distance: 5.0,
        }
    }
}

/// Complete tuning for one agent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub limits: AgentLimits,
    pub avoidance: AvoidanceConfig,
    pub flocking: FlockingConfig,
    pub wander: WanderConfig,
    pub pursuit: PursuitConfig,
    /// Seek slows down inside this distance; zero disables arrival
    pub arrival_distance: f32,
}

impl SteeringConfig {
    /// Roams inside a 40 unit circle around its spawn point
    pub fn wanderer() -> Self {
        Self::default()
    }

    /// Flocks with neighbours, separating at the aversion radius
    pub fn flocker() -> Self {
        let avoidance = AvoidanceConfig::default();
        Self {
            flocking: FlockingConfig {
                neighbourhood_radius: 3.0,
                separation_radius: avoidance.aversion_radius,
                ..Default::default()
            },
            avoidance,
            ..Default::default()
        }
    }

    /// Chases a target by predicting where it will be
    pub fn pursuer() -> Self {
        Self::default()
    }

    /// Heads for a goal while fleeing a pursuer
    pub fn evader() -> Self {
        Self {
            limits: AgentLimits::new(16.0, 15.0),
            ..Default::default()
        }
    }

    /// Set speed and force limits
    pub fn with_limits(mut self, max_velocity: f32, max_steering_force: f32) -> Self {
        self.limits = AgentLimits::new(max_velocity, max_steering_force);
        self
    }

    /// Set arrival distance
    pub fn with_arrival_distance(mut self, distance: f32) -> Self {
        self.arrival_distance = distance;
        self
    }

    /// Set avoidance ray length and fallback radius
    pub fn with_aversion(mut self, distance: f32, radius: f32) -> Self {
        self.avoidance.aversion_distance = distance;
        self.avoidance.aversion_radius = radius;
        self
    }

    /// Enable or disable the avoidance hit cache
    pub fn with_hit_cache(mut self, enabled: bool) -> Self {
        self.avoidance.cache_hits = enabled;
        self
    }

    /// Set wander cone and circle radius
    pub fn with_wander(mut self, angle: f32, circle_radius: f32) -> Self {
        self.wander = WanderConfig {
            wander_angle: angle,
            wander_circle_radius: circle_radius,
        };
        self
    }

    /// Reject negative or non-finite values before a simulation starts
    pub fn validate(&self) -> Result<()> {
        non_negative("max_velocity", self.limits.max_velocity)?;
        non_negative("max_steering_force", self.limits.max_steering_force)?;
        non_negative("aversion_distance", self.avoidance.aversion_distance)?;
        non_negative("aversion_radius", self.avoidance.aversion_radius)?;
        non_negative("avoidance_weight", self.avoidance.weight)?;
        non_negative("neighbourhood_radius", self.flocking.neighbourhood_radius)?;
        non_negative("separation_radius", self.flocking.separation_radius)?;
        non_negative("separation_weight", self.flocking.separation_weight)?;
        non_negative("wander_angle", self.wander.wander_angle)?;
        non_negative("wander_circle_radius", self.wander.wander_circle_radius)?;
        non_negative("pursuit_horizon", self.pursuit.horizon)?;
        non_negative("arrival_distance", self.arrival_distance)?;

        if self.avoidance.precision == 0 {
            return Err(SteeringError::ZeroPrecision);
        }
        // divisor of the look-ahead falloff
        if !(self.pursuit.falloff_distance > 0.0) || !self.pursuit.falloff_distance.is_finite() {
            return Err(SteeringError::InvalidConfig {
                field: "pursuit_falloff_distance",
                value: self.pursuit.falloff_distance,
            });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SteeringError::InvalidConfig { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for config in [
            SteeringConfig::default(),
            SteeringConfig::wanderer(),
            SteeringConfig::flocker(),
            SteeringConfig::pursuer(),
            SteeringConfig::evader(),
        ] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_presets_accelerate_to_full_speed_quickly() {
        for config in [
            SteeringConfig::wanderer(),
            SteeringConfig::flocker(),
            SteeringConfig::pursuer(),
            SteeringConfig::evader(),
        ] {
            let seconds = config.limits.max_velocity / config.limits.max_steering_force;
            assert!(seconds > 1.0 && seconds < 1.5, "{:?}", config.limits);
        }
    }

    #[test]
    fn test_flocker_separates_at_aversion_radius() {
        let config = SteeringConfig::flocker();
        assert_eq!(
            config.flocking.separation_radius,
            config.avoidance.aversion_radius
        );
    }

    #[test]
    fn test_negative_value_rejected() {
        let config = SteeringConfig::default().with_aversion(-1.0, 2.0);
        match config.validate() {
            Err(SteeringError::InvalidConfig { field, value }) => {
                assert_eq!(field, "aversion_distance");
                assert_eq!(value, -1.0);
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_rejected() {
        let config = SteeringConfig::default().with_limits(f32::NAN, 1.0);
        assert!(matches!(
            config.validate(),
            Err(SteeringError::InvalidConfig { field: "max_velocity", .. })
        ));
    }

    #[test]
    fn test_zero_precision_rejected() {
        let mut config = SteeringConfig::default();
        config.avoidance.precision = 0;
        assert!(matches!(config.validate(), Err(SteeringError::ZeroPrecision)));
    }

    #[test]
    fn test_zero_falloff_rejected() {
        let mut config = SteeringConfig::default();
        config.pursuit.falloff_distance = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_values_allowed() {
        let config = SteeringConfig::default()
            .with_arrival_distance(0.0)
            .with_wander(0.0, 0.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "arrival_distance": 3.0, "limits": { "max_velocity": 8.0 } }"#;
        let config: SteeringConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.arrival_distance, 3.0);
        assert_eq!(config.limits.max_velocity, 8.0);
        assert_eq!(config.limits.max_steering_force, AgentLimits::default().max_steering_force);
        assert_eq!(config.avoidance.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SteeringConfig::flocker().with_hit_cache(true);
        let json = serde_json::to_string(&config).unwrap();
        let decoded: SteeringConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, config);
    }
}
