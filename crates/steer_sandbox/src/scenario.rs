//! Scenario files
//!
//! A scenario lists obstacles and agents, the frame loop settings and an
//! optional scripted goal standing in for a cursor.
//!
//! # Scenario Sources (in priority order)
//!
//! 1. First command line argument: `steer-sandbox my_scenario.toml`
//! 2. Environment variable: `STEER_SCENARIO=my_scenario.toml`
//! 3. `scenario.toml` in the working directory
//! 4. The built-in sandbox scenario
//!
//! # Example
//!
//! ```toml
//! seed = 7
//! timestep = 0.016666668
//! frames = 600
//!
//! [goal]
//! kind = "fixed"
//! position = [10.0, 0.0, 0.0]
//!
//! [[obstacles]]
//! center = [0.0, 0.0, 8.0]
//! half_extents = [2.0, 2.0, 0.5]
//!
//! [[agents]]
//! name = "boid"
//! role = "flocker"
//! position = [0.0, 0.0, 0.0]
//! facing = [0.0, 0.0, 1.0]
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use steer_core::{Role, Simulation, SteeringConfig, SteeringError};
use steer_math::Aabb;
use steer_spatial::{CollisionLayer, EntityId};
use thiserror::Error;

/// Scenario used when no file is found
const BUILTIN: &str = include_str!("../scenarios/sandbox.toml");

/// Environment variable naming a scenario file
pub const SCENARIO_ENV: &str = "STEER_SCENARIO";

/// Scenario loading and setup errors
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Steering(#[from] SteeringError),

    #[error("Unknown agent name: {0}")]
    UnknownAgent(String),

    #[error("Duplicate agent name: {0}")]
    DuplicateAgent(String),

    #[error("Agent {0} needs a target")]
    MissingTarget(String),

    #[error("Timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

/// Role names used in scenario files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Wanderer,
    Flocker,
    Pursuer,
    Evader,
}

impl RoleKind {
    /// Preset tuning for the role
    pub fn preset(self) -> SteeringConfig {
        match self {
            RoleKind::Wanderer => SteeringConfig::wanderer(),
            RoleKind::Flocker => SteeringConfig::flocker(),
            RoleKind::Pursuer => SteeringConfig::pursuer(),
            RoleKind::Evader => SteeringConfig::evader(),
        }
    }
}

/// Scripted goal point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalDef {
    /// Stays put
    Fixed { position: Vec3 },
    /// Circles `center` once every `period` seconds
    Orbit { center: Vec3, radius: f32, period: f32 },
}

impl GoalDef {
    /// Goal position `time` seconds into the run
    pub fn at(&self, time: f32) -> Vec3 {
        match *self {
            GoalDef::Fixed { position } => position,
            GoalDef::Orbit {
                center,
                radius,
                period,
            } => {
                let angle = if period > 0.0 {
                    time / period * std::f32::consts::TAU
                } else {
                    0.0
                };
                center + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius
            }
        }
    }
}

/// A static obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDef {
    pub center: Vec3,
    pub half_extents: Vec3,
    #[serde(default = "environment_layer")]
    pub layer: CollisionLayer,
}

fn environment_layer() -> CollisionLayer {
    CollisionLayer::ENVIRONMENT
}

/// An agent to spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDef {
    pub name: String,
    pub role: RoleKind,
    pub position: Vec3,
    #[serde(default = "forward")]
    pub facing: Vec3,
    /// Name of the agent a pursuer chases or an evader flees
    #[serde(default)]
    pub target: Option<String>,
    /// Wander circle centre, defaults to the spawn position
    #[serde(default)]
    pub circle_center: Option<Vec3>,
    #[serde(default = "default_half_extents")]
    pub half_extents: Vec3,
    /// Full tuning. Fields left out take the general defaults, not the
    /// role preset; leave the whole table out to use the preset.
    #[serde(default)]
    pub config: Option<SteeringConfig>,
}

fn forward() -> Vec3 {
    Vec3::Z
}

fn default_half_extents() -> Vec3 {
    Vec3::splat(0.5)
}

impl AgentDef {
    pub fn config(&self) -> SteeringConfig {
        self.config.unwrap_or_else(|| self.role.preset())
    }
}

/// A complete scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_timestep")]
    pub timestep: f32,
    #[serde(default = "default_frames")]
    pub frames: u64,
    /// Log every agent's pose this often, 0 to only log the summary
    #[serde(default = "default_log_every")]
    pub log_every: u64,
    /// Log debug gizmo counts alongside poses
    #[serde(default)]
    pub gizmos: bool,
    #[serde(default)]
    pub goal: Option<GoalDef>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    #[serde(default)]
    pub agents: Vec<AgentDef>,

    /// Where the scenario was loaded from
    #[serde(skip)]
    pub source: Option<String>,
}

fn default_timestep() -> f32 {
    1.0 / 60.0
}

fn default_frames() -> u64 {
    600
}

fn default_log_every() -> u64 {
    60
}

impl Scenario {
    /// Find and load a scenario from all sources
    pub fn locate() -> Result<Self> {
        // 1. Command line
        if let Some(path) = std::env::args().nth(1) {
            log::info!("Scenario from args: {}", path);
            return Self::load(&path);
        }

        // 2. Environment
        if let Ok(path) = std::env::var(SCENARIO_ENV) {
            if !path.is_empty() {
                log::info!("Scenario from env: {}", path);
                return Self::load(&path);
            }
        }

        // 3. Working directory
        if Path::new("scenario.toml").exists() {
            return Self::load("scenario.toml");
        }

        // 4. Built-in
        log::info!("No scenario.toml found, running the built-in sandbox");
        let mut scenario = Self::from_toml(BUILTIN)?;
        scenario.source = Some("built-in".to_string());
        Ok(scenario)
    }

    /// Load a scenario from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut scenario = Self::from_toml(&content)?;
        scenario.source = Some(path.as_ref().display().to_string());
        Ok(scenario)
    }

    /// Parse a scenario from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        if !(scenario.timestep > 0.0) || !scenario.timestep.is_finite() {
            return Err(ScenarioError::InvalidTimestep(scenario.timestep));
        }
        Ok(scenario)
    }

    /// Spawn everything into a fresh simulation.
    ///
    /// Returns agent names by id. Pursuers and evaders are wired after all
    /// agents exist, so two agents may target each other.
    pub fn build(&self) -> Result<(Simulation, HashMap<EntityId, String>)> {
        let mut sim = Simulation::new(self.seed);

        for obstacle in &self.obstacles {
            sim.add_obstacle(Aabb::new(obstacle.center, obstacle.half_extents), obstacle.layer)?;
        }

        let mut ids: HashMap<&str, EntityId> = HashMap::new();
        for agent in &self.agents {
            if ids.contains_key(agent.name.as_str()) {
                return Err(ScenarioError::DuplicateAgent(agent.name.clone()));
            }

            let circle_center = agent.circle_center.unwrap_or(agent.position);
            let role = match agent.role {
                RoleKind::Flocker => Role::Flocker,
                // placeholder on the same layer until targets are wired
                _ => Role::Wanderer { circle_center },
            };
            let id = sim.spawn(
                agent.position,
                agent.facing,
                role,
                agent.config(),
                agent.half_extents,
            )?;
            ids.insert(agent.name.as_str(), id);
        }

        for agent in &self.agents {
            let target = match (agent.role, &agent.target) {
                (RoleKind::Pursuer | RoleKind::Evader, Some(name)) => *ids
                    .get(name.as_str())
                    .ok_or_else(|| ScenarioError::UnknownAgent(name.clone()))?,
                (RoleKind::Pursuer | RoleKind::Evader, None) => {
                    return Err(ScenarioError::MissingTarget(agent.name.clone()))
                }
                _ => continue,
            };

            let role = match agent.role {
                RoleKind::Pursuer => Role::Pursuer { target },
                _ => Role::Evader { pursuer: target },
            };
            let id = ids[agent.name.as_str()];
            sim.set_role(id, role)?;
            log::debug!("Wired {} -> {}", agent.name, agent.target.as_deref().unwrap_or("?"));
        }

        let names = ids
            .into_iter()
            .map(|(name, id)| (id, name.to_string()))
            .collect();
        Ok((sim, names))
    }

    /// Goal for the frame starting at `time`
    pub fn goal_at(&self, time: f32) -> Option<Vec3> {
        self.goal.as_ref().map(|goal| goal.at(time))
    }

    pub fn print_summary(&self) {
        log::info!("Scenario:");
        if let Some(source) = &self.source {
            log::info!("  Source: {}", source);
        }
        log::info!("  Seed: {}", self.seed);
        log::info!(
            "  Frames: {} x {:.4}s ({:.1}s)",
            self.frames,
            self.timestep,
            self.frames as f32 * self.timestep
        );
        log::info!("  Obstacles: {}, agents: {}", self.obstacles.len(), self.agents.len());
        if let Some(goal) = &self.goal {
            log::info!("  Goal: {:?}", goal);
        }
    }
}
