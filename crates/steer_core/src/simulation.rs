//! Frame-stable agent simulation
//!
//! Every frame reads only committed state. Forces for all agents are
//! computed against the spatial world and a snapshot taken at the start of
//! the frame, then every agent is committed at once, so no agent ever sees
//! another agent halfway through its update.

use crate::agent::{Kinematic, Steerable, SteeringAgent};
use crate::compositor::steer;
use crate::config::SteeringConfig;
use crate::debug::GizmoSink;
use crate::error::{Result, SteeringError};
use crate::roles::{FrameContext, Role, RoleDriver};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use steer_math::Aabb;
use steer_spatial::{CollisionLayer, EntityId, Motion, SpatialWorld};

/// Committed motion of every agent at the start of a frame
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    motions: BTreeMap<EntityId, Motion>,
}

impl Snapshot {
    pub fn insert(&mut self, entity: EntityId, motion: Motion) {
        self.motions.insert(entity, motion);
    }

    pub fn get(&self, entity: EntityId) -> Option<Motion> {
        self.motions.get(&entity).copied()
    }

    pub fn len(&self) -> usize {
        self.motions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }
}

impl FromIterator<(EntityId, Motion)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (EntityId, Motion)>>(iter: I) -> Self {
        Self {
            motions: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    agent: SteeringAgent,
    driver: RoleDriver,
    config: SteeringConfig,
}

/// Agents, obstacles and the seeded randomness they share
#[derive(Debug)]
pub struct Simulation {
    world: SpatialWorld,
    agents: BTreeMap<EntityId, Entry>,
    goal: Option<Vec3>,
    rng: StdRng,
    seed: u64,
    frame: u64,
}

impl Simulation {
    /// Create an empty simulation whose wander randomness starts from `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            world: SpatialWorld::new(),
            agents: BTreeMap::new(),
            goal: None,
            rng: StdRng::seed_from_u64(seed),
            seed,
            frame: 0,
        }
    }

    // ==================== Setup ====================

    /// Register a static obstacle
    pub fn add_obstacle(&mut self, bounds: Aabb, layer: CollisionLayer) -> Result<EntityId> {
        Ok(self.world.insert_obstacle(layer, bounds)?)
    }

    /// Spawn an agent moving along `facing` at full speed.
    ///
    /// The config is validated and a pursuer's or evader's target must
    /// already exist. Use [`Simulation::set_role`] to wire two agents that
    /// target each other.
    pub fn spawn(
        &mut self,
        position: Vec3,
        facing: Vec3,
        role: Role,
        config: SteeringConfig,
        half_extents: Vec3,
    ) -> Result<EntityId> {
        config.validate()?;
        self.check_target(&role)?;

        let position = Vec3::new(position.x, 0.0, position.z);
        let id = self.world.insert_steerable(
            role.layer(),
            Aabb::new(position, half_extents),
            Motion::new(position, Vec3::ZERO),
        )?;
        let agent = SteeringAgent::new(id, position, facing, config.limits);
        self.world.update_motion(id, agent.motion())?;

        log::debug!("Spawned {} {:?} at {:?}", role.name(), id, position);
        self.agents.insert(
            id,
            Entry {
                agent,
                driver: RoleDriver::new(role),
                config,
            },
        );
        Ok(id)
    }

    /// Replace an agent's role, dropping any per-role state
    pub fn set_role(&mut self, id: EntityId, role: Role) -> Result<()> {
        self.check_target(&role)?;
        let entry = self
            .agents
            .get_mut(&id)
            .ok_or(SteeringError::UnknownAgent(id))?;
        if entry.driver.role().layer() != role.layer() {
            return Err(SteeringError::InvalidRole {
                entity: id,
                role: role.name(),
            });
        }
        entry.driver = RoleDriver::new(role);
        Ok(())
    }

    /// Remove an agent. Roles still targeting it contribute nothing from then on.
    pub fn despawn(&mut self, id: EntityId) -> Result<SteeringAgent> {
        let entry = self
            .agents
            .remove(&id)
            .ok_or(SteeringError::UnknownAgent(id))?;
        self.world.remove(id)?;
        log::debug!("Despawned {:?}", id);
        Ok(entry.agent)
    }

    fn check_target(&self, role: &Role) -> Result<()> {
        match role.target() {
            Some(target) if !self.agents.contains_key(&target) => {
                Err(SteeringError::UnknownTarget(target))
            }
            _ => Ok(()),
        }
    }

    /// Goal point handed to flockers and evaders, e.g. a projected cursor
    pub fn set_goal(&mut self, goal: Option<Vec3>) {
        self.goal = goal;
    }

    pub fn goal(&self) -> Option<Vec3> {
        self.goal
    }

    /// Restart wander randomness from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    // ==================== Simulation ====================

    /// Advance every agent by `dt` seconds
    pub fn step(&mut self, dt: f32) -> Result<()> {
        let snapshot = self.snapshot();
        let frame = FrameContext {
            query: &self.world,
            snapshot: &snapshot,
            goal: self.goal,
        };

        let mut updated = Vec::with_capacity(self.agents.len());
        for entry in self.agents.values_mut() {
            let mut working = entry.agent.clone();
            let forces = entry
                .driver
                .forces(&mut working, &entry.config, &frame, &mut self.rng);
            steer(&mut working, &forces, dt);
            updated.push(working);
        }

        self.world
            .update_motions(updated.iter().map(|agent| (agent.id(), agent.motion())))?;
        for agent in updated {
            if let Some(entry) = self.agents.get_mut(&agent.id()) {
                entry.agent = agent;
            }
        }

        self.frame += 1;
        log::trace!("Frame {} committed {} agents", self.frame, self.agents.len());
        Ok(())
    }

    /// Committed motion of every agent
    pub fn snapshot(&self) -> Snapshot {
        self.agents
            .iter()
            .map(|(id, entry)| (*id, entry.agent.motion()))
            .collect()
    }

    // ==================== Queries ====================

    pub fn agent(&self, id: EntityId) -> Option<&SteeringAgent> {
        self.agents.get(&id).map(|entry| &entry.agent)
    }

    pub fn role(&self, id: EntityId) -> Option<&Role> {
        self.agents.get(&id).map(|entry| entry.driver.role())
    }

    pub fn config(&self, id: EntityId) -> Option<&SteeringConfig> {
        self.agents.get(&id).map(|entry| &entry.config)
    }

    /// Agents in id order
    pub fn agents(&self) -> impl Iterator<Item = (EntityId, &SteeringAgent)> {
        self.agents.iter().map(|(id, entry)| (*id, &entry.agent))
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Frames stepped so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn world(&self) -> &SpatialWorld {
        &self.world
    }

    // ==================== Debug ====================

    /// Debug shapes for one agent against the current committed state
    pub fn gizmos(&self, id: EntityId, sink: &mut impl GizmoSink) -> Result<()> {
        let entry = self
            .agents
            .get(&id)
            .ok_or(SteeringError::UnknownAgent(id))?;
        let snapshot = self.snapshot();
        let frame = FrameContext {
            query: &self.world,
            snapshot: &snapshot,
            goal: self.goal,
        };
        entry.driver.gizmos(&entry.agent, &entry.config, &frame, sink);
        Ok(())
    }
}
