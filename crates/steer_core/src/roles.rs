//! Agent roles
//!
//! A role is nothing more than a choice of behaviours and masks. Every role
//! runs through the same compositor; targets are handed in as entity ids and
//! resolved against the frame snapshot, never looked up by type.

use crate::agent::Steerable;
use crate::avoidance::Avoidance;
use crate::config::SteeringConfig;
use crate::debug::{self, GizmoSink};
use crate::flocking::flock;
use crate::simulation::Snapshot;
use crate::targeting::{evade, pursue, seek};
use crate::wander::wander_within_circle;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use steer_spatial::{CollisionLayer, EntityId, LayerMask, SpatialQuery};

/// Which behaviours an agent combines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    /// Roams inside a circle, usually centred on its spawn point
    Wanderer { circle_center: Vec3 },
    /// Flocks with other flockers and follows the goal
    Flocker,
    /// Chases `target`
    Pursuer { target: EntityId },
    /// Follows the goal while fleeing `pursuer`
    Evader { pursuer: EntityId },
}

impl Role {
    /// Layer the role's own volume lives on
    pub fn layer(&self) -> CollisionLayer {
        match self {
            Role::Flocker => CollisionLayer::FLOCK,
            _ => CollisionLayer::AGENTS,
        }
    }

    /// Layers obstacle avoidance steers around
    pub fn avoid_mask(&self) -> LayerMask {
        LayerMask::all_except(self.layer())
    }

    /// Layers flocking looks for neighbours on
    pub fn flock_mask(&self) -> LayerMask {
        LayerMask::only(self.layer())
    }

    /// Entity this role reacts to, if any
    pub fn target(&self) -> Option<EntityId> {
        match *self {
            Role::Pursuer { target } => Some(target),
            Role::Evader { pursuer } => Some(pursuer),
            Role::Wanderer { .. } | Role::Flocker => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Wanderer { .. } => "wanderer",
            Role::Flocker => "flocker",
            Role::Pursuer { .. } => "pursuer",
            Role::Evader { .. } => "evader",
        }
    }
}

/// What a role may read during a frame.
///
/// `query` and `snapshot` both reflect the committed state of the previous
/// frame. `goal` is host input, e.g. a cursor projected onto the ground.
pub struct FrameContext<'a, Q: SpatialQuery + ?Sized> {
    pub query: &'a Q,
    pub snapshot: &'a Snapshot,
    pub goal: Option<Vec3>,
}

/// A role plus the per-agent state its behaviours carry between frames
#[derive(Debug, Clone)]
pub struct RoleDriver {
    role: Role,
    avoidance: Avoidance,
}

impl RoleDriver {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            avoidance: Avoidance::new(),
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn avoidance(&self) -> &Avoidance {
        &self.avoidance
    }

    /// Forces for this frame, in composition order.
    ///
    /// Seeking with arrival may slow `agent` before later forces are
    /// computed, so the order here is part of each role's behaviour.
    pub fn forces<S, Q, R>(
        &mut self,
        agent: &mut S,
        config: &SteeringConfig,
        frame: &FrameContext<'_, Q>,
        rng: &mut R,
    ) -> Vec<Vec3>
    where
        S: Steerable + ?Sized,
        Q: SpatialQuery + ?Sized,
        R: Rng + ?Sized,
    {
        let mut forces = Vec::with_capacity(3);

        match self.role {
            Role::Wanderer { circle_center } => {
                forces.push(wander_within_circle(
                    agent,
                    config.wander.wander_angle,
                    circle_center,
                    config.wander.wander_circle_radius,
                    rng,
                ));
            }
            Role::Flocker => {
                forces.push(flock(agent, frame.query, &config.flocking, self.role.flock_mask()));
                if let Some(goal) = frame.goal {
                    forces.push(seek(agent, goal, config.arrival_distance));
                }
            }
            Role::Pursuer { target } => match frame.snapshot.get(target) {
                Some(motion) => {
                    forces.push(pursue(agent, &motion, config.arrival_distance, &config.pursuit))
                }
                None => log::warn!("{:?} lost pursuit target {:?}", agent.id(), target),
            },
            Role::Evader { pursuer } => {
                if let Some(goal) = frame.goal {
                    forces.push(seek(agent, goal, 0.0));
                }
                match frame.snapshot.get(pursuer) {
                    Some(motion) => forces.push(evade(agent, &motion, &config.pursuit)),
                    None => log::warn!("{:?} lost track of pursuer {:?}", agent.id(), pursuer),
                }
            }
        }

        forces.push(
            self.avoidance
                .avert(agent, frame.query, &config.avoidance, self.role.avoid_mask()),
        );
        forces
    }

    /// Debug shapes for every behaviour this role runs
    pub fn gizmos<S, Q>(
        &self,
        agent: &S,
        config: &SteeringConfig,
        frame: &FrameContext<'_, Q>,
        sink: &mut impl GizmoSink,
    ) where
        S: Steerable + ?Sized,
        Q: SpatialQuery + ?Sized,
    {
        debug::steer_gizmos(agent, sink);

        match self.role {
            Role::Wanderer { circle_center } => debug::wander_within_circle_gizmos(
                agent,
                config.wander.wander_angle,
                circle_center,
                config.wander.wander_circle_radius,
                sink,
            ),
            Role::Flocker => debug::flock_gizmos(
                agent,
                frame.query,
                config.flocking.neighbourhood_radius,
                self.role.flock_mask(),
                sink,
            ),
            Role::Pursuer { target } => {
                if let Some(motion) = frame.snapshot.get(target) {
                    debug::pursue_gizmos(agent, &motion, &config.pursuit, sink);
                }
            }
            Role::Evader { pursuer } => {
                if let Some(motion) = frame.snapshot.get(pursuer) {
                    debug::evade_gizmos(agent, &motion, &config.pursuit, sink);
                }
            }
        }

        debug::avert_gizmos(
            agent,
            frame.query,
            &self.avoidance,
            &config.avoidance,
            self.role.avoid_mask(),
            sink,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Kinematic, SteeringAgent};
    use crate::debug::Gizmo;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use steer_math::Aabb;
    use steer_spatial::{Motion, SpatialWorld};

    fn agent(world: &mut SpatialWorld, role: &Role, position: Vec3, facing: Vec3) -> SteeringAgent {
        let config = SteeringConfig::default();
        let velocity = facing * config.limits.max_velocity;
        let id = world
            .insert_steerable(role.layer(), Aabb::cube(position, 0.5), Motion::new(position, velocity))
            .unwrap();
        SteeringAgent::new(id, position, facing, config.limits)
    }

    #[test]
    fn test_role_masks() {
        let flocker = Role::Flocker;
        assert_eq!(flocker.layer(), CollisionLayer::FLOCK);
        assert!(flocker.flock_mask().contains(CollisionLayer::FLOCK));
        assert!(!flocker.avoid_mask().contains(CollisionLayer::FLOCK));
        assert!(flocker.avoid_mask().contains(CollisionLayer::AGENTS));

        let wanderer = Role::Wanderer {
            circle_center: Vec3::ZERO,
        };
        assert_eq!(wanderer.layer(), CollisionLayer::AGENTS);
        assert!(!wanderer.avoid_mask().contains(CollisionLayer::AGENTS));
        assert!(wanderer.avoid_mask().contains(CollisionLayer::ENVIRONMENT));
    }

    #[test]
    fn test_target_wiring() {
        assert_eq!(Role::Pursuer { target: EntityId(3) }.target(), Some(EntityId(3)));
        assert_eq!(Role::Evader { pursuer: EntityId(4) }.target(), Some(EntityId(4)));
        assert_eq!(Role::Flocker.target(), None);
    }

    #[test]
    fn test_flocker_without_goal() {
        let mut world = SpatialWorld::new();
        let role = Role::Flocker;
        let mut flocker = agent(&mut world, &role, Vec3::ZERO, Vec3::Z);
        let snapshot = Snapshot::default();
        let frame = FrameContext {
            query: &world,
            snapshot: &snapshot,
            goal: None,
        };

        let mut driver = RoleDriver::new(role);
        let mut rng = StdRng::seed_from_u64(0);
        let forces = driver.forces(&mut flocker, &SteeringConfig::flocker(), &frame, &mut rng);

        // flock + avert, both zero in empty space
        assert_eq!(forces, vec![Vec3::ZERO, Vec3::ZERO]);
    }

    #[test]
    fn test_flocker_seeks_goal() {
        let mut world = SpatialWorld::new();
        let role = Role::Flocker;
        let mut flocker = agent(&mut world, &role, Vec3::ZERO, Vec3::ZERO);
        let snapshot = Snapshot::default();
        let frame = FrameContext {
            query: &world,
            snapshot: &snapshot,
            goal: Some(Vec3::new(10.0, 0.0, 0.0)),
        };

        let mut driver = RoleDriver::new(role);
        let mut rng = StdRng::seed_from_u64(0);
        let forces = driver.forces(&mut flocker, &SteeringConfig::flocker(), &frame, &mut rng);

        assert_eq!(forces.len(), 3);
        assert!(forces[1].abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_pursuer_missing_target_only_averts() {
        let mut world = SpatialWorld::new();
        let role = Role::Pursuer { target: EntityId(99) };
        let mut pursuer = agent(&mut world, &role, Vec3::ZERO, Vec3::Z);
        let snapshot = Snapshot::default();
        let frame = FrameContext {
            query: &world,
            snapshot: &snapshot,
            goal: None,
        };

        let mut driver = RoleDriver::new(role);
        let mut rng = StdRng::seed_from_u64(0);
        let forces = driver.forces(&mut pursuer, &SteeringConfig::pursuer(), &frame, &mut rng);
        assert_eq!(forces, vec![Vec3::ZERO]);
    }

    #[test]
    fn test_pursuer_chases_snapshot_target() {
        let mut world = SpatialWorld::new();
        let target = EntityId(99);
        let role = Role::Pursuer { target };
        let mut pursuer = agent(&mut world, &role, Vec3::ZERO, Vec3::ZERO);

        let mut snapshot = Snapshot::default();
        snapshot.insert(target, Motion::new(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO));
        let frame = FrameContext {
            query: &world,
            snapshot: &snapshot,
            goal: None,
        };

        let mut driver = RoleDriver::new(role);
        let mut rng = StdRng::seed_from_u64(0);
        let forces = driver.forces(&mut pursuer, &SteeringConfig::pursuer(), &frame, &mut rng);
        assert!(forces[0].abs_diff_eq(Vec3::new(0.0, 0.0, 20.0), 1e-5));
    }

    #[test]
    fn test_evader_flees_pursuer() {
        let mut world = SpatialWorld::new();
        let threat = EntityId(50);
        let role = Role::Evader { pursuer: threat };
        let mut evader = agent(&mut world, &role, Vec3::ZERO, Vec3::ZERO);

        let mut snapshot = Snapshot::default();
        snapshot.insert(threat, Motion::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::ZERO));
        let frame = FrameContext {
            query: &world,
            snapshot: &snapshot,
            goal: None,
        };

        let mut driver = RoleDriver::new(role);
        let mut rng = StdRng::seed_from_u64(0);
        let forces = driver.forces(&mut evader, &SteeringConfig::evader(), &frame, &mut rng);

        assert_eq!(forces.len(), 2);
        assert!(forces[0].x > 0.0);
        assert_eq!(evader.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_wanderer_returns_to_circle() {
        let mut world = SpatialWorld::new();
        let role = Role::Wanderer {
            circle_center: Vec3::ZERO,
        };
        let mut wanderer = agent(&mut world, &role, Vec3::new(100.0, 0.0, 0.0), Vec3::ZERO);
        let snapshot = Snapshot::default();
        let frame = FrameContext {
            query: &world,
            snapshot: &snapshot,
            goal: None,
        };

        let mut driver = RoleDriver::new(role);
        let mut rng = StdRng::seed_from_u64(0);
        let forces = driver.forces(&mut wanderer, &SteeringConfig::wanderer(), &frame, &mut rng);
        assert!(forces[0].abs_diff_eq(Vec3::new(-100.0, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn test_role_gizmos_include_steer_and_avert() {
        let mut world = SpatialWorld::new();
        let role = Role::Flocker;
        let flocker = agent(&mut world, &role, Vec3::ZERO, Vec3::Z);
        let snapshot = Snapshot::default();
        let frame = FrameContext {
            query: &world,
            snapshot: &snapshot,
            goal: None,
        };

        let mut gizmos: Vec<Gizmo> = Vec::new();
        RoleDriver::new(role).gizmos(&flocker, &SteeringConfig::flocker(), &frame, &mut gizmos);

        // steer 2 + flock 4 + avert 2
        assert_eq!(gizmos.len(), 8);
    }

    #[test]
    fn test_role_serde_is_tagged() {
        let json = serde_json::to_string(&Role::Pursuer { target: EntityId(2) }).unwrap();
        assert_eq!(json, r#"{"kind":"pursuer","target":2}"#);
    }
}
