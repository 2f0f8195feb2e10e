//! Debug shapes for steering behaviours.
//!
//! Nothing here feeds back into steering. Each function mirrors one
//! behaviour and describes what it looked at as a handful of [`Gizmo`]s
//! which a host can draw however it likes.

use crate::agent::{Kinematic, Steerable};
use crate::avoidance::Avoidance;
use crate::config::{AvoidanceConfig, PursuitConfig};
use crate::flocking::{align, cohere, separate};
use crate::targeting::predict_position;
use glam::Vec3;
use steer_math::{Aabb, Ray, Vec3Ext, UP};
use steer_spatial::{LayerMask, SpatialQuery};

/// Radius of the predicted-position marker
const MARKER_RADIUS: f32 = 0.25;

/// Normal of every disc and arc
pub const GIZMO_NORMAL: Vec3 = UP;

/// Gizmo colors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
}

impl Color {
    /// Linear RGBA
    pub fn rgba(self) -> [f32; 4] {
        match self {
            Color::Red => [1.0, 0.0, 0.0, 1.0],
            Color::Green => [0.0, 1.0, 0.0, 1.0],
            Color::Blue => [0.0, 0.0, 1.0, 1.0],
            Color::Yellow => [1.0, 0.92, 0.016, 1.0],
            Color::Cyan => [0.0, 1.0, 1.0, 1.0],
            Color::Magenta => [1.0, 0.0, 1.0, 1.0],
        }
    }
}

/// One debug shape. Discs and arcs lie in the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gizmo {
    Line {
        from: Vec3,
        to: Vec3,
        color: Color,
    },
    Disc {
        center: Vec3,
        radius: f32,
        color: Color,
    },
    /// Arc sweeping `angle` degrees about up, starting along `from`
    Arc {
        center: Vec3,
        from: Vec3,
        angle: f32,
        radius: f32,
        color: Color,
    },
    WireBox {
        bounds: Aabb,
        color: Color,
    },
}

/// Destination for emitted gizmos
pub trait GizmoSink {
    fn draw(&mut self, gizmo: Gizmo);

    fn line(&mut self, from: Vec3, to: Vec3, color: Color) {
        self.draw(Gizmo::Line { from, to, color });
    }

    fn disc(&mut self, center: Vec3, radius: f32, color: Color) {
        self.draw(Gizmo::Disc {
            center,
            radius,
            color,
        });
    }
}

impl GizmoSink for Vec<Gizmo> {
    fn draw(&mut self, gizmo: Gizmo) {
        self.push(gizmo);
    }
}

/// Velocity (blue) and steering force (green) as 2 unit lines
pub fn steer_gizmos<S: Steerable + ?Sized>(agent: &S, sink: &mut impl GizmoSink) {
    let position = agent.position();
    sink.line(position, position + agent.velocity().safe_normalize() * 2.0, Color::Blue);
    sink.line(
        position,
        position + agent.steering_force().safe_normalize() * 2.0,
        Color::Green,
    );
}

/// Neighbourhood disc plus one unit line per flocking rule
pub fn flock_gizmos<S, Q>(agent: &S, query: &Q, radius: f32, mask: LayerMask, sink: &mut impl GizmoSink)
where
    S: Steerable + ?Sized,
    Q: SpatialQuery + ?Sized,
{
    let position = agent.position();
    sink.disc(position, radius, Color::Yellow);
    sink.line(position, position + align(agent, query, radius, mask), Color::Cyan);
    sink.line(position, position + cohere(agent, query, radius, mask), Color::Magenta);
    sink.line(position, position + separate(agent, query, radius, 1.0, mask), Color::Red);
}

/// Where a pursuer expects its target to be
pub fn pursue_gizmos<S, T>(agent: &S, target: &T, pursuit: &PursuitConfig, sink: &mut impl GizmoSink)
where
    S: Kinematic + ?Sized,
    T: Kinematic + ?Sized,
{
    let predicted = predict_position(agent.position(), target, pursuit);
    sink.disc(predicted, MARKER_RADIUS, Color::Green);
}

/// Where an evader expects its pursuer to be
pub fn evade_gizmos<S, T>(agent: &S, target: &T, pursuit: &PursuitConfig, sink: &mut impl GizmoSink)
where
    S: Kinematic + ?Sized,
    T: Kinematic + ?Sized,
{
    let predicted = predict_position(agent.position(), target, pursuit);
    sink.disc(predicted, MARKER_RADIUS, Color::Red);
}

/// Avoidance ray, fallback radius and every volume avoidance considered
pub fn avert_gizmos<S, Q>(
    agent: &S,
    query: &Q,
    avoidance: &Avoidance,
    config: &AvoidanceConfig,
    mask: LayerMask,
    sink: &mut impl GizmoSink,
) where
    S: Steerable + ?Sized,
    Q: SpatialQuery + ?Sized,
{
    let id = agent.id();
    let position = agent.position();
    let direction = agent.velocity().safe_normalize();

    sink.line(position, position + direction * config.aversion_distance, Color::Red);
    sink.disc(position, config.aversion_radius, Color::Red);

    // A held obstacle is the only one avoidance looks at
    let ray = Ray::new(position, direction);
    if let Some(hit) = avoidance.blocking_hit(&ray, config) {
        sink.draw(Gizmo::WireBox {
            bounds: hit.bounds,
            color: Color::Red,
        });
        return;
    }

    let hits: Vec<Aabb> = query
        .raycast_all(position, direction, config.aversion_distance, mask)
        .into_iter()
        .filter(|hit| hit.entity != id)
        .map(|hit| hit.bounds)
        .collect();

    let considered = if hits.is_empty() {
        query
            .overlap_sphere(position, config.aversion_radius, mask)
            .into_iter()
            .filter(|proxy| proxy.entity != id)
            .map(|proxy| proxy.bounds)
            .collect()
    } else {
        hits
    };

    for bounds in considered {
        sink.draw(Gizmo::WireBox {
            bounds,
            color: Color::Red,
        });
    }
}

/// The cone wander picks its heading from
pub fn wander_gizmos<S: Steerable + ?Sized>(agent: &S, cone_angle: f32, sink: &mut impl GizmoSink) {
    let position = agent.position();
    let heading = agent.velocity().safe_normalize();
    let start = heading.rotate_about_up(-cone_angle * 0.5);
    let end = heading.rotate_about_up(cone_angle * 0.5);

    sink.draw(Gizmo::Arc {
        center: position,
        from: start,
        angle: cone_angle,
        radius: 1.0,
        color: Color::Red,
    });
    sink.line(position, position + start, Color::Red);
    sink.line(position, position + end, Color::Red);
}

/// Wander cone plus the circle it is confined to
pub fn wander_within_circle_gizmos<S: Steerable + ?Sized>(
    agent: &S,
    cone_angle: f32,
    circle_center: Vec3,
    circle_radius: f32,
    sink: &mut impl GizmoSink,
) {
    wander_gizmos(agent, cone_angle, sink);
    sink.disc(circle_center, circle_radius, Color::Red);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::SteeringAgent;
    use crate::config::AgentLimits;
    use steer_spatial::{CollisionLayer, EntityId, Motion, SpatialWorld};

    fn agent_on(world: &mut SpatialWorld) -> SteeringAgent {
        let id = world
            .insert_steerable(
                CollisionLayer::AGENTS,
                Aabb::cube(Vec3::ZERO, 0.5),
                Motion::new(Vec3::ZERO, Vec3::Z),
            )
            .unwrap();
        SteeringAgent::new(id, Vec3::ZERO, Vec3::Z, AgentLimits::default())
    }

    #[test]
    fn test_steer_draws_two_lines() {
        let agent = SteeringAgent::new(EntityId(0), Vec3::ZERO, Vec3::X, AgentLimits::default());
        let mut gizmos: Vec<Gizmo> = Vec::new();
        steer_gizmos(&agent, &mut gizmos);

        assert_eq!(gizmos.len(), 2);
        assert_eq!(
            gizmos[0],
            Gizmo::Line {
                from: Vec3::ZERO,
                to: Vec3::new(2.0, 0.0, 0.0),
                color: Color::Blue
            }
        );
    }

    #[test]
    fn test_avert_draws_considered_volumes() {
        let mut world = SpatialWorld::new();
        let agent = agent_on(&mut world);
        let wall = Aabb::cube(Vec3::new(0.0, 0.0, 3.0), 1.0);
        world.insert_obstacle(CollisionLayer::ENVIRONMENT, wall).unwrap();

        let mut gizmos: Vec<Gizmo> = Vec::new();
        avert_gizmos(
            &agent,
            &world,
            &Avoidance::new(),
            &AvoidanceConfig::default(),
            LayerMask::ALL,
            &mut gizmos,
        );

        let boxes: Vec<_> = gizmos
            .iter()
            .filter(|g| matches!(g, Gizmo::WireBox { .. }))
            .collect();
        assert_eq!(boxes.len(), 1);
        assert_eq!(
            *boxes[0],
            Gizmo::WireBox {
                bounds: wall,
                color: Color::Red
            }
        );
    }

    #[test]
    fn test_avert_draws_held_obstacle() {
        let mut world = SpatialWorld::new();
        let agent = agent_on(&mut world);
        let wall_bounds = Aabb::cube(Vec3::new(0.0, 0.0, 3.5), 1.0);
        let wall = world
            .insert_obstacle(CollisionLayer::ENVIRONMENT, wall_bounds)
            .unwrap();

        let config = AvoidanceConfig {
            cache_hits: true,
            ..Default::default()
        };
        let mut avoidance = Avoidance::new();
        avoidance.avert(&agent, &world, &config, LayerMask::ALL);
        world.remove(wall).unwrap();

        // the wall is gone from the world but still steered around
        let mut gizmos: Vec<Gizmo> = Vec::new();
        avert_gizmos(&agent, &world, &avoidance, &config, LayerMask::ALL, &mut gizmos);
        let boxes: Vec<_> = gizmos
            .iter()
            .filter(|g| matches!(g, Gizmo::WireBox { .. }))
            .collect();
        assert_eq!(
            boxes,
            vec![&Gizmo::WireBox {
                bounds: wall_bounds,
                color: Color::Red
            }]
        );

        let mut fresh: Vec<Gizmo> = Vec::new();
        avert_gizmos(&agent, &world, &Avoidance::new(), &config, LayerMask::ALL, &mut fresh);
        assert!(!fresh.iter().any(|g| matches!(g, Gizmo::WireBox { .. })));
    }

    #[test]
    fn test_pursue_marks_prediction() {
        let agent = SteeringAgent::new(EntityId(0), Vec3::ZERO, Vec3::ZERO, AgentLimits::default());
        let target = Motion::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.1));
        let mut gizmos: Vec<Gizmo> = Vec::new();
        pursue_gizmos(&agent, &target, &PursuitConfig::default(), &mut gizmos);

        match gizmos[0] {
            Gizmo::Disc { center, .. } => {
                assert!(center.abs_diff_eq(Vec3::new(10.0, 0.0, 15.0), 1e-4))
            }
            other => panic!("expected disc, got {:?}", other),
        }
    }

    #[test]
    fn test_wander_within_circle_adds_circle() {
        let agent = SteeringAgent::new(EntityId(0), Vec3::ZERO, Vec3::Z, AgentLimits::default());
        let mut gizmos: Vec<Gizmo> = Vec::new();
        wander_within_circle_gizmos(&agent, 90.0, Vec3::ZERO, 40.0, &mut gizmos);

        assert_eq!(gizmos.len(), 4);
        assert!(matches!(gizmos[3], Gizmo::Disc { radius, .. } if radius == 40.0));
    }

    #[test]
    fn test_flock_alone_draws_zero_lines() {
        let mut world = SpatialWorld::new();
        let agent = agent_on(&mut world);
        let mut gizmos: Vec<Gizmo> = Vec::new();
        flock_gizmos(&agent, &world, 3.0, LayerMask::ALL, &mut gizmos);

        assert_eq!(gizmos.len(), 4);
        for gizmo in &gizmos[1..] {
            match gizmo {
                Gizmo::Line { from, to, .. } => assert_eq!(from, to),
                other => panic!("expected line, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_colors_are_opaque() {
        assert_eq!(Color::Cyan.rgba()[3], 1.0);
    }
}
