//! Steer Sandbox
//!
//! Headless host for the steering engine. Loads a scenario, runs its frames
//! at a fixed timestep and logs where every agent ends up.

mod scenario;

use scenario::{Result, Scenario};
use std::collections::HashMap;
use steer_core::prelude::*;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("Sandbox failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let scenario = Scenario::locate()?;
    scenario.print_summary();

    let (mut sim, names) = scenario.build()?;
    let start: HashMap<EntityId, Vec3> = sim.agents().map(|(id, agent)| (id, agent.position())).collect();

    for frame in 0..scenario.frames {
        sim.set_goal(scenario.goal_at(frame as f32 * scenario.timestep));
        sim.step(scenario.timestep)?;

        if scenario.log_every > 0 && sim.frame() % scenario.log_every == 0 {
            log_poses(&sim, &names, scenario.gizmos)?;
        }
    }

    log::info!("Finished {} frames", sim.frame());
    for (id, agent) in sim.agents() {
        let travelled = start
            .get(&id)
            .map(|origin| (agent.position() - *origin).length())
            .unwrap_or(0.0);
        let role = sim.role(id).map(|role| role.name()).unwrap_or("?");
        log::info!(
            "  {:<10} {:<8} at ({:7.2}, {:7.2}) speed {:5.2}, {:6.2} from spawn",
            name_of(&names, id),
            role,
            agent.position().x,
            agent.position().z,
            agent.velocity().length(),
            travelled
        );

        if let Some(target) = sim.role(id).and_then(|role| role.target()) {
            if let Some(other) = sim.agent(target) {
                log::info!(
                    "  {:<10} {:.2} from {}",
                    "",
                    (other.position() - agent.position()).length(),
                    name_of(&names, target)
                );
            }
        }
    }

    Ok(())
}

fn log_poses(sim: &Simulation, names: &HashMap<EntityId, String>, gizmos: bool) -> Result<()> {
    log::info!("Frame {}", sim.frame());
    for (id, agent) in sim.agents() {
        log::info!(
            "  {:<10} pos ({:7.2}, {:7.2}) vel ({:6.2}, {:6.2}) force {:5.2}",
            name_of(names, id),
            agent.position().x,
            agent.position().z,
            agent.velocity().x,
            agent.velocity().z,
            agent.steering_force().length()
        );

        if gizmos {
            let mut shapes: Vec<Gizmo> = Vec::new();
            sim.gizmos(id, &mut shapes)?;
            let boxes = shapes
                .iter()
                .filter(|shape| matches!(shape, Gizmo::WireBox { .. }))
                .count();
            log::debug!("  {:<10} {} gizmos, {} obstacles considered", "", shapes.len(), boxes);
        }
    }
    Ok(())
}

fn name_of(names: &HashMap<EntityId, String>, id: EntityId) -> &str {
    names.get(&id).map(String::as_str).unwrap_or("?")
}
