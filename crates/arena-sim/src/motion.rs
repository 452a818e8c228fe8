//! Motion integration and spatial refresh.

use arena_ecs::component::Component;
use glam::Vec2;

use crate::sim::Simulation;

/// Acceleration multiplier while slowed.
pub const SLOW_FACTOR: f32 = 0.5;

/// Integrate velocity and position for every physical entity, then apply
/// friction and keep it inside the arena.
pub fn motion_system(sim: &mut Simulation) {
    let bounds = Vec2::new(sim.config().arena_width, sim.config().arena_height);
    for id in sim.ids_with(Component::Physics) {
        if sim.is_pending_delete(id) {
            continue;
        }
        let Some(ent) = sim.get_mut(id) else {
            continue;
        };
        let mut acceleration = ent.acceleration;
        if ent.slow_ticks > 0 {
            acceleration *= SLOW_FACTOR;
        }
        ent.velocity += acceleration;
        ent.pos += ent.velocity;
        ent.velocity *= 1.0 - ent.friction;
        ent.pos = ent.pos.clamp(Vec2::ZERO, bounds);
    }
}

/// Re-bucket every physical entity after motion.
pub fn spatial_system(sim: &mut Simulation) {
    sim.refresh_spatial();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::Team;
    use crate::spawn::alloc_player;

    fn sim() -> Simulation {
        Simulation::new(SimConfig {
            max_entities: 8,
            mob_spawning: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn integrates_then_applies_friction() {
        let mut sim = sim();
        let id = alloc_player(&mut sim, Team(1)).unwrap();
        {
            let ent = sim.get_mut(id).unwrap();
            ent.pos = Vec2::new(100.0, 100.0);
            ent.acceleration = Vec2::new(5.0, 0.0);
            ent.friction = 0.2;
        }
        motion_system(&mut sim);
        let ent = sim.get(id).unwrap();
        assert_eq!(ent.pos, Vec2::new(105.0, 100.0));
        assert_eq!(ent.velocity, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn slowed_entities_accelerate_at_half_strength() {
        let mut sim = sim();
        let id = alloc_player(&mut sim, Team(1)).unwrap();
        {
            let ent = sim.get_mut(id).unwrap();
            ent.pos = Vec2::new(100.0, 100.0);
            ent.acceleration = Vec2::new(0.0, 4.0);
            ent.slow_ticks = 1;
        }
        motion_system(&mut sim);
        assert_eq!(sim.get(id).unwrap().pos, Vec2::new(100.0, 102.0));
    }

    #[test]
    fn position_clamped_to_arena() {
        let mut sim = sim();
        let id = alloc_player(&mut sim, Team(1)).unwrap();
        sim.get_mut(id).unwrap().velocity = Vec2::new(-50.0, 1e9);
        motion_system(&mut sim);
        let pos = sim.get(id).unwrap().pos;
        assert_eq!(pos, Vec2::new(0.0, sim.config().arena_height));
    }

    #[test]
    fn spatial_system_tracks_new_positions() {
        let mut sim = sim();
        let id = alloc_player(&mut sim, Team(1)).unwrap();
        sim.get_mut(id).unwrap().pos = Vec2::new(3000.0, 1000.0);
        spatial_system(&mut sim);
        assert_eq!(sim.query_ids(3000.0, 1000.0, 10.0, 10.0), vec![id]);
    }
}
