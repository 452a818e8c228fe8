//! Property tests for damage resolution and whole-simulation determinism.

use arena_sim::prelude::*;
use proptest::prelude::*;

fn sim(seed: u64) -> Simulation {
    Simulation::new(SimConfig {
        max_entities: 256,
        rng_seed: seed,
        max_mobs_per_zone: 4,
        ..Default::default()
    })
    .unwrap()
}

fn duel(sim: &mut Simulation) -> (EntityId, EntityId) {
    let a = spawn::alloc_player(sim, Team(1)).unwrap();
    let b = spawn::alloc_player(sim, Team(2)).unwrap();
    (a, b)
}

fn damage_type_strategy() -> impl Strategy<Value = DamageType> {
    prop_oneof![
        Just(DamageType::Contact),
        Just(DamageType::Poison),
        Just(DamageType::Reflect),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn health_stays_within_bounds(
        hits in prop::collection::vec((-50.0f32..200.0, damage_type_strategy()), 1..40),
        armor in 0.0f32..30.0,
    ) {
        let mut sim = sim(1);
        let (a, b) = duel(&mut sim);
        sim.get_mut(b).unwrap().armor = armor;

        let mut last = sim.get(b).unwrap().health;
        for (amount, ty) in hits {
            inflict_damage(&mut sim, a, b, amount, ty);
            let now = sim.get(b).unwrap().health;
            prop_assert!(now >= 0.0);
            prop_assert!(now <= last, "damage never heals: {last} -> {now}");
            last = now;
        }
    }

    #[test]
    fn non_positive_damage_is_a_no_op(amount in -1e6f32..=0.0, ty in damage_type_strategy()) {
        let mut sim = sim(2);
        let (a, b) = duel(&mut sim);
        let before = sim.snapshot();
        inflict_damage(&mut sim, a, b, amount, ty);
        prop_assert_eq!(sim.snapshot(), before);
        prop_assert!(sim.get(b).unwrap().last_damaged_by.is_null());
    }

    #[test]
    fn armor_absorbing_contact_is_a_no_op(amount in 0.0f32..100.0, extra in 0.0f32..100.0) {
        let mut sim = sim(3);
        let (a, b) = duel(&mut sim);
        sim.get_mut(b).unwrap().armor = amount + extra;
        let before = sim.snapshot();
        inflict_damage(&mut sim, a, b, amount, DamageType::Contact);
        prop_assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn heal_never_exceeds_max(hp in 1.0f32..100.0, amount in -10.0f32..500.0) {
        let mut sim = sim(4);
        let (a, _) = duel(&mut sim);
        sim.get_mut(a).unwrap().health = hp;
        inflict_heal(&mut sim, a, amount);
        let ent = sim.get(a).unwrap();
        prop_assert!(ent.health <= ent.max_health);
        prop_assert!(ent.health >= hp);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn identical_seeds_give_identical_runs(seed in any::<u64>(), ticks in 1u64..80) {
        let run = |seed| {
            let mut tick_loop = TickLoop::new(sim(seed));
            let camera = spawn::alloc_camera(tick_loop.sim_mut(), Team(1)).unwrap();
            tick_loop.queue_command(camera, ClientCommand::Spawn { name: "p".into() });
            tick_loop.queue_command(camera, ClientCommand::Input { x: 150.0, y: -40.0, flags: 1 });
            tick_loop.run_ticks(ticks);
            tick_loop.state_hash()
        };
        prop_assert_eq!(run(seed), run(seed));
    }
}
