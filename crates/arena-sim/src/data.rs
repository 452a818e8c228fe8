//! Static per-type attribute tables.
//!
//! Petal, mob and zone definitions are immutable and indexed by their id
//! enums. Behavior code never branches on a type by inheritance; it reads the
//! attribute row for the type and dispatches on the enums stored there
//! ([`RotationStyle`], [`Ability`], [`DespawnMotion`], [`MobAi`]).

use serde::{Deserialize, Serialize};

use crate::consts::{BASE_HEALTH, MAX_LEVEL, MAX_SLOT_COUNT};

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Unusual,
    Rare,
    Epic,
    Legendary,
    Mythic,
    Unique,
}

/// Score granted for trashing a petal, indexed by [`Rarity`].
pub const RARITY_TO_XP: [u32; 7] = [2, 10, 50, 200, 1000, 5000, 0];

impl Rarity {
    /// Score granted for trashing a petal of this rarity.
    pub fn trash_xp(self) -> u32 {
        RARITY_TO_XP[self as usize]
    }
}

// ---------------------------------------------------------------------------
// Petals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PetalId {
    /// Empty loadout slot.
    #[default]
    None,
    Basic,
    Light,
    Heavy,
    Stinger,
    Leaf,
    Twin,
    Rose,
    Iris,
    Missile,
    Dandelion,
    Bubble,
    Faster,
    Web,
    Triweb,
    Pollen,
    Peas,
    PoisonPeas,
    Wing,
    Moon,
    Yggdrasil,
    Salt,
}

impl PetalId {
    pub const COUNT: usize = 22;

    /// Attribute row for this petal type.
    #[inline]
    pub fn data(self) -> &'static PetalData {
        &PETAL_DATA[self as usize]
    }
}

/// How a petal's facing angle evolves while it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStyle {
    /// Angle left alone.
    None,
    /// Spins at `passive_rotation` radians per second. Direction alternates
    /// with entity-id parity so neighbouring petals don't spin in lockstep.
    Passive,
    /// Faces away from the owning flower, except while despawning.
    Follow,
}

/// Secondary action a petal takes once its secondary reload has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    None,
    /// Attack: fly off along the current facing.
    Missile,
    /// Attack: shoot outward (`spread` jitters the angle). Defend: fizzle.
    Web { spread: bool },
    /// Defend: pop and shove the owner away from the bubble.
    Bubble,
    /// Attack or defend: drop in place.
    Pollen,
    /// Attack: shoot outward fast and briefly.
    Peas,
    /// Attack: drift off on a wide arc.
    Moon,
}

/// Acceleration override applied while a petal is despawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnMotion {
    /// Zero acceleration; coast to a stop.
    Halt,
    /// Keep accelerating along the current facing.
    Launch,
    /// Pulled back toward the owner with an inverse-square, capped magnitude.
    Home,
}

/// Poison inflicted on contact: total `damage` spread over `time` seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoisonDamage {
    pub damage: f32,
    pub time: f32,
}

impl PoisonDamage {
    pub const NONE: PoisonDamage = PoisonDamage {
        damage: 0.0,
        time: 0.0,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct PetalAttributes {
    pub rotation_style: RotationStyle,
    /// Radians per second for [`RotationStyle::Passive`].
    pub passive_rotation: f32,
    /// Seconds before [`ability`](Self::ability) becomes available. Zero
    /// means the petal has no secondary behavior.
    pub secondary_reload: f32,
    pub ability: Ability,
    pub despawn_motion: DespawnMotion,
    /// Health restored to the heal target when the petal reaches it.
    pub burst_heal: f32,
    /// Health per second restored to the owner while the petal is out.
    pub constant_heal: f32,
    pub poison_damage: PoisonDamage,
    /// Seconds of slow applied on hit.
    pub slow_inflict: f32,
    pub armor: f32,
    /// Fraction of damage taken reflected to the attacker, granted to the
    /// owning flower while the petal is out.
    pub damage_reflection: f32,
    /// Extra orbit speed (radians per second) granted to the owner.
    pub rotation_bonus: f32,
    /// Stays on the inner orbit even while attacking.
    pub defend_only: bool,
    /// May revive the owner on a lethal hit once it has been spawned.
    pub revival: bool,
}

const BASE_ATTRIBUTES: PetalAttributes = PetalAttributes {
    rotation_style: RotationStyle::None,
    passive_rotation: 1.0,
    secondary_reload: 0.0,
    ability: Ability::None,
    despawn_motion: DespawnMotion::Halt,
    burst_heal: 0.0,
    constant_heal: 0.0,
    poison_damage: PoisonDamage::NONE,
    slow_inflict: 0.0,
    armor: 0.0,
    damage_reflection: 0.0,
    rotation_bonus: 0.0,
    defend_only: false,
    revival: false,
};

#[derive(Debug, Clone, Copy)]
pub struct PetalData {
    pub id: PetalId,
    pub name: &'static str,
    pub rarity: Rarity,
    pub health: f32,
    pub damage: f32,
    pub radius: f32,
    /// Seconds between a petal breaking and its replacement spawning.
    pub reload: f32,
    /// Petals spawned per loadout slot.
    pub count: u8,
    pub attributes: PetalAttributes,
}

const fn petal(
    id: PetalId,
    name: &'static str,
    rarity: Rarity,
    health: f32,
    damage: f32,
    radius: f32,
    reload: f32,
    count: u8,
    attributes: PetalAttributes,
) -> PetalData {
    PetalData {
        id,
        name,
        rarity,
        health,
        damage,
        radius,
        reload,
        count,
        attributes,
    }
}

pub static PETAL_DATA: [PetalData; PetalId::COUNT] = [
    petal(PetalId::None, "None", Rarity::Common, 0.0, 0.0, 0.0, 0.0, 0, BASE_ATTRIBUTES),
    petal(PetalId::Basic, "Basic", Rarity::Common, 10.0, 10.0, 10.0, 2.5, 1, BASE_ATTRIBUTES),
    petal(PetalId::Light, "Light", Rarity::Common, 5.0, 7.0, 7.0, 1.0, 1, BASE_ATTRIBUTES),
    petal(PetalId::Heavy, "Heavy", Rarity::Common, 20.0, 20.0, 12.0, 4.5, 1, BASE_ATTRIBUTES),
    petal(PetalId::Stinger, "Stinger", Rarity::Unusual, 8.0, 35.0, 7.0, 4.0, 1, BASE_ATTRIBUTES),
    petal(
        PetalId::Leaf,
        "Leaf",
        Rarity::Unusual,
        10.0,
        8.0,
        10.0,
        1.0,
        1,
        PetalAttributes {
            rotation_style: RotationStyle::Follow,
            constant_heal: 1.0,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(PetalId::Twin, "Twin", Rarity::Unusual, 5.0, 8.0, 7.0, 1.0, 2, BASE_ATTRIBUTES),
    petal(
        PetalId::Rose,
        "Rose",
        Rarity::Unusual,
        5.0,
        5.0,
        10.0,
        3.5,
        1,
        PetalAttributes {
            secondary_reload: 1.0,
            burst_heal: 11.0,
            defend_only: true,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Iris,
        "Iris",
        Rarity::Unusual,
        5.0,
        5.0,
        7.0,
        6.0,
        1,
        PetalAttributes {
            poison_damage: PoisonDamage {
                damage: 60.0,
                time: 6.0,
            },
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Missile,
        "Missile",
        Rarity::Rare,
        10.0,
        25.0,
        10.0,
        1.5,
        1,
        PetalAttributes {
            rotation_style: RotationStyle::Follow,
            secondary_reload: 0.5,
            ability: Ability::Missile,
            despawn_motion: DespawnMotion::Launch,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Dandelion,
        "Dandelion",
        Rarity::Rare,
        10.0,
        5.0,
        10.0,
        1.0,
        1,
        PetalAttributes {
            rotation_style: RotationStyle::Follow,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Bubble,
        "Bubble",
        Rarity::Rare,
        1.0,
        0.0,
        12.0,
        3.5,
        1,
        PetalAttributes {
            secondary_reload: 0.5,
            ability: Ability::Bubble,
            defend_only: true,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Faster,
        "Faster",
        Rarity::Rare,
        5.0,
        8.0,
        7.0,
        0.5,
        1,
        PetalAttributes {
            rotation_style: RotationStyle::Passive,
            rotation_bonus: 0.8,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Web,
        "Web",
        Rarity::Rare,
        5.0,
        5.0,
        12.0,
        3.0,
        1,
        PetalAttributes {
            secondary_reload: 0.5,
            ability: Ability::Web { spread: false },
            slow_inflict: 1.0,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Triweb,
        "Triweb",
        Rarity::Epic,
        5.0,
        5.0,
        12.0,
        3.0,
        3,
        PetalAttributes {
            secondary_reload: 0.5,
            ability: Ability::Web { spread: true },
            slow_inflict: 1.0,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Pollen,
        "Pollen",
        Rarity::Epic,
        5.0,
        8.0,
        7.0,
        1.0,
        3,
        PetalAttributes {
            secondary_reload: 0.3,
            ability: Ability::Pollen,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Peas,
        "Peas",
        Rarity::Rare,
        5.0,
        8.0,
        7.0,
        1.4,
        4,
        PetalAttributes {
            secondary_reload: 0.2,
            ability: Ability::Peas,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::PoisonPeas,
        "Poison Peas",
        Rarity::Epic,
        5.0,
        2.0,
        7.0,
        1.4,
        4,
        PetalAttributes {
            secondary_reload: 0.2,
            ability: Ability::Peas,
            poison_damage: PoisonDamage {
                damage: 20.0,
                time: 2.0,
            },
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Wing,
        "Wing",
        Rarity::Epic,
        15.0,
        15.0,
        10.0,
        1.25,
        1,
        PetalAttributes {
            rotation_style: RotationStyle::Passive,
            passive_rotation: 10.0,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Moon,
        "Moon",
        Rarity::Mythic,
        100.0,
        5.0,
        30.0,
        10.0,
        1,
        PetalAttributes {
            secondary_reload: 1.0,
            ability: Ability::Moon,
            despawn_motion: DespawnMotion::Home,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Yggdrasil,
        "Yggdrasil",
        Rarity::Unique,
        10.0,
        1.0,
        10.0,
        10.0,
        1,
        PetalAttributes {
            rotation_style: RotationStyle::Passive,
            revival: true,
            ..BASE_ATTRIBUTES
        },
    ),
    petal(
        PetalId::Salt,
        "Salt",
        Rarity::Rare,
        10.0,
        10.0,
        10.0,
        2.5,
        1,
        PetalAttributes {
            damage_reflection: 0.25,
            ..BASE_ATTRIBUTES
        },
    ),
];

// ---------------------------------------------------------------------------
// Mobs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MobId {
    #[default]
    Rock,
    Boulder,
    Ladybug,
    Bee,
    BabyAnt,
    WorkerAnt,
    SoldierAnt,
    Beetle,
    Hornet,
    Spider,
    Cactus,
    Scorpion,
    AntHole,
    Square,
}

impl MobId {
    pub const COUNT: usize = 14;

    /// Attribute row for this mob type.
    #[inline]
    pub fn data(self) -> &'static MobData {
        &MOB_DATA[self as usize]
    }
}

/// Targeting behavior of a mob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobAi {
    /// Never moves on its own.
    Static,
    /// Chases only a target handed to it (by taking damage, or by its parent).
    Passive,
    /// Also acquires the nearest enemy flower inside its aggro radius.
    Aggressive,
}

#[derive(Debug, Clone, Copy)]
pub struct MobData {
    pub id: MobId,
    pub name: &'static str,
    pub rarity: Rarity,
    pub health: f32,
    pub damage: f32,
    pub radius: f32,
    pub armor: f32,
    pub ai: MobAi,
    /// Pursuit acceleration as a multiple of the player's.
    pub speed: f32,
    pub aggro_radius: f32,
    /// Score granted to the flower credited with the kill.
    pub xp: u32,
    pub poison_damage: PoisonDamage,
    /// Seconds of slow applied on hit.
    pub slow_inflict: f32,
}

const fn mob(
    id: MobId,
    name: &'static str,
    rarity: Rarity,
    health: f32,
    damage: f32,
    radius: f32,
    ai: MobAi,
    speed: f32,
    xp: u32,
) -> MobData {
    MobData {
        id,
        name,
        rarity,
        health,
        damage,
        radius,
        armor: 0.0,
        ai,
        speed,
        aggro_radius: 0.0,
        xp,
        poison_damage: PoisonDamage::NONE,
        slow_inflict: 0.0,
    }
}

pub static MOB_DATA: [MobData; MobId::COUNT] = [
    mob(MobId::Rock, "Rock", Rarity::Common, 12.0, 10.0, 25.0, MobAi::Static, 0.0, 1),
    mob(MobId::Boulder, "Boulder", Rarity::Unusual, 40.0, 10.0, 45.0, MobAi::Static, 0.0, 5),
    mob(MobId::Ladybug, "Ladybug", Rarity::Common, 25.0, 10.0, 30.0, MobAi::Passive, 0.5, 2),
    mob(MobId::Bee, "Bee", Rarity::Common, 15.0, 50.0, 20.0, MobAi::Passive, 0.7, 2),
    mob(MobId::BabyAnt, "Baby Ant", Rarity::Common, 10.0, 10.0, 14.0, MobAi::Passive, 0.5, 1),
    mob(MobId::WorkerAnt, "Worker Ant", Rarity::Unusual, 25.0, 10.0, 14.0, MobAi::Passive, 0.6, 3),
    MobData {
        aggro_radius: 500.0,
        ..mob(MobId::SoldierAnt, "Soldier Ant", Rarity::Unusual, 40.0, 10.0, 14.0, MobAi::Aggressive, 0.8, 5)
    },
    MobData {
        aggro_radius: 600.0,
        ..mob(MobId::Beetle, "Beetle", Rarity::Rare, 40.0, 35.0, 35.0, MobAi::Aggressive, 0.7, 10)
    },
    MobData {
        aggro_radius: 700.0,
        ..mob(MobId::Hornet, "Hornet", Rarity::Rare, 40.0, 40.0, 40.0, MobAi::Aggressive, 0.6, 10)
    },
    MobData {
        aggro_radius: 500.0,
        slow_inflict: 1.0,
        ..mob(MobId::Spider, "Spider", Rarity::Rare, 25.0, 15.0, 20.0, MobAi::Aggressive, 1.0, 10)
    },
    mob(MobId::Cactus, "Cactus", Rarity::Common, 42.0, 30.0, 45.0, MobAi::Static, 0.0, 3),
    MobData {
        aggro_radius: 500.0,
        poison_damage: PoisonDamage {
            damage: 10.0,
            time: 2.0,
        },
        ..mob(MobId::Scorpion, "Scorpion", Rarity::Rare, 35.0, 15.0, 30.0, MobAi::Aggressive, 0.7, 10)
    },
    MobData {
        armor: 5.0,
        ..mob(MobId::AntHole, "Ant Hole", Rarity::Rare, 500.0, 10.0, 60.0, MobAi::Static, 0.0, 50)
    },
    mob(MobId::Square, "Square", Rarity::Unique, 2000.0, 10.0, 60.0, MobAi::Static, 0.0, 500),
];

/// Mob waves released by an ant hole. The first `len - 1` waves map onto
/// equal health bands; the last fires when the hole dies.
pub static ANTHOLE_SPAWNS: [&[MobId]; 5] = [
    &[MobId::BabyAnt, MobId::BabyAnt],
    &[MobId::WorkerAnt, MobId::BabyAnt],
    &[MobId::SoldierAnt, MobId::WorkerAnt],
    &[MobId::SoldierAnt, MobId::SoldierAnt],
    &[MobId::SoldierAnt, MobId::SoldierAnt, MobId::SoldierAnt],
];

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// A rectangular map region with its own mob spawn weights.
#[derive(Debug, Clone, Copy)]
pub struct ZoneDefinition {
    pub name: &'static str,
    /// Center x.
    pub x: f32,
    /// Center y.
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Multiplier on the per-zone mob cap.
    pub density: f32,
    pub difficulty: u8,
    /// `(mob, weight)` pairs; a mob is picked with probability
    /// `weight / sum(weights)`.
    pub spawns: &'static [(MobId, u32)],
}

impl ZoneDefinition {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (x - self.x).abs() <= self.w / 2.0 && (y - self.y).abs() <= self.h / 2.0
    }

    pub fn total_weight(&self) -> u32 {
        self.spawns.iter().map(|&(_, w)| w).sum()
    }

    /// Mob whose cumulative weight range contains `roll`
    /// (`0 <= roll < total_weight()`).
    pub fn pick(&self, roll: u32) -> Option<MobId> {
        let mut acc = 0;
        for &(mob_id, weight) in self.spawns {
            acc += weight;
            if roll < acc {
                return Some(mob_id);
            }
        }
        None
    }
}

pub static ZONES: [ZoneDefinition; 4] = [
    ZoneDefinition {
        name: "Easy",
        x: 5000.0,
        y: 2000.0,
        w: 10000.0,
        h: 4000.0,
        density: 1.0,
        difficulty: 0,
        spawns: &[
            (MobId::Rock, 500_000),
            (MobId::Ladybug, 100_000),
            (MobId::Bee, 100_000),
            (MobId::BabyAnt, 25_000),
            (MobId::Boulder, 10_000),
            (MobId::Square, 1),
        ],
    },
    ZoneDefinition {
        name: "Medium",
        x: 15000.0,
        y: 2000.0,
        w: 10000.0,
        h: 4000.0,
        density: 1.0,
        difficulty: 1,
        spawns: &[
            (MobId::Cactus, 400_000),
            (MobId::Beetle, 100_000),
            (MobId::Bee, 50_000),
            (MobId::Scorpion, 50_000),
            (MobId::Ladybug, 50_000),
            (MobId::AntHole, 2_000),
            (MobId::Square, 1),
        ],
    },
    ZoneDefinition {
        name: "Hard",
        x: 25000.0,
        y: 2000.0,
        w: 10000.0,
        h: 4000.0,
        density: 1.0,
        difficulty: 2,
        spawns: &[
            (MobId::Spider, 100_000),
            (MobId::Boulder, 100_000),
            (MobId::Bee, 100_000),
            (MobId::Hornet, 100_000),
            (MobId::Beetle, 50_000),
            (MobId::Ladybug, 50_000),
            (MobId::AntHole, 2_000),
            (MobId::Square, 1),
        ],
    },
    ZoneDefinition {
        name: "???",
        x: 35000.0,
        y: 2000.0,
        w: 10000.0,
        h: 4000.0,
        density: 1.0,
        difficulty: 3,
        spawns: &[
            (MobId::Beetle, 150_000),
            (MobId::Hornet, 150_000),
            (MobId::Spider, 150_000),
            (MobId::Boulder, 100_000),
            (MobId::AntHole, 2_500),
            (MobId::Square, 1),
        ],
    },
];

// ---------------------------------------------------------------------------
// Level curve
// ---------------------------------------------------------------------------

/// Score needed to go from `level` to `level + 1`.
pub fn score_to_pass_level(level: u32) -> u32 {
    ((level + 1) as f32).powf(1.6).floor() as u32 * 10
}

/// Total score at which `level` is reached. Level 1 is free.
pub fn level_to_score(level: u32) -> u32 {
    (1..level.min(MAX_LEVEL)).map(score_to_pass_level).sum()
}

pub fn score_to_level(score: u32) -> u32 {
    let mut level = 1;
    let mut remaining = score;
    while level < MAX_LEVEL {
        let needed = score_to_pass_level(level);
        if remaining < needed {
            break;
        }
        remaining -= needed;
        level += 1;
    }
    level
}

pub fn loadout_slots_at_level(level: u32) -> usize {
    (5 + level as usize / 15).min(MAX_SLOT_COUNT)
}

pub fn hp_at_level(level: u32) -> f32 {
    BASE_HEALTH + level.clamp(1, MAX_LEVEL).saturating_sub(1) as f32 * 2.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
