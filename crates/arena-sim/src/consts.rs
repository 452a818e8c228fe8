//! Game-wide tuning constants.

/// Acceleration (units per tick squared) of a flower at full input.
pub const PLAYER_ACCELERATION: f32 = 5.0;

/// Fraction of velocity lost per tick.
pub const DEFAULT_FRICTION: f32 = 0.2;

/// Radius around a flower in which heal petals look for wounded teammates.
pub const TEAMMATE_HEAL_RADIUS: f32 = 600.0;

/// Number of secondary (inventory) slots, and the deleted-petal history size.
pub const MAX_SLOT_COUNT: usize = 8;

/// Longest accepted player name, in characters.
pub const MAX_NAME_LENGTH: usize = 16;

pub const MAX_LEVEL: u32 = 99;

pub const BASE_HEALTH: f32 = 100.0;
pub const BASE_BODY_DAMAGE: f32 = 25.0;
pub const BASE_FLOWER_RADIUS: f32 = 25.0;

/// Client input components beyond this magnitude are rejected outright.
pub const MAX_INPUT_COMPONENT: f32 = 5e3;

/// Input vector length at which a flower reaches full acceleration.
pub const FULL_INPUT_MAGNITUDE: f32 = 200.0;

/// Immunity granted by a revival, in seconds.
pub const REVIVAL_IMMUNITY_SECONDS: f32 = 1.0;

/// Heal block applied to whoever hits a dandelion, in seconds.
pub const DANDELION_SECONDS: f32 = 10.0;

/// Base orbit speed of a flower's petals, in radians per second.
pub const BASE_ROTATION_SPEED: f32 = 2.5;

pub const ORBIT_RADIUS: f32 = 60.0;
pub const ATTACK_ORBIT_RADIUS: f32 = 120.0;
pub const DEFEND_ORBIT_RADIUS: f32 = 40.0;

/// Distance past which a mob forgets its target.
pub const LOSE_AGGRO_RADIUS: f32 = 1500.0;

/// Loadout every new camera starts with.
pub const STARTING_LOADOUT: [crate::data::PetalId; 5] = [crate::data::PetalId::Basic; 5];
