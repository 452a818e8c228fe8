//! Client commands.
//!
//! Commands arrive already decoded from the network layer and are applied by
//! the [`TickLoop`](crate::tick::TickLoop) at a fixed point in the tick. Each
//! one is validated in full before anything is touched, so a rejected command
//! never leaves partial state behind.

use arena_ecs::component::Component;
use arena_ecs::entity::EntityId;
use glam::Vec2;

use crate::consts::{FULL_INPUT_MAGNITUDE, MAX_INPUT_COMPONENT, MAX_NAME_LENGTH, PLAYER_ACCELERATION};
use crate::data::PetalId;
use crate::entity::InputFlags;
use crate::sim::Simulation;
use crate::spawn::{alloc_player, player_spawn};
use crate::CommandError;

/// A decoded serverbound message, addressed to one camera.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// Spawn a new flower for the camera, unless one is already alive.
    Spawn { name: String },
    /// Movement vector relative to the flower plus attack/defend bits.
    Input { x: f32, y: f32, flags: u8 },
    /// Trash the petal in a loadout or inventory slot.
    PetalDelete { slot: usize },
    /// Exchange two loadout or inventory slots.
    PetalSwap { a: usize, b: usize },
}

/// Validate `cmd` and apply it on behalf of `camera_id`.
///
/// Commands for a camera without a live player (other than `Spawn`) are
/// accepted and ignored.
pub fn apply_command(
    sim: &mut Simulation,
    camera_id: EntityId,
    cmd: &ClientCommand,
) -> Result<(), CommandError> {
    if !sim.ent_exists(camera_id) || !sim.has_component(camera_id, Component::Camera) {
        return Err(CommandError::UnknownCamera { camera: camera_id });
    }
    let player_id = sim.get(camera_id).map_or(EntityId::NULL, |c| c.player);
    let alive = sim.ent_alive(player_id);

    match cmd {
        ClientCommand::Spawn { name } => {
            let len = name.chars().count();
            if len > MAX_NAME_LENGTH {
                return Err(CommandError::NameTooLong {
                    len,
                    max: MAX_NAME_LENGTH,
                });
            }
            if !alive {
                spawn(sim, camera_id, name);
            }
            Ok(())
        }
        ClientCommand::Input { x, y, flags } => {
            if alive {
                set_input(sim, player_id, *x, *y, InputFlags(*flags))?;
            }
            Ok(())
        }
        ClientCommand::PetalDelete { slot } => {
            if alive {
                delete_petal(sim, player_id, *slot)?;
            }
            Ok(())
        }
        ClientCommand::PetalSwap { a, b } => {
            if alive {
                swap_petals(sim, player_id, *a, *b)?;
            }
            Ok(())
        }
    }
}

fn spawn(sim: &mut Simulation, camera_id: EntityId, name: &str) {
    let team = sim.get(camera_id).map(|c| c.team).unwrap_or_default();
    if let Some(camera) = sim.get_mut(camera_id) {
        camera.name = name.to_owned();
    }
    let spawned = alloc_player(sim, team).and_then(|player| player_spawn(sim, camera_id, player));
    if let Err(err) = spawned {
        tracing::warn!(camera = %camera_id, error = %err, "spawn request dropped");
    }
}

/// Map a raw input vector onto flower acceleration.
///
/// Past [`FULL_INPUT_MAGNITUDE`] the flower accelerates at full strength;
/// below it the response is linear.
pub fn input_acceleration(x: f32, y: f32) -> Result<Vec2, CommandError> {
    if x == 0.0 && y == 0.0 {
        return Ok(Vec2::ZERO);
    }
    if !(x.abs() <= MAX_INPUT_COMPONENT && y.abs() <= MAX_INPUT_COMPONENT) {
        return Err(CommandError::InputOutOfBounds { x, y });
    }
    let raw = Vec2::new(x, y);
    let magnitude = raw.length();
    let scale = if magnitude > FULL_INPUT_MAGNITUDE {
        PLAYER_ACCELERATION
    } else {
        magnitude / FULL_INPUT_MAGNITUDE * PLAYER_ACCELERATION
    };
    Ok(raw / magnitude * scale)
}

fn set_input(
    sim: &mut Simulation,
    player_id: EntityId,
    x: f32,
    y: f32,
    flags: InputFlags,
) -> Result<(), CommandError> {
    let acceleration = input_acceleration(x, y)?;
    if let Some(player) = sim.get_mut(player_id) {
        player.acceleration = acceleration;
        player.input = flags;
    }
    Ok(())
}

fn check_slot(sim: &Simulation, player_id: EntityId, slot: usize) -> Result<(), CommandError> {
    let limit = sim.get(player_id).map_or(0, |p| p.addressable_slots());
    if slot >= limit {
        return Err(CommandError::SlotOutOfRange { slot, limit });
    }
    Ok(())
}

fn delete_petal(sim: &mut Simulation, player_id: EntityId, slot: usize) -> Result<(), CommandError> {
    check_slot(sim, player_id, slot)?;
    let Some(player) = sim.get_mut(player_id) else {
        return Ok(());
    };
    let old_id = std::mem::replace(&mut player.loadout_ids[slot], PetalId::None);
    let evicted = match old_id {
        PetalId::None => None,
        PetalId::Basic => Some(PetalId::Basic),
        _ => {
            player.score += old_id.data().rarity.trash_xp();
            player.deleted_petals.push(old_id)
        }
    };
    if let Some(released) = evicted {
        sim.tracker_mut().remove(released);
    }
    Ok(())
}

fn swap_petals(
    sim: &mut Simulation,
    player_id: EntityId,
    a: usize,
    b: usize,
) -> Result<(), CommandError> {
    check_slot(sim, player_id, a)?;
    check_slot(sim, player_id, b)?;
    if let Some(player) = sim.get_mut(player_id) {
        player.loadout_ids.swap(a, b);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
