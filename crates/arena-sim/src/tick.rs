//! Fixed-rate tick driver.
//!
//! The [`TickLoop`] owns the [`Simulation`] and advances it one tick at a
//! time. Each tick:
//!
//! 1. Per-tick flags (`damaged`, `revived`) are cleared.
//! 2. All registered systems run in registration order, each with full
//!    mutable access to the simulation.
//! 3. Queued client commands are applied in arrival order.
//! 4. Entities marked for deletion are reclaimed and their ids invalidated.
//! 5. The tick counter advances.
//!
//! Mutations inside a tick are visible to everything that runs after them in
//! the same tick. Randomness comes only from the simulation's seeded RNG, so
//! the same seed, systems and commands always produce the same state.
//!
//! # Example
//!
//! ```
//! use arena_sim::prelude::*;
//!
//! let config = SimConfig { mob_spawning: false, ..Default::default() };
//! let mut tick_loop = TickLoop::new(Simulation::new(config).unwrap());
//! tick_loop.add_system("noop", |_sim| {});
//!
//! tick_loop.run_ticks(20);
//! assert_eq!(tick_loop.tick_count(), 20);
//! assert!((tick_loop.sim_time() - 1.0).abs() < 1e-9);
//! ```

use std::time::{Duration, Instant};

use arena_ecs::entity::EntityId;

use crate::client::{apply_command, ClientCommand};
use crate::collision::collision_system;
use crate::config::SimConfig;
use crate::flower::flower_system;
use crate::mob::mob_system;
use crate::motion::{motion_system, spatial_system};
use crate::petal::petal_system;
use crate::sim::Simulation;
use crate::spawn::zone_spawn_system;
use crate::status::status_system;
use crate::CommandError;

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Timing of the tick loop, derived from the simulation rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickConfig {
    /// Fixed time step in seconds per tick.
    pub fixed_dt: f64,
}

impl TickConfig {
    pub fn from_sim(config: &SimConfig) -> Self {
        Self {
            fixed_dt: config.fixed_dt(),
        }
    }
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per system (in order of execution).
    pub system_times: Vec<(String, Duration)>,
    /// Total time for the tick (systems + commands + reclamation).
    pub total_time: Duration,
    /// Time spent applying client commands.
    pub command_apply_time: Duration,
    /// Entities reclaimed at the end of the tick.
    pub reclaimed: usize,
}

// ---------------------------------------------------------------------------
// SystemFn
// ---------------------------------------------------------------------------

/// A system run once per tick with full access to the simulation.
pub type SystemFn = fn(&mut Simulation);

#[derive(Debug)]
struct RegisteredSystem {
    name: String,
    func: SystemFn,
}

/// A command that failed validation, reported back so the network layer can
/// decide whether to drop the sender.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub camera: EntityId,
    pub error: CommandError,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// The fixed-rate tick loop.
#[derive(Debug)]
pub struct TickLoop {
    sim: Simulation,
    systems: Vec<RegisteredSystem>,
    commands: Vec<(EntityId, ClientCommand)>,
    tick_counter: u64,
    config: TickConfig,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// A tick loop running the full arena pipeline: `motion`, `spatial`,
    /// `collision`, `flower`, `petal`, `mob`, `status`, `zone_spawn`.
    pub fn new(sim: Simulation) -> Self {
        let mut tick_loop = Self::bare(sim);
        tick_loop.add_system("motion", motion_system);
        tick_loop.add_system("spatial", spatial_system);
        tick_loop.add_system("collision", collision_system);
        tick_loop.add_system("flower", flower_system);
        tick_loop.add_system("petal", petal_system);
        tick_loop.add_system("mob", mob_system);
        tick_loop.add_system("status", status_system);
        tick_loop.add_system("zone_spawn", zone_spawn_system);
        tick_loop
    }

    /// A tick loop with no systems. Commands and reclamation still run.
    pub fn bare(sim: Simulation) -> Self {
        let config = TickConfig::from_sim(sim.config());
        Self {
            sim,
            systems: Vec::new(),
            commands: Vec::new(),
            tick_counter: 0,
            config,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// Append a system to the pipeline.
    ///
    /// # Panics
    ///
    /// Panics if a system with the same name is already registered.
    pub fn add_system(&mut self, name: &str, func: SystemFn) {
        assert!(
            !self.systems.iter().any(|s| s.name == name),
            "duplicate system name: {name:?}"
        );
        self.systems.push(RegisteredSystem {
            name: name.to_owned(),
            func,
        });
    }

    /// Buffer a client command for the next tick.
    pub fn queue_command(&mut self, camera: EntityId, cmd: ClientCommand) {
        self.commands.push((camera, cmd));
    }

    /// Number of commands waiting for the next tick.
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Execute one tick and return the commands rejected during it.
    pub fn tick(&mut self) -> Vec<Rejection> {
        let tick_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());

        self.sim.begin_tick();

        for system in &self.systems {
            let sys_start = Instant::now();
            (system.func)(&mut self.sim);
            system_times.push((system.name.clone(), sys_start.elapsed()));
        }

        let apply_start = Instant::now();
        let mut rejections = Vec::new();
        for (camera, cmd) in std::mem::take(&mut self.commands) {
            if let Err(error) = apply_command(&mut self.sim, camera, &cmd) {
                tracing::warn!(
                    camera = %camera,
                    %error,
                    disconnect = error.should_disconnect(),
                    "client command rejected"
                );
                rejections.push(Rejection { camera, error });
            }
        }
        let command_apply_time = apply_start.elapsed();

        let reclaimed = self.sim.reclaim().len();
        self.tick_counter += 1;

        self.last_diagnostics = TickDiagnostics {
            system_times,
            total_time: tick_start.elapsed(),
            command_apply_time,
            reclaimed,
        };
        tracing::trace!(
            tick = self.tick_counter,
            entities = self.sim.entity_count(),
            "tick complete"
        );

        rejections
    }

    /// Run `count` ticks and return every rejection, in order.
    pub fn run_ticks(&mut self, count: u64) -> Vec<Rejection> {
        let mut rejections = Vec::new();
        for _ in 0..count {
            rejections.extend(self.tick());
        }
        rejections
    }

    /// BLAKE3 digest of the tick counter plus every entity view.
    pub fn state_hash(&self) -> String {
        #[derive(serde::Serialize)]
        struct HashableState<'a> {
            tick_counter: u64,
            entities: &'a [crate::snapshot::EntityView],
        }

        let entities = self.sim.snapshot();
        let hashable = HashableState {
            tick_counter: self.tick_counter,
            entities: &entities,
        };
        let json_bytes = serde_json::to_vec(&hashable)
            .expect("tick state should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }

    // -- accessors ----------------------------------------------------------

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time in seconds, as `tick_count * fixed_dt`.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.config.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.fixed_dt
    }

    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    /// Mutable access to the simulation, for setup and tests.
    pub fn sim_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// The names of all registered systems, in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name.as_str()).collect()
    }

    /// Diagnostics from the last tick (timing per system).
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
