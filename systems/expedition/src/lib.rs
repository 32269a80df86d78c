#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn driver that runs one mining expedition tick by tick.
//!
//! An [`Expedition`] owns the map, the player, and the Overlord with its
//! drones. Presentation layers call [`Expedition::advance`] or
//! [`Expedition::submit_input`] once per tick and redraw from the map and the
//! two display counters.

use std::{iter, mem};

use atron_mining_core::{AtronId, AtronKind, Command, Counter, Direction, Event};
use atron_mining_system_dispatch::{DispatchConfig, Overlord};
use atron_mining_world::{Atron, MapData, WorldResult};
use tracing::{debug, warn};

/// Identifier of the player.
pub const PLAYER_ID: AtronId = AtronId::new(1);
/// Identifier of the Overlord; drones are numbered after it.
pub const OVERLORD_ID: AtronId = AtronId::new(2);

/// Budget and goals for one expedition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpeditionConfig {
    /// Ticks available before the expedition ends.
    pub tick_budget: u32,
    /// Refined minerals that complete the expedition early.
    pub refined_quota: u32,
    /// Overlord roster settings.
    pub dispatch: DispatchConfig,
}

impl Default for ExpeditionConfig {
    fn default() -> Self {
        Self {
            tick_budget: 200,
            refined_quota: 100,
            dispatch: DispatchConfig::default(),
        }
    }
}

/// Outcome of a single tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// One-based index of the tick that was resolved.
    pub tick: u64,
    /// Command the Overlord issued.
    pub command: Command,
    /// Effects resolved during the tick.
    pub events: Vec<Event>,
}

/// A running expedition.
#[derive(Debug)]
pub struct Expedition {
    map: MapData,
    player: Atron,
    overlord: Overlord,
    ticks: Counter,
    refined: Counter,
    tick: u64,
    pending: Vec<Event>,
}

impl Expedition {
    /// Prepares an expedition on `map`. Nobody is deployed yet.
    pub fn new(map: MapData, config: ExpeditionConfig) -> WorldResult<Self> {
        Ok(Self {
            map,
            player: Atron::new(PLAYER_ID, AtronKind::Player)?,
            overlord: Overlord::new(OVERLORD_ID, config.dispatch)?,
            ticks: Counter::new(i64::from(config.tick_budget), i64::from(config.tick_budget))?,
            refined: Counter::new(0, i64::from(config.refined_quota))?,
            tick: 0,
            pending: Vec::new(),
        })
    }

    /// Lands the player on the landing zone.
    pub fn start(&mut self) -> WorldResult<Vec<Event>> {
        let mut events = Vec::new();
        self.map.deploy_atron(&mut self.player, &mut events)?;
        self.pending.extend(events.iter().cloned());
        Ok(events)
    }

    /// The map being mined.
    #[must_use]
    pub const fn map(&self) -> &MapData {
        &self.map
    }

    /// The human-controlled atron.
    #[must_use]
    pub const fn player(&self) -> &Atron {
        &self.player
    }

    /// The dispatcher and its drones.
    #[must_use]
    pub const fn overlord(&self) -> &Overlord {
        &self.overlord
    }

    /// Ticks left in the budget.
    #[must_use]
    pub const fn ticks(&self) -> &Counter {
        &self.ticks
    }

    /// Minerals delivered to the landing zone so far.
    #[must_use]
    pub const fn refined(&self) -> &Counter {
        &self.refined
    }

    /// Number of ticks resolved so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether the budget ran out, the quota was met, or the player died.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.ticks.is_depleted() || self.refined.is_full() || self.player.is_destroyed()
    }

    /// Resolves one tick: the Overlord issues a command, the command is
    /// applied, and every deployed atron takes its moves.
    pub fn advance(&mut self) -> TickReport {
        if self.is_finished() {
            return TickReport {
                tick: self.tick,
                command: Command::Idle,
                events: Vec::new(),
            };
        }

        let observed = mem::take(&mut self.pending);
        let command = self.overlord.handle(&observed, &self.map);
        let mut events = Vec::new();
        self.apply(command, &mut events);

        let atrons = iter::once(&mut self.player).chain(self.overlord.deployed_drones_mut());
        self.map.tick(atrons, &mut events);

        self.ticks.count(-1);
        self.tick += 1;
        self.pending.extend(events.iter().cloned());
        TickReport {
            tick: self.tick,
            command,
            events,
        }
    }

    /// Queues a player move, then resolves the tick.
    pub fn submit_input(&mut self, direction: Direction) -> TickReport {
        let _ = self.player.queue_direction(direction);
        self.advance()
    }

    /// Like [`Expedition::submit_input`] for a textual direction; unknown
    /// tokens leave the player in place.
    pub fn submit_input_token(&mut self, token: &str) -> TickReport {
        let direction = token.parse::<Direction>().unwrap_or_else(|error| {
            warn!(token, %error, "ignoring player input");
            Direction::Center
        });
        self.submit_input(direction)
    }

    /// Applies a scripted `DEPLOY <id>` or `RETURN <id>` action outside the
    /// Overlord's own orders. Unrecognized actions do nothing.
    pub fn execute_action(&mut self, action: &str) -> Vec<Event> {
        let command = action.parse::<Command>().unwrap_or_else(|error| {
            warn!(action, %error, "ignoring action");
            Command::Idle
        });
        let mut events = Vec::new();
        self.apply(command, &mut events);
        self.pending.extend(events.iter().cloned());
        events
    }

    /// Banks the player's payload; only legal on the landing zone.
    pub fn extract_player(&mut self) -> WorldResult<i64> {
        let mut events = Vec::new();
        let payload = self.map.remove_drone(&mut self.player, &mut events)?;
        self.refined.count(payload);
        self.pending.extend(events);
        Ok(payload)
    }

    /// Pulls the player off the map wherever it stands. The payload is
    /// returned but not banked.
    pub fn withdraw_player(&mut self) -> WorldResult<i64> {
        let mut events = Vec::new();
        let payload = self.map.undeploy_atron(&mut self.player, &mut events)?;
        self.pending.extend(events);
        Ok(payload)
    }

    fn apply(&mut self, command: Command, events: &mut Vec<Event>) {
        match command {
            Command::Idle => {}
            Command::Deploy { atron } => {
                let Some(drone) = self.overlord.drone_mut(atron) else {
                    warn!(%atron, "deploy ordered for unknown drone");
                    return;
                };
                if let Err(error) = self.map.deploy_atron(drone, events) {
                    warn!(%atron, %error, "deploy failed");
                }
            }
            Command::Return { atron } => {
                let Some(drone) = self.overlord.drone_mut(atron) else {
                    warn!(%atron, "return ordered for unknown drone");
                    return;
                };
                match self.map.remove_drone(drone, events) {
                    Ok(payload) => {
                        self.refined.count(payload);
                        debug!(%atron, payload, refined = self.refined.get(), "payload banked");
                    }
                    Err(error) => warn!(%atron, %error, "extraction failed"),
                }
            }
        }
    }
}
