#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Overlord dispatch system that deploys, tasks, and recalls drones.
//!
//! The Overlord owns the drone roster and a ledger of known mineral
//! deposits. Each tick it reacts to the world's events, then issues at most
//! one [`Command`]: recall an idle drone from the landing zone, send a miner
//! towards an untasked deposit, send a scout out, or do nothing.

use std::collections::{BTreeMap, BTreeSet};

use atron_mining_core::{AtronId, AtronKind, Command, Coordinate, Event};
use atron_mining_world::{query, Atron, MapData, Pathfinder, WorldResult};
use tracing::debug;

/// Roster sizes and exploration limits for the Overlord.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Number of scouts in the roster.
    pub scouts: u32,
    /// Number of miners in the roster.
    pub miners: u32,
    /// How many times scouts may be sent out over a run.
    pub scout_sorties: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            scouts: 2,
            miners: 4,
            scout_sorties: 2,
        }
    }
}

/// Dispatcher that plans over the revealed part of the map.
#[derive(Debug)]
pub struct Overlord {
    body: Atron,
    config: DispatchConfig,
    drones: BTreeMap<AtronId, Atron>,
    untasked: BTreeSet<Coordinate>,
    tasked: BTreeMap<Coordinate, AtronId>,
    unreachable: BTreeSet<Coordinate>,
    surveyed_hidden: Option<usize>,
    sorties: u32,
}

impl Overlord {
    /// Creates an Overlord identified by `id` with drones numbered after it,
    /// scouts first.
    pub fn new(id: AtronId, config: DispatchConfig) -> WorldResult<Self> {
        let body = Atron::new(id, AtronKind::Overlord)?;
        let mut drones = BTreeMap::new();
        let kinds = std::iter::repeat(AtronKind::Scout)
            .take(config.scouts as usize)
            .chain(std::iter::repeat(AtronKind::Miner).take(config.miners as usize));
        for (offset, kind) in (1..).zip(kinds) {
            let drone_id = AtronId::new(id.get().saturating_add(offset));
            let _ = drones.insert(drone_id, Atron::new(drone_id, kind)?);
        }

        Ok(Self {
            body,
            config,
            drones,
            untasked: BTreeSet::new(),
            tasked: BTreeMap::new(),
            unreachable: BTreeSet::new(),
            surveyed_hidden: None,
            sorties: 0,
        })
    }

    /// The Overlord's own actor record.
    #[must_use]
    pub const fn body(&self) -> &Atron {
        &self.body
    }

    /// Configuration the roster was built from.
    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Every drone in the roster, ordered by identifier.
    pub fn drones(&self) -> impl Iterator<Item = &Atron> {
        self.drones.values()
    }

    /// Looks up a drone.
    #[must_use]
    pub fn drone(&self, id: AtronId) -> Option<&Atron> {
        self.drones.get(&id)
    }

    /// Looks up a drone for mutation.
    pub fn drone_mut(&mut self, id: AtronId) -> Option<&mut Atron> {
        self.drones.get_mut(&id)
    }

    /// Drones currently on the map, ordered by identifier.
    pub fn deployed_drones_mut(&mut self) -> impl Iterator<Item = &mut Atron> {
        self.drones.values_mut().filter(|drone| drone.is_deployed())
    }

    /// Known deposits waiting for a miner.
    #[must_use]
    pub const fn untasked(&self) -> &BTreeSet<Coordinate> {
        &self.untasked
    }

    /// Deposits assigned to a miner.
    #[must_use]
    pub const fn tasked(&self) -> &BTreeMap<Coordinate, AtronId> {
        &self.tasked
    }

    /// Deposits with no route across the revealed map.
    #[must_use]
    pub const fn unreachable(&self) -> &BTreeSet<Coordinate> {
        &self.unreachable
    }

    /// Scout deployments so far.
    #[must_use]
    pub const fn sorties(&self) -> u32 {
        self.sorties
    }

    /// Folds the previous tick's events into the ledgers and issues the next
    /// command.
    pub fn handle(&mut self, events: &[Event], map: &MapData) -> Command {
        self.observe(events);
        self.order(map)
    }

    /// Updates the deposit ledgers from world events.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::AtronDeployed { atron, .. } => {
                    if self.kind_of(*atron) == Some(AtronKind::Scout) {
                        self.sorties = self.sorties.saturating_add(1);
                    }
                }
                Event::AtronDestroyed { atron, .. } | Event::AtronExtracted { atron, .. } => {
                    self.release_deposit(*atron);
                }
                Event::DepositExhausted { at } => {
                    let _ = self.tasked.remove(at);
                    let _ = self.untasked.remove(at);
                    let _ = self.unreachable.remove(at);
                }
                _ => {}
            }
        }
    }

    /// Chooses this tick's command.
    pub fn order(&mut self, map: &MapData) -> Command {
        self.survey(map);

        if let Some(atron) = self.idle_at_landing_zone(map) {
            debug!(%atron, "recalling idle drone");
            return Command::Return { atron };
        }

        if !map.is_landing_zone_free() {
            return Command::Idle;
        }

        if let Some(atron) = self.task_miner(map) {
            return Command::Deploy { atron };
        }

        if let Some(atron) = self.next_scout() {
            debug!(%atron, sortie = self.sorties + 1, "sending scout");
            return Command::Deploy { atron };
        }

        Command::Idle
    }

    fn kind_of(&self, id: AtronId) -> Option<AtronKind> {
        self.drones.get(&id).map(Atron::kind)
    }

    fn release_deposit(&mut self, atron: AtronId) {
        let released: Vec<Coordinate> = self
            .tasked
            .iter()
            .filter(|(_, miner)| **miner == atron)
            .map(|(deposit, _)| *deposit)
            .collect();
        for deposit in released {
            let _ = self.tasked.remove(&deposit);
            let _ = self.untasked.insert(deposit);
            debug!(%atron, %deposit, "deposit released");
        }
    }

    /// Tracks newly revealed deposits and forgets ones that vanished.
    fn survey(&mut self, map: &MapData) {
        let hidden = map.undiscovered_count();
        if self.surveyed_hidden != Some(hidden) {
            self.surveyed_hidden = Some(hidden);
            self.untasked.append(&mut self.unreachable);
        }

        for deposit in query::discovered_minerals(map) {
            if !self.tasked.contains_key(&deposit) && !self.unreachable.contains(&deposit) {
                let _ = self.untasked.insert(deposit);
            }
        }

        let ledger = map.minerals();
        self.untasked.retain(|deposit| ledger.contains_key(deposit));
        self.tasked.retain(|deposit, _| ledger.contains_key(deposit));
    }

    fn idle_at_landing_zone(&self, map: &MapData) -> Option<AtronId> {
        let landing_zone = map.landing_zone();
        self.drones
            .values()
            .find(|drone| drone.coordinate() == Some(landing_zone) && !drone.has_task())
            .map(Atron::id)
    }

    fn task_miner(&mut self, map: &MapData) -> Option<AtronId> {
        let miner = self
            .drones
            .values()
            .find(|drone| {
                drone.kind() == AtronKind::Miner && !drone.is_deployed() && !drone.is_destroyed()
            })
            .map(Atron::id)?;

        let pathfinder = Pathfinder::surveyed(map);
        while let Some(deposit) = self.untasked.pop_first() {
            let path = pathfinder.shortest_path(map.landing_zone(), deposit);
            if path.is_empty() {
                debug!(%deposit, "no route to deposit");
                let _ = self.unreachable.insert(deposit);
                continue;
            }

            let drone = self.drones.get_mut(&miner)?;
            let _ = drone.assign_path(path);
            let _ = self.tasked.insert(deposit, miner);
            debug!(atron = %miner, %deposit, "miner tasked");
            return Some(miner);
        }

        None
    }

    fn next_scout(&self) -> Option<AtronId> {
        if self.sorties >= self.config.scout_sorties {
            return None;
        }
        let mut scouts = self
            .drones
            .values()
            .filter(|drone| drone.kind() == AtronKind::Scout);
        if scouts.clone().any(Atron::is_deployed) {
            return None;
        }
        scouts
            .find(|drone| !drone.is_destroyed())
            .map(Atron::id)
    }
}
