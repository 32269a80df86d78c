//! Actor model shared by the player, drones, and the Overlord.

use std::collections::{BTreeSet, VecDeque};

use atron_mining_core::{
    AtronId, AtronKind, Context, Coordinate, Counter, Direction, DroneState, Icon,
};

use crate::{WorldError, WorldResult};

/// An actor with health, an optional mineral payload, and a sensed context.
///
/// The atron is deployed exactly when it holds a context. Only the world
/// assigns contexts, so deployment state follows map occupancy.
#[derive(Clone, Debug)]
pub struct Atron {
    id: AtronId,
    kind: AtronKind,
    health: Counter,
    payload: Counter,
    moves: u32,
    context: Option<Context>,
    pilot: Pilot,
}

impl Atron {
    /// Creates an atron with the default statistics for its kind.
    pub fn new(id: AtronId, kind: AtronKind) -> WorldResult<Self> {
        Self::with_stats(
            id,
            kind,
            kind.default_health(),
            kind.default_capacity(),
            kind.default_moves(),
        )
    }

    /// Creates an atron with explicit health, payload capacity, and moves per tick.
    pub fn with_stats(
        id: AtronId,
        kind: AtronKind,
        health: i64,
        capacity: i64,
        moves: u32,
    ) -> WorldResult<Self> {
        if health <= 0 {
            return Err(WorldError::InvalidConfiguration(format!(
                "atron health must be at least 1, got {health}"
            )));
        }

        Ok(Self {
            id,
            kind,
            health: Counter::new(health, health)?,
            payload: Counter::new(0, capacity)?,
            moves,
            context: None,
            pilot: Pilot::for_kind(kind),
        })
    }

    /// Identifier of the atron.
    #[must_use]
    pub const fn id(&self) -> AtronId {
        self.id
    }

    /// Variant of the atron.
    #[must_use]
    pub const fn kind(&self) -> AtronKind {
        self.kind
    }

    /// Icon drawn on the occupied tile.
    #[must_use]
    pub const fn icon(&self) -> Icon {
        self.kind.icon()
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> &Counter {
        &self.health
    }

    /// Minerals carried.
    #[must_use]
    pub const fn payload(&self) -> &Counter {
        &self.payload
    }

    /// Moves allotted per tick.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    /// Surroundings sensed at the last deploy or move.
    #[must_use]
    pub const fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Current cell, when deployed.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.context.map(|context| context.coord())
    }

    /// Whether the atron is on the map.
    #[must_use]
    pub const fn is_deployed(&self) -> bool {
        self.context.is_some()
    }

    /// Whether the atron has run out of health.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.health.is_depleted()
    }

    /// Task state for drones; `None` for the player and the Overlord.
    #[must_use]
    pub fn state(&self) -> Option<DroneState> {
        match &self.pilot {
            Pilot::Miner(miner) => Some(miner.state),
            Pilot::Scout(scout) => Some(scout.state),
            Pilot::Manual(_) | Pilot::Dispatcher => None,
        }
    }

    /// Path assigned to a miner, from the landing zone to its deposit.
    #[must_use]
    pub fn path(&self) -> &[Coordinate] {
        match &self.pilot {
            Pilot::Miner(miner) => &miner.path,
            _ => &[],
        }
    }

    /// Deposit a miner is currently tasked with.
    #[must_use]
    pub fn target(&self) -> Option<Coordinate> {
        match &self.pilot {
            Pilot::Miner(miner) => miner.target,
            _ => None,
        }
    }

    /// Whether the drone still has work to do before it can be picked up.
    #[must_use]
    pub fn has_task(&self) -> bool {
        match &self.pilot {
            Pilot::Miner(miner) => miner.target.is_some() || miner.state != DroneState::Waiting,
            Pilot::Scout(scout) => scout.state != DroneState::Waiting,
            Pilot::Manual(_) | Pilot::Dispatcher => false,
        }
    }

    /// Assigns a path to a miner.
    ///
    /// The miner travels when the path holds more than its start and
    /// destination; otherwise it waits beside the destination. Returns `false`
    /// for atrons that do not follow paths.
    pub fn assign_path(&mut self, path: Vec<Coordinate>) -> bool {
        match &mut self.pilot {
            Pilot::Miner(miner) => {
                miner.assign(path);
                true
            }
            _ => false,
        }
    }

    /// Queues a direction for a manually piloted atron to take on its next move.
    ///
    /// Returns `false` for atrons that are not manually piloted.
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        match &mut self.pilot {
            Pilot::Manual(manual) => {
                manual.queued = Some(direction);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn health_mut(&mut self) -> &mut Counter {
        &mut self.health
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Counter {
        &mut self.payload
    }

    pub(crate) fn deploy(&mut self, context: Context) -> WorldResult<()> {
        if self.is_destroyed() {
            return Err(WorldError::Destroyed(self.id));
        }
        if self.context.is_some() {
            return Err(WorldError::AlreadyDeployed(self.id));
        }

        match &mut self.pilot {
            Pilot::Scout(scout) => scout.restart(),
            Pilot::Manual(manual) => manual.queued = None,
            Pilot::Miner(_) | Pilot::Dispatcher => {}
        }
        self.context = Some(context);
        Ok(())
    }

    pub(crate) fn relocate(&mut self, context: Context) {
        self.context = Some(context);
    }

    /// Leaves the map, returning the payload and emptying the hold.
    pub(crate) fn undeploy(&mut self) -> WorldResult<i64> {
        if self.context.take().is_none() {
            return Err(WorldError::NotDeployed(self.id));
        }
        if let Pilot::Manual(manual) = &mut self.pilot {
            manual.queued = None;
        }

        let payload = self.payload.get();
        self.payload.reset();
        Ok(payload)
    }

    /// Asks the pilot for the next move given the current context.
    pub(crate) fn next_direction(&mut self) -> Direction {
        let Some(context) = self.context else {
            return Direction::Center;
        };

        match &mut self.pilot {
            Pilot::Manual(manual) => manual.queued.take().unwrap_or(Direction::Center),
            Pilot::Miner(miner) => miner.decide(&context, &self.payload),
            Pilot::Scout(scout) => scout.decide(&context),
            Pilot::Dispatcher => Direction::Center,
        }
    }
}

/// Behaviour that chooses an atron's moves.
#[derive(Clone, Debug)]
enum Pilot {
    Manual(ManualPilot),
    Miner(MinerPilot),
    Scout(ScoutPilot),
    Dispatcher,
}

impl Pilot {
    fn for_kind(kind: AtronKind) -> Self {
        match kind {
            AtronKind::Player => Self::Manual(ManualPilot::default()),
            AtronKind::Miner => Self::Miner(MinerPilot::default()),
            AtronKind::Scout => Self::Scout(ScoutPilot::default()),
            AtronKind::Overlord => Self::Dispatcher,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct ManualPilot {
    queued: Option<Direction>,
}

#[derive(Clone, Debug)]
struct MinerPilot {
    path: Vec<Coordinate>,
    route: VecDeque<Coordinate>,
    target: Option<Coordinate>,
    state: DroneState,
}

impl Default for MinerPilot {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            route: VecDeque::new(),
            target: None,
            state: DroneState::Waiting,
        }
    }
}

impl MinerPilot {
    fn assign(&mut self, path: Vec<Coordinate>) {
        self.state = if path.len() > 2 {
            DroneState::Traveling
        } else {
            DroneState::Waiting
        };
        self.target = if path.len() >= 2 { path.last().copied() } else { None };
        self.route = match path.len() {
            0..=2 => VecDeque::new(),
            len => path[1..len - 1].iter().copied().collect(),
        };
        self.path = path;
    }

    fn start_reversing(&mut self) {
        self.target = None;
        self.state = DroneState::Reversing;
        let len = self.path.len();
        self.route = if len > 2 {
            self.path[..len - 2].iter().rev().copied().collect()
        } else {
            VecDeque::new()
        };
    }

    /// Drives the travel, work, return cycle. Each state either yields a
    /// direction or hands over to the next state within the same decision.
    fn decide(&mut self, context: &Context, payload: &Counter) -> Direction {
        let here = context.coord();
        for _ in 0..4 {
            match self.state {
                DroneState::Traveling | DroneState::Reversing => {
                    if self.route.front() == Some(&here) {
                        let _ = self.route.pop_front();
                    }
                    match self.route.front() {
                        Some(next) => {
                            return here
                                .direction_to(*next)
                                .filter(|_| here.is_adjacent(*next))
                                .unwrap_or(Direction::Center);
                        }
                        None if self.state == DroneState::Traveling => {
                            self.state = DroneState::Working;
                        }
                        None => {
                            self.state = DroneState::Waiting;
                            return Direction::Center;
                        }
                    }
                }
                DroneState::Working => {
                    let Some(target) = self.target else {
                        self.start_reversing();
                        continue;
                    };
                    if payload.is_full() || !here.is_adjacent(target) {
                        self.start_reversing();
                        continue;
                    }
                    let Some(direction) = here.direction_to(target) else {
                        self.start_reversing();
                        continue;
                    };
                    if context.neighbor(direction) == Some(Icon::Mineral) {
                        return direction;
                    }
                    self.start_reversing();
                }
                DroneState::Waiting => match self.target {
                    Some(target) if here.is_adjacent(target) && !payload.is_full() => {
                        self.state = DroneState::Working;
                    }
                    _ => return Direction::Center,
                },
            }
        }

        Direction::Center
    }
}

/// Depth-first explorer that only walks open ground.
#[derive(Clone, Debug)]
struct ScoutPilot {
    trail: Vec<Coordinate>,
    visited: BTreeSet<Coordinate>,
    state: DroneState,
}

impl Default for ScoutPilot {
    fn default() -> Self {
        Self {
            trail: Vec::new(),
            visited: BTreeSet::new(),
            state: DroneState::Traveling,
        }
    }
}

impl ScoutPilot {
    fn restart(&mut self) {
        self.trail.clear();
        self.visited.clear();
        self.state = DroneState::Traveling;
    }

    fn decide(&mut self, context: &Context) -> Direction {
        let here = context.coord();
        match self.trail.iter().position(|cell| *cell == here) {
            Some(index) => self.trail.truncate(index + 1),
            None => self.trail.push(here),
        }
        let _ = self.visited.insert(here);

        let frontier = context.neighbors().into_iter().find(|(direction, icon)| {
            *icon == Icon::Empty && !self.visited.contains(&here.translate_one(*direction))
        });
        if let Some((direction, _)) = frontier {
            self.state = DroneState::Traveling;
            return direction;
        }

        let len = self.trail.len();
        if len >= 2 {
            self.state = DroneState::Reversing;
            return here
                .direction_to(self.trail[len - 2])
                .unwrap_or(Direction::Center);
        }

        self.state = DroneState::Waiting;
        Direction::Center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_at(coord: Coordinate, neighbors: [Icon; 4]) -> Context {
        Context::new(coord, neighbors)
    }

    fn miner() -> Atron {
        Atron::new(AtronId::new(1), AtronKind::Miner).expect("default stats")
    }

    #[test]
    fn zero_health_is_rejected() {
        assert!(matches!(
            Atron::with_stats(AtronId::new(1), AtronKind::Scout, 0, 10, 1),
            Err(WorldError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn deployment_follows_context() {
        let mut atron = miner();
        assert!(!atron.is_deployed());
        atron
            .deploy(context_at(Coordinate::new(1, 1), [Icon::Empty; 4]))
            .expect("first deploy");
        assert!(atron.is_deployed());
        assert!(matches!(
            atron.deploy(context_at(Coordinate::new(1, 1), [Icon::Empty; 4])),
            Err(WorldError::AlreadyDeployed(_))
        ));
        assert_eq!(atron.undeploy().expect("deployed"), 0);
        assert!(!atron.is_deployed());
        assert!(matches!(atron.undeploy(), Err(WorldError::NotDeployed(_))));
    }

    #[test]
    fn undeploy_empties_payload() {
        let mut atron = miner();
        atron
            .deploy(context_at(Coordinate::new(1, 1), [Icon::Empty; 4]))
            .expect("deploy");
        atron.payload_mut().count(4);
        assert_eq!(atron.undeploy().expect("deployed"), 4);
        assert_eq!(atron.payload().get(), 0);
    }

    #[test]
    fn path_length_selects_initial_state() {
        let mut atron = miner();
        assert!(atron.assign_path(vec![
            Coordinate::new(1, 1),
            Coordinate::new(2, 1),
            Coordinate::new(3, 1),
        ]));
        assert_eq!(atron.state(), Some(DroneState::Traveling));

        assert!(atron.assign_path(vec![Coordinate::new(1, 1), Coordinate::new(2, 1)]));
        assert_eq!(atron.state(), Some(DroneState::Waiting));
        assert_eq!(atron.target(), Some(Coordinate::new(2, 1)));
    }

    #[test]
    fn only_miners_take_paths_and_only_players_take_input() {
        let mut scout = Atron::new(AtronId::new(2), AtronKind::Scout).expect("default stats");
        assert!(!scout.assign_path(vec![Coordinate::new(1, 1)]));
        assert!(!scout.queue_direction(Direction::North));

        let mut player = Atron::new(AtronId::new(3), AtronKind::Player).expect("default stats");
        assert!(player.queue_direction(Direction::East));
    }

    #[test]
    fn miner_travels_mines_and_returns() {
        let lz = Coordinate::new(1, 1);
        let step = Coordinate::new(2, 1);
        let deposit = Coordinate::new(3, 1);
        let mut pilot = MinerPilot::default();
        let mut payload = Counter::new(0, 2).expect("valid bounds");
        pilot.assign(vec![lz, step, deposit]);

        let at_lz = context_at(lz, [Icon::Wall, Icon::Empty, Icon::Empty, Icon::Wall]);
        assert_eq!(pilot.decide(&at_lz, &payload), Direction::East);

        let beside = context_at(step, [Icon::Wall, Icon::Empty, Icon::Mineral, Icon::DeployZone]);
        assert_eq!(pilot.decide(&beside, &payload), Direction::East);
        assert_eq!(pilot.state, DroneState::Working);

        payload.count(2);
        assert_eq!(pilot.decide(&beside, &payload), Direction::West);
        assert_eq!(pilot.state, DroneState::Reversing);

        let home = context_at(lz, [Icon::Wall, Icon::Empty, Icon::Miner, Icon::Wall]);
        assert_eq!(pilot.decide(&home, &payload), Direction::Center);
        assert_eq!(pilot.state, DroneState::Waiting);
        assert_eq!(pilot.target, None);
    }

    #[test]
    fn waiting_miner_beside_deposit_starts_working() {
        let lz = Coordinate::new(1, 1);
        let deposit = Coordinate::new(1, 2);
        let mut pilot = MinerPilot::default();
        let payload = Counter::new(0, 10).expect("valid bounds");
        pilot.assign(vec![lz, deposit]);
        assert_eq!(pilot.state, DroneState::Waiting);

        let at_lz = context_at(lz, [Icon::Wall, Icon::Mineral, Icon::Empty, Icon::Wall]);
        assert_eq!(pilot.decide(&at_lz, &payload), Direction::South);

        let exhausted = context_at(lz, [Icon::Wall, Icon::Empty, Icon::Empty, Icon::Wall]);
        assert_eq!(pilot.decide(&exhausted, &payload), Direction::Center);
        assert_eq!(pilot.state, DroneState::Waiting);
    }

    #[test]
    fn scout_explores_then_backtracks_home() {
        let mut pilot = ScoutPilot::default();
        let start = Coordinate::new(1, 1);
        let east = Coordinate::new(2, 1);

        let at_start = context_at(start, [Icon::Wall, Icon::Wall, Icon::Empty, Icon::Wall]);
        assert_eq!(pilot.decide(&at_start), Direction::East);

        let dead_end = context_at(east, [Icon::Wall, Icon::Acid, Icon::Wall, Icon::DeployZone]);
        assert_eq!(pilot.decide(&dead_end), Direction::West);
        assert_eq!(pilot.state, DroneState::Reversing);

        let back = context_at(start, [Icon::Wall, Icon::Wall, Icon::Empty, Icon::Wall]);
        assert_eq!(pilot.decide(&back), Direction::Center);
        assert_eq!(pilot.state, DroneState::Waiting);
    }
}
