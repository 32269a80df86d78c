//! Weighted shortest-path search over the tile grid.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
};

use atron_mining_core::{Coordinate, Icon};

use crate::MapData;

/// Cost of stepping onto a tile showing `icon`, or `None` when the search
/// must never expand through it.
///
/// Tiles held by another atron cost the same as open ground since the
/// occupant is expected to move on.
#[must_use]
pub const fn terrain_weight(icon: Icon) -> Option<u32> {
    match icon {
        Icon::Empty | Icon::DeployZone => Some(1),
        Icon::Atron | Icon::Scout | Icon::Miner | Icon::Player => Some(1),
        Icon::Acid => Some(10),
        Icon::Wall | Icon::Mineral | Icon::Unknown => None,
    }
}

/// Dijkstra search over the four-connected grid of a [`MapData`].
///
/// The goal cell is always accepted as the final step regardless of its
/// icon, since routes usually end beside or onto a mineral deposit.
#[derive(Clone, Copy, Debug)]
pub struct Pathfinder<'map> {
    map: &'map MapData,
    surveyed_only: bool,
}

impl<'map> Pathfinder<'map> {
    /// Creates a pathfinder that sees every tile of the map.
    #[must_use]
    pub const fn new(map: &'map MapData) -> Self {
        Self {
            map,
            surveyed_only: false,
        }
    }

    /// Creates a pathfinder that treats undiscovered tiles as impassable.
    #[must_use]
    pub const fn surveyed(map: &'map MapData) -> Self {
        Self {
            map,
            surveyed_only: true,
        }
    }

    /// Cheapest route from `start` to `goal`, both included.
    ///
    /// Returns `[start]` when both coordinates match and an empty path when
    /// the goal cannot be reached or either end lies off the map.
    #[must_use]
    pub fn shortest_path(&self, start: Coordinate, goal: Coordinate) -> Vec<Coordinate> {
        if !self.map.contains(start) || !self.map.contains(goal) {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let mut frontier = BinaryHeap::new();
        let mut settled = HashSet::new();
        let mut costs = HashMap::new();
        let mut parents = HashMap::new();
        let mut sequence = 0_u64;

        let _ = costs.insert(start, 0_u32);
        frontier.push(Reverse((0_u32, sequence, start)));

        while let Some(Reverse((cost, _, current))) = frontier.pop() {
            if !settled.insert(current) {
                continue;
            }

            if current.is_adjacent(goal) {
                let _ = parents.insert(goal, current);
                return reconstruct(&parents, start, goal);
            }

            for neighbor in current.cardinals() {
                if settled.contains(&neighbor) {
                    continue;
                }
                let Some(weight) = self.weight(neighbor) else {
                    continue;
                };

                let next_cost = cost.saturating_add(weight);
                if costs.get(&neighbor).map_or(true, |known| next_cost < *known) {
                    let _ = costs.insert(neighbor, next_cost);
                    let _ = parents.insert(neighbor, current);
                    sequence += 1;
                    frontier.push(Reverse((next_cost, sequence, neighbor)));
                }
            }
        }

        Vec::new()
    }

    /// Total weight of entering every cell of `path` after the first.
    ///
    /// Returns `None` when the path crosses a tile the search would refuse.
    /// The final cell is free, matching how routes treat the goal.
    #[must_use]
    pub fn path_cost(&self, path: &[Coordinate]) -> Option<u32> {
        let Some((_, steps)) = path.split_first() else {
            return Some(0);
        };
        let Some((_, through)) = steps.split_last() else {
            return Some(0);
        };

        through
            .iter()
            .try_fold(0_u32, |total, cell| Some(total + self.weight(*cell)?))
    }

    fn weight(&self, coordinate: Coordinate) -> Option<u32> {
        let tile = self.map.get(coordinate)?;
        if self.surveyed_only && !tile.is_discovered() {
            return None;
        }
        terrain_weight(tile.surface())
    }
}

fn reconstruct(
    parents: &HashMap<Coordinate, Coordinate>,
    start: Coordinate,
    goal: Coordinate,
) -> Vec<Coordinate> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        let Some(parent) = parents.get(&current) else {
            return Vec::new();
        };
        path.push(*parent);
        current = *parent;
    }
    path.reverse();
    path
}
