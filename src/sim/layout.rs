//! Synthetic cable layouts for tests and benchmarks.
//!
//! All generators write into a [`GridWorld`] directly and return the
//! cells they placed, in placement order.

use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::world::GridWorld;
use crate::grid::{Coord, Direction, GridOracle};

/// Lays `len` cables from `start` (inclusive) towards `dir`.
pub fn cable_line(world: &mut GridWorld, start: Coord, dir: Direction, len: usize) -> Vec<Coord> {
    let mut placed = Vec::with_capacity(len);
    let mut at = start;
    for _ in 0..len {
        world.place_cable(at);
        placed.push(at);
        at = at.relative(dir);
    }
    placed
}

/// Fills an `edge`-sided cube of cable with `min` as its lowest corner.
pub fn cable_cube(world: &mut GridWorld, min: Coord, edge: i32) -> Vec<Coord> {
    let mut placed = Vec::new();
    for x in 0..edge {
        for y in 0..edge {
            for z in 0..edge {
                let c = Coord::new(min.x + x, min.y + y, min.z + z);
                world.place_cable(c);
                placed.push(c);
            }
        }
    }
    placed
}

/// Grows a loop-free cable tree of up to `cells` cables from `root`.
///
/// Each new cable touches exactly one cable of the tree, so the result has
/// no cycles. Cells the world already occupies are never overwritten.
/// Output is fully determined by `seed`.
pub fn random_tree(world: &mut GridWorld, root: Coord, cells: usize, seed: u64) -> Vec<Coord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut placed: Vec<Coord> = Vec::with_capacity(cells);
    let mut members: HashSet<Coord> = HashSet::new();
    if cells == 0 || !world.is_empty(root) {
        return placed;
    }

    world.place_cable(root);
    placed.push(root);
    members.insert(root);

    let max_attempts = cells.saturating_mul(64);
    let mut attempts = 0;
    while placed.len() < cells && attempts < max_attempts {
        attempts += 1;
        let from = placed[rng.random_range(0..placed.len())];
        let dir = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
        let next = from.relative(dir);
        if !world.is_empty(next) {
            continue;
        }
        let touching = next
            .neighbors()
            .iter()
            .filter(|n| members.contains(*n))
            .count();
        if touching != 1 {
            continue;
        }
        world.place_cable(next);
        placed.push(next);
        members.insert(next);
    }
    placed
}

/// Empty cells next to `cells` that touch exactly one of them, in
/// canonical order. Good spots to hang machines off a layout.
pub fn free_ports(world: &GridWorld, cells: &[Coord]) -> Vec<(Coord, Direction)> {
    let members: HashSet<Coord> = cells.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut ports = Vec::new();
    for c in cells {
        for dir in Direction::ALL {
            let spot = c.relative(dir);
            if !world.is_empty(spot) || !seen.insert(spot) {
                continue;
            }
            let touching = spot
                .neighbors()
                .iter()
                .filter(|n| members.contains(*n))
                .count();
            if touching == 1 {
                ports.push((spot, dir.opposite()));
            }
        }
    }
    ports
}
