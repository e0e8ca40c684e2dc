//! Bounded breadth-first traversal of conductor networks.

use std::collections::{HashSet, VecDeque};

use crate::grid::{Capability, Coord, Direction, DirectionSet, GridOracle};

/// A non-conductor cell reached by a scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReachedNode {
    pub coord: Coord,
    /// Face of the node the scan arrived through.
    pub side: Direction,
    /// Direction the scan left the origin in to reach this node.
    pub via: Direction,
    pub capability: Capability,
}

/// Everything a single scan observed.
#[derive(Clone, Debug, Default)]
pub struct ScanOutcome {
    /// Accepted nodes in discovery order, one per coordinate.
    pub nodes: Vec<ReachedNode>,
    /// Every conductor walked.
    pub conductors: HashSet<Coord>,
    /// Cells examined, conductors and leaves alike. A leaf reached through
    /// several faces counts once per arrival until it is recorded.
    pub visited: usize,
    /// The cell budget ran out before the frontier emptied.
    pub truncated: bool,
}

/// Walks the network around `origin` without ever entering `origin`.
///
/// The queue is seeded with the neighbours in `directions`. Conductors are
/// expanded along their connected directions and walked once. Any other cell
/// is a leaf, recorded the first time its capability on the facing side
/// passes `accept`. At most `max_cells` cells are examined, counting every
/// arrival at a leaf.
pub fn bounded_scan<O, F>(
    oracle: &O,
    origin: Coord,
    directions: DirectionSet,
    max_cells: usize,
    accept: F,
) -> ScanOutcome
where
    O: GridOracle + ?Sized,
    F: Fn(&Capability) -> bool,
{
    // (cell, direction of travel into it, direction it left the origin in)
    let mut queue: VecDeque<(Coord, Direction, Direction)> = VecDeque::new();
    let mut visited: HashSet<Coord> = HashSet::new();
    let mut recorded: HashSet<Coord> = HashSet::new();
    let mut out = ScanOutcome::default();

    for dir in directions.iter() {
        queue.push_back((origin.relative(dir), dir, dir));
    }

    while let Some((coord, travel, via)) = queue.pop_front() {
        if coord == origin || visited.contains(&coord) || recorded.contains(&coord) {
            continue;
        }
        if out.visited >= max_cells {
            out.truncated = true;
            break;
        }
        out.visited += 1;

        if oracle.is_conductor(coord) {
            visited.insert(coord);
            out.conductors.insert(coord);
            for dir in oracle.connected_directions(coord).iter() {
                let next = coord.relative(dir);
                if next != origin && !visited.contains(&next) && !recorded.contains(&next) {
                    queue.push_back((next, dir, via));
                }
            }
            continue;
        }

        // Leaf: never expanded. A face that does not qualify leaves the
        // cell open to another path reaching a different face.
        let side = travel.opposite();
        if let Some(capability) = oracle.capability_at(coord, Some(side)) {
            if accept(&capability) {
                recorded.insert(coord);
                out.nodes.push(ReachedNode {
                    coord,
                    side,
                    via,
                    capability,
                });
            }
        }
    }

    out
}
