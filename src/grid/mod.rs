//! Lattice primitives and the collaborator traits the grid core consumes.

/// Host-world query and action contracts.
pub mod oracle;

use std::fmt;

pub use oracle::{Capability, EnergyAccess, GridOracle, HostWorld, NodeClass, WorldActions};

/// A cell position in the 3D lattice.
///
/// Pure value key: equality and hashing are by component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord {
    /// Creates a coordinate from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the adjacent coordinate one step in `dir`.
    pub fn relative(self, dir: Direction) -> Self {
        let (dx, dy, dz) = dir.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Returns the six face-adjacent coordinates in [`Direction::ALL`] order.
    pub fn neighbors(self) -> [Coord; 6] {
        Direction::ALL.map(|d| self.relative(d))
    }

    /// Squared euclidean distance to `other`.
    pub fn distance_sq(self, other: Coord) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let dz = i64::from(self.z) - i64::from(other.z);
        dx * dx + dy * dy + dz * dz
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the six axis-aligned lattice directions.
///
/// Y is vertical. Declaration order is the canonical iteration order used
/// everywhere a scan has to be reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All directions in canonical order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Unit offset `(dx, dy, dz)` for this direction.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    /// The direction pointing the other way.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Position in [`Direction::ALL`], also the bit index in [`DirectionSet`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A subset of the six directions stored as a bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: DirectionSet = DirectionSet(0);
    pub const ALL: DirectionSet = DirectionSet(0b11_1111);

    /// A set holding only `dir`.
    pub const fn single(dir: Direction) -> Self {
        DirectionSet(1 << dir.index())
    }

    /// Builds a set from raw bits; bits above the sixth are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        DirectionSet(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir.index();
    }

    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !(1 << dir.index());
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates members in canonical direction order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::EMPTY;
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_and_opposite_cancel() {
        let origin = Coord::new(3, -2, 7);
        for dir in Direction::ALL {
            assert_eq!(origin.relative(dir).relative(dir.opposite()), origin);
        }
    }

    #[test]
    fn neighbors_are_unit_distance() {
        let origin = Coord::new(0, 0, 0);
        for n in origin.neighbors() {
            assert_eq!(origin.distance_sq(n), 1);
        }
    }

    #[test]
    fn distance_sq_does_not_overflow_on_wide_coords() {
        let a = Coord::new(i32::MAX, 0, 0);
        let b = Coord::new(i32::MIN, 0, 0);
        assert!(a.distance_sq(b) > 0);
    }

    #[test]
    fn direction_set_membership() {
        let mut set = DirectionSet::single(Direction::Up);
        set.insert(Direction::East);
        assert!(set.contains(Direction::Up));
        assert!(set.contains(Direction::East));
        assert!(!set.contains(Direction::Down));
        assert_eq!(set.len(), 2);

        set.remove(Direction::Up);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Direction::East]);
    }

    #[test]
    fn direction_set_iterates_in_canonical_order() {
        let set: DirectionSet = [Direction::East, Direction::Down, Direction::North]
            .into_iter()
            .collect();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Direction::Down, Direction::North, Direction::East]
        );
        assert_eq!(DirectionSet::ALL.len(), 6);
        assert!(DirectionSet::from_bits(0b1100_0000).is_empty());
    }
}
