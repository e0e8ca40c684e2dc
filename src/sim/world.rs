//! In-memory voxel world that hosts cables and machines.
//!
//! `GridWorld` implements every host contract the grid core needs, records
//! the destructive effects applied to it as [`WorldEvent`]s and keeps a
//! journal of changed cells so callers can feed invalidation.

use std::collections::BTreeMap;

use tracing::debug;

use crate::devices::{Device, DeviceContext, Machine};
use crate::grid::{
    Capability, Coord, Direction, DirectionSet, EnergyAccess, GridOracle, WorldActions,
};

/// A pass-through conductor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cable {
    /// Faces the cable may connect through.
    pub mask: DirectionSet,
}

/// Content of an occupied cell.
#[derive(Clone, Debug)]
pub enum Cell {
    Cable(Cable),
    Device(Machine),
    Fire,
}

/// A destructive effect applied to the world.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    /// Fire was set in an empty cell.
    Ignited(Coord),
    /// Cells within `radius` of `center` were destroyed.
    Destroyed {
        center: Coord,
        radius: f32,
        removed: usize,
    },
    /// Living entities near `center` were damaged and set burning.
    EntitiesShocked {
        center: Coord,
        radius: f32,
        amount: f32,
        burn_seconds: u32,
    },
}

/// Sparse lattice of cells with a tick counter.
#[derive(Debug, Default)]
pub struct GridWorld {
    cells: BTreeMap<Coord, Cell>,
    tick: u64,
    events: Vec<WorldEvent>,
    changes: Vec<Coord>,
}

impl GridWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a cable that connects on every face.
    pub fn place_cable(&mut self, coord: Coord) {
        self.place_cable_with(coord, DirectionSet::ALL);
    }

    /// Places a cable restricted to the faces in `mask`.
    pub fn place_cable_with(&mut self, coord: Coord, mask: DirectionSet) {
        self.set(coord, Cell::Cable(Cable { mask }));
    }

    /// Places a machine, replacing whatever occupied the cell.
    pub fn place_device(&mut self, coord: Coord, device: impl Into<Machine>) {
        self.set(coord, Cell::Device(device.into()));
    }

    /// Clears the cell and returns what was there.
    pub fn remove(&mut self, coord: Coord) -> Option<Cell> {
        let old = self.cells.remove(&coord);
        if old.is_some() {
            self.changes.push(coord);
        }
        old
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    pub fn device(&self, coord: Coord) -> Option<&Machine> {
        match self.cells.get(&coord) {
            Some(Cell::Device(d)) => Some(d),
            _ => None,
        }
    }

    pub fn device_mut(&mut self, coord: Coord) -> Option<&mut Machine> {
        match self.cells.get_mut(&coord) {
            Some(Cell::Device(d)) => Some(d),
            _ => None,
        }
    }

    /// Machines in coordinate order.
    pub fn devices(&self) -> impl Iterator<Item = (Coord, &Machine)> {
        self.cells.iter().filter_map(|(c, cell)| match cell {
            Cell::Device(d) => Some((*c, d)),
            _ => None,
        })
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_vacant(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn advance_ticks(&mut self, n: u64) {
        self.tick += n;
    }

    /// Runs every machine's per-tick update at the current tick.
    pub fn tick_devices(&mut self) {
        let context = DeviceContext::new(self.tick);
        for cell in self.cells.values_mut() {
            if let Cell::Device(d) = cell {
                d.on_tick(&context);
            }
        }
    }

    /// Takes up to `amount` out of the machine at `coord`.
    pub fn extract(&mut self, coord: Coord, amount: u64) -> u64 {
        self.device_mut(coord)
            .map_or(0, |d| d.extract(amount, false))
    }

    /// Effects applied so far, oldest first.
    pub fn events(&self) -> &[WorldEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Cells changed since the last call, in change order.
    pub fn take_changes(&mut self) -> Vec<Coord> {
        std::mem::take(&mut self.changes)
    }

    fn set(&mut self, coord: Coord, cell: Cell) {
        self.cells.insert(coord, cell);
        self.changes.push(coord);
    }

    /// Whether the cell at `coord` accepts a link entering through `face`.
    fn links_through(&self, coord: Coord, face: Direction) -> bool {
        match self.cells.get(&coord) {
            Some(Cell::Cable(c)) => c.mask.contains(face),
            Some(Cell::Device(_)) => true,
            Some(Cell::Fire) | None => false,
        }
    }
}

impl GridOracle for GridWorld {
    fn is_conductor(&self, coord: Coord) -> bool {
        matches!(self.cells.get(&coord), Some(Cell::Cable(_)))
    }

    fn connected_directions(&self, coord: Coord) -> DirectionSet {
        let Some(Cell::Cable(cable)) = self.cells.get(&coord) else {
            return DirectionSet::EMPTY;
        };
        cable
            .mask
            .iter()
            .filter(|d| self.links_through(coord.relative(*d), d.opposite()))
            .collect()
    }

    fn capability_at(&self, coord: Coord, side: Option<Direction>) -> Option<Capability> {
        self.device(coord)?.capability(side)
    }

    fn current_tick(&self) -> u64 {
        self.tick
    }

    fn is_empty(&self, coord: Coord) -> bool {
        !self.cells.contains_key(&coord)
    }
}

impl EnergyAccess for GridWorld {
    fn receive(&mut self, coord: Coord, side: Direction, amount: u64, simulate: bool) -> u64 {
        self.device_mut(coord)
            .map_or(0, |d| d.receive(side, amount, simulate))
    }
}

impl WorldActions for GridWorld {
    fn apply_ignite(&mut self, coord: Coord) {
        if GridOracle::is_empty(self, coord) {
            self.set(coord, Cell::Fire);
            self.events.push(WorldEvent::Ignited(coord));
        }
    }

    fn apply_area_destruction(&mut self, center: Coord, radius: f32) {
        let r2 = f64::from(radius) * f64::from(radius);
        let doomed: Vec<Coord> = self
            .cells
            .keys()
            .filter(|c| (c.distance_sq(center) as f64) <= r2)
            .copied()
            .collect();
        for coord in &doomed {
            self.cells.remove(coord);
            self.changes.push(*coord);
        }
        debug!(%center, radius, removed = doomed.len(), "area destroyed");
        self.events.push(WorldEvent::Destroyed {
            center,
            radius,
            removed: doomed.len(),
        });
    }

    fn apply_entity_damage(&mut self, center: Coord, radius: f32, amount: f32, burn_seconds: u32) {
        self.events.push(WorldEvent::EntitiesShocked {
            center,
            radius,
            amount,
            burn_seconds,
        });
    }
}
