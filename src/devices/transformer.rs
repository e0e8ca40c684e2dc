use crate::devices::types::{Device, DeviceContext};
use crate::grid::{Capability, Direction};
use crate::voltage::Tier;

/// Buffer size of a transformer unless configured otherwise.
pub const DEFAULT_TRANSFORMER_BUFFER: u64 = 2048;

/// A multi-tier bridge: each face carries its own voltage tier.
///
/// A transformer accepts energy on any face into one buffer and hands it
/// back out per face, at that face's tier. It never takes part in
/// source/consumer pairing as a whole.
#[derive(Debug, Clone)]
pub struct Transformer {
    /// Tier per face, indexed by [`Direction::index`].
    pub faces: [Tier; 6],

    /// Buffer size.
    pub capacity: u64,

    stored: u64,
}

impl Transformer {
    /// Creates a transformer with an explicit tier per face.
    pub fn new(faces: [Tier; 6]) -> Self {
        Self {
            faces,
            capacity: DEFAULT_TRANSFORMER_BUFFER,
            stored: 0,
        }
    }

    /// The usual step transformer: `high` on `high_face`, `low` everywhere else.
    pub fn split(high_face: Direction, high: Tier, low: Tier) -> Self {
        let mut faces = [low; 6];
        faces[high_face.index()] = high;
        Self::new(faces)
    }

    /// Replaces the buffer size.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        assert!(capacity > 0, "transformer capacity must be > 0");
        self.capacity = capacity;
        self.stored = self.stored.min(capacity);
        self
    }

    /// Tier on `face`.
    pub fn face_tier(&self, face: Direction) -> Tier {
        self.faces[face.index()]
    }

    /// Highest tier over all faces.
    pub fn highest_tier(&self) -> Tier {
        self.faces.iter().copied().max().unwrap_or(Tier::T1)
    }
}

impl Device for Transformer {
    fn capability(&self, side: Option<Direction>) -> Option<Capability> {
        let tier = match side {
            Some(face) => self.face_tier(face),
            None => self.highest_tier(),
        };
        Some(Capability::bridge_face(tier))
    }

    fn receive(&mut self, _side: Direction, amount: u64, simulate: bool) -> u64 {
        let accepted = amount.min(self.capacity - self.stored);
        if !simulate {
            self.stored += accepted;
        }
        accepted
    }

    fn extract(&mut self, amount: u64, simulate: bool) -> u64 {
        let taken = amount.min(self.stored);
        if !simulate {
            self.stored -= taken;
        }
        taken
    }

    fn max_output(&self) -> u64 {
        self.stored
    }

    fn stored(&self) -> u64 {
        self.stored
    }

    fn on_tick(&mut self, _context: &DeviceContext) {}

    fn device_type(&self) -> &'static str {
        "Transformer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_faces() {
        let t = Transformer::split(Direction::East, Tier::T3, Tier::T2);
        assert_eq!(t.face_tier(Direction::East), Tier::T3);
        assert_eq!(t.face_tier(Direction::West), Tier::T2);
        assert_eq!(t.face_tier(Direction::Up), Tier::T2);
        assert_eq!(t.highest_tier(), Tier::T3);
    }

    #[test]
    fn test_capability_per_face() {
        let t = Transformer::split(Direction::Up, Tier::T4, Tier::T1);
        let up = t.capability(Some(Direction::Up)).unwrap();
        let down = t.capability(Some(Direction::Down)).unwrap();
        assert!(up.bridge && down.bridge);
        assert_eq!(up.tier, Some(Tier::T4));
        assert_eq!(down.tier, Some(Tier::T1));
        assert_eq!(t.capability(None).unwrap().tier, Some(Tier::T4));
    }

    #[test]
    fn test_buffer_round_trip() {
        let mut t = Transformer::split(Direction::Up, Tier::T2, Tier::T1).with_capacity(100);
        assert_eq!(t.receive(Direction::Up, 150, false), 100);
        assert_eq!(t.max_output(), 100);
        assert_eq!(t.extract(40, false), 40);
        assert_eq!(t.stored(), 60);
    }
}
