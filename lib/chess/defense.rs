use crate::chess::{Bitboard, Color, Effective, Square};

/// The air defense zones projected by the pieces of one side.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct AirDefense {
    defenders: Vec<(Square, u8)>,
}

impl AirDefense {
    /// The zones projected by the pieces of a [`Color`].
    pub fn of(view: &Effective<'_>, c: Color) -> Self {
        let defenders = view
            .pieces(c)
            .map(|(sq, p)| (sq, p.air_defense()))
            .filter(|&(_, r)| r > 0)
            .collect();

        AirDefense { defenders }
    }

    /// Whether no zone is projected at all.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.defenders.is_empty()
    }

    /// The squares of the defenders whose zone covers `sq`.
    pub fn covering(&self, sq: Square) -> Bitboard {
        self.defenders
            .iter()
            .filter(|&&(d, r)| {
                let df = i32::from(sq.file() - d.file());
                let dr = i32::from(sq.rank() - d.rank());
                df * df + dr * dr <= i32::from(r) * i32::from(r)
            })
            .map(|&(d, _)| d)
            .collect()
    }
}

/// What an air force may do on a square along its flight.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Flight {
    /// Outside of any zone.
    Clear,
    /// Inside a single zone, only a suicide attack is possible.
    Kamikaze,
    /// The flight cannot reach this far.
    Grounded,
}

/// Tracks the zones touched along one line of flight.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FlightPath {
    touched: Bitboard,
}

impl FlightPath {
    /// Advances onto a square covered by `covering`.
    pub fn step(&mut self, covering: Bitboard) -> Flight {
        let before = self.touched;
        self.touched |= covering;

        if self.touched.is_empty() {
            Flight::Clear
        } else if self.touched.len() > 1 || (!before.is_empty() && covering != self.touched) {
            Flight::Grounded
        } else {
            Flight::Kamikaze
        }
    }
}
