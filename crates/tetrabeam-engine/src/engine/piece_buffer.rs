use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies pieces with the 7-bag randomizer.
///
/// Every bag holds each kind exactly once in shuffled order; a new bag is
/// appended whenever seven or fewer pieces remain, so at least seven pieces
/// of preview are always available.
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceBuffer {
    /// Creates a buffer seeded from the thread RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Deterministic buffer: equal seeds yield equal piece sequences.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            bag: VecDeque::with_capacity(PieceKind::LEN * 2),
        };
        this.refill();
        this
    }

    /// Like [`Self::with_seed`], but `queue` is dealt before the first bag.
    #[must_use]
    pub fn with_queue<I>(seed: PieceSeed, queue: I) -> Self
    where
        I: IntoIterator<Item = PieceKind>,
    {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            bag: queue.into_iter().collect(),
        };
        this.refill();
        this
    }

    fn refill(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut bag = PieceKind::ALL;
            bag.shuffle(&mut self.rng);
            self.bag.extend(bag);
        }
    }

    /// Draws the next piece.
    ///
    /// # Panics
    ///
    /// Never in practice: the bag is refilled before every draw.
    pub fn pop_next(&mut self) -> PieceKind {
        self.refill();
        let next = self.bag.pop_front().expect("bag is refilled before every draw");
        self.refill();
        next
    }

    /// Upcoming pieces, soonest first.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }
}

/// 128-bit seed for [`PieceBuffer`], written as 32 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {text:?}: expected 32 hex digits")]
pub struct SeedParseError {
    text: String,
}

impl FromStr for PieceSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(SeedParseError { text: s.to_owned() });
        }
        u128::from_str_radix(s, 16)
            .map(Self::from_u128)
            .map_err(|_| SeedParseError { text: s.to_owned() })
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
