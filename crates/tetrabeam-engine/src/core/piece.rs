use std::{fmt, str::FromStr};

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// A falling piece: kind, rotation state and bounding-box position.
///
/// The position is the top-left corner of the piece's SRS bounding box in
/// playable board coordinates (column, row; row 0 is the top hidden row). It
/// may be negative or past the right edge when the box overhangs a wall while
/// the cells themselves stay inside the board.
///
/// Pieces are `Copy` values; movement and rotation return new pieces.
///
/// # Example
///
/// ```
/// use tetrabeam_engine::{Piece, PieceKind, RotationDirection};
///
/// let piece = Piece::new(PieceKind::T);
/// let moved = piece.shifted(1, 0).rotated(RotationDirection::Clockwise);
/// assert_eq!(moved.position().x(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece {text:?}: {reason}")]
pub struct PieceParseError {
    text: String,
    reason: &'static str,
}

impl FromStr for Piece {
    type Err = PieceParseError;

    // Format: "kind#rotation@x,y" (e.g., "S#1@4,18")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| PieceParseError {
            text: s.to_owned(),
            reason,
        };
        let (kind, rest) = s.split_once('#').ok_or_else(|| err("missing '#'"))?;
        let (rotation, position) = rest.split_once('@').ok_or_else(|| err("missing '@'"))?;
        let (x, y) = position.split_once(',').ok_or_else(|| err("missing ','"))?;

        let mut chars = kind.chars();
        let kind = match (chars.next(), chars.next()) {
            (Some(c), None) => PieceKind::from_char(c).ok_or_else(|| err("unknown piece kind"))?,
            _ => return Err(err("piece kind must be a single character")),
        };
        let rotation = rotation
            .parse::<u8>()
            .ok()
            .and_then(PieceRotation::new)
            .ok_or_else(|| err("rotation must be 0-3"))?;
        let x = x.parse::<i8>().map_err(|_| err("invalid x position"))?;
        let y = y.parse::<i8>().map_err(|_| err("invalid y position"))?;

        Ok(Self {
            position: PiecePosition::new(x, y),
            rotation,
            kind,
        })
    }
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Piece {
    /// Spawns a piece of the given kind in rotation 0 at the spawn position.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            position: PiecePosition::SPAWN,
            rotation: PieceRotation::SPAWN,
            kind,
        }
    }

    #[must_use]
    pub const fn with_state(kind: PieceKind, rotation: PieceRotation, position: PiecePosition) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    #[must_use]
    pub const fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn shape(&self) -> &'static Shape {
        self.kind.shape(self.rotation)
    }

    /// Column of the shape's leftmost cell.
    #[must_use]
    pub const fn col(&self) -> i32 {
        self.position.x as i32 + self.shape().offset_x as i32
    }

    /// Row of the shape's topmost cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.position.y as i32 + self.shape().offset_y as i32
    }

    /// Moves the piece by `dx` columns right and `dy` rows down.
    #[must_use]
    pub const fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            position: PiecePosition::new(self.position.x + dx, self.position.y + dy),
            rotation: self.rotation,
            kind: self.kind,
        }
    }

    /// Rotates in place, without any kick.
    #[must_use]
    pub const fn rotated(&self, direction: RotationDirection) -> Self {
        Self {
            position: self.position,
            rotation: self.rotation.rotated(direction),
            kind: self.kind,
        }
    }

    /// Board cells `(row, col)` covered by the piece.
    ///
    /// Cells that lie outside the board (negative coordinates) are skipped.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (col, row) = (self.col(), self.row());
        self.shape().cells().filter_map(move |(dy, dx)| {
            let r = usize::try_from(row + i32::from(dy)).ok()?;
            let c = usize::try_from(col + i32::from(dx)).ok()?;
            Some((r, c))
        })
    }
}

/// Position of a piece's bounding box.
///
/// - X increases rightward (columns), Y increases downward (rows)
/// - (0, 0) is the top-left playable cell of the top hidden row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PiecePosition {
    x: i8,
    y: i8,
}

impl PiecePosition {
    pub const SPAWN: Self = Self::new(3, 0);

    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i8 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i8 {
        self.y
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct PieceRotation(u8);

impl TryFrom<u8> for PieceRotation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("rotation must be 0-3, got {value}"))
    }
}

impl From<PieceRotation> for u8 {
    fn from(value: PieceRotation) -> Self {
        value.0
    }
}

impl PieceRotation {
    pub const SPAWN: Self = Self(0);
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    #[must_use]
    pub const fn new(state: u8) -> Option<Self> {
        if state < 4 { Some(Self(state)) } else { None }
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        Self((self.0 + direction.quarter_turns()) % 4)
    }

    /// Direction that turns `self` into `target` with a single command, or
    /// `None` when they are the same state.
    #[must_use]
    pub const fn direction_to(self, target: Self) -> Option<RotationDirection> {
        match (target.0 + 4 - self.0) % 4 {
            1 => Some(RotationDirection::Clockwise),
            2 => Some(RotationDirection::Half),
            3 => Some(RotationDirection::Counterclockwise),
            _ => None,
        }
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Clockwise,
    Counterclockwise,
    Half,
}

impl RotationDirection {
    const fn quarter_turns(self) -> u8 {
        match self {
            Self::Clockwise => 1,
            Self::Half => 2,
            Self::Counterclockwise => 3,
        }
    }
}

/// Type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    O = 1,
    S = 2,
    Z = 3,
    J = 4,
    L = 5,
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
        Self::T,
    ];

    #[must_use]
    pub const fn shape(self, rotation: PieceRotation) -> &'static Shape {
        &SHAPES[self as usize][rotation.as_usize()]
    }

    /// Number of distinct shapes among the four rotation states.
    #[must_use]
    pub const fn distinct_rotations(self) -> usize {
        match self {
            Self::O => 1,
            Self::I | Self::S | Self::Z => 2,
            Self::J | Self::L | Self::T => 4,
        }
    }

    /// Ordered SRS kick tests for rotating from `from` in `direction`.
    ///
    /// Offsets are `(dx, dy)` with x to the right and y **up**, as SRS tables
    /// are usually written. The first entry is always `(0, 0)`.
    #[must_use]
    pub fn kicks(self, from: PieceRotation, direction: RotationDirection) -> &'static [(i8, i8)] {
        let from = from.as_usize();
        match (self, direction) {
            (Self::O, _) => &O_KICKS,
            (_, RotationDirection::Half) => &HALF_KICKS[from],
            (Self::I, RotationDirection::Clockwise) => &I_CW_KICKS[from],
            (Self::I, RotationDirection::Counterclockwise) => &I_CCW_KICKS[from],
            (_, RotationDirection::Clockwise) => &JLSTZ_CW_KICKS[from],
            (_, RotationDirection::Counterclockwise) => &JLSTZ_CCW_KICKS[from],
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::O => 'O',
            Self::S => 'S',
            Self::Z => 'Z',
            Self::J => 'J',
            Self::L => 'L',
            Self::T => 'T',
        }
    }

    /// Parses a piece kind from a single (case-insensitive) character.
    ///
    /// ```
    /// use tetrabeam_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('t'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Self::I),
            'O' => Some(Self::O),
            'S' => Some(Self::S),
            'Z' => Some(Self::Z),
            'J' => Some(Self::J),
            'L' => Some(Self::L),
            'T' => Some(Self::T),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Cells of one (kind, rotation) pair, trimmed to their bounding rectangle.
///
/// `rows[dy]` has bit `dx` set when cell `(dy, dx)` is filled. `offset_x` and
/// `offset_y` locate the rectangle inside the SRS bounding box.
/// `column_bottoms[dx]` is the lowest filled `dy` of column `dx`; tetromino
/// columns are contiguous, so it is all a drop needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: [u16; 4],
    width: u8,
    height: u8,
    offset_x: u8,
    offset_y: u8,
    column_bottoms: [u8; 4],
}

impl Shape {
    #[must_use]
    pub const fn rows(&self) -> &[u16] {
        self.rows.split_at(self.height as usize).0
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    #[must_use]
    pub const fn offset_x(&self) -> u8 {
        self.offset_x
    }

    #[must_use]
    pub const fn offset_y(&self) -> u8 {
        self.offset_y
    }

    #[must_use]
    pub const fn column_bottoms(&self) -> &[u8] {
        self.column_bottoms.split_at(self.width as usize).0
    }

    /// Packs the trimmed cells into a single integer, 4 bits per row.
    ///
    /// Two rotation states with the same signature cover the same cells
    /// relative to their top-left corner.
    #[must_use]
    pub const fn signature(&self) -> u16 {
        self.rows[0] | self.rows[1] << 4 | self.rows[2] << 8 | self.rows[3] << 12
    }

    /// Filled cells as `(dy, dx)`, top to bottom, left to right.
    pub fn cells(&self) -> impl Iterator<Item = (u8, u8)> + use<> {
        let rows = self.rows;
        (0..4u8).flat_map(move |dy| {
            (0..4u8).filter_map(move |dx| (rows[dy as usize] & (1 << dx) != 0).then_some((dy, dx)))
        })
    }

    #[expect(clippy::cast_possible_truncation)]
    const fn from_box(mask: PieceMask) -> Self {
        let mut top = 4;
        let mut bottom = 0;
        let mut left = 4;
        let mut right = 0;
        let mut y = 0;
        while y < 4 {
            if mask[y] != 0 {
                if top == 4 {
                    top = y;
                }
                bottom = y;
                let lo = mask[y].trailing_zeros() as usize;
                let hi = 15 - mask[y].leading_zeros() as usize;
                if lo < left {
                    left = lo;
                }
                if hi > right {
                    right = hi;
                }
            }
            y += 1;
        }

        let mut rows = [0; 4];
        let mut column_bottoms = [0; 4];
        let mut dy = 0;
        while top + dy <= bottom {
            let row = mask[top + dy] >> left;
            rows[dy] = row;
            let mut dx = 0;
            while dx < 4 {
                if row & (1 << dx) != 0 {
                    column_bottoms[dx] = dy as u8;
                }
                dx += 1;
            }
            dy += 1;
        }

        Self {
            rows,
            width: (right - left + 1) as u8,
            height: (bottom - top + 1) as u8,
            offset_x: left as u8,
            offset_y: top as u8,
            column_bottoms,
        }
    }
}

/// Piece cells inside the SRS bounding box, one `u16` per box row
/// (bit `x` = box column `x`).
type PieceMask = [u16; 4];

/// Generates all 4 rotation states by rotating 90° clockwise inside a
/// `size`×`size` box (4 for I, 2 for O, 3 otherwise).
const fn mask_rotations(size: usize, mask: PieceMask) -> [PieceMask; 4] {
    let mut rotations = [mask; 4];
    let mut i = 1;
    while i < 4 {
        let mut rotated = [0; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                if rotations[i - 1][size - 1 - x] & (1 << y) != 0 {
                    rotated[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        rotations[i] = rotated;
        i += 1;
    }
    rotations
}

const fn shapes_of(size: usize, mask: PieceMask) -> [Shape; 4] {
    let masks = mask_rotations(size, mask);
    [
        Shape::from_box(masks[0]),
        Shape::from_box(masks[1]),
        Shape::from_box(masks[2]),
        Shape::from_box(masks[3]),
    ]
}

static SHAPES: [[Shape; 4]; PieceKind::LEN] = [
    // I: ....
    //    ####
    shapes_of(4, [0b0000, 0b1111, 0, 0]),
    // O: ##
    //    ##
    shapes_of(2, [0b11, 0b11, 0, 0]),
    // S: .##
    //    ##.
    shapes_of(3, [0b110, 0b011, 0, 0]),
    // Z: ##.
    //    .##
    shapes_of(3, [0b011, 0b110, 0, 0]),
    // J: #..
    //    ###
    shapes_of(3, [0b001, 0b111, 0, 0]),
    // L: ..#
    //    ###
    shapes_of(3, [0b100, 0b111, 0, 0]),
    // T: .#.
    //    ###
    shapes_of(3, [0b010, 0b111, 0, 0]),
];

type KickTable = [[(i8, i8); 5]; 4];

static O_KICKS: [(i8, i8); 1] = [(0, 0)];

// Indexed by the state rotated from.
static JLSTZ_CW_KICKS: KickTable = [
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

static JLSTZ_CCW_KICKS: KickTable = [
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

static I_CW_KICKS: KickTable = [
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

static I_CCW_KICKS: KickTable = [
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
];

static HALF_KICKS: [[(i8, i8); 6]; 4] = [
    [(0, 0), (0, 1), (1, 1), (-1, 1), (1, 0), (-1, 0)],
    [(0, 0), (1, 0), (1, 2), (1, 1), (0, 2), (0, 1)],
    [(0, 0), (0, -1), (-1, -1), (1, -1), (-1, 0), (1, 0)],
    [(0, 0), (-1, 0), (-1, 2), (-1, 1), (0, 2), (0, 1)],
];
