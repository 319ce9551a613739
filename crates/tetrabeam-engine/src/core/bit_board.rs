use std::{fmt, ops::Range};

use serde::{Deserialize, Serialize, de};

use super::{BOARD_HEIGHT, HIDDEN_HEIGHT, PLAYABLE_WIDTH, SENTINEL_MARGIN_LEFT, VISIBLE_HEIGHT};

/// Playable cells of a row in column coordinates (bit `i` = column `i`).
pub const FULL_ROW_MASK: u16 = (1 << PLAYABLE_WIDTH) - 1;

// Left sentinel: bits 0-1
const LEFT_SENTINEL_MASK: u16 = 0b11;
// Right sentinel: bits 12-13
const RIGHT_SENTINEL_MASK: u16 = 0b11 << (SENTINEL_MARGIN_LEFT + PLAYABLE_WIDTH);
const SENTINEL_MASK: u16 = LEFT_SENTINEL_MASK | RIGHT_SENTINEL_MASK;
// Playable area in raw (sentinel-padded) coordinates
const PLAYABLE_MASK: u16 = FULL_ROW_MASK << SENTINEL_MARGIN_LEFT;

/// Single row of the bit board.
///
/// # Bit Layout (LSB to MSB)
///
/// - Bits 0-1: Left sentinel (walls)
/// - Bits 2-11: Playable area (10 cells)
/// - Bits 12-13: Right sentinel (walls)
/// - Bits 14-15: Unused (padding)
///
/// Sentinel bits are always set. They never leak out of the public API: every
/// accessor speaks playable column coordinates, but feature extraction can use
/// [`Self::raw`] to treat the walls as filled cells without extra branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitRow {
    bits: u16,
}

impl Default for BitRow {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BitRow {
    pub const EMPTY: Self = Self {
        bits: SENTINEL_MASK,
    };
    pub const FULL: Self = Self {
        bits: SENTINEL_MASK | PLAYABLE_MASK,
    };
    /// Playable cells in [`Self::raw`] coordinates.
    pub const RAW_PLAYABLE_MASK: u16 = PLAYABLE_MASK;

    /// Bit of column `col` in [`Self::raw`] coordinates.
    #[inline]
    #[must_use]
    pub const fn raw_column_bit(col: usize) -> u16 {
        1 << (col + SENTINEL_MARGIN_LEFT)
    }

    /// Converts a mask in [`Self::raw`] coordinates back to column bits,
    /// dropping the wall bits.
    #[inline]
    #[must_use]
    pub const fn raw_to_bits(raw: u16) -> u16 {
        (raw & PLAYABLE_MASK) >> SENTINEL_MARGIN_LEFT
    }

    /// Builds a row from playable column bits. Bits above column 9 are ignored.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self {
            bits: ((bits & FULL_ROW_MASK) << SENTINEL_MARGIN_LEFT) | SENTINEL_MASK,
        }
    }

    /// Returns the playable cells as column bits (bit `i` = column `i`).
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u16 {
        (self.bits & PLAYABLE_MASK) >> SENTINEL_MARGIN_LEFT
    }

    /// Returns the sentinel-padded representation (walls at bits 0-1 and 12-13).
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.bits
    }

    #[inline]
    #[must_use]
    pub const fn is_filled(self) -> bool {
        (self.bits & PLAYABLE_MASK) == PLAYABLE_MASK
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        (self.bits & PLAYABLE_MASK) == 0
    }

    #[inline]
    #[must_use]
    pub const fn count_occupied(self) -> u32 {
        (self.bits & PLAYABLE_MASK).count_ones()
    }

    #[inline]
    #[must_use]
    pub const fn is_cell_occupied(self, col: usize) -> bool {
        self.bits & (1 << (col + SENTINEL_MARGIN_LEFT)) != 0
    }

    /// Checks whether any cell of `mask` shifted to `col` is occupied.
    #[inline]
    #[must_use]
    pub(crate) const fn overlaps(self, col: usize, mask: u16) -> bool {
        self.bits & (mask << (col + SENTINEL_MARGIN_LEFT)) != 0
    }

    #[inline]
    pub(crate) const fn occupy(&mut self, col: usize, mask: u16) {
        self.bits |= (mask << (col + SENTINEL_MARGIN_LEFT)) & PLAYABLE_MASK;
    }

    #[inline]
    pub(crate) const fn vacate(&mut self, col: usize, mask: u16) {
        self.bits &= !((mask << (col + SENTINEL_MARGIN_LEFT)) & PLAYABLE_MASK);
    }

    /// Iterates over the playable cells from left to right.
    pub fn iter_cells(self) -> impl Iterator<Item = bool> {
        (0..PLAYABLE_WIDTH).map(move |col| self.is_cell_occupied(col))
    }
}

/// Set of row indices removed by a line clear, packed into a bitmask.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearedRows(u32);

impl ClearedRows {
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, row: usize) -> bool {
        row < BOARD_HEIGHT && self.0 & (1 << row) != 0
    }

    /// Iterates over the cleared row indices, top to bottom.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..BOARD_HEIGHT).filter(move |row| self.contains(*row))
    }
}

impl Serialize for ClearedRows {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ClearedRows {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<usize>::deserialize(deserializer)?;
        let mut bits = 0;
        for row in rows {
            if row >= BOARD_HEIGHT {
                return Err(de::Error::custom(format!(
                    "cleared row {row} out of range (height {BOARD_HEIGHT})"
                )));
            }
            bits |= 1 << row;
        }
        Ok(Self(bits))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("board has {rows} rows, at most {} allowed", BOARD_HEIGHT)]
    TooManyRows { rows: usize },
    #[display("row {row} has {width} cells, expected {}", PLAYABLE_WIDTH)]
    RowWidth { row: usize, width: usize },
    #[display("row {row} contains invalid cell {cell:?} (expected '#' or '.')")]
    InvalidCell { row: usize, cell: char },
    #[display("invalid hex row {row}: {text:?}")]
    InvalidHex { row: usize, text: String },
}

/// Bit-packed Tetris board.
///
/// 22 rows of 10 columns, stored top to bottom. Rows 0 and 1 are hidden spawn
/// rows above the 20 visible rows. Each row is a [`BitRow`] whose playable
/// cells are exposed as the low 10 bits of a `u16`.
///
/// The board is a plain value (no heap storage): cloning it is a 44-byte copy,
/// so every search branch works on its own copy and no branch can observe
/// another branch's mutations.
///
/// # Out-of-range access
///
/// Accessing a row or column outside the board is a programming error. Debug
/// builds panic; release builds treat out-of-range cells as walls (occupied)
/// and ignore writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitBoard {
    rows: [BitRow; BOARD_HEIGHT],
}

impl Default for BitBoard {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BitBoard {
    pub const WIDTH: usize = PLAYABLE_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;
    pub const VISIBLE_HEIGHT: usize = VISIBLE_HEIGHT;
    pub const HIDDEN_HEIGHT: usize = HIDDEN_HEIGHT;
    pub const VISIBLE_ROWS: Range<usize> = HIDDEN_HEIGHT..BOARD_HEIGHT;
    pub const FULL_ROW_MASK: u16 = FULL_ROW_MASK;

    pub const EMPTY: Self = Self {
        rows: [BitRow::EMPTY; BOARD_HEIGHT],
    };

    #[inline]
    fn in_bounds(row: usize, col: usize) -> bool {
        row < BOARD_HEIGHT && col < PLAYABLE_WIDTH
    }

    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        debug_assert!(Self::in_bounds(row, col), "cell ({row}, {col}) out of range");
        if !Self::in_bounds(row, col) {
            return true;
        }
        self.rows[row].is_cell_occupied(col)
    }

    pub fn set_cell(&mut self, row: usize, col: usize) {
        debug_assert!(Self::in_bounds(row, col), "cell ({row}, {col}) out of range");
        if Self::in_bounds(row, col) {
            self.rows[row].occupy(col, 0b1);
        }
    }

    pub fn clear_cell(&mut self, row: usize, col: usize) {
        debug_assert!(Self::in_bounds(row, col), "cell ({row}, {col}) out of range");
        if Self::in_bounds(row, col) {
            self.rows[row].vacate(col, 0b1);
        }
    }

    /// Returns the playable bits of a row (bit `i` = column `i`).
    #[must_use]
    pub fn row_bits(&self, row: usize) -> u16 {
        debug_assert!(row < BOARD_HEIGHT, "row {row} out of range");
        self.rows.get(row).map_or(FULL_ROW_MASK, |r| r.bits())
    }

    pub fn set_row_bits(&mut self, row: usize, bits: u16) {
        debug_assert!(row < BOARD_HEIGHT, "row {row} out of range");
        if let Some(r) = self.rows.get_mut(row) {
            *r = BitRow::from_bits(bits);
        }
    }

    #[must_use]
    pub fn row(&self, row: usize) -> BitRow {
        debug_assert!(row < BOARD_HEIGHT, "row {row} out of range");
        self.rows.get(row).copied().unwrap_or(BitRow::FULL)
    }

    /// Iterates over all rows, top to bottom.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = BitRow> + ExactSizeIterator + '_ {
        self.rows.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    #[must_use]
    pub fn count_occupied(&self) -> u32 {
        self.rows.iter().map(|r| r.count_occupied()).sum()
    }

    /// Index of the topmost non-empty row, or [`Self::HEIGHT`] if the board is empty.
    #[must_use]
    pub fn top_row(&self) -> usize {
        self.rows
            .iter()
            .position(|r| !r.is_empty())
            .unwrap_or(BOARD_HEIGHT)
    }

    /// Stack height measured from the floor (0 for an empty board).
    #[must_use]
    pub fn calculate_height(&self) -> usize {
        BOARD_HEIGHT - self.top_row()
    }

    #[inline]
    pub(crate) fn overlaps(&self, row: usize, col: usize, mask: u16) -> bool {
        self.rows[row].overlaps(col, mask)
    }

    #[inline]
    pub(crate) fn occupy(&mut self, row: usize, col: usize, mask: u16) {
        self.rows[row].occupy(col, mask);
    }

    /// Removes every full row, compacts the rest downward and refills the top
    /// with empty rows.
    ///
    /// Returns the indices the cleared rows had before compaction.
    pub fn clear_lines(&mut self) -> ClearedRows {
        let mut cleared = 0u32;
        let mut count = 0;

        for y in (0..BOARD_HEIGHT).rev() {
            if self.rows[y].is_filled() {
                cleared |= 1 << y;
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }

        self.rows[..count].fill(BitRow::EMPTY);
        ClearedRows(cleared)
    }

    /// Like [`Self::clear_lines`], but leaves `self` untouched.
    #[must_use]
    pub fn with_lines_cleared(&self) -> (Self, ClearedRows) {
        let mut board = self.clone();
        let cleared = board.clear_lines();
        (board, cleared)
    }

    /// Builds a board from rows of cells, aligned to the floor.
    ///
    /// The first row given is the topmost; fewer than [`Self::HEIGHT`] rows
    /// leave the rows above empty.
    pub fn from_matrix<I, R>(matrix: I) -> Result<Self, BoardParseError>
    where
        I: IntoIterator<Item = R>,
        I::IntoIter: ExactSizeIterator,
        R: AsRef<[bool]>,
    {
        let matrix = matrix.into_iter();
        let rows = matrix.len();
        if rows > BOARD_HEIGHT {
            return Err(BoardParseError::TooManyRows { rows });
        }
        let mut board = Self::EMPTY;
        let offset = BOARD_HEIGHT - rows;
        for (y, cells) in matrix.enumerate() {
            let cells = cells.as_ref();
            if cells.len() != PLAYABLE_WIDTH {
                return Err(BoardParseError::RowWidth {
                    row: y,
                    width: cells.len(),
                });
            }
            for (x, &occupied) in cells.iter().enumerate() {
                if occupied {
                    board.rows[offset + y].occupy(x, 0b1);
                }
            }
        }
        Ok(board)
    }

    /// Parses `#`/`.` rows, aligned to the floor. Blank lines and whitespace
    /// are ignored.
    pub fn parse_ascii<'a, I>(lines: I) -> Result<Self, BoardParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut matrix = Vec::new();
        for (y, line) in lines
            .into_iter()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
        {
            let mut cells = Vec::with_capacity(PLAYABLE_WIDTH);
            for cell in line.chars().filter(|c| !c.is_whitespace()) {
                match cell {
                    '#' => cells.push(true),
                    '.' => cells.push(false),
                    _ => return Err(BoardParseError::InvalidCell { row: y, cell }),
                }
            }
            matrix.push(cells);
        }
        Self::from_matrix(matrix)
    }

    /// Creates a board from ASCII art, for tests and examples.
    ///
    /// `#` is an occupied cell and `.` an empty one; the last line is the floor.
    ///
    /// # Panics
    ///
    /// Panics if the art is malformed.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        Self::parse_ascii(art.lines()).unwrap_or_else(|e| panic!("invalid board art: {e}"))
    }

    /// Renders the board as `#`/`.` lines, top to bottom.
    #[must_use]
    pub fn to_ascii_rows(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.iter_cells().map(|c| if c { '#' } else { '.' }).collect())
            .collect()
    }
}

impl fmt::Display for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, line) in self.to_ascii_rows().iter().enumerate() {
            let marker = if y < HIDDEN_HEIGHT { '-' } else { '|' };
            writeln!(f, "{marker}{line}{marker}")?;
        }
        Ok(())
    }
}

impl Serialize for BitBoard {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "000,000,...,3ff" (comma-separated hex of the playable bits)
        let hex = self
            .rows
            .iter()
            .map(|row| format!("{:03x}", row.bits()))
            .collect::<Vec<_>>()
            .join(",");
        serializer.serialize_str(&hex)
    }
}

/// Accepts either the compact hex string produced by `Serialize`, or an array
/// of `#`/`.` row strings (floor-aligned) as written by hand in state files.
impl<'de> Deserialize<'de> for BitBoard {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct BoardVisitor;

        impl<'de> de::Visitor<'de> for BoardVisitor {
            type Value = BitBoard;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    f,
                    "a string of {BOARD_HEIGHT} comma-separated hex rows or an array of ASCII rows"
                )
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let parts: Vec<&str> = s.split(',').collect();
                if parts.len() != BOARD_HEIGHT {
                    return Err(E::custom(format!(
                        "expected {BOARD_HEIGHT} comma-separated hex values, got {}",
                        parts.len()
                    )));
                }
                let mut board = BitBoard::EMPTY;
                for (y, text) in parts.iter().enumerate() {
                    let bits = u16::from_str_radix(text.trim(), 16)
                        .ok()
                        .filter(|b| b & !FULL_ROW_MASK == 0)
                        .ok_or_else(|| {
                            E::custom(BoardParseError::InvalidHex {
                                row: y,
                                text: (*text).to_owned(),
                            })
                        })?;
                    board.rows[y] = BitRow::from_bits(bits);
                }
                Ok(board)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut lines: Vec<String> = Vec::with_capacity(BOARD_HEIGHT);
                while let Some(line) = seq.next_element::<String>()? {
                    lines.push(line);
                }
                BitBoard::parse_ascii(lines.iter().map(String::as_str)).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(BoardVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let board = BitBoard::EMPTY;
        for row in 0..BitBoard::HEIGHT {
            assert_eq!(board.row_bits(row), 0);
            for col in 0..BitBoard::WIDTH {
                assert!(!board.is_occupied(row, col));
            }
        }
        assert!(board.is_empty());
        assert_eq!(board.calculate_height(), 0);
        assert_eq!(board.count_occupied(), 0);
    }

    #[test]
    fn test_set_and_clear_cell() {
        let mut board = BitBoard::EMPTY;
        board.set_cell(21, 0);
        board.set_cell(21, 9);
        assert!(board.is_occupied(21, 0));
        assert!(board.is_occupied(21, 9));
        assert!(!board.is_occupied(21, 1));
        assert_eq!(board.row_bits(21), 0b10_0000_0001);

        board.clear_cell(21, 0);
        assert!(!board.is_occupied(21, 0));
        assert_eq!(board.row_bits(21), 0b10_0000_0000);
    }

    #[test]
    fn test_row_bits_only_low_ten_bits() {
        let mut board = BitBoard::EMPTY;
        board.set_row_bits(5, 0xffff);
        assert_eq!(board.row_bits(5), FULL_ROW_MASK);
        assert!(board.row(5).is_filled());
        // walls survive any write
        assert_eq!(board.row(5).raw() & SENTINEL_MASK, SENTINEL_MASK);
    }

    #[test]
    fn test_height_and_count() {
        let board = BitBoard::from_ascii(
            "
            ....#.....
            ...###....
            ##########
            ",
        );
        assert_eq!(board.calculate_height(), 3);
        assert_eq!(board.top_row(), BitBoard::HEIGHT - 3);
        assert_eq!(board.count_occupied(), 14);
    }

    #[test]
    fn test_clone_is_independent() {
        let board = BitBoard::from_ascii("#.........");
        let mut copy = board.clone();
        copy.set_cell(0, 5);
        assert!(!board.is_occupied(0, 5));
        assert!(copy.is_occupied(0, 5));
    }

    #[test]
    fn test_clear_lines_single() {
        let mut board = BitBoard::from_ascii(
            "
            #.........
            ##########
            ",
        );
        let cleared = board.clear_lines();
        assert_eq!(cleared.len(), 1);
        assert!(cleared.contains(21));
        assert_eq!(board.row_bits(21), 0b1);
        assert_eq!(board.row_bits(20), 0);
    }

    #[test]
    fn test_clear_lines_preserves_order_of_remaining_rows() {
        let mut board = BitBoard::from_ascii(
            "
            #.........
            ##########
            .#........
            ##########
            ..#.......
            ",
        );
        let cleared = board.clear_lines();
        assert_eq!(cleared.iter().collect::<Vec<_>>(), vec![18, 20]);
        assert_eq!(board.row_bits(21), 0b100);
        assert_eq!(board.row_bits(20), 0b10);
        assert_eq!(board.row_bits(19), 0b1);
        for row in 0..19 {
            assert_eq!(board.row_bits(row), 0);
        }
    }

    #[test]
    fn test_clear_lines_nothing_to_clear_leaves_board_unchanged() {
        let board = BitBoard::from_ascii(
            "
            .###.#....
            #########.
            ",
        );
        let (after, cleared) = board.with_lines_cleared();
        assert!(cleared.is_empty());
        assert_eq!(after, board);
    }

    #[test]
    fn test_clear_lines_all_rows() {
        let mut board = BitBoard::EMPTY;
        for row in 0..BitBoard::HEIGHT {
            board.set_row_bits(row, FULL_ROW_MASK);
        }
        let cleared = board.clear_lines();
        assert_eq!(cleared.len(), BitBoard::HEIGHT);
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_lines_in_hidden_rows() {
        let mut board = BitBoard::EMPTY;
        board.set_row_bits(0, FULL_ROW_MASK);
        board.set_row_bits(1, 0b1);
        let cleared = board.clear_lines();
        assert!(cleared.contains(0));
        assert_eq!(board.row_bits(1), 0b1);
        assert_eq!(board.row_bits(0), 0);
    }

    #[test]
    fn test_from_matrix_rejects_bad_shapes() {
        let rows = vec![vec![false; 9]];
        assert_eq!(
            BitBoard::from_matrix(rows),
            Err(BoardParseError::RowWidth { row: 0, width: 9 })
        );
        let rows = vec![[false; 10]; 23];
        assert_eq!(
            BitBoard::from_matrix(rows),
            Err(BoardParseError::TooManyRows { rows: 23 })
        );
    }

    #[test]
    fn test_parse_ascii_rejects_unknown_cells() {
        let err = BitBoard::parse_ascii(["..x......."]).unwrap_err();
        assert_eq!(err, BoardParseError::InvalidCell { row: 0, cell: 'x' });
    }

    #[test]
    fn test_serialization_hex_format() {
        let board = BitBoard::from_ascii("##........");
        let serialized = serde_json::to_string(&board).unwrap();
        assert!(serialized.starts_with("\"000,"));
        assert!(serialized.ends_with(",003\""));
        let deserialized: BitBoard = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);
    }

    #[test]
    fn test_deserialize_ascii_rows() {
        let rows = serde_json::json!(["....#.....", "#########."]);
        let board: BitBoard = serde_json::from_value(rows).unwrap();
        assert_eq!(board.row_bits(21), 0b01_1111_1111);
        assert_eq!(board.row_bits(20), 0b00_0001_0000);
    }

    #[test]
    fn test_deserialize_rejects_wide_hex() {
        let mut rows = vec!["000"; BitBoard::HEIGHT];
        rows[3] = "7ff";
        let json = format!("\"{}\"", rows.join(","));
        assert!(serde_json::from_str::<BitBoard>(&json).is_err());
    }

    #[test]
    fn test_cleared_rows_serde() {
        let mut board = BitBoard::from_ascii(
            "
            ##########
            .#........
            ##########
            ",
        );
        let cleared = board.clear_lines();
        let json = serde_json::to_string(&cleared).unwrap();
        assert_eq!(json, "[19,21]");
        assert_eq!(serde_json::from_str::<ClearedRows>(&json).unwrap(), cleared);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_out_of_range_is_defensive_in_release() {
        let mut board = BitBoard::EMPTY;
        board.set_cell(BitBoard::HEIGHT, 0);
        board.set_cell(0, BitBoard::WIDTH);
        assert!(board.is_empty());
        assert!(board.is_occupied(0, BitBoard::WIDTH));
        assert_eq!(board.row_bits(BitBoard::HEIGHT), FULL_ROW_MASK);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_fails_fast_in_debug() {
        let mut board = BitBoard::EMPTY;
        board.set_cell(BitBoard::HEIGHT, 0);
    }
}
