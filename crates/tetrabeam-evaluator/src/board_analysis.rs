//! Lazily computed board metrics.
//!
//! [`BoardAnalysis`] owns a copy of a board and computes each metric the first
//! time it is asked for, so a profile that ignores a feature never pays for it.
//!
//! Metrics that look at neighbouring cells work on the sentinel-padded row
//! representation ([`BitRow::raw`]): the walls are filled cells, so a column
//! against a wall can be a well and a row never "opens" into the wall.

use std::{cell::OnceCell, iter};

use tetrabeam_engine::{BitBoard, BitRow};

const WIDTH: usize = BitBoard::WIDTH;

// Pairs (bit i, bit i + 1) from the left wall to the right wall.
const ROW_TRANSITION_MASK: u16 = BitRow::RAW_PLAYABLE_MASK | (BitRow::RAW_PLAYABLE_MASK >> 1);

/// Deepest open well that still counts toward [`BoardAnalysis::well_open`].
pub const WELL_OPEN_CAP: u8 = 4;

/// Minimum filled cells for a row to count as a potential line.
const POTENTIAL_LINE_CELLS: u32 = WIDTH as u32 - 2;

#[derive(Debug, Clone, Copy)]
struct HoleStats {
    holes: u32,
    blocks_above_holes: u32,
}

#[derive(Debug, Clone, Copy)]
struct WellStats {
    cumulative_depth: u32,
    open_depth: u8,
}

#[derive(Debug, Clone, Copy)]
struct TSlotStats {
    open_notches: u32,
    twist_slots: u32,
}

#[derive(Debug)]
pub struct BoardAnalysis {
    board: BitBoard,
    column_heights: OnceCell<[u8; WIDTH]>,
    max_height: OnceCell<u8>,
    occupied_cells: OnceCell<u32>,
    hole_stats: OnceCell<HoleStats>,
    well_stats: OnceCell<WellStats>,
    t_slot_stats: OnceCell<TSlotStats>,
    row_transitions: OnceCell<u32>,
    column_transitions: OnceCell<u32>,
    bumpiness: OnceCell<u32>,
    potential_lines: OnceCell<u32>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &BitBoard) -> Self {
        Self::new(board.clone())
    }

    #[must_use]
    pub fn new(board: BitBoard) -> Self {
        Self {
            board,
            column_heights: OnceCell::new(),
            max_height: OnceCell::new(),
            occupied_cells: OnceCell::new(),
            hole_stats: OnceCell::new(),
            well_stats: OnceCell::new(),
            t_slot_stats: OnceCell::new(),
            row_transitions: OnceCell::new(),
            column_transitions: OnceCell::new(),
            bumpiness: OnceCell::new(),
            potential_lines: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    #[must_use]
    pub fn into_board(self) -> BitBoard {
        self.board
    }

    /// Height of every column measured from the floor.
    #[must_use]
    pub fn column_heights(&self) -> &[u8; WIDTH] {
        self.column_heights.get_or_init(|| {
            let mut heights = [0; WIDTH];
            let mut seen = 0u16;
            for (y, row) in self.board.rows().enumerate() {
                let fresh = row.bits() & !seen;
                for x in bit_indices(fresh) {
                    heights[x] = height_at(y);
                }
                seen |= fresh;
            }
            heights
        })
    }

    #[must_use]
    pub fn max_height(&self) -> u8 {
        *self
            .max_height
            .get_or_init(|| self.column_heights().iter().copied().max().unwrap_or(0))
    }

    #[must_use]
    pub fn occupied_cells(&self) -> u32 {
        *self
            .occupied_cells
            .get_or_init(|| self.board.count_occupied())
    }

    /// Empty cells with at least one filled cell above them in the same column.
    #[must_use]
    pub fn holes(&self) -> u32 {
        self.hole_stats().holes
    }

    /// For every hole, the number of filled cells stacked above it.
    #[must_use]
    pub fn blocks_above_holes(&self) -> u32 {
        self.hole_stats().blocks_above_holes
    }

    fn hole_stats(&self) -> HoleStats {
        *self.hole_stats.get_or_init(|| {
            let mut covered = 0u16;
            let mut filled_above = [0u32; WIDTH];
            let mut stats = HoleStats {
                holes: 0,
                blocks_above_holes: 0,
            };
            for row in self.board.rows() {
                let bits = row.bits();
                let holes = covered & !bits & BitBoard::FULL_ROW_MASK;
                stats.holes += holes.count_ones();
                stats.blocks_above_holes += bit_indices(holes).map(|x| filled_above[x]).sum::<u32>();
                for x in bit_indices(bits) {
                    filled_above[x] += 1;
                }
                covered |= bits;
            }
            stats
        })
    }

    /// Sum over every well of `1 + 2 + ... + depth`, walls counted as filled.
    #[must_use]
    pub fn cumulative_wells(&self) -> u32 {
        self.well_stats().cumulative_depth
    }

    /// Depth of the deepest well reachable straight from the top, capped at
    /// [`WELL_OPEN_CAP`].
    #[must_use]
    pub fn well_open(&self) -> u8 {
        self.well_stats().open_depth
    }

    fn well_stats(&self) -> WellStats {
        *self.well_stats.get_or_init(|| {
            let mut runs = [0u32; WIDTH];
            let mut open_runs = [0u8; WIDTH];
            let mut covered = 0u16;
            let mut cumulative_depth = 0;
            for row in self.board.rows() {
                let raw = row.raw();
                let wells = BitRow::raw_to_bits(!raw & (raw << 1) & (raw >> 1));
                let open = wells & !covered;
                for (x, (run, open_run)) in iter::zip(&mut runs, &mut open_runs).enumerate() {
                    let bit = 1 << x;
                    if wells & bit == 0 {
                        *run = 0;
                    } else {
                        *run += 1;
                        cumulative_depth += *run;
                    }
                    if open & bit != 0 {
                        *open_run = open_run.saturating_add(1);
                    }
                }
                covered |= row.bits();
            }
            let open_depth = open_runs.iter().copied().max().unwrap_or(0);
            WellStats {
                cumulative_depth,
                open_depth: open_depth.min(WELL_OPEN_CAP),
            }
        })
    }

    /// Places a T could still go: open notches plus one-sided twist slots.
    #[must_use]
    pub fn escape_routes(&self) -> u32 {
        let stats = self.t_slot_stats();
        stats.open_notches + stats.twist_slots
    }

    /// One-cell notches whose row above is blocked on exactly one side, the
    /// shape a T needs a rotation to get into.
    #[must_use]
    pub fn twist_slots(&self) -> u32 {
        self.t_slot_stats().twist_slots
    }

    /// One-cell notches a flat-side-down T can drop into from the top.
    #[must_use]
    pub fn open_t_notches(&self) -> u32 {
        self.t_slot_stats().open_notches
    }

    fn t_slot_stats(&self) -> TSlotStats {
        *self.t_slot_stats.get_or_init(|| {
            let mut stats = TSlotStats {
                open_notches: 0,
                twist_slots: 0,
            };
            // everything above `above`, walls included
            let mut covered = 0u16;
            for (above, current) in iter::zip(self.board.rows(), self.board.rows().skip(1)) {
                let (a, c) = (above.raw(), current.raw());
                let notch = !c & (c << 1) & (c >> 1) & BitRow::RAW_PLAYABLE_MASK;
                if notch != 0 {
                    let empty_above = !a;
                    let wide_open = empty_above & (empty_above << 1) & (empty_above >> 1);
                    let uncovered = !covered;
                    let reachable = uncovered & (uncovered << 1) & (uncovered >> 1);
                    stats.open_notches += (notch & wide_open & reachable).count_ones();

                    let one_side = ((a << 1) ^ (a >> 1)) & empty_above;
                    stats.twist_slots += (notch & one_side).count_ones();
                }
                covered |= a;
            }
            stats
        })
    }

    /// Filled/empty changes along each row, walls included.
    #[must_use]
    pub fn row_transitions(&self) -> u32 {
        *self.row_transitions.get_or_init(|| {
            self.board
                .rows()
                .map(|row| {
                    let raw = row.raw();
                    ((raw ^ (raw >> 1)) & ROW_TRANSITION_MASK).count_ones()
                })
                .sum()
        })
    }

    /// Filled/empty changes down each column, the floor counted as filled.
    #[must_use]
    pub fn column_transitions(&self) -> u32 {
        *self.column_transitions.get_or_init(|| {
            let mut rows = self.board.rows().map(BitRow::bits);
            let Some(mut prev) = rows.next() else {
                return 0;
            };
            let mut transitions = 0;
            for bits in rows {
                transitions += (prev ^ bits).count_ones();
                prev = bits;
            }
            transitions + (!prev & BitBoard::FULL_ROW_MASK).count_ones()
        })
    }

    #[must_use]
    pub fn bumpiness(&self) -> u32 {
        *self.bumpiness.get_or_init(|| {
            self.column_heights()
                .windows(2)
                .map(|w| {
                    let left = i32::from(w[0]);
                    let right = i32::from(w[1]);
                    (right - left).unsigned_abs()
                })
                .sum()
        })
    }

    /// Rows that are neither empty nor full and miss at most two cells.
    #[must_use]
    pub fn potential_lines(&self) -> u32 {
        *self.potential_lines.get_or_init(|| {
            let count = self
                .board
                .rows()
                .filter(|row| {
                    !row.is_empty() && !row.is_filled() && row.count_occupied() >= POTENTIAL_LINE_CELLS
                })
                .count();
            u32::try_from(count).unwrap_or(u32::MAX)
        })
    }

    /// Filled cells over the capacity of the non-empty rows; 1.0 on an empty
    /// board.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn row_fill_ratio(&self) -> f32 {
        let nonempty_rows = self.board.rows().filter(|row| !row.is_empty()).count();
        if nonempty_rows == 0 {
            return 1.0;
        }
        self.occupied_cells() as f32 / (nonempty_rows * WIDTH) as f32
    }
}

#[expect(clippy::cast_possible_truncation)]
fn height_at(y: usize) -> u8 {
    (BitBoard::HEIGHT - y) as u8
}

/// Column indices of the set bits of `mask`, lowest first.
pub(crate) fn bit_indices(mut mask: u16) -> impl Iterator<Item = usize> {
    iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let index = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(index)
    })
}
