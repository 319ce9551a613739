use std::ops::{Deref, DerefMut};

use tetrabeam_engine::{BitBoard, GeneratedMove, PieceKind};

/// A partial move sequence kept in the beam.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Board after every placement on the path.
    pub(crate) board: BitBoard,
    pub(crate) held: Option<PieceKind>,
    /// Index into the queue of the next piece to play.
    pub(crate) cursor: usize,
    /// Sum of the evaluation scores along the path.
    pub(crate) score: f32,
    /// Placements on the path.
    pub(crate) plies: u16,
    /// Index of the root candidate the path starts with.
    pub(crate) root: usize,
    /// Cleared to stop expanding a path whose next piece cannot spawn.
    pub(crate) alive: bool,
}

impl Node {
    /// Mean score per placement; the beam is ranked by this so that paths
    /// cut short by the end of the queue compare with longer ones.
    pub(crate) fn value(&self) -> f32 {
        self.score / f32::from(self.plies.max(1))
    }
}

/// Scratch buffers whose capacity is kept from one decision to the next.
#[derive(Debug, Default)]
pub(crate) struct SearchBuffers {
    pub(crate) moves: Vec<GeneratedMove>,
    pub(crate) beam: Vec<Node>,
    pub(crate) next: Vec<Node>,
}

impl SearchBuffers {
    fn clear(&mut self) {
        self.moves.clear();
        self.beam.clear();
        self.next.clear();
    }
}

#[derive(Debug, Default)]
pub(crate) struct SearchArena {
    buffers: SearchBuffers,
}

impl SearchArena {
    /// Borrows the buffers for one search. They are empty on entry and are
    /// emptied again when the lease is dropped.
    pub(crate) fn lease(&mut self) -> ArenaLease<'_> {
        self.buffers.clear();
        ArenaLease {
            buffers: &mut self.buffers,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ArenaLease<'a> {
    buffers: &'a mut SearchBuffers,
}

impl Deref for ArenaLease<'_> {
    type Target = SearchBuffers;

    fn deref(&self) -> &Self::Target {
        self.buffers
    }
}

impl DerefMut for ArenaLease<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buffers
    }
}

impl Drop for ArenaLease<'_> {
    fn drop(&mut self) {
        self.buffers.clear();
    }
}
