//! A 3x3 noughts-and-crosses board used to drive the demos.

use std::fmt;

use retrace_machine::{Codec, Direction};
use retrace_patch::{
    Delta, FieldPatch, GridPatch, all_empty, apply_grid, apply_grid_in_place, diff_field,
    diff_grid,
};

pub const SIDE: usize = 3;
const EMPTY: u8 = 0;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<u8>,
    /// Player to move, 1 or 2.
    turn: u8,
    winner: Option<u8>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: vec![EMPTY; SIDE * SIDE],
            turn: 1,
            winner: None,
        }
    }
}

impl Board {
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn turn(&self) -> u8 {
        self.turn
    }

    pub fn winner(&self) -> Option<u8> {
        self.winner
    }

    /// Place the current player's mark. Returns false for an occupied or
    /// out-of-range cell, or once the game is won.
    pub fn play(&mut self, cell: usize) -> bool {
        if self.winner.is_some() || self.cells.get(cell) != Some(&EMPTY) {
            return false;
        }
        self.cells[cell] = self.turn;
        self.winner = self.find_winner();
        self.turn = 3 - self.turn;
        true
    }

    fn find_winner(&self) -> Option<u8> {
        LINES.iter().find_map(|[a, b, c]| {
            let mark = self.cells[*a];
            (mark != EMPTY && mark == self.cells[*b] && mark == self.cells[*c]).then_some(mark)
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(SIDE) {
            let line: String = row
                .iter()
                .map(|c| match c {
                    1 => 'X',
                    2 => 'O',
                    _ => '.',
                })
                .collect();
            writeln!(f, "  {line}")?;
        }
        match self.winner {
            Some(w) => write!(f, "  winner: {w}"),
            None => write!(f, "  to move: {}", self.turn),
        }
    }
}

/// Difference between two boards, one part per field.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardPatch {
    cells: GridPatch<u8>,
    turn: FieldPatch<u8>,
    winner: FieldPatch<Option<u8>>,
}

impl BoardPatch {
    pub fn diff(previous: &Board, next: &Board) -> Self {
        Self {
            cells: diff_grid(&previous.cells, &next.cells),
            turn: diff_field(&previous.turn, &next.turn),
            winner: diff_field(&previous.winner, &next.winner),
        }
    }

    pub fn apply(&self, base: &Board) -> Board {
        Board {
            cells: apply_grid(&base.cells, &self.cells, Direction::Forward),
            turn: self.turn.apply(&base.turn, Direction::Forward),
            winner: self.winner.apply(&base.winner, Direction::Forward),
        }
    }

    pub fn apply_in_place(&self, direction: Direction, board: &mut Board) {
        apply_grid_in_place(&mut board.cells, &self.cells, direction);
        self.turn.apply_in_place(&mut board.turn, direction);
        self.winner.apply_in_place(&mut board.winner, direction);
    }
}

impl Delta for BoardPatch {
    fn is_empty(&self) -> bool {
        all_empty(&[&self.cells, &self.turn, &self.winner])
    }
}

/// Codec with every capability, snapshots being plain board copies.
pub fn codec() -> Codec<Board, Board, BoardPatch> {
    Codec::new(Board::clone, |snapshot: &Board, board: &mut Board| {
        board.clone_from(snapshot)
    })
    .with_patches(BoardPatch::diff, |base: &Board, patch: &BoardPatch| patch.apply(base))
    .with_state_patcher(|patch: &BoardPatch, direction, board: &mut Board| {
        patch.apply_in_place(direction, board)
    })
    .with_empty_check(|patch: &BoardPatch| patch.is_empty())
}
