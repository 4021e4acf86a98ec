//! Movement geometry for the simplified replay.
//!
//! These checks only answer "can a piece of this kind travel from A to B on
//! this board". They know nothing about check, pins or en passant.

use chess_core::{Color, Piece, Square};

use crate::Board;

/// Returns true if every square strictly between `from` and `to` is empty.
///
/// `from` and `to` must share a rank, file or diagonal; otherwise the
/// squares are not aligned and the path is reported as blocked.
pub(crate) fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (df, dr) = from.delta_to(to);
    if !(df == 0 || dr == 0 || df.abs() == dr.abs()) {
        return false;
    }
    let (step_f, step_r) = (df.signum(), dr.signum());
    let mut current = from;
    loop {
        current = match current.offset(step_f, step_r) {
            Some(sq) => sq,
            None => return false,
        };
        if current == to {
            return true;
        }
        if !board.is_empty(current) {
            return false;
        }
    }
}

/// Geometric reachability for non-pawn pieces, including path clearance
/// for sliders.
pub(crate) fn piece_reaches(board: &Board, piece: Piece, from: Square, to: Square) -> bool {
    let (df, dr) = from.delta_to(to);
    let (adf, adr) = (df.abs(), dr.abs());
    match piece {
        Piece::Knight => (adf == 1 && adr == 2) || (adf == 2 && adr == 1),
        Piece::King => adf <= 1 && adr <= 1 && (adf, adr) != (0, 0),
        Piece::Bishop => adf == adr && adf != 0 && path_clear(board, from, to),
        Piece::Rook => (adf == 0) != (adr == 0) && path_clear(board, from, to),
        Piece::Queen => {
            let diagonal = adf == adr && adf != 0;
            let straight = (adf == 0) != (adr == 0);
            (diagonal || straight) && path_clear(board, from, to)
        }
        Piece::Pawn => false,
    }
}

/// Forward pawn push: one square onto an empty square, or two squares from
/// the starting rank with the intermediate square empty too.
pub(crate) fn pawn_pushes(board: &Board, color: Color, from: Square, to: Square) -> bool {
    let (df, dr) = from.delta_to(to);
    if df != 0 || !board.is_empty(to) {
        return false;
    }
    let dir = color.pawn_direction();
    if dr == dir {
        return true;
    }
    if dr == 2 * dir && from.rank().index() == color.pawn_rank() {
        return from.offset(0, dir).is_some_and(|mid| board.is_empty(mid));
    }
    false
}

/// Diagonal pawn capture onto a square held by the opponent.
pub(crate) fn pawn_captures(board: &Board, color: Color, from: Square, to: Square) -> bool {
    let (df, dr) = from.delta_to(to);
    df.abs() == 1
        && dr == color.pawn_direction()
        && board
            .occupant(to)
            .is_some_and(|occ| occ.color == color.opposite())
}
