//! Board state: which piece, if any, stands on each square.

use std::fmt;

use chess_core::{Color, File, Piece, Rank, Square};

/// A colored piece standing on a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupant {
    pub color: Color,
    pub piece: Piece,
}

impl Occupant {
    #[inline]
    pub const fn new(color: Color, piece: Piece) -> Self {
        Self { color, piece }
    }
}

/// Back rank layout from the a-file to the h-file.
const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

/// Mapping from square to occupant, at most one occupant per square.
///
/// This is a plain data structure: no method checks whether a change is a
/// legal chess move.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Occupant>; 64],
}

impl Board {
    /// A board with no pieces.
    pub const fn empty() -> Self {
        Self {
            squares: [None; 64],
        }
    }

    /// The standard starting arrangement.
    pub fn starting_position() -> Self {
        let mut board = Self::empty();
        for color in [Color::White, Color::Black] {
            let back = Rank::ALL[color.back_rank() as usize];
            let pawns = Rank::ALL[color.pawn_rank() as usize];
            for (file, piece) in File::ALL.into_iter().zip(BACK_RANK) {
                board.place(Square::new(file, back), color, piece);
                board.place(Square::new(file, pawns), color, Piece::Pawn);
            }
        }
        board
    }

    /// Returns the occupant of `square`, if any.
    #[inline]
    pub fn occupant(&self, square: Square) -> Option<Occupant> {
        self.squares[square.index() as usize]
    }

    /// Returns true if nothing stands on `square`.
    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.occupant(square).is_none()
    }

    /// Puts a piece on `square`, returning whatever stood there before.
    pub fn place(&mut self, square: Square, color: Color, piece: Piece) -> Option<Occupant> {
        self.squares[square.index() as usize].replace(Occupant::new(color, piece))
    }

    /// Clears `square`, returning its former occupant.
    pub fn remove(&mut self, square: Square) -> Option<Occupant> {
        self.squares[square.index() as usize].take()
    }

    /// Removes any occupant of `to`, then relocates the piece standing on `from`.
    ///
    /// Returns the captured occupant of `to`. If `from` is empty the
    /// destination is still cleared.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Occupant> {
        let captured = self.remove(to);
        if let Some(moving) = self.remove(from) {
            self.squares[to.index() as usize] = Some(moving);
        }
        captured
    }

    /// Iterates over occupied squares from a1 to h8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Occupant)> + '_ {
        Square::all().filter_map(move |sq| self.occupant(sq).map(|occ| (sq, occ)))
    }

    /// Total number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.squares.iter().flatten().count()
    }

    /// Number of pieces of the given color and kind.
    pub fn count(&self, color: Color, piece: Piece) -> usize {
        self.squares
            .iter()
            .flatten()
            .filter(|occ| occ.color == color && occ.piece == piece)
            .count()
    }

    /// Renders the piece-placement field of a FEN string.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in Rank::ALL.into_iter().rev() {
            let mut gap = 0;
            for file in File::ALL {
                match self.occupant(Square::new(file, rank)) {
                    Some(occ) => {
                        if gap > 0 {
                            out.push(char::from(b'0' + gap));
                            gap = 0;
                        }
                        out.push(occ.piece.to_fen_char(occ.color));
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push(char::from(b'0' + gap));
            }
            if rank != Rank::R1 {
                out.push('/');
            }
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.placement())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            write!(f, "{} ", rank)?;
            for file in File::ALL {
                let c = self
                    .occupant(Square::new(file, rank))
                    .map_or('.', |occ| occ.piece.to_fen_char(occ.color));
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
