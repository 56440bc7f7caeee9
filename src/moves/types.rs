use crate::board::{Color, Piece};
use crate::square::Square;
use arrayvec::ArrayVec;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Upper bound on moves in one position. Standard chess peaks near 218;
/// drop variants can go far beyond that.
pub const MAX_MOVES: usize = 1024;

pub trait MoveBuffer: Deref<Target = [Move]> + DerefMut {
    fn push(&mut self, mv: Move);
    fn clear(&mut self);
    fn truncate(&mut self, len: usize);
}

impl MoveBuffer for Vec<Move> {
    fn push(&mut self, mv: Move) {
        self.push(mv);
    }
    fn clear(&mut self) {
        self.clear();
    }
    fn truncate(&mut self, len: usize) {
        self.truncate(len);
    }
}

impl<const N: usize> MoveBuffer for ArrayVec<Move, N> {
    fn push(&mut self, mv: Move) {
        self.push(mv);
    }
    fn clear(&mut self) {
        self.clear();
    }
    fn truncate(&mut self, len: usize) {
        self.truncate(len);
    }
}

/// What kind of move this is; promotions carry the piece promoted to and
/// drops the piece leaving the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    Promotion(Piece),
    EnPassant,
    Castling,
    Drop(Color, Piece),
}

/// A generated move. Castling is encoded king-from, rook-to (the rook's home
/// square), so `to` may hold an own piece for that kind alone. For drops,
/// `from` equals `to` and carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
}

impl Move {
    #[inline(always)]
    pub fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            kind: MoveKind::Normal,
        }
    }

    #[inline(always)]
    pub fn promotion(from: Square, to: Square, promo: Piece) -> Self {
        Move {
            from,
            to,
            kind: MoveKind::Promotion(promo),
        }
    }

    #[inline(always)]
    pub fn en_passant(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            kind: MoveKind::EnPassant,
        }
    }

    #[inline(always)]
    pub fn castling(king_from: Square, rook_to: Square) -> Self {
        Move {
            from: king_from,
            to: rook_to,
            kind: MoveKind::Castling,
        }
    }

    #[inline(always)]
    pub fn drop(color: Color, piece: Piece, to: Square) -> Self {
        Move {
            from: to,
            to,
            kind: MoveKind::Drop(color, piece),
        }
    }

    #[inline(always)]
    pub fn is_promotion(&self) -> bool {
        matches!(self.kind, MoveKind::Promotion(_))
    }

    #[inline(always)]
    pub fn is_en_passant(&self) -> bool {
        self.kind == MoveKind::EnPassant
    }

    #[inline(always)]
    pub fn is_castling(&self) -> bool {
        self.kind == MoveKind::Castling
    }

    #[inline(always)]
    pub fn is_drop(&self) -> bool {
        matches!(self.kind, MoveKind::Drop(..))
    }

    #[inline(always)]
    pub fn promoted_to(&self) -> Option<Piece> {
        match self.kind {
            MoveKind::Promotion(p) => Some(p),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn dropped(&self) -> Option<(Color, Piece)> {
        match self.kind {
            MoveKind::Drop(c, p) => Some((c, p)),
            _ => None,
        }
    }

    pub fn to_uci(&self) -> String {
        if let MoveKind::Drop(_, piece) = self.kind {
            let c = match piece {
                Piece::Pawn => 'P',
                Piece::Knight => 'N',
                Piece::Bishop => 'B',
                Piece::Rook => 'R',
                Piece::Queen => 'Q',
                Piece::King => 'K',
            };
            return format!("{}@{}", c, self.to);
        }
        let promo = match self.kind {
            MoveKind::Promotion(Piece::Queen) => "q",
            MoveKind::Promotion(Piece::Rook) => "r",
            MoveKind::Promotion(Piece::Bishop) => "b",
            MoveKind::Promotion(Piece::Knight) => "n",
            MoveKind::Promotion(Piece::King) => "k",
            _ => "",
        };
        format!("{}{}{}", self.from, self.to, promo)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())?;
        if f.alternate() {
            if self.is_castling() {
                write!(f, " (castle)")?;
            } else if self.is_en_passant() {
                write!(f, " (ep)")?;
            }
        }
        Ok(())
    }
}
