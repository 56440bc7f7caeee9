use crate::bitboard::{adjacent_squares_bb, between_bb, grid_bb, BitboardExt};
use crate::board::{Board, Color, Piece};
use crate::moves::king::KING_ATTACKS;
use crate::moves::knight::KNIGHT_ATTACKS;
use crate::moves::magic::tables;
use crate::moves::pawn::pawn_attacks;
use crate::square::Square;
use crate::utils::pop_lsb;

/// Returns a bitboard showing all the squares that *piece* could attack from
/// *square* given the blocker set.
pub fn attacks_from(piece: Piece, color: Color, square: u8, blockers: u64) -> u64 {
    let sq = square as usize;

    match piece {
        Piece::Knight => KNIGHT_ATTACKS[sq],
        Piece::King => KING_ATTACKS[sq],
        Piece::Pawn => pawn_attacks(square, color),
        Piece::Bishop => tables().bishop.get_attacks(sq, blockers),
        Piece::Rook => tables().rook.get_attacks(sq, blockers),
        Piece::Queen => tables().queen_attacks(sq, blockers),
    }
}

/// Empty-board attack set; what the piece would see with nothing in the way.
#[inline(always)]
pub fn pseudo_attacks(piece: Piece, color: Color, square: u8) -> u64 {
    attacks_from(piece, color, square, 0)
}

impl Board {
    /// Every piece of `attacker` color bearing on `sq` under occupancy `occ`.
    pub fn attackers_to(&self, sq: Square, occ: u64, attacker: Color) -> u64 {
        let idx = sq.index();
        // A square is hit by attacker pawns sitting on the squares a pawn of
        // the *defending* color would attack from `sq`.
        let pawns = pawn_attacks(idx, attacker.opposite()) & self.pieces(Piece::Pawn, attacker);
        let knights = KNIGHT_ATTACKS[idx as usize] & self.pieces(Piece::Knight, attacker);
        let kings = KING_ATTACKS[idx as usize] & self.pieces(Piece::King, attacker);

        let rook_rays = tables().rook.get_attacks(idx as usize, occ);
        let bishop_rays = tables().bishop.get_attacks(idx as usize, occ);
        let rooks = rook_rays & self.pieces(Piece::Rook, attacker);
        let bishops = bishop_rays & self.pieces(Piece::Bishop, attacker);
        let queens = (rook_rays | bishop_rays) & self.pieces(Piece::Queen, attacker);

        pawns | knights | kings | rooks | bishops | queens
    }

    /// Pieces of the side not to move that give check right now. Variants
    /// without a royal king (or with the king still in hand) report none, and
    /// two touching kings shield every check under atomic rules.
    pub fn checkers(&self) -> u64 {
        let us = self.side_to_move;
        let them = us.opposite();

        if self.is_anti() || self.is_extinction() {
            return 0;
        }
        if self.is_placement() && self.count_in_hand(us, Piece::King) > 0 {
            return 0;
        }
        let ksq = match self.king_square(us) {
            Some(sq) => sq,
            None => return 0,
        };
        if self.is_atomic()
            && adjacent_squares_bb(self.pieces(Piece::King, us)) & self.pieces(Piece::King, them)
                != 0
        {
            return 0;
        }

        let mut checkers = self.attackers_to(ksq, self.occupied(), them);
        if self.is_grid() {
            checkers &= !grid_bb(ksq);
        }
        checkers
    }

    /// Pieces (of either color) that stand alone between `c`'s king and an
    /// enemy slider: pins and discovered-check candidates.
    pub fn blockers_for_king(&self, c: Color) -> u64 {
        let ksq = match self.king_square(c) {
            Some(sq) => sq,
            None => return 0,
        };
        let them = c.opposite();
        let snipers = (pseudo_attacks(Piece::Rook, them, ksq.index())
            & (self.pieces(Piece::Rook, them) | self.pieces(Piece::Queen, them)))
            | (pseudo_attacks(Piece::Bishop, them, ksq.index())
                & (self.pieces(Piece::Bishop, them) | self.pieces(Piece::Queen, them)));
        let occupancy = self.occupied() ^ snipers;

        let mut blockers = 0u64;
        let mut rest = snipers;
        while rest != 0 {
            let sniper = Square::from_index(pop_lsb(&mut rest));
            let b = between_bb(sniper, ksq) & occupancy;
            if b != 0 && !b.more_than_one() {
                blockers |= b;
            }
        }
        blockers
    }

    /// Squares from which a piece of type `pt`, owned by the side to move,
    /// would directly check the enemy king.
    pub fn check_squares(&self, pt: Piece) -> u64 {
        let them = self.side_to_move.opposite();
        let ksq = match self.king_square(them) {
            Some(sq) => sq,
            None => return 0,
        };
        match pt {
            Piece::King => 0,
            _ => attacks_from(pt, them, ksq.index(), self.occupied()),
        }
    }
}

pub fn is_square_attacked(board: &Board, square: Square, attacker: Color) -> bool {
    board.attackers_to(square, board.occupied(), attacker) != 0
}

/// Grid-aware attack test: attackers inside the target's own cell see nothing.
pub fn is_square_attacked_grid(board: &Board, square: Square, attacker: Color) -> bool {
    board.attackers_to(square, board.occupied(), attacker) & !grid_bb(square) != 0
}

#[inline(always)]
pub fn in_check(board: &Board, side: Color) -> bool {
    match board.king_square(side) {
        Some(king_sq) => is_square_attacked(board, king_sq, side.opposite()),
        None => false,
    }
}
