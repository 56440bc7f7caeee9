use crate::bitboard::{adjacent_squares_bb, grid_bb, RANK_1, RANK_8};
use crate::board::{
    Board, Color, Piece, Variant, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ,
};
use crate::moves::pawn::pawn_attacks;
use crate::moves::square_control::{
    attacks_from, is_square_attacked, is_square_attacked_grid,
};
use crate::moves::types::{Move, MoveKind};
use crate::square::Square;
use crate::utils::pop_lsb;

/// Helper: clear a piece bit and table entry at `sq`.
#[inline(always)]
fn remove_piece(board: &mut Board, color: Color, piece: Piece, sq: Square) {
    let new_bb = board.pieces(piece, color) & !sq.bb();
    board.set_bb(color, piece, new_bb);
}

/// Helper: set a piece bit and table entry at `sq`.
#[inline(always)]
fn place_piece(board: &mut Board, color: Color, piece: Piece, sq: Square) {
    let new_bb = board.pieces(piece, color) | sq.bb();
    board.set_bb(color, piece, new_bb);
}

impl Board {
    /// Applies a generated move to a copy of the position. The original is
    /// untouched; callers in search and perft keep their own stack of boards.
    pub fn make_move(&self, mv: Move) -> Board {
        let mut next = self.clone();
        next.apply_move(mv);
        next
    }

    fn apply_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = us.opposite();
        self.en_passant = None;
        let mut reset_clock = false;

        match mv.kind {
            MoveKind::Drop(color, piece) => {
                debug_assert_eq!(color, us, "drop color must match side to move");
                self.take_from_hand(us, piece);
                place_piece(self, us, piece, mv.to);
                reset_clock = piece == Piece::Pawn;
            }
            MoveKind::Castling => {
                // Encoded king-from, rook-square; both land on fixed files.
                let kingside = mv.to.file() > mv.from.file();
                let rank = mv.from.rank();
                remove_piece(self, us, Piece::King, mv.from);
                remove_piece(self, us, Piece::Rook, mv.to);
                let (king_file, rook_file) = if kingside { (6, 5) } else { (2, 3) };
                place_piece(self, us, Piece::King, Square::make(king_file, rank));
                place_piece(self, us, Piece::Rook, Square::make(rook_file, rank));
            }
            _ => {
                let piece = match self.piece_at(mv.from) {
                    Some((_, p)) => p,
                    None => panic!("no piece to move on {}", mv.from),
                };

                let captured: Option<(Square, Piece)> = if mv.is_en_passant() {
                    let cap = Square::from_index(match us {
                        Color::White => mv.to.index() - 8,
                        Color::Black => mv.to.index() + 8,
                    });
                    Some((cap, Piece::Pawn))
                } else {
                    self.piece_at(mv.to).map(|(c, p)| {
                        debug_assert_eq!(c, them, "capture target must be an enemy piece");
                        (mv.to, p)
                    })
                };

                if let Some((cap_sq, cap_piece)) = captured {
                    remove_piece(self, them, cap_piece, cap_sq);
                    if self.is_house() {
                        self.add_to_hand(us, cap_piece);
                    }
                    reset_clock = true;
                }

                remove_piece(self, us, piece, mv.from);

                if captured.is_some() && self.is_atomic() {
                    // The capture square's neighborhood explodes; the
                    // capturing piece is consumed, pawns stay put.
                    let mut blast = adjacent_squares_bb(mv.to.bb());
                    while blast != 0 {
                        let sq = Square::from_index(pop_lsb(&mut blast));
                        if let Some((c, p)) = self.piece_at(sq) {
                            if p != Piece::Pawn {
                                remove_piece(self, c, p, sq);
                            }
                        }
                    }
                } else {
                    let placed = mv.promoted_to().unwrap_or(piece);
                    place_piece(self, us, placed, mv.to);
                }

                if piece == Piece::Pawn {
                    reset_clock = true;
                    let double_push = match us {
                        Color::White => mv.from.rank() == 1 && mv.to.rank() == 3,
                        Color::Black => mv.from.rank() == 6 && mv.to.rank() == 4,
                    };
                    if double_push {
                        self.en_passant = Some(Square::make(mv.from.file(), match us {
                            Color::White => 2,
                            Color::Black => 5,
                        }));
                    }
                }
            }
        }

        self.prune_castling_rights();

        self.halfmove_clock = if reset_clock {
            0
        } else {
            self.halfmove_clock + 1
        };
        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;
    }

    /// A castling right survives only while its rook sits on the home corner
    /// and a king stands on the castling square. Covers ordinary rook/king
    /// moves, corner captures, and atomic blasts in one place.
    fn prune_castling_rights(&mut self) {
        if self.castling_rights == 0 {
            return;
        }
        let e1 = Square::from_index(4).bb();
        let e8 = Square::from_index(60).bb();
        let white_king_home = self.pieces(Piece::King, Color::White) & e1 != 0;
        let black_king_home = self.pieces(Piece::King, Color::Black) & e8 != 0;
        let white_rooks = self.pieces(Piece::Rook, Color::White);
        let black_rooks = self.pieces(Piece::Rook, Color::Black);

        let mut rights = self.castling_rights;
        if !white_king_home || white_rooks & (1u64 << 7) == 0 {
            rights &= !CASTLE_WK;
        }
        if !white_king_home || white_rooks & 1u64 == 0 {
            rights &= !CASTLE_WQ;
        }
        if !black_king_home || black_rooks & (1u64 << 63) == 0 {
            rights &= !CASTLE_BK;
        }
        if !black_king_home || black_rooks & (1u64 << 56) == 0 {
            rights &= !CASTLE_BQ;
        }
        self.castling_rights = rights;
    }

    /// Castling path test: every square the king crosses, endpoints included,
    /// must be safe.
    fn castling_path_safe(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let them = us.opposite();
        let kingside = mv.to.file() > mv.from.file();
        let rank = mv.from.rank();
        let dest_file = if kingside { 6 } else { 2 };

        let mut file = mv.from.file();
        loop {
            if is_square_attacked(self, Square::make(file, rank), them) {
                return false;
            }
            if file == dest_file {
                return true;
            }
            if kingside {
                file += 1;
            } else {
                file -= 1;
            }
        }
    }

    /// Variant-aware legality oracle for a pseudo-legal move.
    pub fn legal(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let them = us.opposite();

        match self.variant {
            // No royal king: everything the generator emits stands.
            Variant::Anti | Variant::Extinction => true,
            _ if mv.is_drop() => true,
            Variant::Atomic => {
                if mv.is_castling() && !self.castling_path_safe(mv) {
                    return false;
                }
                let next = self.make_move(mv);
                if next.pieces(Piece::King, us) == 0 {
                    return false;
                }
                if next.pieces(Piece::King, them) == 0 {
                    return true;
                }
                // Touching kings shield every check.
                if adjacent_squares_bb(next.pieces(Piece::King, us))
                    & next.pieces(Piece::King, them)
                    != 0
                {
                    return true;
                }
                let ksq = next.king_square(us).expect("king checked above");
                !is_square_attacked(&next, ksq, them)
            }
            Variant::Grid => {
                if mv.is_castling() {
                    if !self.castling_path_safe(mv) {
                        return false;
                    }
                } else if grid_bb(mv.from) & mv.to.bb() != 0 {
                    return false; // must cross a grid line
                }
                let next = self.make_move(mv);
                match next.king_square(us) {
                    None => true,
                    Some(k) => !is_square_attacked_grid(&next, k, them),
                }
            }
            Variant::Race => {
                // Checks are outlawed outright: neither king may end up
                // attacked, whichever side it belongs to.
                let next = self.make_move(mv);
                for color in [Color::White, Color::Black] {
                    if let Some(k) = next.king_square(color) {
                        if is_square_attacked(&next, k, color.opposite()) {
                            return false;
                        }
                    }
                }
                true
            }
            Variant::TwoKings => {
                if mv.is_castling() && !self.castling_path_safe(mv) {
                    return false;
                }
                let next = self.make_move(mv);
                let mut kings = next.pieces(Piece::King, us);
                while kings != 0 {
                    let sq = Square::from_index(pop_lsb(&mut kings));
                    if is_square_attacked(&next, sq, them) {
                        return false;
                    }
                }
                true
            }
            // Standard, crazyhouse, horde, losers: the royal king (when the
            // side has one) must not be left attacked.
            _ => {
                if mv.is_castling() {
                    return self.castling_path_safe(mv);
                }
                let next = self.make_move(mv);
                match next.king_square(us) {
                    None => true,
                    Some(k) => !is_square_attacked(&next, k, them),
                }
            }
        }
    }

    /// True when the move takes an enemy piece (en passant included).
    #[inline(always)]
    pub fn is_capture(&self, mv: Move) -> bool {
        mv.is_en_passant()
            || (!mv.is_castling() && self.occupancy(self.side_to_move.opposite()) & mv.to.bb() != 0)
    }

    /// Does the side to move have any capture at all? Kings count as
    /// capturers here; anti chess has no royalty.
    pub fn can_capture(&self) -> bool {
        let us = self.side_to_move;
        let them = us.opposite();
        let occ = self.occupied();
        let enemy = self.occupancy(them);

        if let Some(ep) = self.en_passant {
            if pawn_attacks(ep.index(), them) & self.pieces(Piece::Pawn, us) != 0 {
                return true;
            }
        }

        let mut own = self.occupancy(us);
        while own != 0 {
            let sq = pop_lsb(&mut own);
            let piece = self
                .piece_type_at(Square::from_index(sq))
                .expect("occupancy bit without piece");
            if attacks_from(piece, us, sq, occ) & enemy != 0 {
                return true;
            }
        }
        false
    }

    /// Losers keeps the royal king, so only captures that survive the
    /// legality oracle enforce the mandate.
    pub fn can_capture_losers(&self) -> bool {
        let us = self.side_to_move;
        let them = us.opposite();
        let occ = self.occupied();
        let enemy = self.occupancy(them);
        let last_rank = match us {
            Color::White => RANK_8,
            Color::Black => RANK_1,
        };

        if let Some(ep) = self.en_passant {
            let mut attackers = pawn_attacks(ep.index(), them) & self.pieces(Piece::Pawn, us);
            while attackers != 0 {
                let from = Square::from_index(pop_lsb(&mut attackers));
                if self.legal(Move::en_passant(from, ep)) {
                    return true;
                }
            }
        }

        let mut own = self.occupancy(us);
        while own != 0 {
            let from_idx = pop_lsb(&mut own);
            let from = Square::from_index(from_idx);
            let piece = self.piece_type_at(from).expect("occupancy bit without piece");
            let mut targets = attacks_from(piece, us, from_idx, occ) & enemy;
            while targets != 0 {
                let to = Square::from_index(pop_lsb(&mut targets));
                let mv = if piece == Piece::Pawn && to.bb() & last_rank != 0 {
                    Move::promotion(from, to, Piece::Queen)
                } else {
                    Move::new(from, to)
                };
                if self.legal(mv) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether the variant's own winning condition already fired. Checkmate
    /// and stalemate stay the caller's business.
    pub fn is_variant_end(&self) -> bool {
        match self.variant {
            Variant::Atomic => {
                self.pieces(Piece::King, Color::White) == 0
                    || self.pieces(Piece::King, Color::Black) == 0
            }
            Variant::Extinction => {
                for color in [Color::White, Color::Black] {
                    for piece in [
                        Piece::Pawn,
                        Piece::Knight,
                        Piece::Bishop,
                        Piece::Rook,
                        Piece::Queen,
                        Piece::King,
                    ] {
                        if self.pieces(piece, color) == 0 {
                            return true;
                        }
                    }
                }
                false
            }
            Variant::Race => {
                (self.pieces(Piece::King, Color::White) | self.pieces(Piece::King, Color::Black))
                    & RANK_8
                    != 0
            }
            Variant::Horde => {
                (self.is_horde_color(Color::White) && self.occupancy(Color::White) == 0)
                    || (self.is_horde_color(Color::Black) && self.occupancy(Color::Black) == 0)
            }
            Variant::Anti | Variant::Losers => {
                self.occupancy(Color::White) == 0 || self.occupancy(Color::Black) == 0
            }
            _ => false,
        }
    }
}
