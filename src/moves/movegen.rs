use crate::bitboard::{
    adjacent_squares_bb, between_bb, file_bb, grid_bb, line_bb, passed_pawn_span, pawn_push,
    shift, stepped_from, BitboardExt, Direction, RANK_1, RANK_2, RANK_3, RANK_6, RANK_7, RANK_8,
};
use crate::bitboard::DARK_SQUARES;
use crate::board::{
    Board, Color, Piece, Variant, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ,
};
use crate::moves::king::KING_ATTACKS;
use crate::moves::knight::KNIGHT_ATTACKS;
use crate::moves::pawn::pawn_attacks;
use crate::moves::square_control::{attacks_from, pseudo_attacks};
use crate::moves::types::{Move, MoveBuffer, MAX_MOVES};
use crate::square::Square;
use crate::utils::{bit, pop_lsb};
use arrayvec::ArrayVec;

/// Runtime tag mirrored by the `GenType` marker types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenKind {
    Captures,
    Quiets,
    QuietChecks,
    Evasions,
    NonEvasions,
    Legal,
}

/// One zero-sized marker per generation mode; the emitters are generic over
/// these so every mode gets its own monomorphized pipeline with the mode
/// branches folded away.
pub trait GenType {
    const KIND: GenKind;
    const CHECKS: bool = false;
}

pub struct Captures;
pub struct Quiets;
pub struct QuietChecks;
pub struct Evasions;
pub struct NonEvasions;
pub struct Legal;

impl GenType for Captures {
    const KIND: GenKind = GenKind::Captures;
}
impl GenType for Quiets {
    const KIND: GenKind = GenKind::Quiets;
}
impl GenType for QuietChecks {
    const KIND: GenKind = GenKind::QuietChecks;
    const CHECKS: bool = true;
}
impl GenType for Evasions {
    const KIND: GenKind = GenKind::Evasions;
}
impl GenType for NonEvasions {
    const KIND: GenKind = GenKind::NonEvasions;
}
impl GenType for Legal {
    const KIND: GenKind = GenKind::Legal;
}

/// Marker types for the active rule set. Variant dispatch happens once at the
/// top of `generate`; inside the emitters `V::V` is a constant and the dead
/// overlays vanish per instantiation.
pub trait VariantSpec {
    const V: Variant;
}

pub struct Chess;
pub struct Anti;
pub struct Atomic;
pub struct Crazyhouse;
pub struct Extinction;
pub struct Grid;
pub struct Horde;
pub struct Losers;
pub struct Race;
pub struct TwoKings;

impl VariantSpec for Chess {
    const V: Variant = Variant::Standard;
}
impl VariantSpec for Anti {
    const V: Variant = Variant::Anti;
}
impl VariantSpec for Atomic {
    const V: Variant = Variant::Atomic;
}
impl VariantSpec for Crazyhouse {
    const V: Variant = Variant::Crazyhouse;
}
impl VariantSpec for Extinction {
    const V: Variant = Variant::Extinction;
}
impl VariantSpec for Grid {
    const V: Variant = Variant::Grid;
}
impl VariantSpec for Horde {
    const V: Variant = Variant::Horde;
}
impl VariantSpec for Losers {
    const V: Variant = Variant::Losers;
}
impl VariantSpec for Race {
    const V: Variant = Variant::Race;
}
impl VariantSpec for TwoKings {
    const V: Variant = Variant::TwoKings;
}

pub trait SideSpec {
    const US: Color;
}

pub struct White;
pub struct Black;

impl SideSpec for White {
    const US: Color = Color::White;
}
impl SideSpec for Black {
    const US: Color = Color::Black;
}

trait PieceSpec {
    const PT: Piece;
}

struct Knights;
struct Bishops;
struct Rooks;
struct Queens;

impl PieceSpec for Knights {
    const PT: Piece = Piece::Knight;
}
impl PieceSpec for Bishops {
    const PT: Piece = Piece::Bishop;
}
impl PieceSpec for Rooks {
    const PT: Piece = Piece::Rook;
}
impl PieceSpec for Queens {
    const PT: Piece = Piece::Queen;
}

/// Expands a pawn arrival on the last rank into the promotion set the variant
/// and mode call for. `dir` is the shift that brought the pawn to `to`.
fn make_promotions<V: VariantSpec, T: GenType>(
    list: &mut impl MoveBuffer,
    to: Square,
    dir: Direction,
    ksq: Option<Square>,
) {
    let from = stepped_from(to.index(), dir);

    if V::V == Variant::Anti {
        if matches!(
            T::KIND,
            GenKind::Captures | GenKind::Quiets | GenKind::NonEvasions
        ) {
            list.push(Move::promotion(from, to, Piece::Queen));
            list.push(Move::promotion(from, to, Piece::Rook));
            list.push(Move::promotion(from, to, Piece::Bishop));
            list.push(Move::promotion(from, to, Piece::Knight));
            list.push(Move::promotion(from, to, Piece::King));
        }
        return;
    }
    if V::V == Variant::Losers {
        if matches!(
            T::KIND,
            GenKind::Captures | GenKind::Quiets | GenKind::Evasions | GenKind::NonEvasions
        ) {
            list.push(Move::promotion(from, to, Piece::Queen));
            list.push(Move::promotion(from, to, Piece::Rook));
            list.push(Move::promotion(from, to, Piece::Bishop));
            list.push(Move::promotion(from, to, Piece::Knight));
        }
        return;
    }

    if matches!(
        T::KIND,
        GenKind::Captures | GenKind::Evasions | GenKind::NonEvasions
    ) {
        list.push(Move::promotion(from, to, Piece::Queen));
    }

    if matches!(
        T::KIND,
        GenKind::Quiets | GenKind::Evasions | GenKind::NonEvasions
    ) {
        list.push(Move::promotion(from, to, Piece::Rook));
        list.push(Move::promotion(from, to, Piece::Bishop));
        list.push(Move::promotion(from, to, Piece::Knight));
        if V::V == Variant::Extinction {
            list.push(Move::promotion(from, to, Piece::King));
        }
    }

    // Knight promotion is the only promotion that can give a direct check
    // not already covered by the queen promotion.
    if T::KIND == GenKind::QuietChecks {
        if let Some(k) = ksq {
            if KNIGHT_ATTACKS[to.index() as usize] & k.bb() != 0 {
                list.push(Move::promotion(from, to, Piece::Knight));
            }
        }
    }
}

/// Crazyhouse drops of one piece type onto the refined square set.
fn generate_drops<Us: SideSpec, T: GenType>(
    pos: &Board,
    list: &mut impl MoveBuffer,
    pt: Piece,
    mut b: u64,
) {
    let us = Us::US;
    if pos.count_in_hand(us, pt) == 0 {
        return;
    }

    // Placement phase forces one bishop per square color.
    if pos.is_placement() && pos.count_in_hand(us, Piece::Bishop) > 0 {
        let bishops = pos.pieces(Piece::Bishop, us);
        if pt == Piece::Bishop {
            if bishops & DARK_SQUARES != 0 {
                b &= !DARK_SQUARES;
            }
            if bishops & !DARK_SQUARES != 0 {
                b &= DARK_SQUARES;
            }
        } else {
            if bishops & DARK_SQUARES == 0 && (b & DARK_SQUARES).count_ones() <= 1 {
                b &= !DARK_SQUARES;
            }
            if bishops & !DARK_SQUARES == 0 && (b & !DARK_SQUARES).count_ones() <= 1 {
                b &= DARK_SQUARES;
            }
        }
    }

    if T::CHECKS {
        b &= pos.check_squares(pt);
    }

    while b != 0 {
        let to = Square::from_index(pop_lsb(&mut b));
        list.push(Move::drop(us, pt, to));
    }
}

/// King walker for the variants where every king moves (anti, extinction,
/// two kings).
fn generate_king_moves<Us: SideSpec>(pos: &Board, list: &mut impl MoveBuffer, target: u64) {
    let mut kings = pos.pieces(Piece::King, Us::US);
    while kings != 0 {
        let ksq = Square::from_index(pop_lsb(&mut kings));
        let mut b = KING_ATTACKS[ksq.index() as usize] & target;
        while b != 0 {
            list.push(Move::new(ksq, Square::from_index(pop_lsb(&mut b))));
        }
    }
}

fn generate_pawn_moves<V: VariantSpec, Us: SideSpec, T: GenType>(
    pos: &Board,
    list: &mut impl MoveBuffer,
    target: u64,
) {
    let us = Us::US;
    let them = us.opposite();
    let (trank7, trank3, trank2) = match us {
        Color::White => (RANK_7, RANK_3, RANK_2),
        Color::Black => (RANK_2, RANK_6, RANK_7),
    };
    let up = pawn_push(us);
    let (up_right, up_left) = match us {
        Color::White => (Direction::NorthEast, Direction::NorthWest),
        Color::Black => (Direction::SouthWest, Direction::SouthEast),
    };

    let ksq = if V::V == Variant::Horde && pos.is_horde_color(them) {
        None
    } else {
        pos.king_square(them)
    };

    let pawns_on7 = pos.pieces(Piece::Pawn, us) & trank7;
    let pawns_not_on7 = pos.pieces(Piece::Pawn, us) & !trank7;

    let mut enemies = match T::KIND {
        GenKind::Evasions => pos.occupancy(them) & target,
        GenKind::Captures => target,
        _ => pos.occupancy(them),
    };
    if V::V == Variant::Atomic {
        enemies &= if matches!(T::KIND, GenKind::Captures | GenKind::NonEvasions) {
            target
        } else {
            !adjacent_squares_bb(pos.pieces(Piece::King, us))
        };
    }

    let mut empty_squares = 0u64;

    // Single and double pawn pushes, no promotions.
    if T::KIND != GenKind::Captures {
        empty_squares = if matches!(T::KIND, GenKind::Quiets | GenKind::QuietChecks) {
            target
        } else {
            !pos.occupied()
        };
        if V::V == Variant::Anti {
            empty_squares &= target;
        }

        let mut b1 = shift(up, pawns_not_on7) & empty_squares;
        let mut b2 = shift(up, b1 & trank3) & empty_squares;
        if V::V == Variant::Horde {
            // Horde pawns on the back rank keep their double step.
            b2 = shift(up, b1 & (trank2 | trank3)) & empty_squares;
        }

        if V::V == Variant::Losers {
            b1 &= target;
            b2 &= target;
        }
        if T::KIND == GenKind::Evasions {
            // Consider only blocking squares.
            b1 &= target;
            b2 &= target;
        }

        if T::KIND == GenKind::QuietChecks {
            if let Some(k) = ksq {
                b1 &= pawn_attacks(k.index(), them);
                b2 &= pawn_attacks(k.index(), them);

                // Add pawn pushes which give discovered check. This is
                // possible only if the pawn is not on the same file as the
                // enemy king, because we do not generate captures here. A
                // discovery promotion was already emitted with the captures.
                let dc_candidates = pos.blockers_for_king(them) & pawns_not_on7;
                if dc_candidates != 0 {
                    let dc1 =
                        shift(up, dc_candidates) & empty_squares & !file_bb(k.file());
                    let dc2 = shift(up, dc1 & trank3) & empty_squares;
                    b1 |= dc1;
                    b2 |= dc2;
                }
            }
        }

        while b1 != 0 {
            let to = pop_lsb(&mut b1);
            list.push(Move::new(stepped_from(to, up), Square::from_index(to)));
        }
        while b2 != 0 {
            let to = pop_lsb(&mut b2);
            let mid = stepped_from(to, up);
            list.push(Move::new(stepped_from(mid.index(), up), Square::from_index(to)));
        }
    }

    // Promotions and underpromotions.
    if pawns_on7 != 0 {
        if T::KIND == GenKind::Captures {
            empty_squares = !pos.occupied();
            // Atomic in check: promote only where it blocks or explodes.
            if V::V == Variant::Atomic && pos.checkers() != 0 {
                empty_squares &= target;
            }
        }
        if V::V == Variant::Anti || V::V == Variant::Losers {
            empty_squares &= target;
        }
        if T::KIND == GenKind::Evasions {
            empty_squares &= target;
        }

        let mut b1 = shift(up_right, pawns_on7) & enemies;
        let mut b2 = shift(up_left, pawns_on7) & enemies;
        let mut b3 = shift(up, pawns_on7) & empty_squares;

        while b1 != 0 {
            let to = Square::from_index(pop_lsb(&mut b1));
            make_promotions::<V, T>(list, to, up_right, ksq);
        }
        while b2 != 0 {
            let to = Square::from_index(pop_lsb(&mut b2));
            make_promotions::<V, T>(list, to, up_left, ksq);
        }
        while b3 != 0 {
            let to = Square::from_index(pop_lsb(&mut b3));
            make_promotions::<V, T>(list, to, up, ksq);
        }
    }

    // Standard and en-passant captures.
    if matches!(
        T::KIND,
        GenKind::Captures | GenKind::Evasions | GenKind::NonEvasions
    ) {
        let mut b1 = shift(up_right, pawns_not_on7) & enemies;
        let mut b2 = shift(up_left, pawns_not_on7) & enemies;

        while b1 != 0 {
            let to = pop_lsb(&mut b1);
            list.push(Move::new(stepped_from(to, up_right), Square::from_index(to)));
        }
        while b2 != 0 {
            let to = pop_lsb(&mut b2);
            list.push(Move::new(stepped_from(to, up_left), Square::from_index(to)));
        }

        if let Some(ep) = pos.ep_square() {
            debug_assert_eq!(
                ep.rank(),
                match us {
                    Color::White => 5,
                    Color::Black => 2,
                },
                "en passant square must sit on relative rank 6"
            );

            // An en passant capture can be an evasion only if the checking
            // piece is the double pushed pawn and so is in the target.
            // Otherwise this is a discovery check and we are forced to do
            // something else.
            if T::KIND == GenKind::Evasions && target & stepped_from(ep.index(), up).bb() == 0 {
                return;
            }

            let mut attackers = pawns_not_on7 & pawn_attacks(ep.index(), them);
            while attackers != 0 {
                let from = Square::from_index(pop_lsb(&mut attackers));
                list.push(Move::en_passant(from, ep));
            }
        }
    }
}

/// Knight, bishop, rook and queen emission over the piece list.
fn generate_piece_moves<P: PieceSpec, T: GenType>(
    pos: &Board,
    list: &mut impl MoveBuffer,
    us: Color,
    target: u64,
) {
    debug_assert!(P::PT != Piece::King && P::PT != Piece::Pawn);

    let occ = pos.occupied();
    let check_sqs = if T::CHECKS { pos.check_squares(P::PT) } else { 0 };
    let discoverers = if T::CHECKS {
        pos.blockers_for_king(us.opposite())
    } else {
        0
    };

    let mut pieces = pos.pieces(P::PT, us);
    while pieces != 0 {
        let from = pop_lsb(&mut pieces);

        if T::CHECKS {
            // A slider that cannot reach a checking square is skipped before
            // the attack lookup; discovered checkers are handled elsewhere.
            if matches!(P::PT, Piece::Bishop | Piece::Rook | Piece::Queen)
                && pseudo_attacks(P::PT, us, from) & target & check_sqs == 0
            {
                continue;
            }
            if discoverers & bit(from) != 0 {
                continue;
            }
        }

        let mut b = attacks_from(P::PT, us, from, occ) & target;
        if T::CHECKS {
            b &= check_sqs;
        }

        let from_sq = Square::from_index(from);
        while b != 0 {
            list.push(Move::new(from_sq, Square::from_index(pop_lsb(&mut b))));
        }
    }
}

/// Composes the per-piece emitters for one (variant, side, mode) shape.
fn generate_all<V: VariantSpec, Us: SideSpec, T: GenType>(
    pos: &Board,
    list: &mut impl MoveBuffer,
    target: u64,
) {
    let us = Us::US;

    // During crazyhouse placement only drops leave the hand.
    let placement_only =
        V::V == Variant::Crazyhouse && pos.is_placement() && pos.hand_total(us) > 0;

    if !placement_only {
        generate_pawn_moves::<V, Us, T>(pos, list, target);
        generate_piece_moves::<Knights, T>(pos, list, us, target);
        generate_piece_moves::<Bishops, T>(pos, list, us, target);
        generate_piece_moves::<Rooks, T>(pos, list, us, target);
        generate_piece_moves::<Queens, T>(pos, list, us, target);
    }

    if V::V == Variant::Crazyhouse && T::KIND != GenKind::Captures && pos.hand_total(us) > 0 {
        let mut b = match T::KIND {
            GenKind::Evasions => target ^ pos.checkers(),
            GenKind::NonEvasions => target ^ pos.occupancy(us.opposite()),
            _ => target,
        };
        if pos.is_placement() {
            b &= match us {
                Color::White => RANK_1,
                Color::Black => RANK_8,
            };
        }
        generate_drops::<Us, T>(pos, list, Piece::Pawn, b & !(RANK_1 | RANK_8));
        generate_drops::<Us, T>(pos, list, Piece::Knight, b);
        generate_drops::<Us, T>(pos, list, Piece::Bishop, b);
        generate_drops::<Us, T>(pos, list, Piece::Rook, b);
        generate_drops::<Us, T>(pos, list, Piece::Queen, b);
        if pos.is_placement() {
            generate_drops::<Us, T>(pos, list, Piece::King, b);
        }
    }

    // The horde army has no king to move or castle with.
    if V::V == Variant::Horde && pos.is_horde_color(us) {
        return;
    }

    match V::V {
        Variant::Anti => {
            generate_king_moves::<Us>(pos, list, target);
            if pos.can_capture() {
                return;
            }
        }
        Variant::Extinction => generate_king_moves::<Us>(pos, list, target),
        Variant::TwoKings => {
            if T::KIND != GenKind::Evasions {
                generate_king_moves::<Us>(pos, list, target);
            }
        }
        _ => {
            if T::KIND != GenKind::QuietChecks && T::KIND != GenKind::Evasions {
                if let Some(ksq) = pos.king_square(us) {
                    let attacks = KING_ATTACKS[ksq.index() as usize];
                    let mut b = attacks & target;
                    if V::V == Variant::Race {
                        // Forward king steps count as captures, the rest as
                        // quiets; both colors race toward rank eight.
                        if T::KIND == GenKind::Captures {
                            b |= attacks
                                & passed_pawn_span(Color::White, ksq)
                                & !pos.occupied();
                        }
                        if T::KIND == GenKind::Quiets {
                            b &= !passed_pawn_span(Color::White, ksq);
                        }
                    }
                    while b != 0 {
                        list.push(Move::new(ksq, Square::from_index(pop_lsb(&mut b))));
                    }
                }
            }
        }
    }

    if T::KIND != GenKind::QuietChecks && T::KIND != GenKind::Evasions {
        let castler = match V::V {
            Variant::Extinction | Variant::TwoKings => Some(pos.castling_king_square(us)),
            Variant::Anti => {
                if pos.is_giveaway() {
                    Some(pos.castling_king_square(us))
                } else {
                    pos.king_square(us)
                }
            }
            _ => pos.king_square(us),
        };
        let mandate = V::V == Variant::Losers && pos.can_capture_losers();

        if let Some(ksq) = castler {
            if T::KIND != GenKind::Captures && !mandate {
                let (oo, ooo) = match us {
                    Color::White => (CASTLE_WK, CASTLE_WQ),
                    Color::Black => (CASTLE_BK, CASTLE_BQ),
                };
                if pos.has_castling(oo) && !pos.castling_impeded(oo) {
                    list.push(Move::castling(ksq, pos.castling_rook_square(oo)));
                }
                if pos.has_castling(ooo) && !pos.castling_impeded(ooo) {
                    list.push(Move::castling(ksq, pos.castling_rook_square(ooo)));
                }
            }
        }
    }
}

fn by_color<V: VariantSpec, T: GenType>(pos: &Board, list: &mut impl MoveBuffer, target: u64) {
    match pos.side_to_move {
        Color::White => generate_all::<V, White, T>(pos, list, target),
        Color::Black => generate_all::<V, Black, T>(pos, list, target),
    }
}

/// Single point where the runtime variant tag picks the monomorphized shape.
fn dispatch_variant<T: GenType>(pos: &Board, list: &mut impl MoveBuffer, target: u64) {
    match pos.variant() {
        Variant::Standard => by_color::<Chess, T>(pos, list, target),
        Variant::Anti => by_color::<Anti, T>(pos, list, target),
        Variant::Atomic => by_color::<Atomic, T>(pos, list, target),
        Variant::Crazyhouse => by_color::<Crazyhouse, T>(pos, list, target),
        Variant::Extinction => by_color::<Extinction, T>(pos, list, target),
        Variant::Grid => by_color::<Grid, T>(pos, list, target),
        Variant::Horde => by_color::<Horde, T>(pos, list, target),
        Variant::Losers => by_color::<Losers, T>(pos, list, target),
        Variant::Race => by_color::<Race, T>(pos, list, target),
        Variant::TwoKings => by_color::<TwoKings, T>(pos, list, target),
    }
}

/// Quiet moves that give check: discovered checks from king-line blockers
/// first, then the direct-check pass through `generate_all`.
fn generate_quiet_checks(pos: &Board, list: &mut impl MoveBuffer) {
    let us = pos.side_to_move;
    let them = us.opposite();

    if pos.is_anti() || pos.is_extinction() || pos.is_race() {
        return;
    }
    if pos.is_horde() && pos.is_horde_color(them) {
        return;
    }
    if pos.is_losers() && pos.can_capture_losers() {
        return;
    }
    if pos.is_placement() && pos.count_in_hand(them, Piece::King) > 0 {
        return;
    }

    debug_assert!(pos.checkers() == 0, "quiet checks expect a quiet position");

    let mut dc = pos.blockers_for_king(them) & pos.occupancy(us);
    while dc != 0 {
        let from = Square::from_index(pop_lsb(&mut dc));
        let pt = pos
            .piece_type_at(from)
            .expect("blocker bit without a piece");

        if pt == Piece::Pawn {
            continue; // generated together with the direct checks
        }

        let mut b = attacks_from(pt, us, from.index(), pos.occupied()) & !pos.occupied();
        if pt == Piece::King {
            // Stepping along the shared ray would not reveal the check.
            if let Some(eksq) = pos.king_square(them) {
                b &= !pseudo_attacks(Piece::Queen, them, eksq.index());
            }
        }

        while b != 0 {
            list.push(Move::new(from, Square::from_index(pop_lsb(&mut b))));
        }
    }

    dispatch_variant::<QuietChecks>(pos, list, !pos.occupied());
}

/// All pseudo-legal ways out of check.
fn generate_evasions(pos: &Board, list: &mut impl MoveBuffer) {
    let us = pos.side_to_move;
    let them = us.opposite();

    if pos.is_anti() || pos.is_extinction() || pos.is_race() {
        return;
    }
    if pos.is_placement() && pos.count_in_hand(us, Piece::King) > 0 {
        return;
    }

    let checkers = pos.checkers();
    debug_assert!(checkers != 0, "evasions expect the side to move in check");
    let ksq = match pos.king_square(us) {
        Some(k) => k,
        None => return,
    };

    let king_ring = if pos.is_atomic() {
        adjacent_squares_bb(pos.pieces(Piece::King, them))
    } else {
        0
    };

    if pos.is_atomic() {
        // Blasts that explode the opposing king or every checker count as
        // evasions too.
        let mut target = pos.occupancy(them) & (checkers | adjacent_squares_bb(checkers));
        target |= king_ring;
        target &= pos.occupancy(them) & !adjacent_squares_bb(pos.pieces(Piece::King, us));
        by_color::<Atomic, Captures>(pos, list, target);
    }

    // Squares attacked by slider checkers are stripped from the king flight
    // set up front; that skips known-illegal moves before the oracle runs.
    let mut slider_attacks = 0u64;
    let mut sliders = checkers & !pos.pieces_both(Piece::Knight, Piece::Pawn);
    while sliders != 0 {
        let checksq = Square::from_index(pop_lsb(&mut sliders));
        let ray = line_bb(checksq, ksq) ^ checksq.bb();
        if pos.is_grid() {
            slider_attacks |= ray & !grid_bb(checksq);
        } else {
            slider_attacks |= ray;
        }
    }

    if pos.is_two_kings() {
        // Every king may flee; the legality oracle sorts the rest out.
        let mut kings = pos.pieces(Piece::King, us);
        while kings != 0 {
            let k = Square::from_index(pop_lsb(&mut kings));
            let mut b = KING_ATTACKS[k.index() as usize] & !pos.occupancy(us);
            while b != 0 {
                list.push(Move::new(k, Square::from_index(pop_lsb(&mut b))));
            }
        }
    } else {
        let mut b = if pos.is_atomic() {
            // The king cannot capture, but squares beside the enemy king are
            // safe from sliders: landing there mutes the check.
            KING_ATTACKS[ksq.index() as usize]
                & !pos.occupied()
                & !(slider_attacks & !king_ring)
        } else {
            KING_ATTACKS[ksq.index() as usize] & !pos.occupancy(us) & !slider_attacks
        };
        if pos.is_losers() && pos.can_capture_losers() {
            b &= pos.occupancy(them);
        }
        while b != 0 {
            list.push(Move::new(ksq, Square::from_index(pop_lsb(&mut b))));
        }
    }

    if checkers.more_than_one() {
        return; // double check: only a king move can save the day
    }

    // Block the ray or capture the single checker.
    let checksq = Square::from_index(checkers.lsb());
    let mut target = if pos.is_atomic() {
        between_bb(checksq, ksq) // captures were handled by the blast pass
    } else {
        between_bb(checksq, ksq) | checksq.bb()
    };
    if pos.is_losers() && pos.can_capture_losers() {
        target &= pos.occupancy(them);
    }

    dispatch_variant::<Evasions>(pos, list, target);
}

/// Pseudo-legal generation plus the selective legality filter.
fn generate_legal(pos: &Board, list: &mut impl MoveBuffer) {
    if pos.is_variant_end() {
        return;
    }

    let us = pos.side_to_move;
    let pinned = pos.blockers_for_king(us) & pos.occupancy(us);
    let validate = pinned != 0
        || matches!(
            pos.variant(),
            Variant::Grid | Variant::Race | Variant::TwoKings
        );
    let ksq = pos.king_square(us);

    let start = list.len();
    if pos.checkers() != 0 {
        generate_evasions(pos, list);
    } else {
        generate::<NonEvasions>(pos, list);
    }

    let mut keep = start;
    for i in start..list.len() {
        let m = list[i];
        let suspect = !m.is_drop()
            && (validate
                || Some(m.from) == ksq
                || m.is_en_passant()
                || (pos.is_atomic() && pos.is_capture(m)));
        if !suspect || pos.legal(m) {
            list[keep] = m;
            keep += 1;
        }
    }
    list.truncate(keep);
}

/// Appends the moves of the requested mode to `list`.
///
/// `Captures`, `Quiets` and `NonEvasions` expect a position not in check;
/// `Evasions` expects one in check. `Legal` works from any position and is
/// the only mode whose output is filtered through the legality oracle.
pub fn generate<T: GenType>(pos: &Board, list: &mut impl MoveBuffer) {
    match T::KIND {
        GenKind::QuietChecks => generate_quiet_checks(pos, list),
        GenKind::Evasions => generate_evasions(pos, list),
        GenKind::Legal => generate_legal(pos, list),
        _ => {
            debug_assert!(pos.checkers() == 0, "pseudo-legal modes expect no check");
            let us = pos.side_to_move;
            let them = us.opposite();

            let mut target = match T::KIND {
                GenKind::Captures => pos.occupancy(them),
                GenKind::Quiets => !pos.occupied(),
                GenKind::NonEvasions => !pos.occupancy(us),
                _ => unreachable!(),
            };

            match pos.variant() {
                Variant::Anti => {
                    if pos.can_capture() {
                        target &= pos.occupancy(them);
                    }
                }
                Variant::Atomic => {
                    // Capturing beside the own king would blow it up.
                    if matches!(T::KIND, GenKind::Captures | GenKind::NonEvasions) {
                        target &= !(pos.occupancy(them)
                            & adjacent_squares_bb(pos.pieces(Piece::King, us)));
                    }
                }
                Variant::Losers => {
                    if pos.can_capture_losers() {
                        target &= pos.occupancy(them);
                    }
                }
                _ => {}
            }

            dispatch_variant::<T>(pos, list, target);
        }
    }
}

/// Convenience wrapper around `generate` with an inline fixed-size buffer.
pub struct MoveList {
    moves: ArrayVec<Move, MAX_MOVES>,
}

impl MoveList {
    pub fn new<T: GenType>(pos: &Board) -> MoveList {
        let mut moves = ArrayVec::new();
        generate::<T>(pos, &mut moves);
        MoveList { moves }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn contains(&self, m: Move) -> bool {
        self.moves.iter().any(|&x| x == m)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }
}

impl std::ops::Deref for MoveList {
    type Target = [Move];

    fn deref(&self) -> &Self::Target {
        &self.moves
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
