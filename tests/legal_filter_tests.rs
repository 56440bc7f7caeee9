use std::str::FromStr;

use motley::board::Board;
use motley::moves::movegen::{Legal, MoveList, NonEvasions};
use motley::moves::types::Move;
use motley::square::Square;

fn has_move(moves: &[Move], from: &str, to: &str) -> bool {
    let f = Square::from_str(from).unwrap();
    let t = Square::from_str(to).unwrap();
    moves.iter().any(|m| m.from == f && m.to == t)
}

#[test]
fn self_check_is_filtered_out() {
    // White: Ke1, Re2. Black: Re8. Moving Re2->f2 exposes the e-file.
    let b: Board = "4r3/8/8/8/8/8/4R3/4K3 w - - 0 1".parse().unwrap();
    let legal = MoveList::new::<Legal>(&b);

    assert!(
        !has_move(&legal, "e2", "f2"),
        "Move e2f2 should be filtered (self-check)."
    );
    assert!(
        has_move(&legal, "e2", "e3"),
        "Moving along the pin ray stays legal."
    );
    assert!(
        has_move(&legal, "e2", "e8"),
        "Capturing the pinner stays legal."
    );
}

#[test]
fn checking_moves_are_kept() {
    // Rxe7+ is perfectly legal; giving check must not be filtered.
    let b: Board = "4k3/4n3/8/8/8/8/8/4R2K w - - 0 1".parse().unwrap();
    let legal = MoveList::new::<Legal>(&b);
    assert!(has_move(&legal, "e1", "e7"));
}

#[test]
fn en_passant_is_illegal_when_it_opens_the_fifth_rank() {
    // Ka5 and the h5 rook share rank 5; both shields vanish with b5xc6 e.p.
    let b: Board = "4k3/8/8/KPpr4/8/8/8/8 w - c6 0 1".parse().unwrap();
    let legal = MoveList::new::<Legal>(&b);
    assert!(
        !legal.iter().any(|m| m.is_en_passant()),
        "EP capture exposing the king must be filtered"
    );
}

#[test]
fn king_cannot_step_onto_attacked_squares() {
    let b: Board = "4k3/8/8/8/8/8/1r6/4K3 w - - 0 1".parse().unwrap();
    let legal = MoveList::new::<Legal>(&b);
    for to in ["d2", "e2", "f2"] {
        assert!(!has_move(&legal, "e1", to), "e1{to} walks into the rook");
    }
    assert!(has_move(&legal, "e1", "d1"));
    assert!(has_move(&legal, "e1", "f1"));
}

#[test]
fn unpinned_positions_skip_the_oracle_but_stay_correct() {
    // No pins, no checks: LEGAL equals pseudo-legal minus king suicides.
    let b: Board = "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1".parse().unwrap();
    let legal = MoveList::new::<Legal>(&b);
    let pseudo = MoveList::new::<NonEvasions>(&b);
    assert_eq!(legal.len(), pseudo.len());
    assert!(legal.iter().any(|m| m.is_castling()));
    assert_eq!(legal.iter().filter(|m| m.is_castling()).count(), 2);
}