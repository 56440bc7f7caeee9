use std::str::FromStr;

use motley::board::{Board, Piece};
use motley::moves::movegen::{
    generate, Captures, Evasions, Legal, MoveList, NonEvasions, QuietChecks, Quiets,
};
use motley::moves::types::{Move, MoveKind};
use motley::square::Square;

fn sq(s: &str) -> Square {
    Square::from_str(s).unwrap()
}

fn uci_sorted(moves: &[Move]) -> Vec<String> {
    let mut v: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
    v.sort();
    v
}

fn has(moves: &[Move], from: &str, to: &str) -> bool {
    let f = sq(from);
    let t = sq(to);
    moves.iter().any(|m| m.from == f && m.to == t)
}

#[test]
fn startpos_non_evasions_is_twenty() {
    let board = Board::new();
    let moves = MoveList::new::<NonEvasions>(&board);
    assert_eq!(moves.len(), 20);
    let pawn_moves = moves.iter().filter(|m| m.from.rank() == 1).count();
    assert_eq!(pawn_moves, 16);
    assert!(has(&moves, "g1", "f3"));
    assert!(has(&moves, "b1", "c3"));
}

/// CAPTURES and QUIETS partition NON_EVASIONS when not in check.
#[test]
fn captures_and_quiets_partition_non_evasions() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b KQkq - 0 1",
        "4k3/P7/8/8/8/8/8/4K3 w - - 0 1",
    ];
    for fen in fens {
        let board: Board = fen.parse().unwrap();
        let captures = MoveList::new::<Captures>(&board);
        let quiets = MoveList::new::<Quiets>(&board);
        let all = MoveList::new::<NonEvasions>(&board);

        let mut both: Vec<Move> = captures.iter().copied().collect();
        both.extend(quiets.iter().copied());
        assert_eq!(uci_sorted(&both), uci_sorted(&all), "partition failed for {fen}");
    }
}

#[test]
fn no_emitted_move_lands_on_own_piece() {
    let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();
    let own = board.occupancy(board.side_to_move);
    for &m in &MoveList::new::<NonEvasions>(&board) {
        if m.is_castling() {
            continue; // castling targets the own rook by convention
        }
        assert_eq!(own & m.to.bb(), 0, "{} lands on an own piece", m);
    }
}

#[test]
fn king_rook_pawn_legal_set() {
    // Two pawn pushes, four king steps, nine rook moves, one castle.
    let board: Board = "8/8/8/8/8/8/4P3/4K2R w K - 0 1".parse().unwrap();
    let moves = MoveList::new::<Legal>(&board);
    assert_eq!(moves.len(), 16);

    assert!(has(&moves, "e2", "e3"));
    assert!(has(&moves, "e2", "e4"));
    for to in ["d1", "d2", "f1", "f2"] {
        assert!(has(&moves, "e1", to), "missing king move to {to}");
    }
    for to in ["f1", "g1", "h2", "h8"] {
        assert!(has(&moves, "h1", to), "missing rook move to {to}");
    }
    assert!(
        moves.contains(Move::castling(sq("e1"), sq("h1"))),
        "short castle missing"
    );
    // e2 is blocked by the own pawn.
    assert!(!has(&moves, "e1", "e2"));
}

#[test]
fn promotion_modes_split_queen_and_underpromotions() {
    let board: Board = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();

    let captures = MoveList::new::<Captures>(&board);
    assert_eq!(uci_sorted(&captures), vec!["a7a8q"]);

    let quiets = MoveList::new::<Quiets>(&board);
    let quiet_promos: Vec<&Move> = quiets.iter().filter(|m| m.is_promotion()).collect();
    assert_eq!(quiet_promos.len(), 3);
    assert!(quiet_promos
        .iter()
        .all(|m| !matches!(m.kind, MoveKind::Promotion(Piece::Queen))));

    let all = MoveList::new::<NonEvasions>(&board);
    let promos = all.iter().filter(|m| m.is_promotion()).count();
    assert_eq!(promos, 4);
    assert_eq!(all.len(), 9); // 4 promotions + 5 king steps
}

#[test]
fn promotion_capture_expands_per_mode() {
    // b8 holds a knight: a7xb8 and a7a8 both promote.
    let board: Board = "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
    let captures = MoveList::new::<Captures>(&board);
    // Queen promotions only: the push and the capture.
    assert_eq!(uci_sorted(&captures), vec!["a7a8q", "a7b8q"]);

    let all = MoveList::new::<NonEvasions>(&board);
    assert_eq!(all.iter().filter(|m| m.is_promotion()).count(), 8);
}

#[test]
fn en_passant_requires_matching_rank() {
    let board: Board = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1".parse().unwrap();
    let moves = MoveList::new::<Captures>(&board);
    assert!(moves.contains(Move::en_passant(sq("e5"), sq("d6"))));
}

#[test]
fn ep_is_no_evasion_when_checker_is_not_the_pushed_pawn() {
    // Ra8 checks down the a-file; bxc6 en passant would not address it.
    let board: Board = "r3k3/8/8/1Pp5/K7/8/8/8 w - c6 0 1".parse().unwrap();
    assert_ne!(board.checkers(), 0);

    let evasions = MoveList::new::<Evasions>(&board);
    assert!(evasions.iter().all(|m| !m.is_en_passant()));

    let legal = MoveList::new::<Legal>(&board);
    assert_eq!(uci_sorted(&legal), vec!["a4b3"]);
}

#[test]
fn ep_counts_as_evasion_when_the_pushed_pawn_checks() {
    // Black just played d7d5+? No: the c5 pawn itself checks the b4 king, so
    // taking it en passant is a listed way out.
    let board: Board = "4k3/8/8/1Pp5/1K6/8/8/8 w - c6 0 1".parse().unwrap();
    assert_eq!(board.checkers(), sq("c5").bb());

    let evasions = MoveList::new::<Evasions>(&board);
    assert!(evasions.contains(Move::en_passant(sq("b5"), sq("c6"))));
}

#[test]
fn double_check_allows_only_king_moves() {
    // Re1 and Nd6 both hit the e8 king.
    let board: Board = "4k3/8/3N4/8/8/8/8/4RK2 b - - 0 1".parse().unwrap();
    assert_eq!(board.checkers().count_ones(), 2);

    let evasions = MoveList::new::<Evasions>(&board);
    assert!(evasions.iter().all(|m| m.from == sq("e8")));

    let legal = MoveList::new::<Legal>(&board);
    assert_eq!(uci_sorted(&legal), vec!["e8d7", "e8d8", "e8f8"]);
}

#[test]
fn evasions_block_or_capture_the_checker() {
    // Bishop b4 checks e1; block on c3/d2 or capture it.
    let board: Board = "4k3/8/8/8/1b6/8/8/RN2K3 w - - 0 1".parse().unwrap();
    assert_ne!(board.checkers(), 0);
    let legal = MoveList::new::<Legal>(&board);
    for &m in &legal {
        let resolves = m.from == sq("e1")
            || m.to == sq("b4")
            || m.to == sq("c3")
            || m.to == sq("d2");
        assert!(resolves, "{} neither moves the king nor deals with b4", m);
    }
    assert!(has(&legal, "b1", "c3")); // knight block
    assert!(has(&legal, "b1", "d2")); // second knight block
}

#[test]
fn legal_is_subset_of_pseudo_legal() {
    let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();
    let legal = MoveList::new::<Legal>(&board);
    let pseudo = MoveList::new::<NonEvasions>(&board);
    for &m in &legal {
        assert!(pseudo.contains(m), "{} legal but not pseudo-legal", m);
    }
}

#[test]
fn quiet_checks_only_give_check_and_capture_nothing() {
    let fens = [
        "4k3/8/8/8/8/8/8/RK6 w - - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "4k3/8/8/8/8/2n5/8/R3K3 b - - 0 1",
    ];
    for fen in fens {
        let board: Board = fen.parse().unwrap();
        let occupied = board.occupied();
        let checks = MoveList::new::<QuietChecks>(&board);
        for &m in &checks {
            assert_eq!(occupied & m.to.bb(), 0, "{} is not quiet ({fen})", m);
            let next = board.make_move(m);
            assert_ne!(next.checkers(), 0, "{} gives no check ({fen})", m);
        }
    }
}

#[test]
fn quiet_checks_include_direct_rook_check() {
    let board: Board = "4k3/8/8/8/8/8/8/RK6 w - - 0 1".parse().unwrap();
    let checks = MoveList::new::<QuietChecks>(&board);
    assert_eq!(uci_sorted(&checks), vec!["a1a8"]);
}

#[test]
fn quiet_checks_include_discovered_checks() {
    // The e4 knight stands between the e1 rook and the e8 king; any quiet
    // knight move discovers the check.
    let board: Board = "4k3/8/8/8/4N3/8/8/4RK2 w - - 0 1".parse().unwrap();
    let checks = MoveList::new::<QuietChecks>(&board);
    assert!(has(&checks, "e4", "c3"), "discovered check missing");
    for &m in &checks {
        let next = board.make_move(m);
        assert_ne!(next.checkers(), 0);
    }
}

#[test]
fn generate_appends_without_clearing() {
    let board = Board::new();
    let mut buf: Vec<Move> = Vec::new();
    generate::<Captures>(&board, &mut buf);
    let after_captures = buf.len();
    generate::<Quiets>(&board, &mut buf);
    assert_eq!(after_captures, 0);
    assert_eq!(buf.len(), 20);
}
