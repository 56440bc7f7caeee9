use crate::board::Board;
use crate::moves::movegen::{Legal, MoveList};
use tracing::{debug, instrument};

fn perft_inner(board: &Board, depth: u32) -> u64 {
    let moves = MoveList::new::<Legal>(board);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &mv in &moves {
        nodes += perft_inner(&board.make_move(mv), depth - 1);
    }
    nodes
}

/// Counts leaf nodes of the legal-move tree to the given depth.
#[instrument(skip(board), fields(depth))]
pub fn perft(board: &Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    perft_inner(board, depth)
}

/// Per-root-move node counts, printed like the usual `divide` helper.
#[instrument(skip(board), fields(depth))]
pub fn perft_divide(board: &Board, depth: u32) -> u64 {
    let moves = MoveList::new::<Legal>(board);
    debug!(depth, moves = moves.len(), "divide: root legal moves");

    let mut total = 0;
    for &mv in &moves {
        let count = if depth <= 1 {
            1
        } else {
            perft_inner(&board.make_move(mv), depth - 1)
        };
        debug!(%mv, nodes = count, "divide: root child total");
        println!("{}: {}", mv, count);
        total += count;
    }

    println!("Total: {}", total);
    total
}
