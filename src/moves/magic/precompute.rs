use crate::bitboard::{FILE_A, FILE_H, RANK_1, RANK_8};
use crate::moves::magic::attacks::{
    bishop_attacks_per_square, get_bishop_attack_bitboards, get_rook_attack_bitboards,
    rook_attacks_per_square,
};
use crate::moves::magic::search::find_magic_for_square;
use crate::moves::magic::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub enum MagicTableSeed {
    Fixed(u64),
    Random,
}

/// Relevant-occupancy mask: the slider's empty-board vision with the edge
/// squares trimmed, except where the slider itself sits on that edge.
fn relevant_mask(square: usize, rook: bool) -> u64 {
    let rank_edges = (RANK_1 | RANK_8) & !(RANK_1 << (8 * (square / 8)));
    let file_edges = (FILE_A | FILE_H) & !(FILE_A << (square % 8));
    let vision = if rook {
        rook_attacks_per_square(square, 0)
    } else {
        bishop_attacks_per_square(square, 0)
    };
    vision & !(rank_edges | file_edges)
}

/// Every subset of `mask`, enumerated with the carry-rippler trick.
fn blocker_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut occ = 0u64;
    loop {
        subsets.push(occ);
        occ = occ.wrapping_sub(mask) & mask;
        if occ == 0 {
            break;
        }
    }
    subsets
}

fn build_entries<R: RngCore>(rook: bool, rng: &mut R) -> Result<Vec<MagicEntry>, String> {
    let mut entries = Vec::with_capacity(64);
    for square in 0..64 {
        let mask = relevant_mask(square, rook);
        let shift = 64 - mask.count_ones();
        let blockers = blocker_subsets(mask);
        let attacks = if rook {
            get_rook_attack_bitboards(square, &blockers)
        } else {
            get_bishop_attack_bitboards(square, &blockers)
        };
        let (magic, table) = find_magic_for_square(mask, &blockers, &attacks, shift, rng)
            .map_err(|e| format!("square {}: {}", square, e))?;
        entries.push(MagicEntry {
            magic,
            shift,
            mask,
            table,
        });
    }
    Ok(entries)
}

pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(s),
        MagicTableSeed::Random => StdRng::from_os_rng(),
    };

    let rook = RookMagicTables {
        entries: build_entries(true, &mut rng)?,
    };
    let bishop = BishopMagicTables {
        entries: build_entries(false, &mut rng)?,
    };
    Ok(MagicTables { rook, bishop })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_masks_trim_edges() {
        // d4: mask spans d2..d7 and b4..g4, 10 bits.
        assert_eq!(relevant_mask(27, true).count_ones(), 10);
        // a1: the corner keeps its own rank/file interiors, 12 bits.
        assert_eq!(relevant_mask(0, true).count_ones(), 12);
    }

    #[test]
    fn bishop_masks_trim_edges() {
        assert_eq!(relevant_mask(27, false).count_ones(), 9); // d4
        assert_eq!(relevant_mask(0, false).count_ones(), 6); // a1
    }

    #[test]
    fn subset_enumeration_counts() {
        let mask = relevant_mask(0, false);
        assert_eq!(blocker_subsets(mask).len(), 1 << mask.count_ones());
    }
}
