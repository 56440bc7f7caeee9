use rand::RngCore;

#[inline(always)]
// Generate a sparse 64-bit number by AND-ing three random values.
// A low number of set bits reduces the chance of collisions in magic
// indexing.
pub fn random_sparse_u64<R: RngCore>(rng: &mut R) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// Tries to fill an attack table with `magic`. Collisions mapping to the same
/// attack set are constructive and allowed; conflicting ones fail the
/// candidate.
pub fn try_fill_table(
    blockers: &[u64],
    attacks: &[u64],
    magic: u64,
    shift: u32,
) -> Option<Box<[u64]>> {
    let size = blockers.len();
    let mut table = vec![0u64; size].into_boxed_slice();
    let mut used = vec![false; size];

    for (&blocker, &attack) in blockers.iter().zip(attacks) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        if !used[index] {
            used[index] = true;
            table[index] = attack;
        } else if table[index] != attack {
            return None;
        }
    }

    Some(table)
}

pub fn find_magic_for_square<R: RngCore>(
    mask: u64,
    blockers: &[u64],
    attacks: &[u64],
    shift: u32,
    rng: &mut R,
) -> Result<(u64, Box<[u64]>), String> {
    for _attempt in 0..100_000_000u64 {
        let magic = random_sparse_u64(rng);
        // Cheap screen: a good magic spreads the high mask bits around.
        if (mask.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }
        if let Some(table) = try_fill_table(blockers, attacks, magic, shift) {
            return Ok((magic, table));
        }
    }
    Err("no valid magic number found within the attempt budget".to_string())
}
