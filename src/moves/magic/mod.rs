pub mod attacks;
pub mod precompute;
pub mod search;
pub mod structs;

pub use structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};

use once_cell::sync::Lazy;
use precompute::{generate_magic_tables, MagicTableSeed};

/// Fixed seed so every process builds identical tables.
const TABLE_SEED: u64 = 0x9E3779B97F4A7C15;

static TABLES: Lazy<MagicTables> = Lazy::new(|| {
    generate_magic_tables(MagicTableSeed::Fixed(TABLE_SEED))
        .expect("magic table construction failed")
});

/// Process-wide sliding attack tables, built on first use.
#[inline(always)]
pub fn tables() -> &'static MagicTables {
    &TABLES
}
