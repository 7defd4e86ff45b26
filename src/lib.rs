//! arena-hashtable: a chained hashtable engine for runtime registries
//! (symbol interning, class/module tables, string pools) that stores its
//! entries in a block-carving arena.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one generic engine that many registries instantiate, with
//!   entry storage cheap enough for insert-heavy, rarely-shrinking tables.
//! - Layers:
//!   - BlockArena<T>: carves fixed-size entry slots out of blocks reserved
//!     on demand; freed slots go onto a LIFO free list threaded through the
//!     slots themselves and are reused before anything new is carved.
//!   - Hashtable<T>: owns the bucket array and the arena; allocates entries
//!     but leaves linking and counting to the caller, so each registry can
//!     pick its own insertion policy on top of one allocation path.
//!   - resize / maybe_grow: caller-triggered migration to a larger bucket
//!     array.
//!   - statistics / verify: read-only passes producing footprint summaries
//!     and (diagnostic builds) consistency checks.
//!
//! Constraints
//! - Entries are addressed by `EntryId`, an index into the arena; chain
//!   links are indices, never pointers.
//! - An entry's hash is fixed at creation. The table never rehashes a
//!   literal; resize reuses the stored hash.
//! - `hash_to_index` is `hash mod table_size`; sizes need not be powers of
//!   two.
//! - No entry lookup, equality or deduplication here. Registries walk
//!   `chain(index)` and compare literals themselves.
//!
//! Shared entries
//! - Entries preloaded from a read-only image are flagged shared. The flag
//!   is packed into the link word, so every relink captures it first and
//!   restores it after. Shared entries are never freed.
//!
//! Concurrency
//! - No internal locking. Mutation takes `&mut self`; an embedding runtime
//!   that shares a table hands out that borrow only inside its own pause.
//! - `resize` installs the new bucket array before migrating entries, since
//!   `hash_to_index` reads the installed size. Nothing may observe the table
//!   until it returns.
//!
//! Failure
//! - A bucket array that cannot be allocated makes `resize` fail with no
//!   side effects; the table keeps working at its current size.
//! - Running out of memory for a new entry block is not recoverable and
//!   aborts like any other allocation failure.
//! - Verification failures indicate corruption and panic.

pub mod block_arena;
pub mod entry;
mod error;
mod hashtable;
#[cfg(test)]
mod hashtable_proptest;
mod mem_tag;
mod resize;
pub mod statistics;
#[cfg(any(debug_assertions, feature = "diagnostics"))]
mod verify;

// Public surface
pub use block_arena::{BlockArena, BlockSizing};
pub use entry::{Bucket, Entry, EntryId};
pub use error::ResizeError;
pub use hashtable::{Chain, Hashtable};
pub use mem_tag::MemTag;
pub use statistics::{Summary, TableRateStatistics, TableStatistics};
#[cfg(any(debug_assertions, feature = "diagnostics"))]
pub use verify::VerifyReport;
