//! Diagnostic consistency checks and dumps.
//!
//! Compiled into debug builds, or release builds with the `diagnostics`
//! feature. A failed check is corruption, not an error: it panics with the
//! table name and the mismatching counts.

use crate::hashtable::Hashtable;
use core::fmt;
use tracing::Level;

/// What `verify_table` tallied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VerifyReport {
    pub element_count: usize,
    pub max_bucket_count: usize,
    pub max_bucket_index: usize,
}

impl<T> Hashtable<T> {
    /// Walks every chain, runs `verify_literal` on each literal, and checks
    /// the tallied entries against `number_of_entries`.
    ///
    /// Also checks each entry is linked in the bucket its hash maps to.
    /// Logs the longest bucket at `info`, and a per-bucket hash dump at
    /// `debug`, under the `hashtables` target.
    pub fn verify_table<F>(&self, table_name: &str, mut verify_literal: F) -> VerifyReport
    where
        F: FnMut(&T) -> bool,
    {
        let live = self.arena.len();
        let mut element_count = 0usize;
        let mut max_bucket_count = 0usize;
        let mut max_bucket_index = 0usize;

        for index in 0..self.table_size() {
            let mut bucket_count = 0usize;
            for (id, e) in self.chain(index) {
                assert!(
                    verify_literal(e.literal()),
                    "Verify of {table_name} failed: literal of {id:?} in bucket {index} rejected"
                );
                let expected = self.hash_to_index(e.hash());
                assert!(
                    expected == index,
                    "Verify of {table_name} failed: {id:?} with hash {:#010x} linked in bucket {index}, expected {expected}",
                    e.hash()
                );
                bucket_count += 1;
                // More links than live entries means a chain loops back on itself.
                assert!(
                    element_count + bucket_count <= live,
                    "Verify of {table_name} failed: chain {index} is cyclic"
                );
            }
            element_count += bucket_count;
            if bucket_count > max_bucket_count {
                max_bucket_count = bucket_count;
                max_bucket_index = index;
            }
        }

        assert!(
            self.number_of_entries == element_count,
            "Verify of {table_name} failed: number_of_entries is {} but {element_count} entries are linked",
            self.number_of_entries
        );

        tracing::info!(
            target: "hashtables",
            "{} max bucket size {} bucket {} element count {} table size {}",
            table_name,
            max_bucket_count,
            max_bucket_index,
            self.number_of_entries,
            self.table_size()
        );
        if self.number_of_entries > 0 && tracing::enabled!(target: "hashtables", Level::DEBUG) {
            for index in 0..self.table_size() {
                let mut bucket_count = 0usize;
                for (_, e) in self.chain(index) {
                    tracing::debug!(target: "hashtables", "bucket {} hash {:#010x}", index, e.hash());
                    bucket_count += 1;
                }
                if bucket_count > 0 {
                    tracing::debug!(target: "hashtables", "bucket {} count {}", index, bucket_count);
                }
            }
        }

        VerifyReport {
            element_count,
            max_bucket_count,
            max_bucket_index,
        }
    }

    /// Writes one `"<bucket> : <literal>"` line per linked entry.
    pub fn print<W, P>(&self, sink: &mut W, mut print_literal: P) -> fmt::Result
    where
        W: fmt::Write,
        P: FnMut(&mut W, &T) -> fmt::Result,
    {
        for index in 0..self.table_size() {
            for (_, e) in self.chain(index) {
                write!(sink, "{index} : ")?;
                print_literal(sink, e.literal())?;
                writeln!(sink)?;
            }
        }
        Ok(())
    }
}
