//! Resize and load-factor growth.

use crate::entry::Bucket;
use crate::error::ResizeError;
use crate::hashtable::Hashtable;

impl<T> Hashtable<T> {
    /// Moves every entry into a fresh array of `new_size` buckets.
    ///
    /// Only the bucket allocation can fail, and it happens before anything
    /// is touched: on error the table is exactly as it was. Once the new
    /// array exists the migration always completes.
    ///
    /// The new array is installed before migration starts, because
    /// `hash_to_index` reads the installed size. Between the switch and the
    /// end of migration entries are still threaded through the old array,
    /// so the caller must hold the table exclusively (no concurrent readers
    /// either) for the whole call; `&mut self` is that guarantee.
    pub fn resize(&mut self, new_size: usize) -> Result<(), ResizeError> {
        if new_size == 0 {
            return Err(ResizeError::ZeroSize);
        }

        let mut buckets_new: Vec<Bucket> = Vec::new();
        if let Err(source) = buckets_new.try_reserve_exact(new_size) {
            tracing::warn!(
                target: "hashtables",
                mem_tag = %self.mem_tag,
                table_size = self.table_size(),
                requested = new_size,
                "resize failed: cannot allocate buckets"
            );
            return Err(ResizeError::AllocationFailed {
                requested: new_size,
                source,
            });
        }
        buckets_new.resize(new_size, Bucket::default());

        let buckets_old = core::mem::replace(&mut self.buckets, buckets_new);

        for bucket in &buckets_old {
            let mut p = bucket.entry();
            while let Some(id) = p {
                let entry = &self.arena[id];
                let next = entry.next();
                let index_new = self.hash_to_index(entry.hash());

                let head = self.buckets[index_new].entry();
                self.relink(id, head);
                self.buckets[index_new].set_entry(Some(id));

                p = next;
            }
        }

        tracing::debug!(
            target: "hashtables",
            mem_tag = %self.mem_tag,
            old_size = buckets_old.len(),
            new_size,
            entries = self.number_of_entries,
            "resized hashtable"
        );
        drop(buckets_old);
        Ok(())
    }

    /// Doubles the table (capped at `max_size`) when the integer load
    /// `number_of_entries / table_size` exceeds `load_factor`.
    ///
    /// Returns `true` once a resize was attempted. A failed bucket allocation
    /// is logged by `resize` and leaves the table at its current size, so
    /// callers that care about the outcome compare `table_size` afterwards.
    pub fn maybe_grow(&mut self, max_size: usize, load_factor: usize) -> bool {
        let table_size = self.table_size();
        if table_size >= max_size {
            return false;
        }
        if self.number_of_entries / table_size <= load_factor {
            tracing::trace!(
                target: "hashtables",
                table_size,
                entries = self.number_of_entries,
                load_factor,
                "below load factor, not growing"
            );
            return false;
        }

        let new_size = table_size.saturating_mul(2).min(max_size);
        self.grow_to(new_size)
    }

    fn grow_to(&mut self, new_size: usize) -> bool {
        // The failure was already reported by `resize`; the table is unchanged.
        let _ = self.resize(new_size);
        true
    }
}
