//! Hashtable: bucket array, entry creation and chain maintenance.

use crate::block_arena::{BlockArena, BlockSizing};
use crate::entry::{Bucket, Entry, EntryId};
use crate::mem_tag::MemTag;
use crate::statistics::TableRateStatistics;

/// Chained hashtable over literals of type `T`.
///
/// The table owns the buckets and every entry's storage, but it does not
/// decide where entries go: `new_entry` only allocates. Collaborators link
/// entries into chains and keep `number_of_entries` in step, either through
/// `add_entry` or through the lower-level `set_bucket` / `set_next` /
/// `increment_number_of_entries` when they need a different insertion
/// policy.
///
/// There is no internal locking. Mutation goes through `&mut self`, so an
/// embedding runtime that shares a table across threads must hand out the
/// exclusive borrow only while every other user is paused; `resize` and
/// `maybe_grow` rely on that.
#[derive(Debug)]
pub struct Hashtable<T> {
    pub(crate) buckets: Vec<Bucket>,
    pub(crate) number_of_entries: usize,
    pub(crate) arena: BlockArena<T>,
    pub(crate) mem_tag: MemTag,
    pub(crate) rate: TableRateStatistics,
}

impl<T> Hashtable<T> {
    /// Creates a table with `table_size` empty buckets.
    ///
    /// Panics if `table_size` is zero.
    pub fn new(table_size: usize, mem_tag: MemTag) -> Self {
        assert!(table_size > 0, "hashtable needs at least one bucket");
        Self {
            buckets: vec![Bucket::default(); table_size],
            number_of_entries: 0,
            arena: BlockArena::new(),
            mem_tag,
            rate: TableRateStatistics::new(),
        }
    }

    #[inline]
    pub fn table_size(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn number_of_entries(&self) -> usize {
        self.number_of_entries
    }

    #[inline]
    pub fn mem_tag(&self) -> MemTag {
        self.mem_tag
    }

    pub fn arena(&self) -> &BlockArena<T> {
        &self.arena
    }

    /// Bucket index for `hash`: `hash mod table_size`.
    ///
    /// A modulo rather than a mask, since the size need not be a power of two.
    #[inline]
    pub fn hash_to_index(&self, hash: u32) -> usize {
        hash as usize % self.table_size()
    }

    /// Head of chain `index`.
    #[inline]
    pub fn bucket(&self, index: usize) -> Option<EntryId> {
        self.check_index(index);
        self.buckets[index].entry()
    }

    /// Allocates an entry holding `hash` and `literal`.
    ///
    /// The entry is not linked into any chain and is not counted; callers
    /// do both (see `add_entry`).
    pub fn new_entry(&mut self, hash: u32, literal: T) -> EntryId {
        let sizing = self.block_sizing();
        self.arena.allocate(hash, literal, sizing)
    }

    /// Like `new_entry`, but marks the entry as belonging to a preloaded
    /// read-only image. Shared entries are never freed.
    pub fn new_shared_entry(&mut self, hash: u32, literal: T) -> EntryId {
        let id = self.new_entry(hash, literal);
        self.arena[id].set_shared();
        id
    }

    pub(crate) fn block_sizing(&self) -> BlockSizing {
        BlockSizing {
            table_size: self.table_size(),
            number_of_entries: self.number_of_entries,
        }
    }

    /// Panics if `id` is not a live entry.
    #[inline]
    pub fn entry(&self, id: EntryId) -> &Entry<T> {
        &self.arena[id]
    }

    #[inline]
    pub fn entry_mut(&mut self, id: EntryId) -> &mut Entry<T> {
        &mut self.arena[id]
    }

    #[inline]
    pub fn literal(&self, id: EntryId) -> &T {
        self.arena[id].literal()
    }

    /// Entries of chain `index`, head first.
    pub fn chain(&self, index: usize) -> Chain<'_, T> {
        Chain {
            arena: &self.arena,
            cur: self.bucket(index),
        }
    }

    /// Every linked entry, in bucket order.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &Entry<T>)> + '_ {
        (0..self.table_size()).flat_map(move |i| self.chain(i))
    }

    /// Prepends `id` to chain `index` and counts it.
    pub fn add_entry(&mut self, index: usize, id: EntryId) {
        self.check_index(index);
        let head = self.buckets[index].entry();
        self.relink(id, head);
        self.buckets[index].set_entry(Some(id));
        self.number_of_entries += 1;
        self.rate.add();
    }

    /// Replaces the head of chain `index` without touching the count.
    pub fn set_bucket(&mut self, index: usize, head: Option<EntryId>) {
        self.check_index(index);
        self.buckets[index].set_entry(head);
    }

    /// Points `id` at `next`, keeping its shared flag.
    pub fn set_next(&mut self, id: EntryId, next: Option<EntryId>) {
        self.relink(id, next);
    }

    /// Records an entry the caller linked through `set_bucket` / `set_next`.
    pub fn increment_number_of_entries(&mut self) {
        self.number_of_entries += 1;
        self.rate.add();
    }

    /// Detaches `id` from chain `index`. Returns false if it was not there.
    ///
    /// The entry stays allocated and counted; follow with `free_entry` to
    /// recycle it.
    pub fn unlink_entry(&mut self, index: usize, id: EntryId) -> bool {
        let next = self.arena[id].next();
        if self.bucket(index) == Some(id) {
            self.buckets[index].set_entry(next);
            self.relink(id, None);
            return true;
        }

        let mut cur = self.bucket(index);
        while let Some(p) = cur {
            let after = self.arena[p].next();
            if after == Some(id) {
                self.relink(p, next);
                self.relink(id, None);
                return true;
            }
            cur = after;
        }
        false
    }

    /// Recycles a counted entry after it was unlinked, returning its literal.
    ///
    /// Decrements `number_of_entries`. The entry must already be out of its
    /// chain and must not be shared. Entries that were never counted go
    /// through [`Hashtable::free_unlinked`] instead.
    pub fn free_entry(&mut self, id: EntryId) -> T {
        assert!(
            self.number_of_entries > 0,
            "free_entry on a table with no counted entries"
        );
        let literal = self.arena.free(id);
        self.number_of_entries -= 1;
        self.rate.remove();
        literal
    }

    /// Recycles an entry that was allocated but never added to the table,
    /// such as a candidate dropped after a duplicate was found.
    ///
    /// Pushes the slot onto the free list and leaves `number_of_entries`
    /// and the rate counters untouched.
    pub fn free_unlinked(&mut self, id: EntryId) -> T {
        self.arena.free(id)
    }

    /// Chain index `id` is currently linked in, if any.
    pub fn bucket_index_of(&self, id: EntryId) -> Option<usize> {
        (0..self.table_size()).find(|&i| self.chain(i).any(|(e, _)| e == id))
    }

    /// Writes a new link for `id` and restores its shared flag, which the
    /// link write clears.
    #[inline]
    pub(crate) fn relink(&mut self, id: EntryId, next: Option<EntryId>) {
        let entry = &mut self.arena[id];
        let keep_shared = entry.is_shared();
        entry.set_link(next);
        if keep_shared {
            entry.set_shared();
        }
    }

    #[inline]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.table_size(),
            "bucket index {index} out of range for table size {}",
            self.table_size()
        );
    }
}

/// Iterator over one chain.
pub struct Chain<'a, T> {
    arena: &'a BlockArena<T>,
    cur: Option<EntryId>,
}

impl<'a, T> Iterator for Chain<'a, T> {
    type Item = (EntryId, &'a Entry<T>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let entry = &self.arena[id];
        self.cur = entry.next();
        Some((id, entry))
    }
}
