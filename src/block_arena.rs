//! BlockArena: entry storage carved out of blocks, with a LIFO free list.
//!
//! Entries live in one growable slot vector addressed by `EntryId`. Capacity
//! is reserved a block at a time; slots past the end of the current block
//! are only carved once a new block has been reserved. Freed slots are
//! threaded into a free list through their own link and reused before any
//! new slot is carved, most recently freed first.

use crate::entry::{Entry, EntryId};
use core::ops::{Index, IndexMut};

/// Cap on the number of entries reserved per block.
pub const MAX_BLOCK_ENTRIES: usize = 512;

/// Table state the block-size policy reads at the moment a block runs out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockSizing {
    pub table_size: usize,
    pub number_of_entries: usize,
}

/// Entries per block: `min(512, max(table_size / 2, number_of_entries))`
/// entries, with the byte length rounded down to a power of two.
///
/// Always at least one entry so that a one-bucket empty table can still
/// carve its first slot.
pub fn block_entries(entry_size: usize, sizing: BlockSizing) -> usize {
    let entry_size = entry_size.max(1);
    let wanted = (sizing.table_size / 2)
        .max(sizing.number_of_entries)
        .min(MAX_BLOCK_ENTRIES)
        .max(1);
    let bytes = entry_size * wanted;
    let rounded = 1usize << (usize::BITS - 1 - bytes.leading_zeros());
    (rounded / entry_size).max(1)
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(Entry<T>),
    Free { next_free: Option<EntryId> },
}

#[derive(Debug)]
pub struct BlockArena<T> {
    slots: Vec<Slot<T>>,
    free_list: Option<EntryId>,
    free_count: usize,
    // Slots below this bound belong to an already reserved block.
    end_block: usize,
    blocks: Vec<usize>,
}

impl<T> BlockArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: None,
            free_count: 0,
            end_block: 0,
            blocks: Vec::new(),
        }
    }

    /// Size in bytes of one carved slot.
    pub fn entry_size() -> usize {
        core::mem::size_of::<Slot<T>>()
    }

    /// Hands out a slot holding a fresh entry with `hash` and `literal`.
    ///
    /// Pops the free list first; otherwise carves the next slot, reserving a
    /// new block when the current one is exhausted. A failed block
    /// reservation is not recoverable and aborts like any other allocation
    /// failure.
    pub fn allocate(&mut self, hash: u32, literal: T, sizing: BlockSizing) -> EntryId {
        let entry = Entry::new(hash, literal);
        if let Some(id) = self.free_list {
            let slot = &mut self.slots[id.index()];
            let next_free = match slot {
                Slot::Free { next_free } => *next_free,
                Slot::Occupied(_) => unreachable!("free list points at occupied slot {id:?}"),
            };
            *slot = Slot::Occupied(entry);
            self.free_list = next_free;
            self.free_count -= 1;
            return id;
        }

        if self.slots.len() >= self.end_block {
            self.new_block(sizing);
        }
        let id = EntryId::from_index(self.slots.len());
        self.slots.push(Slot::Occupied(entry));
        id
    }

    fn new_block(&mut self, sizing: BlockSizing) {
        let len = block_entries(Self::entry_size(), sizing);
        self.slots.reserve_exact(len);
        self.end_block += len;
        self.blocks.push(len);
        tracing::trace!(
            target: "hashtables",
            block = self.blocks.len(),
            entries = len,
            bytes = len * Self::entry_size(),
            "carving new entry block"
        );
    }

    /// Returns a slot to the free list and hands back its literal.
    ///
    /// Panics if the slot is already free or holds a shared entry.
    pub fn free(&mut self, id: EntryId) -> T {
        let slot = self
            .slots
            .get_mut(id.index())
            .unwrap_or_else(|| panic!("entry {id:?} was never allocated"));
        if let Slot::Occupied(entry) = slot {
            assert!(!entry.is_shared(), "shared entry {id:?} must not be freed");
        }
        let old = core::mem::replace(
            slot,
            Slot::Free {
                next_free: self.free_list,
            },
        );
        match old {
            Slot::Occupied(entry) => {
                self.free_list = Some(id);
                self.free_count += 1;
                entry.into_literal()
            }
            Slot::Free { .. } => panic!("entry {id:?} freed twice"),
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry<T>> {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(e)) => Some(e),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry<T>> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(e)) => Some(e),
            _ => None,
        }
    }

    /// Number of slots currently holding an entry.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots carved so far, live or free.
    pub fn carved(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free_count
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Entries per block, in allocation order.
    pub fn block_lengths(&self) -> &[usize] {
        &self.blocks
    }

    /// Bytes reserved across all blocks.
    pub fn reserved_bytes(&self) -> usize {
        self.end_block * Self::entry_size()
    }

    /// Free-list members, next to be reused first.
    pub fn free_list(&self) -> FreeList<'_, T> {
        FreeList {
            arena: self,
            cur: self.free_list,
        }
    }
}

impl<T> Default for BlockArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<EntryId> for BlockArena<T> {
    type Output = Entry<T>;

    #[inline]
    fn index(&self, id: EntryId) -> &Entry<T> {
        self.get(id)
            .unwrap_or_else(|| panic!("entry {id:?} is not allocated"))
    }
}

impl<T> IndexMut<EntryId> for BlockArena<T> {
    #[inline]
    fn index_mut(&mut self, id: EntryId) -> &mut Entry<T> {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("entry {id:?} is not allocated"))
    }
}

/// Iterator over the free list.
pub struct FreeList<'a, T> {
    arena: &'a BlockArena<T>,
    cur: Option<EntryId>,
}

impl<'a, T> Iterator for FreeList<'a, T> {
    type Item = EntryId;

    fn next(&mut self) -> Option<EntryId> {
        let id = self.cur?;
        self.cur = match self.arena.slots.get(id.index()) {
            Some(Slot::Free { next_free }) => *next_free,
            _ => None,
        };
        Some(id)
    }
}
