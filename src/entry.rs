//! Entry and bucket records.
//!
//! An entry's `next` link and its shared flag are packed into one 32-bit
//! word. Writing a new link therefore clears the shared flag; callers that
//! relink entries must capture the flag first and put it back afterwards
//! (see `Hashtable::relink`).

use core::fmt;
use core::num::NonZeroU32;

/// Upper bound on the number of entry slots a single arena can carve.
///
/// One bit of the link word is reserved for the shared flag, so indices must
/// fit in the remaining 31 bits.
pub const MAX_ENTRIES: usize = (u32::MAX >> 1) as usize;

/// Index of an entry slot inside a table's arena.
///
/// Stored as `index + 1` so that `Option<EntryId>` stays four bytes wide.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(NonZeroU32);

impl EntryId {
    pub(crate) fn from_index(index: usize) -> Self {
        assert!(
            index < MAX_ENTRIES,
            "entry index {index} exceeds arena limit of {MAX_ENTRIES} slots"
        );
        // index + 1 <= MAX_ENTRIES, which is nonzero and fits in 31 bits.
        EntryId(NonZeroU32::new(index as u32 + 1).unwrap_or(NonZeroU32::MIN))
    }

    /// Position of the slot in the arena.
    #[inline]
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    #[inline]
    fn raw(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.index())
    }
}

const SHARED_BIT: u32 = 1;

/// Packed `next` link plus shared flag.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) struct Link(u32);

impl Link {
    /// A link to `next` with the shared flag clear.
    #[inline]
    pub(crate) fn to(next: Option<EntryId>) -> Self {
        Link(next.map_or(0, |id| id.raw() << 1))
    }

    #[inline]
    pub(crate) fn next(self) -> Option<EntryId> {
        NonZeroU32::new(self.0 >> 1).map(EntryId)
    }

    #[inline]
    pub(crate) fn is_shared(self) -> bool {
        self.0 & SHARED_BIT != 0
    }

    #[inline]
    pub(crate) fn set_shared(&mut self) {
        self.0 |= SHARED_BIT;
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("next", &self.next())
            .field("shared", &self.is_shared())
            .finish()
    }
}

/// One stored association: an immutable hash, a chain link, and the literal.
#[derive(Debug)]
pub struct Entry<T> {
    hash: u32,
    link: Link,
    literal: T,
}

impl<T> Entry<T> {
    pub(crate) fn new(hash: u32, literal: T) -> Self {
        Self {
            hash,
            link: Link::default(),
            literal,
        }
    }

    /// The hash the entry was created with. Never recomputed by the table.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// The following entry in the same chain, if any.
    #[inline]
    pub fn next(&self) -> Option<EntryId> {
        self.link.next()
    }

    /// True for entries carved from a preloaded read-only image.
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.link.is_shared()
    }

    #[inline]
    pub fn literal(&self) -> &T {
        &self.literal
    }

    #[inline]
    pub fn literal_mut(&mut self) -> &mut T {
        &mut self.literal
    }

    pub(crate) fn into_literal(self) -> T {
        self.literal
    }

    /// Overwrites the whole link word, clearing the shared flag.
    #[inline]
    pub(crate) fn set_link(&mut self, next: Option<EntryId>) {
        self.link = Link::to(next);
    }

    #[inline]
    pub(crate) fn set_shared(&mut self) {
        self.link.set_shared();
    }
}

/// Head of one chain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Bucket {
    head: Option<EntryId>,
}

impl Bucket {
    #[inline]
    pub fn entry(&self) -> Option<EntryId> {
        self.head
    }

    #[inline]
    pub(crate) fn set_entry(&mut self, head: Option<EntryId>) {
        self.head = head;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: bucket heads and entry ids stay four bytes wide.
    #[test]
    fn records_are_compact() {
        assert_eq!(core::mem::size_of::<Bucket>(), 4);
        assert_eq!(core::mem::size_of::<Option<EntryId>>(), 4);
        assert_eq!(core::mem::size_of::<Entry<u32>>(), 12);
    }

    /// Invariant: writing a link clears the shared bit but keeps the target.
    #[test]
    fn set_link_clears_shared_flag() {
        let mut e = Entry::new(7, "lit");
        e.set_shared();
        assert!(e.is_shared());
        let target = EntryId::from_index(41);
        e.set_link(Some(target));
        assert!(!e.is_shared());
        assert_eq!(e.next(), Some(target));
        e.set_shared();
        assert!(e.is_shared());
        assert_eq!(e.next(), Some(target));
        assert_eq!(e.hash(), 7);
    }

    /// Invariant: the largest representable index round-trips through a link.
    #[test]
    fn max_index_fits_in_link() {
        let id = EntryId::from_index(MAX_ENTRIES - 1);
        let mut link = Link::to(Some(id));
        link.set_shared();
        assert_eq!(link.next(), Some(id));
        assert!(link.is_shared());
        assert_eq!(Link::to(None).next(), None);
    }

    #[test]
    #[should_panic(expected = "exceeds arena limit")]
    fn index_past_limit_panics() {
        let _ = EntryId::from_index(MAX_ENTRIES);
    }
}
