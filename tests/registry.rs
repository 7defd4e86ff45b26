// A symbol registry built the way embedding tables use the engine: lookup
// by walking a chain, insertion by prepending, growth checked after each
// insert.
use arena_hashtable::{EntryId, Hashtable, MemTag};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const MAX_SIZE: usize = 1 << 12;
const LOAD_FACTOR: usize = 2;

struct SymbolTable {
    table: Hashtable<Box<str>>,
}

fn hash_str(s: &str) -> u32 {
    let mut h = DefaultHasher::new();
    s.hash(&mut h);
    h.finish() as u32
}

impl SymbolTable {
    fn new() -> Self {
        Self {
            table: Hashtable::new(4, MemTag::SYMBOL),
        }
    }

    fn lookup(&self, name: &str) -> Option<EntryId> {
        let hash = hash_str(name);
        let index = self.table.hash_to_index(hash);
        self.table
            .chain(index)
            .find(|(_, e)| e.hash() == hash && &**e.literal() == name)
            .map(|(id, _)| id)
    }

    fn intern(&mut self, name: &str) -> EntryId {
        if let Some(id) = self.lookup(name) {
            return id;
        }
        let hash = hash_str(name);
        let id = self.table.new_entry(hash, name.into());
        let index = self.table.hash_to_index(hash);
        self.table.add_entry(index, id);
        self.table.maybe_grow(MAX_SIZE, LOAD_FACTOR);
        id
    }

    /// Interns through a pre-built candidate, the way callers that build the
    /// literal before taking the table lock do. A losing candidate is
    /// recycled without touching the entry count.
    fn intern_candidate(&mut self, name: &str) -> EntryId {
        let hash = hash_str(name);
        let candidate = self.table.new_entry(hash, name.into());
        if let Some(id) = self.lookup(name) {
            self.table.free_unlinked(candidate);
            return id;
        }
        let index = self.table.hash_to_index(hash);
        self.table.add_entry(index, candidate);
        self.table.maybe_grow(MAX_SIZE, LOAD_FACTOR);
        candidate
    }

    fn unintern(&mut self, name: &str) -> Option<Box<str>> {
        let id = self.lookup(name)?;
        let index = self.table.hash_to_index(self.table.entry(id).hash());
        assert!(self.table.unlink_entry(index, id));
        Some(self.table.free_entry(id))
    }
}

#[test]
fn intern_deduplicates_and_grows() {
    let mut symbols = SymbolTable::new();
    let first: Vec<_> = (0..500).map(|i| symbols.intern(&format!("sym{i}"))).collect();
    let again: Vec<_> = (0..500).map(|i| symbols.intern(&format!("sym{i}"))).collect();
    assert_eq!(first, again);
    assert_eq!(symbols.table.number_of_entries(), 500);
    assert!(symbols.table.table_size() > 4);
    assert!(symbols.table.number_of_entries() / symbols.table.table_size() <= LOAD_FACTOR);
    for (i, id) in first.iter().enumerate() {
        assert_eq!(&**symbols.table.literal(*id), format!("sym{i}"));
    }
}

#[test]
fn unintern_recycles_slot() {
    let mut symbols = SymbolTable::new();
    symbols.intern("alpha");
    let beta = symbols.intern("beta");
    assert_eq!(symbols.unintern("beta").as_deref(), Some("beta"));
    assert!(symbols.lookup("beta").is_none());
    assert!(symbols.unintern("beta").is_none());
    let gamma = symbols.intern("gamma");
    assert_eq!(gamma, beta);
    assert_eq!(symbols.table.number_of_entries(), 2);
}

#[test]
fn duplicate_candidate_is_recycled() {
    let mut symbols = SymbolTable::new();
    let alpha = symbols.intern_candidate("alpha");
    symbols.intern_candidate("beta");
    assert_eq!(symbols.intern_candidate("alpha"), alpha);
    assert_eq!(symbols.table.number_of_entries(), 2);
    assert_eq!(symbols.table.entries().count(), 2);
    assert_eq!(symbols.table.arena().free_count(), 1);

    #[cfg(any(debug_assertions, feature = "diagnostics"))]
    {
        let report = symbols.table.verify_table("SymbolTable", |_| true);
        assert_eq!(report.element_count, 2);
    }
}

#[test]
fn statistics_report_for_registry() {
    let mut symbols = SymbolTable::new();
    for i in 0..100 {
        symbols.intern(&format!("name{i:03}"));
    }
    let mut out = String::new();
    symbols
        .table
        .print_table_statistics(&mut out, "SymbolTable", |s| s.len())
        .unwrap();
    assert!(out.starts_with("SymbolTable statistics:"));
    // Each name is "name" plus three digits.
    assert!(out.contains("Number of literals      :       100 =       700 bytes"));

    #[cfg(any(debug_assertions, feature = "diagnostics"))]
    {
        let report = symbols
            .table
            .verify_table("SymbolTable", |s| s.starts_with("name"));
        assert_eq!(report.element_count, 100);
    }
}
