//! Memory-category tags for allocator accounting.

use core::fmt;

/// Category a table's memory is accounted under.
///
/// The table never interprets the tag; it is stored at construction and
/// attached to diagnostics so the embedding runtime can attribute footprint.
/// The constants below cover the usual runtime tables. Embedders with their
/// own categories build one with [`MemTag::new`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemTag(&'static str);

impl MemTag {
    pub const SYMBOL: MemTag = MemTag::new("Symbol");
    pub const CLASS: MemTag = MemTag::new("Class");
    pub const CLASS_SHARED: MemTag = MemTag::new("Shared class space");
    pub const MODULE: MemTag = MemTag::new("Module");
    pub const CODE: MemTag = MemTag::new("Code");
    pub const GC: MemTag = MemTag::new("GC");
    pub const COMPILER: MemTag = MemTag::new("Compiler");
    pub const TRACING: MemTag = MemTag::new("Tracing");
    pub const INTERNAL: MemTag = MemTag::new("Internal");

    pub const fn new(name: &'static str) -> Self {
        MemTag(name)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Default for MemTag {
    fn default() -> Self {
        MemTag::INTERNAL
    }
}

impl fmt::Display for MemTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
