use std::collections::BTreeMap;

/// Cross-reference index: object number → byte offset of the object's
/// representation in the file.
pub struct Xref {
    pub entries: BTreeMap<u32, XrefEntry>,

    /// Total number of entries the table declares, including the free-list
    /// sentinel.
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XrefEntry {
    pub offset: u32,
    pub generation: u16,
}

impl Xref {
    pub fn new(object_count: usize) -> Xref {
        Xref {
            entries: BTreeMap::new(),
            size: object_count as u32 + 1,
        }
    }

    pub fn get(&self, id: u32) -> Option<&XrefEntry> {
        self.entries.get(&id)
    }

    pub fn insert(&mut self, id: u32, entry: XrefEntry) {
        self.entries.insert(id, entry);
    }
}
