//! Resolution of descriptors against code tables.
//!
//! The meaning of a descriptor depends on the tables a bulletin was written
//! against, identified by a [`TableVersion`] and refined by the bulletin's
//! [`DataCategory`]. Decoders look descriptors up through a [`Resolver`]; this
//! crate does not read table files, but provides [`MemoryTables`] for tables
//! built in memory.

use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use core::fmt;

use thiserror::Error;
use tracing::trace;

use crate::{value::Varinfo, varcode::Varcode};

/// The table set a bulletin was written against.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableVersion {
    pub master_table_number: u8,
    pub edition: u8,
    pub table: u8,
}

impl fmt::Display for TableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T{:02}{:02}{:02}",
            self.master_table_number, self.edition, self.table
        )
    }
}

/// The data category of a bulletin, from its A-table code.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataCategory {
    pub category: u16,
    /// Not written in CREX headers; always 255 when decoded.
    pub subtype: u8,
    pub localsubtype: u16,
}

/// Everything needed to resolve a descriptor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub version: TableVersion,
    pub category: DataCategory,
}

/// An error resolving a descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// No tables are available for a version.
    #[error("No tables are available for {0}.")]
    UnknownTable(TableVersion),
    /// An element descriptor is not in table B.
    #[error("Element {code} is not defined in table B of {version}.")]
    UnknownElement { version: TableVersion, code: Varcode },
    /// A sequence descriptor is not in table D.
    #[error("Sequence {code} is not defined in table D of {version}.")]
    UnknownSequence { version: TableVersion, code: Varcode },
}

/// Resolve descriptors to their metadata.
///
/// Resolution must be pure: the same key and descriptor always produce the
/// same result. Callers serialize access unless an implementation documents
/// otherwise.
pub trait Resolver {
    /// Prepare every table of a version for lookups.
    ///
    /// Called once per bulletin before any lookup, and expected to be cheap
    /// for versions that are already loaded.
    fn load(&mut self, version: &TableVersion) -> Result<(), TableError>;

    /// Resolve an element descriptor.
    fn element(&self, key: &TableKey, code: Varcode) -> Result<Arc<Varinfo>, TableError>;

    /// Resolve a sequence descriptor to the descriptors it expands to.
    fn sequence(&self, key: &TableKey, code: Varcode) -> Result<&[Varcode], TableError>;
}

impl<R: Resolver + ?Sized> Resolver for &mut R {
    fn load(&mut self, version: &TableVersion) -> Result<(), TableError> {
        (**self).load(version)
    }

    fn element(&self, key: &TableKey, code: Varcode) -> Result<Arc<Varinfo>, TableError> {
        (**self).element(key, code)
    }

    fn sequence(&self, key: &TableKey, code: Varcode) -> Result<&[Varcode], TableError> {
        (**self).sequence(key, code)
    }
}

/// The B and D tables of a single version.
#[derive(Debug, Default, Clone)]
pub struct TableSet {
    elements: BTreeMap<Varcode, Arc<Varinfo>>,
    sequences: BTreeMap<Varcode, Vec<Varcode>>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, replacing any earlier definition of the same code.
    pub fn with_element(mut self, info: Varinfo) -> Self {
        self.insert_element(info);
        self
    }

    /// Add a sequence, replacing any earlier definition of the same code.
    pub fn with_sequence(mut self, code: Varcode, items: impl IntoIterator<Item = Varcode>) -> Self {
        self.insert_sequence(code, items);
        self
    }

    pub fn insert_element(&mut self, info: Varinfo) {
        self.elements.insert(info.code, Arc::new(info));
    }

    pub fn insert_sequence(&mut self, code: Varcode, items: impl IntoIterator<Item = Varcode>) {
        self.sequences.insert(code, items.into_iter().collect());
    }
}

/// A [`Resolver`] over tables built in memory, one [`TableSet`] per version.
///
/// Local tables are not modelled: the data category of a key is ignored.
#[derive(Debug, Default, Clone)]
pub struct MemoryTables {
    sets: BTreeMap<TableVersion, TableSet>,
}

impl MemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the tables of a version, replacing any earlier ones.
    pub fn with(mut self, version: TableVersion, set: TableSet) -> Self {
        self.insert(version, set);
        self
    }

    pub fn insert(&mut self, version: TableVersion, set: TableSet) {
        self.sets.insert(version, set);
    }

    fn set(&self, version: &TableVersion) -> Result<&TableSet, TableError> {
        self.sets
            .get(version)
            .ok_or(TableError::UnknownTable(*version))
    }
}

impl Resolver for MemoryTables {
    fn load(&mut self, version: &TableVersion) -> Result<(), TableError> {
        let set = self.set(version)?;
        trace!(
            %version,
            elements = set.elements.len(),
            sequences = set.sequences.len(),
            "tables ready"
        );
        Ok(())
    }

    fn element(&self, key: &TableKey, code: Varcode) -> Result<Arc<Varinfo>, TableError> {
        let version = key.version;
        self.set(&version)?
            .elements
            .get(&code)
            .cloned()
            .ok_or(TableError::UnknownElement { version, code })
    }

    fn sequence(&self, key: &TableKey, code: Varcode) -> Result<&[Varcode], TableError> {
        let version = key.version;
        self.set(&version)?
            .sequences
            .get(&code)
            .map(Vec::as_slice)
            .ok_or(TableError::UnknownSequence { version, code })
    }
}
