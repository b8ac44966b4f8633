//! Decoded bulletins.

use alloc::{string::String, vec::Vec};
use core::ops::Deref;

use crate::{
    avec::{FromSubset, publish},
    table::{DataCategory, TableKey, TableVersion},
    value::Var,
    varcode::Varcode,
};

/// The indicator and data description sections of a bulletin.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Header {
    /// The name of the file the bulletin was read from, if known.
    pub fname: Option<String>,
    /// The offset of the bulletin within its file.
    pub offset: usize,
    pub version: TableVersion,
    pub category: DataCategory,
    /// The descriptor list, in the order written.
    pub datadesc: Vec<Varcode>,
    /// Whether every data value is preceded by a check digit.
    pub has_check_digit: bool,
}

impl Header {
    /// The key for resolving descriptors of this bulletin.
    pub fn table_key(&self) -> TableKey {
        TableKey {
            version: self.version,
            category: self.category,
        }
    }
}

/// The variables of one subset, in descriptor evaluation order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Subset(Vec<Var>);

impl Subset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable, returning the stored copy.
    pub fn store_variable(&mut self, var: Var) -> &Var {
        self.0.push(var);
        &self.0[self.0.len() - 1]
    }

    /// The first variable for a descriptor, if any.
    pub fn find(&self, code: Varcode) -> Option<&Var> {
        self.0.iter().find(|v| v.code() == code)
    }

    /// Every variable for a descriptor, in order.
    pub fn find_all(&self, code: Varcode) -> impl Iterator<Item = &Var> {
        self.0.iter().filter(move |v| v.code() == code)
    }
}

impl Deref for Subset {
    type Target = [Var];

    fn deref(&self) -> &[Var] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Subset {
    type Item = &'a Var;
    type IntoIter = core::slice::Iter<'a, Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Var>> for Subset {
    fn from(vars: Vec<Var>) -> Self {
        Self(vars)
    }
}

/// A decoded bulletin: its header and its subsets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bulletin {
    header: Header,
    subsets: Vec<Subset>,
}

impl Bulletin {
    pub fn new(header: Header, subsets: Vec<Subset>) -> Self {
        Self { header, subsets }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn subsets(&self) -> &[Subset] {
        &self.subsets
    }

    pub fn fname(&self) -> Option<&str> {
        self.header.fname.as_deref()
    }

    pub fn offset(&self) -> usize {
        self.header.offset
    }

    pub fn master_table_number(&self) -> u8 {
        self.header.version.master_table_number
    }

    pub fn edition(&self) -> u8 {
        self.header.version.edition
    }

    pub fn table(&self) -> u8 {
        self.header.version.table
    }

    /// The data category (the type of the bulletin).
    pub fn category(&self) -> u16 {
        self.header.category.category
    }

    pub fn subtype(&self) -> u8 {
        self.header.category.subtype
    }

    pub fn localsubtype(&self) -> u16 {
        self.header.category.localsubtype
    }

    pub fn datadesc(&self) -> &[Varcode] {
        &self.header.datadesc
    }

    pub fn has_check_digit(&self) -> bool {
        self.header.has_check_digit
    }

    /// Publish every subset to a receiver of its own.
    pub fn extract<T: FromSubset + Default>(&self) -> Vec<T> {
        self.subsets
            .iter()
            .map(|subset| {
                let mut o = T::default();
                publish(subset, &mut o);
                o
            })
            .collect()
    }
}
