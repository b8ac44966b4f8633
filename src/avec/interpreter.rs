//! Interpretation of descriptor lists.
//!
//! An [`Interpreter`] walks the descriptor list of a bulletin for one subset,
//! expanding sequences and replications, and decoding one value from the data
//! section for every element it reaches.

use alloc::sync::Arc;

use tracing::trace;

use crate::{
    bulletin::Subset,
    cursor::{Cursor, DecodeError},
    sans::data::decode_value,
    table::{Resolver, TableKey},
    value::{Var, Varinfo},
    varcode::{DescriptorClass, Varcode},
};

/// The element holding the count of a delayed replication.
pub const DELAYED_REPLICATION: Varcode = Varcode::from_raw((31 << 8) | 1);

/// The deepest nesting of sequences and replications that is followed.
pub const MAX_DEPTH: usize = 32;

/// Decodes the values of one subset, following a descriptor list.
pub struct Interpreter<'c, 'a, R: ?Sized> {
    cursor: &'c mut Cursor<'a>,
    resolver: &'c R,
    key: TableKey,
    subset: &'c mut Subset,
    depth: usize,
}

impl<'c, 'a, R: Resolver + ?Sized> Interpreter<'c, 'a, R> {
    pub fn new(
        cursor: &'c mut Cursor<'a>,
        resolver: &'c R,
        key: TableKey,
        subset: &'c mut Subset,
    ) -> Self {
        Self {
            cursor,
            resolver,
            key,
            subset,
            depth: 0,
        }
    }

    /// Decode the values for a descriptor list, storing them in the subset.
    pub fn run(&mut self, descriptors: &[Varcode]) -> Result<(), DecodeError> {
        if self.depth >= MAX_DEPTH {
            Err(self.cursor.parse_error(format_args!(
                "Descriptors are nested more than {MAX_DEPTH} levels deep."
            )))?;
        }

        self.depth += 1;
        let mut rest = descriptors;

        while let Some((&code, tail)) = rest.split_first() {
            rest = tail;

            match code.class() {
                DescriptorClass::Element => {
                    let info = self.element(code)?;
                    self.define_variable(info)?;
                }
                DescriptorClass::Sequence => {
                    let resolver = self.resolver;
                    let items = resolver
                        .sequence(&self.key, code)
                        .map_err(|e| self.cursor.table_error(e))?;
                    self.run(items)?;
                }
                DescriptorClass::Replication => {
                    let group = code.x() as usize;
                    if group == 0 || group > rest.len() {
                        Err(self.cursor.parse_error(format_args!(
                            "Replication {code} needs {group} descriptors, {} follow.",
                            rest.len()
                        )))?;
                    }

                    let (items, tail) = rest.split_at(group);
                    rest = tail;

                    let count = match code.y() {
                        0 => self.delayed_count()?,
                        y => y as usize,
                    };

                    trace!(%code, count, "replication");
                    for _ in 0..count {
                        self.run(items)?;
                    }
                }
                DescriptorClass::Operator => Err(self.cursor.unsupported(code))?,
            }
        }

        self.depth -= 1;
        Ok(())
    }

    /// Decode and store a value for an element.
    pub fn define_variable(&mut self, info: Arc<Varinfo>) -> Result<(), DecodeError> {
        self.read_variable(info)?;
        Ok(())
    }

    /// Decode and store a value for an element whose content drives the rest
    /// of the decoding, returning the stored variable.
    pub fn define_semantic_variable(&mut self, info: Arc<Varinfo>) -> Result<&Var, DecodeError> {
        self.read_variable(info)
    }

    fn read_variable(&mut self, info: Arc<Varinfo>) -> Result<&Var, DecodeError> {
        let start = self.cursor.position();
        let token = self.cursor.parse_value(info.len, info.is_numeric())?;

        let var = decode_value(&info, token).map_err(|e| self.cursor.parse_error_at(start, e))?;
        trace!(code = %var.code(), value = %var, "stored variable");

        Ok(self.subset.store_variable(var))
    }

    fn delayed_count(&mut self) -> Result<usize, DecodeError> {
        let info = self.element(DELAYED_REPLICATION)?;
        let count = self.define_semantic_variable(info)?.enqi();

        match count {
            Ok(count) if count >= 0 => Ok(count as usize),
            Ok(count) => Err(self.cursor.parse_error(format_args!(
                "Delayed replication factor {count} is negative."
            ))),
            Err(e) => Err(self.cursor.parse_error(format_args!(
                "Delayed replication factor is not usable: {e}"
            ))),
        }
    }

    fn element(&self, code: Varcode) -> Result<Arc<Varinfo>, DecodeError> {
        self.resolver
            .element(&self.key, code)
            .map_err(|e| self.cursor.table_error(e))
    }
}
