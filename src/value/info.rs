//! Element metadata.

use alloc::string::String;

use crate::varcode::Varcode;

/// The kind of value an element holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vartype {
    /// A whole number.
    Integer,
    /// A number held as an integer scaled by a power of ten.
    Decimal,
    /// Text.
    String,
    /// Opaque bytes.
    Binary,
}

impl Vartype {
    /// Whether values of this kind are written as signed decimal digits.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }
}

/// Immutable metadata for an element descriptor.
///
/// Produced by a [`Resolver`](crate::table::Resolver) and shared between every
/// [`Var`](super::Var) decoded for the same element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varinfo {
    /// The descriptor this metadata belongs to.
    pub code: Varcode,
    /// The kind of value.
    pub kind: Vartype,
    /// The width of the value in CREX characters, excluding any sign.
    pub len: u32,
    /// The number of decimal places applied to [`Vartype::Decimal`] values.
    /// Negative scales multiply by a power of ten.
    pub scale: i32,
    /// The unit of measurement.
    pub unit: String,
    /// A human-readable description.
    pub desc: String,
}

impl Varinfo {
    pub fn new(
        code: Varcode,
        kind: Vartype,
        len: u32,
        scale: i32,
        unit: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            code,
            kind,
            len,
            scale,
            unit: unit.into(),
            desc: desc.into(),
        }
    }

    pub fn integer(code: Varcode, len: u32, unit: impl Into<String>, desc: impl Into<String>) -> Self {
        Self::new(code, Vartype::Integer, len, 0, unit, desc)
    }

    pub fn decimal(
        code: Varcode,
        len: u32,
        scale: i32,
        unit: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        Self::new(code, Vartype::Decimal, len, scale, unit, desc)
    }

    pub fn string(code: Varcode, len: u32, desc: impl Into<String>) -> Self {
        Self::new(code, Vartype::String, len, 0, "CHARACTER", desc)
    }

    pub fn binary(code: Varcode, len: u32, desc: impl Into<String>) -> Self {
        Self::new(code, Vartype::Binary, len, 0, "", desc)
    }

    /// Whether values of this element are written as signed decimal digits.
    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }
}
