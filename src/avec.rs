//! Convenience interfaces for common decoding patterns.
//!
//! The functions in this module decode whole bulletins from data slices and
//! readers into a [`Bulletin`](crate::bulletin::Bulletin). Subsets can then be
//! published to the [`FromSubset`] trait, which can be derived for structs of
//! a known shape. See the [`FromSubset`](macro@FromSubset) macro for details.

pub mod interpreter;
#[cfg(feature = "std")]
pub mod reader;
pub mod slice;

#[cfg(feature = "std")]
pub use reader::{decode as decode_reader, decode_all};
pub use slice::{decode as decode_slice, decode_header, messages};

use alloc::string::String;

use crate::{bulletin::Subset, value::Scalar, varcode::Varcode};

/// Options for decoding a bulletin.
///
/// Both options only affect the locations reported in errors, and are copied
/// into the decoded [`Header`](crate::bulletin::Header).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// The name of the file the bulletin is read from.
    pub fname: Option<String>,
    /// The offset of the bulletin within its file.
    pub offset: usize,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fname(mut self, fname: impl Into<String>) -> Self {
        self.fname = Some(fname.into());
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Derive [`FromSubset`] for a struct representing a single subset.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive a single value for a descriptor, add the `var(CODE)` attribute to
/// an `Option<T>` struct field, where `CODE` is the descriptor as written in
/// CREX and `T` is one of `i64` (integer elements), `f64` (decimal elements),
/// `String` (text elements) or `Vec<u8>` (binary elements). Additional values
/// received for the same descriptor will replace earlier ones.
///
/// ```
/// #[derive(Debug, Default, FromSubset)]
/// struct Observation {
///     #[var(B01001)]
///     block: Option<i64>,
///     #[var(B01002)]
///     station: Option<i64>,
///     #[var(B12101)]
///     temperature: Option<f64>,
/// }
/// ```
///
/// To receive repeated values, supply an accumulator closure. Since the value
/// type cannot be inferred, the second argument must be typed, as one of
/// `i64`, `f64`, `&str` or `&[u8]`.
///
/// ```
/// #[derive(Debug, Default, FromSubset)]
/// struct Profile {
///     #[var(B12101, |v, t: f64| v.push(t))]
///     temperatures: Vec<f64>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use crex_derive::FromSubset;

/// Receive the values of a subset.
///
/// Values are published in descriptor order, after decimal scaling. Unset
/// variables are skipped.
///
/// The default implementation of each method ignores received values.
///
/// See the [`FromSubset`](macro@FromSubset) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromSubset {
    /// Add the value of an integer element.
    fn add_integer(&mut self, code: Varcode, _: i64) {}
    /// Add the value of a decimal element.
    fn add_decimal(&mut self, code: Varcode, _: f64) {}
    /// Add the value of a text element.
    fn add_string(&mut self, code: Varcode, _: &str) {}
    /// Add the value of a binary element.
    fn add_binary(&mut self, code: Varcode, _: &[u8]) {}
}

/// Publish the values of a subset to a receiver.
pub fn publish(subset: &Subset, o: &mut (impl FromSubset + ?Sized)) {
    for var in subset {
        let code = var.code();

        match var.enq() {
            Ok(Scalar::Integer(v)) => o.add_integer(code, v),
            Ok(Scalar::Decimal(v)) => o.add_decimal(code, v),
            Ok(Scalar::String(v)) => o.add_string(code, v),
            Ok(Scalar::Binary(v)) => o.add_binary(code, v),
            Err(_) => {}
        }
    }
}
