//! States processing the data, optional and end sections.

use alloc::{string::String, sync::Arc};

use either::Either::{self, Left, Right};
use thiserror::Error;

use crate::{
    cursor::echo,
    value::{Value, Var, Varinfo, Vartype},
};

/// The literal opening the optional section.
pub const SUPPLEMENT: &[u8; 4] = b"SUPP";

/// The literal ending every CREX message.
pub const TERMINATOR: &[u8; 4] = b"7777";

/// An error advancing over the data, optional or end sections.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// A numeric value is not a base-10 integer.
    #[error("Value \"{0}\" is not a base-10 integer.")]
    BadNumber(String),
    /// A text value is not valid UTF-8.
    #[error("Value \"{0}\" is not valid text.")]
    BadText(String),
    /// A subset is not followed by `+`.
    #[error("There should be a '+' at the end of the data section, found '{0}'.")]
    MissingSubsetEnd(String),
    /// The message does not end with the terminator.
    #[error("Unexpected data after data section or optional section 3 (\"{0}\").")]
    MissingTerminator(String),
}

/// State token to begin decoding the data section.
#[derive(Debug)]
pub struct DataSection(pub(super) ());

impl DataSection {
    /// Transition to the state decoding the first subset.
    pub fn advance(self) -> Subset {
        Subset(())
    }
}

/// State token to decode the values of one subset.
///
/// Values are decoded with [`decode_value`], in descriptor order, while this
/// state is held.
#[derive(Debug)]
pub struct Subset(pub(super) ());

impl Subset {
    /// Transition to another state by decoding the `+` ending a subset.
    ///
    /// Returns the successor state token.
    pub fn advance(self, r: [u8; 1]) -> Result<SubsetEnd, DataError> {
        if r != [b'+'] {
            Err(DataError::MissingSubsetEnd(echo(&r)))?;
        }

        Ok(SubsetEnd(()))
    }
}

/// State token to decide whether another subset follows.
#[derive(Debug)]
pub struct SubsetEnd(pub(super) ());

impl SubsetEnd {
    /// Transition to another state by inspecting the byte after a subset.
    ///
    /// A second `+` ends the data section, and should be consumed. Any other
    /// byte begins another subset, and must be left unread.
    pub fn advance(self, r: [u8; 1]) -> Either<Subset, OptionalSection> {
        if r == [b'+'] {
            Right(OptionalSection(()))
        } else {
            Left(Subset(()))
        }
    }
}

/// State token to decode the start of the optional section.
#[derive(Debug)]
pub struct OptionalSection(pub(super) ());

impl OptionalSection {
    /// Transition to another state by inspecting the bytes after the data
    /// section.
    ///
    /// A `SUPP` literal begins the optional section, and should be consumed.
    /// Otherwise, the bytes must be left unread for the end section.
    pub fn advance(self, r: [u8; 4]) -> Either<Supplement, End> {
        if &r == SUPPLEMENT {
            Left(Supplement(()))
        } else {
            Right(End(()))
        }
    }
}

/// State token to skip over the content of the optional section.
#[derive(Debug)]
pub struct Supplement(pub(super) ());

impl Supplement {
    /// Transition to another state by inspecting two bytes of the optional
    /// section.
    ///
    /// A `++` ends the section, and should be consumed. Otherwise, advance by
    /// a single byte and inspect again.
    pub fn advance(self, r: [u8; 2]) -> Either<Supplement, End> {
        if &r == b"++" {
            Right(End(()))
        } else {
            Left(self)
        }
    }
}

/// State token to decode the end section.
#[derive(Debug)]
pub struct End(pub(super) ());

impl End {
    /// Finish decoding by checking the message terminator.
    pub fn advance(self, r: [u8; 4]) -> Result<(), DataError> {
        if &r != TERMINATOR {
            Err(DataError::MissingTerminator(echo(&r)))?;
        }

        Ok(())
    }
}

/// Decode a value token located by
/// [`Cursor::parse_value`](crate::cursor::Cursor::parse_value).
///
/// A token starting with `/` is missing, and produces an unset variable of any
/// kind. Text and binary tokens are kept verbatim, including padding. Numeric
/// tokens are parsed as base-10 integers; decimal scaling is left to readers
/// of the variable.
pub fn decode_value(info: &Arc<Varinfo>, r: &[u8]) -> Result<Var, DataError> {
    let value = match (r.first(), info.kind) {
        (Some(b'/'), _) => None,
        (_, Vartype::String) => {
            let text = String::from_utf8(r.to_vec()).map_err(|_| DataError::BadText(echo(r)))?;
            Some(Value::String(text))
        }
        (_, Vartype::Binary) => Some(Value::Binary(r.to_vec())),
        (_, Vartype::Integer) => Some(Value::Integer(parse_integer(r)?)),
        (_, Vartype::Decimal) => Some(Value::Decimal(parse_integer(r)?)),
    };

    Ok(Var::decoded(Arc::clone(info), value))
}

fn parse_integer(r: &[u8]) -> Result<i64, DataError> {
    core::str::from_utf8(r)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DataError::BadNumber(echo(r)))
}
