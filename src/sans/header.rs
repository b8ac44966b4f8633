//! States processing the indicator and data description sections.

use alloc::string::String;

use either::Either::{self, Left, Right};
use thiserror::Error;
use zerocopy::FromBytes;

use super::data::DataSection;
use crate::{
    cursor::echo,
    table::{DataCategory, TableVersion},
    varcode::{Varcode, digits},
};

/// The literal opening every CREX message.
pub const INDICATOR: &[u8; 6] = b"CREX++";

/// An error advancing over the indicator or data description sections.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeaderError {
    /// Incorrect indicator.
    #[error("Data does not start with a CREX indicator (\"{0}\" was read instead).")]
    NotCrexData(String),
    /// The edition token does not start with `T`.
    #[error("Version not found in data description.")]
    MissingEdition,
    /// The edition token is not `T` followed by six digits.
    #[error("Edition ({0}) is not in format Ttteevv.")]
    BadEdition(String),
    /// The category token does not start with `A`.
    #[error("A table information not found in data description.")]
    MissingCategory,
    /// The category token has neither three nor six digits.
    #[error("Cannot parse an A table indicator {0} digits long.")]
    BadCategoryLength(usize),
    /// The category token is not numeric.
    #[error("A table indicator ({0}) is not numeric.")]
    BadCategory(String),
    /// A descriptor token is not a class letter followed by five digits.
    #[error("Descriptor ({0}) is not a valid descriptor code.")]
    BadDescriptor(String),
    /// An unexpected byte in the descriptor list.
    #[error("Unexpected '{0}' in data descriptor section.")]
    UnexpectedByte(String),
    /// The descriptor list ends with a single `+`.
    #[error("Data descriptor section ends with only one '+'.")]
    LoneTerminator,
}

/// State token to decode the indicator section.
#[derive(Debug)]
pub struct Indicator;

impl Indicator {
    /// Transition to another state by decoding the indicator.
    ///
    /// Returns the successor state token.
    pub fn advance(r: [u8; 6]) -> Result<Edition, HeaderError> {
        if &r != INDICATOR {
            Err(HeaderError::NotCrexData(echo(&r)))?;
        }

        Ok(Edition(()))
    }
}

/// State token to decode the edition token, `T` followed by two digits each of
/// master table number, edition and table version.
#[derive(Debug)]
pub struct Edition(pub(super) ());

impl Edition {
    /// Transition to another state by decoding the edition token.
    ///
    /// Returns the table version, and a successor state token.
    pub fn advance(self, r: &[u8]) -> Result<(TableVersion, Category), HeaderError> {
        let Some((&b'T', rest)) = r.split_first() else {
            return Err(HeaderError::MissingEdition);
        };

        let bad_edition = || HeaderError::BadEdition(echo(r));

        let rest: [u8; 6] = rest.try_into().map_err(|_| bad_edition())?;

        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct EditionDigits {
            master_table_number: [u8; 2],
            edition: [u8; 2],
            table: [u8; 2],
        }

        let EditionDigits {
            master_table_number,
            edition,
            table,
        } = zerocopy::transmute!(rest);

        // Two digits always fit a byte.
        let field = |d: [u8; 2]| digits(&d).map(|v| v as u8).ok_or_else(bad_edition);

        let version = TableVersion {
            master_table_number: field(master_table_number)?,
            edition: field(edition)?,
            table: field(table)?,
        };

        Ok((version, Category(())))
    }
}

/// State token to decode the category token, `A` followed by either a
/// three-digit category, or a three-digit category and a three-digit local
/// subcategory.
#[derive(Debug)]
pub struct Category(pub(super) ());

impl Category {
    /// Transition to another state by decoding the category token.
    ///
    /// Returns the data category, and a successor state token.
    pub fn advance(self, r: &[u8]) -> Result<(DataCategory, DescriptorList), HeaderError> {
        let Some((&b'A', rest)) = r.split_first() else {
            return Err(HeaderError::MissingCategory);
        };

        let value = match rest.len() {
            3 | 6 => digits(rest).ok_or_else(|| HeaderError::BadCategory(echo(r)))?,
            n => Err(HeaderError::BadCategoryLength(n))?,
        };

        // Subtypes are not written in CREX, and are always reported as 255.
        let category = if rest.len() == 3 {
            DataCategory {
                category: value as u16,
                subtype: 255,
                localsubtype: 0,
            }
        } else {
            DataCategory {
                category: (value / 1000) as u16,
                subtype: 255,
                localsubtype: (value % 1000) as u16,
            }
        };

        Ok((category, DescriptorList(())))
    }
}

/// State token to decode an entry of the descriptor list.
#[derive(Debug)]
pub struct DescriptorList(pub(super) ());

impl DescriptorList {
    /// Transition to another state by classifying the first byte of an entry.
    ///
    /// A class letter leads to a [`Descriptor`] state, which expects the whole
    /// six-byte descriptor token. The check digit flag `E` is a complete entry
    /// of one byte, leading straight back to a [`DescriptorList`] state. A `+`
    /// leads to a [`Terminator`] state.
    pub fn advance(
        self,
        lead: u8,
    ) -> Result<Either<Descriptor, Either<DescriptorList, Terminator>>, HeaderError> {
        Ok(match lead {
            b'B' | b'R' | b'C' | b'D' => Left(Descriptor(())),
            b'E' => Right(Left(DescriptorList(()))),
            b'+' => Right(Right(Terminator(()))),
            _ => Err(HeaderError::UnexpectedByte(echo(&[lead])))?,
        })
    }
}

/// State token to decode a descriptor token.
#[derive(Debug)]
pub struct Descriptor(pub(super) ());

impl Descriptor {
    /// Transition to another state by decoding a descriptor token.
    ///
    /// Returns the descriptor code, and a successor state token.
    pub fn advance(self, r: [u8; 6]) -> Result<(Varcode, DescriptorList), HeaderError> {
        let code = Varcode::parse(r).ok_or_else(|| HeaderError::BadDescriptor(echo(&r)))?;
        Ok((code, DescriptorList(())))
    }
}

/// State token to decode the `++` ending the descriptor list.
#[derive(Debug)]
pub struct Terminator(pub(super) ());

impl Terminator {
    /// Transition to another state by decoding the end of the descriptor list.
    ///
    /// Returns the successor state token.
    pub fn advance(self, r: [u8; 2]) -> Result<DataSection, HeaderError> {
        if &r != b"++" {
            Err(HeaderError::LoneTerminator)?;
        }

        Ok(DataSection(()))
    }
}
