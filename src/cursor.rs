//! Position-tracking reads over the bytes of a message.
//!
//! Every read is bounds-checked: running out of data produces
//! [`DecodeError::Framing`], and the helpers raising grammar errors attach the
//! current [`Location`], so decoders built on a [`Cursor`] never index past the
//! end of a message.

use alloc::{
    borrow::ToOwned,
    format,
    string::{String, ToString},
};
use core::fmt;

use thiserror::Error;
use tinyvec::ArrayVec;
use tracing::trace;

use crate::{sans::check::CheckDigit, table::TableError, varcode::Varcode};

/// The longest token [`Cursor::read_word`] can hold.
pub const WORD_CAPACITY: usize = 32;

/// A token read by [`Cursor::read_word`].
pub type Word = ArrayVec<[u8; WORD_CAPACITY]>;

/// Where in its input an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The name of the file the message was read from, if known.
    pub fname: Option<String>,
    /// The byte offset of the error, counted from the start of the file.
    pub offset: usize,
    /// The message section being decoded.
    pub section: u8,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fname {
            Some(fname) => write!(f, "{fname}:{}", self.offset)?,
            None => write!(f, "offset {}", self.offset)?,
        }
        write!(f, " (section {})", self.section)
    }
}

/// Errors occurring while decoding a bulletin.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The message ended before a required token.
    #[error("{location}: end of data while looking for {context} ({needed} bytes needed, {available} available).")]
    Framing {
        location: Location,
        context: &'static str,
        needed: usize,
        available: usize,
    },
    /// A token does not match the message grammar.
    #[error("{location}: {message}")]
    Parse { location: Location, message: String },
    /// A descriptor or table could not be resolved.
    #[error("{location}: {source}")]
    Table {
        location: Location,
        source: TableError,
    },
    /// A descriptor requires behaviour this decoder does not implement.
    #[error("{location}: descriptor {code} is not supported.")]
    Unsupported { location: Location, code: Varcode },
}

impl DecodeError {
    pub fn location(&self) -> &Location {
        match self {
            Self::Framing { location, .. }
            | Self::Parse { location, .. }
            | Self::Table { location, .. }
            | Self::Unsupported { location, .. } => location,
        }
    }
}

/// A read position over the bytes of one message.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    fname: Option<&'a str>,
    offset: usize,
    section: u8,
    section_starts: [Option<usize>; 5],
    check: Option<CheckDigit>,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            fname: None,
            offset: 0,
            section: 0,
            section_starts: [Some(0), None, None, None, None],
            check: None,
        }
    }

    /// Name the file the message was read from, for error locations.
    pub fn with_fname(mut self, fname: Option<&'a str>) -> Self {
        self.fname = fname;
        self
    }

    /// Set the offset of the message within its file, for error locations.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// The read position, relative to the start of the message.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// The section being decoded.
    pub fn section(&self) -> u8 {
        self.section
    }

    /// Where a section started, relative to the start of the message.
    pub fn section_start(&self, section: u8) -> Option<usize> {
        self.section_starts.get(section as usize).copied().flatten()
    }

    /// Record that a section begins at the read position.
    pub fn mark_section_start(&mut self, section: u8) {
        self.section = section;
        if let Some(start) = self.section_starts.get_mut(section as usize) {
            *start = Some(self.pos);
        }
        trace!(section, position = self.pos, "section start");
    }

    pub fn location(&self) -> Location {
        Location {
            fname: self.fname.map(ToOwned::to_owned),
            offset: self.offset + self.pos,
            section: self.section,
        }
    }

    /// Fail unless at least `n` bytes remain. `context` names what is being
    /// looked for.
    pub fn check_available_data(&self, n: usize, context: &'static str) -> Result<(), DecodeError> {
        let available = self.data.len().saturating_sub(self.pos);

        if available < n {
            Err(DecodeError::Framing {
                location: self.location(),
                context,
                needed: n,
                available,
            })?;
        }

        Ok(())
    }

    /// Fail if no bytes remain.
    pub fn check_eof(&self, context: &'static str) -> Result<(), DecodeError> {
        self.check_available_data(1, context)
    }

    /// The next `N` bytes, without advancing.
    pub fn peek<const N: usize>(&self, context: &'static str) -> Result<[u8; N], DecodeError> {
        self.check_available_data(N, context)?;

        let mut r = [0; N];
        r.copy_from_slice(&self.data[self.pos..self.pos + N]);
        Ok(r)
    }

    /// Advance by up to `n` bytes, stopping at the end of the message.
    pub fn advance(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.data.len());
    }

    pub fn skip_spaces(&mut self) {
        let n = self
            .remaining()
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        self.pos += n;
    }

    /// Advance past `n` bytes of data, then past any whitespace.
    pub fn skip_data_and_spaces(&mut self, n: usize) {
        self.advance(n);
        self.skip_spaces();
    }

    /// Copy the token at the read position without advancing.
    ///
    /// A token runs from the read position up to whitespace, a `+`, the end
    /// of the message, or an uppercase letter after its first byte (the start
    /// of the next header token). Fails if it is longer than `maxlen` or
    /// [`WORD_CAPACITY`] bytes.
    pub fn peek_word(&self, maxlen: usize) -> Result<Word, DecodeError> {
        let maxlen = maxlen.min(WORD_CAPACITY);
        let rest = self.remaining();

        let len = rest
            .iter()
            .enumerate()
            .take_while(|(i, b)| !is_delimiter(**b) && (*i == 0 || !b.is_ascii_uppercase()))
            .count();

        if len > maxlen {
            Err(self.parse_error(format_args!(
                "Token \"{}\" is longer than {maxlen} bytes.",
                echo(&rest[..len])
            )))?;
        }

        let mut word = Word::new();
        word.extend_from_slice(&rest[..len]);
        Ok(word)
    }

    /// Copy the token at the read position, then advance past it and any
    /// whitespace. See [`Cursor::peek_word`].
    pub fn read_word(&mut self, maxlen: usize) -> Result<Word, DecodeError> {
        let word = self.peek_word(maxlen)?;
        self.skip_data_and_spaces(word.len());
        Ok(word)
    }

    /// Require a check digit before every following data value.
    pub fn arm_check_digit(&mut self) {
        self.check = Some(CheckDigit::new());
    }

    /// Locate the next data value, skipping any whitespace before it, and
    /// advance past it and any whitespace after it.
    ///
    /// Text and binary values are exactly `len` bytes. A numeric value starting
    /// with `/` is missing, and spans the run of `/` up to `len` bytes. Other
    /// numeric values are an optional `-` followed by up to `len` bytes, ending
    /// early at whitespace or `+`. When check digits are armed, the value is
    /// preceded by one.
    pub fn parse_value(&mut self, len: u32, numeric: bool) -> Result<&'a [u8], DecodeError> {
        let len = len as usize;
        self.skip_spaces();

        if let Some(mut check) = self.check {
            self.check_available_data(1, "check digit")?;

            let found = self.data[self.pos];
            check.verify(found).map_err(|expected| {
                self.parse_error(format_args!(
                    "Check digit mismatch: expected {expected}, found '{}'.",
                    found.escape_ascii()
                ))
            })?;

            self.check = Some(check);
            self.pos += 1;
        }

        self.check_eof("data value")?;

        let start = self.pos;
        let rest = self.remaining();

        let end = if !numeric {
            self.check_available_data(len, "data value")?;
            start + len
        } else if rest[0] == b'/' {
            start + rest.iter().take(len.max(1)).take_while(|b| **b == b'/').count()
        } else {
            let sign = usize::from(rest[0] == b'-');
            let digits = rest[sign..]
                .iter()
                .take(len)
                .take_while(|b| !is_delimiter(**b))
                .count();
            start + sign + digits
        };

        self.pos = end;
        let token = &self.data[start..end];
        self.skip_spaces();

        Ok(token)
    }

    /// A grammar error at the read position.
    pub fn parse_error(&self, message: impl fmt::Display) -> DecodeError {
        DecodeError::Parse {
            location: self.location(),
            message: message.to_string(),
        }
    }

    /// A grammar error at an earlier read position, such as the start of a
    /// token that has already been consumed.
    pub fn parse_error_at(&self, position: usize, message: impl fmt::Display) -> DecodeError {
        let mut location = self.location();
        location.offset = self.offset + position.min(self.pos);

        DecodeError::Parse {
            location,
            message: message.to_string(),
        }
    }

    /// A resolution error at the read position.
    pub fn table_error(&self, source: TableError) -> DecodeError {
        DecodeError::Table {
            location: self.location(),
            source,
        }
    }

    /// An unsupported descriptor at the read position.
    pub fn unsupported(&self, code: Varcode) -> DecodeError {
        DecodeError::Unsupported {
            location: self.location(),
            code,
        }
    }
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'+'
}

/// Render bytes from the message for an error message.
pub(crate) fn echo(r: &[u8]) -> String {
    format!("{}", r.escape_ascii())
}
