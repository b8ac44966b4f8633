//! Slice-based decoder implementation.

use alloc::vec::Vec;

use either::Either::{Left, Right};
use tracing::{debug, trace};

use crate::{
    bulletin::{Bulletin, Header, Subset},
    cursor::{Cursor, DecodeError, echo},
    sans::{
        Decoder,
        data::{DataError, DataSection, SUPPLEMENT, TERMINATOR},
        header::INDICATOR,
    },
    table::Resolver,
    varcode::DescriptorClass,
};

use super::{DecodeOptions, interpreter::Interpreter};

/// The longest edition token accepted.
const EDITION_MAXLEN: usize = 10;

/// The longest category token accepted.
const CATEGORY_MAXLEN: usize = 19;

/// Decode a bulletin from a slice holding exactly one message.
///
/// This method is also re-exported as `crex::avec::decode_slice`.
pub fn decode<R: Resolver + ?Sized>(
    r: &[u8],
    resolver: &mut R,
    options: &DecodeOptions,
) -> Result<Bulletin, DecodeError> {
    let mut cursor = Cursor::new(r)
        .with_fname(options.fname.as_deref())
        .with_offset(options.offset);

    let (header, state) = decode_header_sections(&mut cursor, resolver, options)?;
    let subsets = decode_data_sections(state, &mut cursor, resolver, &header)?;

    debug!(
        fname = options.fname.as_deref(),
        offset = options.offset,
        subsets = subsets.len(),
        "decoded bulletin"
    );

    Ok(Bulletin::new(header, subsets))
}

/// Decode only the indicator and data description sections of a message,
/// loading its tables.
pub fn decode_header<R: Resolver + ?Sized>(
    r: &[u8],
    resolver: &mut R,
    options: &DecodeOptions,
) -> Result<Header, DecodeError> {
    let mut cursor = Cursor::new(r)
        .with_fname(options.fname.as_deref())
        .with_offset(options.offset);

    let (header, _) = decode_header_sections(&mut cursor, resolver, options)?;
    Ok(header)
}

fn decode_header_sections<R: Resolver + ?Sized>(
    c: &mut Cursor,
    resolver: &mut R,
    options: &DecodeOptions,
) -> Result<(Header, DataSection), DecodeError> {
    let edition = Decoder::advance(c.peek("initial header of CREX message")?)
        .map_err(|e| c.parse_error(e))?;
    c.skip_data_and_spaces(INDICATOR.len());
    trace!("found CREX indicator");

    c.mark_section_start(1);

    c.check_eof("edition")?;
    let word = c.read_word(EDITION_MAXLEN)?;
    let (version, category) = edition.advance(&word).map_err(|e| c.parse_error(e))?;
    trace!(%version, "edition");

    c.check_eof("A code")?;
    let word = c.read_word(CATEGORY_MAXLEN)?;
    let (data_category, mut list) = category.advance(&word).map_err(|e| c.parse_error(e))?;
    trace!(
        category = data_category.category,
        localsubtype = data_category.localsubtype,
        "category"
    );

    let mut datadesc = Vec::new();
    let mut has_check_digit = false;

    let data_section = loop {
        let [lead] = c.peek("data descriptor section")?;

        list = match list.advance(lead).map_err(|e| c.parse_error(e))? {
            Left(state) => {
                let (code, successor) = state
                    .advance(c.peek("one data descriptor")?)
                    .map_err(|e| c.parse_error(e))?;
                datadesc.push(code);
                c.skip_data_and_spaces(6);
                successor
            }
            Right(Left(successor)) => {
                has_check_digit = true;
                c.arm_check_digit();
                c.skip_data_and_spaces(1);
                successor
            }
            Right(Right(state)) => {
                let successor = state
                    .advance(c.peek("end of data descriptor section")?)
                    .map_err(|e| c.parse_error(e))?;
                c.skip_data_and_spaces(2);
                break successor;
            }
        };
    };
    trace!(descriptors = datadesc.len(), has_check_digit, "data descriptor section");

    let header = Header {
        fname: options.fname.clone(),
        offset: options.offset,
        version,
        category: data_category,
        datadesc,
        has_check_digit,
    };

    resolver.load(&version).map_err(|e| c.table_error(e))?;

    // Resolve the top level eagerly, so that missing tables are reported
    // before any data is read.
    let key = header.table_key();
    for &code in &header.datadesc {
        let resolved = match code.class() {
            DescriptorClass::Element => resolver.element(&key, code).map(drop),
            DescriptorClass::Sequence => resolver.sequence(&key, code).map(drop),
            DescriptorClass::Replication | DescriptorClass::Operator => Ok(()),
        };
        resolved.map_err(|e| c.table_error(e))?;
    }

    Ok((header, data_section))
}

fn decode_data_sections<R: Resolver + ?Sized>(
    state: DataSection,
    c: &mut Cursor,
    resolver: &R,
    header: &Header,
) -> Result<Vec<Subset>, DecodeError> {
    c.mark_section_start(2);

    let key = header.table_key();
    let mut subsets = Vec::new();
    let mut state = state.advance();

    let optional = loop {
        let mut subset = Subset::new();
        Interpreter::new(c, resolver, key, &mut subset).run(&header.datadesc)?;
        subsets.push(subset);

        c.skip_spaces();
        let end = state
            .advance(c.peek("end of data section")?)
            .map_err(|e| c.parse_error(e))?;
        c.advance(1);

        // Peek at the next byte to see if it ends the section.
        match end.advance(c.peek("end of data section")?) {
            Left(successor) => state = successor,
            Right(successor) => {
                c.advance(1);
                break successor;
            }
        }
    };
    c.skip_spaces();

    c.mark_section_start(3);
    let end = match optional.advance(peek_terminator(c)?) {
        Left(mut supplement) => {
            let start = c.position();
            c.advance(SUPPLEMENT.len());

            loop {
                supplement = match supplement.advance(c.peek("end of CREX optional section 3")?) {
                    Left(successor) => {
                        c.advance(1);
                        successor
                    }
                    Right(end) => {
                        debug!(bytes = c.position() - start, "skipped optional section");
                        c.skip_data_and_spaces(2);
                        break end;
                    }
                };
            }
        }
        Right(end) => end,
    };

    c.mark_section_start(4);
    end.advance(peek_terminator(c)?)
        .map_err(|e| c.parse_error(e))?;
    c.advance(TERMINATOR.len());

    Ok(subsets)
}

/// Peek at the four bytes where the terminator is expected. A message ending
/// early is missing its terminator, rather than being short of data.
fn peek_terminator(c: &Cursor) -> Result<[u8; 4], DecodeError> {
    let rest = c.remaining();

    rest.get(..TERMINATOR.len())
        .and_then(|r| r.try_into().ok())
        .ok_or_else(|| c.parse_error(DataError::MissingTerminator(echo(rest))))
}

/// Iterate over the messages in a buffer.
///
/// A message starts at a `CREX++` indicator and ends after the next `7777`
/// terminator that stands as a token of its own. Each item holds the offset of
/// the message within the buffer. A message without a terminator runs to the
/// end of the buffer, so that decoding it reports the error.
pub fn messages(r: &[u8]) -> Messages<'_> {
    Messages { data: r, pos: 0 }
}

/// An iterator over the messages in a buffer. See [`messages`].
#[derive(Debug, Clone)]
pub struct Messages<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Messages<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.data.get(self.pos..)?;
        let start = self.pos + find(rest, INDICATOR)?;

        let body = start + INDICATOR.len();
        let end = (body..self.data.len())
            .find(|&i| is_terminator_at(self.data, i))
            .map_or(self.data.len(), |i| i + TERMINATOR.len());

        self.pos = end;
        Some((start, &self.data[start..end]))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn is_terminator_at(r: &[u8], i: usize) -> bool {
    let separated = |b: Option<&u8>| b.is_none_or(|b| b.is_ascii_whitespace() || *b == b'+');

    r[i..].starts_with(TERMINATOR)
        && separated(i.checked_sub(1).and_then(|j| r.get(j)))
        && separated(r.get(i + TERMINATOR.len()))
}
