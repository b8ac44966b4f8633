//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::{io::Read, vec::Vec};

use thiserror::Error;
use tracing::debug;

use crate::{bulletin::Bulletin, cursor::DecodeError, table::Resolver};

use super::{
    DecodeOptions,
    slice::{self, messages},
};

extern crate std;

/// Errors occurring while decoding from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// An error decoding the bytes read.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Decode a bulletin from a reader holding exactly one message.
///
/// The reader is read to its end before decoding begins.
///
/// This method is also re-exported as `crex::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode<R: Resolver + ?Sized>(
    r: &mut impl Read,
    resolver: &mut R,
    options: &DecodeOptions,
) -> Result<Bulletin, Error> {
    let buf = read_all(r)?;
    Ok(slice::decode(&buf, resolver, options)?)
}

/// Decode every bulletin from a reader holding a sequence of messages.
///
/// Bytes between messages are ignored. The offset of each bulletin is counted
/// from the start of the reader, plus the offset in `options`. Decoding stops
/// at the first message in error.
///
/// _Requires Cargo feature `std`._
pub fn decode_all<R: Resolver + ?Sized>(
    r: &mut impl Read,
    resolver: &mut R,
    options: &DecodeOptions,
) -> Result<Vec<Bulletin>, Error> {
    let buf = read_all(r)?;

    let mut bulletins = Vec::new();

    for (offset, message) in messages(&buf) {
        let options = options.clone().with_offset(options.offset + offset);
        bulletins.push(slice::decode(message, resolver, &options)?);
    }

    debug!(bulletins = bulletins.len(), "decoded messages");

    Ok(bulletins)
}

fn read_all(r: &mut impl Read) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    r.read_to_end(&mut buf)?;
    Ok(buf)
}
