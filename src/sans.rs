//! Internal finite-state machine for implementing decoders.
//!
//! This module is intended for applications that need fine control over
//! decoder internals. See [`crate::avec`] for implementations covering common
//! decoding patterns.
//!
//! # Architecture
//!
//! All states are represented by a zero-size, non-copy token. Once the bytes
//! of a token are ready, transition to another state by calling the state's
//! `advance` method. This will return a successor state token, along with any
//! extracted data. Where the grammar offers a choice, the successor is an
//! [`either::Either`].
//!
//! Only the initial state, re-exported for convenience as [`Decoder`], can be
//! constructed.
//!
//! The states cover the message framing and the header grammar. Some areas of
//! the decoding process are not represented in the finite-state machine and
//! must be carefully written:
//!
//! - Reading bytes from the correct place in the message, and skipping the
//! whitespace between tokens. A bounds-checked [`crate::cursor::Cursor`] is
//! provided for this.
//!
//! - Walking the descriptor list while a [`data::Subset`] state is held, and
//! decoding one value per element with [`data::decode_value`].
//!
//! - Verifying check digits. A helper is provided in the [`check`] module.
//!
//! Implementers are recommended to begin by studying and modifying the decoder
//! in [`crate::avec::slice`].

pub mod check;
pub mod data;
pub mod header;

/// Entrypoint to the finite-state machine.
pub type Decoder = header::Indicator;
