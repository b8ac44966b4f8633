#![no_std]

//! A decoder for CREX, the character form of WMO meteorological bulletins.
//!
//! A CREX message carries a header naming its table edition, category and a
//! list of descriptors, followed by one or more subsets of values written as
//! text. Decoding expands the descriptor list against a [`table::Resolver`],
//! producing a [`Bulletin`] of typed variables.
//!
//! Most users should begin with the functions and derive macros in the [`avec`]
//! module. If these prove insufficient, consider implementing a decoder as
//! described in the [`sans`] module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based decoder (default).

extern crate alloc;

pub mod avec;
pub mod bulletin;
pub mod cursor;
pub mod sans;
pub mod table;
pub mod value;
pub mod varcode;

pub use bulletin::{Bulletin, Header, Subset};
pub use cursor::DecodeError;
pub use value::{Var, Varinfo, Vartype};
pub use varcode::Varcode;
