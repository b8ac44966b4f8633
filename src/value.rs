//! The value model: element metadata and the variables decoded against it.
//!
//! A [`Varinfo`] describes one element descriptor (its kind, width, scale and
//! unit) and is shared by reference between every [`Var`] holding a value for
//! that element. A [`Var`] is either unset or holds a value of exactly the kind
//! its [`Varinfo`] declares.

pub mod info;
pub mod var;

pub use info::{Varinfo, Vartype};
pub use var::{Scalar, Value, ValueError, Var};
