//! Minimal DNS wire protocol: message types, a bounds-checked parser, query/response
//! encoding and a blocking UDP client.

pub mod error;
pub mod parse;
pub mod protocol;
pub mod resolver;
pub mod serialize;

pub use error::{EncodeError, ParseError, ResolveError};
