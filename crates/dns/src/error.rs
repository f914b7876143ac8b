use thiserror::Error;

use crate::protocol::{record_type::RecordType, response_code::ResponseCode};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of packet: needed {needed} bytes at offset {position}")]
    UnexpectedEnd { position: usize, needed: usize },

    #[error("Name compression loop at offset {position}")]
    PointerLoop { position: usize },

    #[error("Invalid label length byte {byte:#04x} at offset {position}")]
    InvalidLabel { position: usize, byte: u8 },

    #[error("Domain name exceeds 255 bytes at offset {position}")]
    NameTooLong { position: usize },

    #[error("Malformed {record_type} record data at offset {position}")]
    InvalidRdata { record_type: RecordType, position: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Label {0:?} is longer than 63 bytes")]
    LabelTooLong(String),

    #[error("Character string is longer than 255 bytes")]
    StringTooLong,

    #[error("Record data is longer than 65535 bytes")]
    RdataTooLong,
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No usable address for server {0:?}")]
    NoAddress(String),

    #[error("Query timed out")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not encode query: {0}")]
    Encode(#[from] EncodeError),

    #[error("Malformed response: {0}")]
    Parse(#[from] ParseError),

    #[error("Response id {received} does not match query id {expected}")]
    IdMismatch { expected: u16, received: u16 },

    #[error("Response was truncated")]
    Truncated,

    #[error("Server answered with {0:?}")]
    ServerFailure(ResponseCode),
}
