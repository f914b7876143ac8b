/// `RCODE` of a response header, see https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum ResponseCode {
    NOERROR,
    FORMERR,
    SERVFAIL,
    NXDOMAIN,
    NOTIMP,
    REFUSED,
    Other(u8),
}

impl From<ResponseCode> for u8 {
    fn from(rc: ResponseCode) -> Self {
        match rc {
            ResponseCode::NOERROR => 0,
            ResponseCode::FORMERR => 1,
            ResponseCode::SERVFAIL => 2,
            ResponseCode::NXDOMAIN => 3,
            ResponseCode::NOTIMP => 4,
            ResponseCode::REFUSED => 5,
            ResponseCode::Other(n) => n,
        }
    }
}

impl From<u8> for ResponseCode {
    fn from(input: u8) -> Self {
        match input {
            0 => Self::NOERROR,
            1 => Self::FORMERR,
            2 => Self::SERVFAIL,
            3 => Self::NXDOMAIN,
            4 => Self::NOTIMP,
            5 => Self::REFUSED,
            n => Self::Other(n),
        }
    }
}
