use super::response_code::ResponseCode;

/// Size of the fixed header that starts every DNS message.
pub const HEADER_LEN: usize = 12;

// Header section format https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Header {
    pub request_id: u16,
    pub flags: Flags,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

impl From<Header> for [u8; HEADER_LEN] {
    fn from(header: Header) -> Self {
        let raw_flags: u16 = header.flags.into();
        let mut out = [0u8; HEADER_LEN];
        out[0..2].copy_from_slice(&header.request_id.to_be_bytes());
        out[2..4].copy_from_slice(&raw_flags.to_be_bytes());
        out[4..6].copy_from_slice(&header.question_count.to_be_bytes());
        out[6..8].copy_from_slice(&header.answer_count.to_be_bytes());
        out[8..10].copy_from_slice(&header.authority_count.to_be_bytes());
        out[10..12].copy_from_slice(&header.additional_count.to_be_bytes());
        out
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Flags {
    pub query: bool,
    pub opcode: u8,
    pub authoritative_answer: bool,
    pub truncation: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub z: u8,
    pub response_code: u8,
}

impl Flags {
    /// Flags of a standard recursive query.
    pub fn recursive_query() -> Self {
        Self {
            query: true,
            recursion_desired: true,
            ..Self::default()
        }
    }

    pub fn rcode(&self) -> ResponseCode {
        ResponseCode::from(self.response_code)
    }
}

impl From<u16> for Flags {
    fn from(input: u16) -> Self {
        Self {
            query: (input >> 15 & 1) == 0,
            opcode: (input >> 11 & 0xF) as u8,
            authoritative_answer: (input >> 10 & 1) > 0,
            truncation: (input >> 9 & 1) > 0,
            recursion_desired: (input >> 8 & 1) > 0,
            recursion_available: (input >> 7 & 1) > 0,
            z: (input >> 4 & 0x7) as u8,
            response_code: (input & 0xF) as u8,
        }
    }
}

impl From<Flags> for u16 {
    fn from(flags: Flags) -> Self {
        let mut value = 0u16;
        value |= if flags.query { 0 } else { 0x8000 }; // MSB needs to be set
        value |= ((flags.opcode & 0xF) as u16) << 11;
        value |= u16::from(flags.authoritative_answer) << 10;
        value |= u16::from(flags.truncation) << 9;
        value |= u16::from(flags.recursion_desired) << 8;
        value |= u16::from(flags.recursion_available) << 7;
        value |= ((flags.z & 0x7) as u16) << 4;
        value |= (flags.response_code & 0xF) as u16;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{Flags, Header, HEADER_LEN};
    use crate::protocol::response_code::ResponseCode;

    #[test]
    fn test_conversion_flags() {
        let raw = 0x8100_u16; // response & recursive resolution desired flags set
        let flags = Flags::from(raw);
        assert_eq!(
            flags,
            Flags {
                query: false,
                recursion_desired: true,
                ..Default::default()
            }
        );

        let encoded: u16 = flags.into();
        assert_eq!(raw, encoded);
    }

    #[test]
    fn test_response_code_bits() {
        // response, RD, RA, NXDOMAIN
        let flags = Flags::from(0x8183_u16);
        assert!(flags.recursion_available);
        assert_eq!(flags.rcode(), ResponseCode::NXDOMAIN);

        // REFUSED uses bit 2 of the rcode nibble
        assert_eq!(Flags::from(0x8105_u16).rcode(), ResponseCode::REFUSED);
    }

    #[test]
    fn test_truncation_bit() {
        let flags = Flags::from(0x8300_u16);
        assert!(flags.truncation);
        assert!(flags.recursion_desired);
        assert_eq!(u16::from(flags), 0x8300);
    }

    #[test]
    fn test_header_layout() {
        let header = Header {
            request_id: 0xBEEF,
            flags: Flags::recursive_query(),
            question_count: 1,
            ..Default::default()
        };
        let raw: [u8; HEADER_LEN] = header.into();
        assert_eq!(raw, [0xBE, 0xEF, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0]);
    }
}
