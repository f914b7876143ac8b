#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
/// The `TYPE` field of questions and resource records.
///
/// Only the types whose `RDATA` we know how to decode get their own variant. Everything
/// else is carried as `Unknown` with its raw code, so that a response with unexpected
/// records (e.g. `RRSIG` or `OPT`) still parses and the records can be skipped via
/// their `RDLENGTH`.
pub enum RecordType {
    // RFC 1035 TYPEs, see https://datatracker.ietf.org/doc/html/rfc1035#section-3.2.2
    A,     // 1 a host address
    NS,    // 2 an authoritative name server
    CNAME, // 5 the canonical name for an alias
    SOA,   // 6 marks the start of a zone of authority
    MX,    // 15 mail exchange
    TXT,   // 16 text strings
    // IPv6 host address, see https://datatracker.ietf.org/doc/html/rfc3596#section-2.1
    AAAA, // 28
    // Fallback
    Unknown(u16),
}

impl From<u16> for RecordType {
    fn from(input: u16) -> Self {
        match input {
            1 => Self::A,
            2 => Self::NS,
            5 => Self::CNAME,
            6 => Self::SOA,
            15 => Self::MX,
            16 => Self::TXT,
            28 => Self::AAAA,
            _ => Self::Unknown(input),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::Unknown(n) => n,
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::A => f.write_str("A"),
            RecordType::NS => f.write_str("NS"),
            RecordType::CNAME => f.write_str("CNAME"),
            RecordType::SOA => f.write_str("SOA"),
            RecordType::MX => f.write_str("MX"),
            RecordType::TXT => f.write_str("TXT"),
            RecordType::AAAA => f.write_str("AAAA"),
            RecordType::Unknown(n) => write!(f, "TYPE{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RecordType;

    #[test]
    fn test_unknown_codes_are_preserved() {
        let rrsig = RecordType::from(46);
        assert_eq!(rrsig, RecordType::Unknown(46));
        assert_eq!(u16::from(rrsig), 46);
        assert_eq!(rrsig.to_string(), "TYPE46");
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(RecordType::from(28), RecordType::AAAA);
        assert_eq!(u16::from(RecordType::MX), 15);
    }
}
