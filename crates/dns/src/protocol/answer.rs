use std::net::{Ipv4Addr, Ipv6Addr};

use super::record_type::RecordType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerMeta {
    pub name: String,
    pub r#type: RecordType,
    pub class: u16,
    pub ttl: u32,
    pub len: u16,
}

/// A resource record from the answer section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub meta: AnswerMeta,
    pub value: AnswerValue,
}

impl Answer {
    pub fn new(meta: AnswerMeta, value: AnswerValue) -> Self {
        Self { meta, value }
    }
}

/// Decoded `RDATA`. Types we don't decode keep their raw bytes in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    A {
        ipv4: Ipv4Addr,
    },
    AAAA {
        ipv6: Ipv6Addr,
    },
    CNAME {
        cname: String,
    },
    NS {
        ns: String,
    },
    MX {
        preference: u16,
        exchange: String,
    },
    TXT {
        segments: Vec<Vec<u8>>,
    },
    SOA {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Other {
        rdata: Vec<u8>,
    },
}
