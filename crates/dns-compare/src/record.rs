use std::{fmt, str::FromStr};

use dns::protocol::{
    answer::{Answer, AnswerValue},
    record_type::RecordType as WireType,
};
use serde::Serialize;

use crate::{classify::Severity, error::ConfigError};

/// The record types that can be fetched and compared.
///
/// Declaration order is the sort order used by [`RecordSet`].
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum RecordType {
    SOA,
    A,
    AAAA,
    CNAME,
    MX,
    TXT,
    NS,
}

impl RecordType {
    /// Every supported type, in report order.
    pub const ALL: [RecordType; 7] = [
        RecordType::SOA,
        RecordType::A,
        RecordType::AAAA,
        RecordType::CNAME,
        RecordType::MX,
        RecordType::TXT,
        RecordType::NS,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::SOA => "SOA",
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::NS => "NS",
        }
    }

    /// Severity when the two servers return a different number of records.
    ///
    /// Authoritative servers commonly differ in NS glue, so only NS is downgraded.
    pub fn count_mismatch_severity(&self) -> Severity {
        match self {
            RecordType::NS => Severity::Warn,
            _ => Severity::Error,
        }
    }

    /// Severity when two records at the same position carry different values.
    ///
    /// SOA serials and NS sets are server-local even in consistent zones.
    pub fn value_mismatch_severity(&self) -> Severity {
        match self {
            RecordType::SOA | RecordType::NS => Severity::Warn,
            _ => Severity::Error,
        }
    }

    /// Reduces an answer to its comparable form. Answers of any other type, such as
    /// the CNAME chain a recursive server prepends to an A answer, yield `None`.
    pub fn normalize(&self, answer: &Answer) -> Option<NormalizedRecord> {
        let ttl = answer.meta.ttl;
        let record = match (self, &answer.value) {
            (RecordType::A, AnswerValue::A { ipv4 }) => {
                NormalizedRecord::new(*self, ipv4.to_string(), ttl)
            }
            (RecordType::AAAA, AnswerValue::AAAA { ipv6 }) => {
                NormalizedRecord::new(*self, ipv6.to_string(), ttl)
            }
            (RecordType::CNAME, AnswerValue::CNAME { cname }) => {
                NormalizedRecord::new(*self, cname.clone(), ttl)
            }
            (RecordType::NS, AnswerValue::NS { ns }) => {
                NormalizedRecord::new(*self, ns.clone(), ttl)
            }
            (
                RecordType::MX,
                AnswerValue::MX {
                    preference,
                    exchange,
                },
            ) => NormalizedRecord {
                record_type: *self,
                value: format!("{preference} {exchange}"),
                ttl,
                mx_preference: Some(*preference),
            },
            (RecordType::TXT, AnswerValue::TXT { segments }) => {
                let first = segments
                    .first()
                    .map(|segment| String::from_utf8_lossy(segment).into_owned())
                    .unwrap_or_default();
                NormalizedRecord::new(*self, first, ttl)
            }
            (
                RecordType::SOA,
                AnswerValue::SOA {
                    mname,
                    rname,
                    serial,
                    refresh,
                    retry,
                    expire,
                    minimum,
                },
            ) => NormalizedRecord::new(
                *self,
                format!("{mname} {rname} {serial} {refresh} {retry} {expire} {minimum}"),
                ttl,
            ),
            _ => return None,
        };
        Some(record)
    }
}

impl From<RecordType> for WireType {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::SOA => WireType::SOA,
            RecordType::A => WireType::A,
            RecordType::AAAA => WireType::AAAA,
            RecordType::CNAME => WireType::CNAME,
            RecordType::MX => WireType::MX,
            RecordType::TXT => WireType::TXT,
            RecordType::NS => WireType::NS,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownRecordType(s.into()))
    }
}

/// A record reduced to a canonical, comparable value plus its TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    record_type: RecordType,
    value: String,
    ttl: u32,
    mx_preference: Option<u16>,
}

impl NormalizedRecord {
    pub fn new(record_type: RecordType, value: impl Into<String>, ttl: u32) -> Self {
        Self {
            record_type,
            value: value.into(),
            ttl,
            mx_preference: None,
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn mx_preference(&self) -> Option<u16> {
        self.mx_preference
    }
}

/// Records returned by one server for one (name, type), sorted by (type, value).
///
/// Sorting makes the positional comparison in [`crate::classify`] independent of the
/// order a server happens to return records in. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<NormalizedRecord>,
}

impl RecordSet {
    pub fn new(mut records: Vec<NormalizedRecord>) -> Self {
        records.sort_by(|a, b| {
            a.record_type
                .cmp(&b.record_type)
                .then_with(|| a.value.cmp(&b.value))
        });
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalizes the answers matching `record_type` and drops everything else.
    pub fn from_answers(record_type: RecordType, answers: &[Answer]) -> Self {
        Self::new(
            answers
                .iter()
                .filter_map(|answer| record_type.normalize(answer))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRecord> {
        self.records.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(NormalizedRecord::value)
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a NormalizedRecord;
    type IntoIter = std::slice::Iter<'a, NormalizedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
