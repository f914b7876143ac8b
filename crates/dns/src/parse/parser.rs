use crate::{
    error::ParseError,
    protocol::{
        answer::{Answer, AnswerMeta, AnswerValue},
        header::{Flags, Header},
        question::Question,
        record_type::RecordType,
    },
};

/// Largest DNS message we accept over UDP without EDNS.
pub const MAX_UDP_PACKET_LEN: usize = 512;

pub type DnsPacketBuffer = [u8; MAX_UDP_PACKET_LEN];

/// Upper bound on compression pointers followed while reading a single name.
const MAX_POINTER_JUMPS: usize = 64;
const MAX_NAME_LEN: usize = 255;

#[derive(Debug)]
pub struct DnsParser<'a> {
    pub buf: &'a [u8],
    position: usize,
}

pub trait Collate {
    fn collate(self) -> usize;
}

impl<'a> Collate for &'a [u8] {
    fn collate(self: &'a [u8]) -> usize {
        self.iter()
            .fold(0usize, |acc, byte| acc << 8 | *byte as usize)
    }
}

impl<const N: usize> Collate for [u8; N] {
    fn collate(self: [u8; N]) -> usize {
        self.iter()
            .fold(0usize, |acc, byte| acc << 8 | *byte as usize)
    }
}

impl<'a> DnsParser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    fn slice(&self, start: usize, n: usize) -> Result<&'a [u8], ParseError> {
        let buf: &'a [u8] = self.buf;
        start
            .checked_add(n)
            .and_then(|end| buf.get(start..end))
            .ok_or(ParseError::UnexpectedEnd {
                position: start,
                needed: n,
            })
    }

    fn advance(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        let out = self.slice(self.position, n)?;
        self.position += n;
        Ok(out)
    }

    fn advance_n<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.advance(N)?);
        Ok(out)
    }

    fn read_u16(&mut self) -> Result<u16, ParseError> {
        Ok(self.advance_n::<2>()?.collate() as u16)
    }

    fn read_u32(&mut self) -> Result<u32, ParseError> {
        Ok(self.advance_n::<4>()?.collate() as u32)
    }

    // https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4
    // Labels are read from a cursor that may jump backwards through compression pointers;
    // the parser position continues right after the first pointer (or the terminating zero).
    fn parse_domain_name(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        // length on the wire, counting the terminating zero
        let mut wire_len = 1;
        let mut cursor = self.position;
        let mut resume_at = None;
        let mut jumps = 0;

        loop {
            let len = self.slice(cursor, 1)?[0];
            match len & 0xC0 {
                0xC0 => {
                    let low = self.slice(cursor + 1, 1)?[0];
                    resume_at.get_or_insert(cursor + 2);
                    jumps += 1;
                    if jumps > MAX_POINTER_JUMPS {
                        return Err(ParseError::PointerLoop { position: cursor });
                    }
                    cursor = ((len as usize & 0x3F) << 8) | low as usize;
                }
                0x00 => {
                    cursor += 1;
                    if len == 0 {
                        break;
                    }
                    let label = self.slice(cursor, len as usize)?;
                    if !name.is_empty() {
                        name.push('.');
                    }
                    for c in label {
                        name.push(*c as char);
                    }
                    wire_len += 1 + label.len();
                    if wire_len > MAX_NAME_LEN {
                        return Err(ParseError::NameTooLong { position: cursor });
                    }
                    cursor += len as usize;
                }
                _ => {
                    return Err(ParseError::InvalidLabel {
                        position: cursor,
                        byte: len,
                    })
                }
            }
        }

        self.position = resume_at.unwrap_or(cursor);
        Ok(name)
    }

    // Header section format https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
    pub fn parse_header(&mut self) -> Result<Header, ParseError> {
        Ok(Header {
            request_id: self.read_u16()?,
            flags: Flags::from(self.read_u16()?),
            question_count: self.read_u16()?,
            answer_count: self.read_u16()?,
            authority_count: self.read_u16()?,
            additional_count: self.read_u16()?,
        })
    }

    // Question section format https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
    pub fn parse_question(&mut self) -> Result<Question, ParseError> {
        Ok(Question {
            domain_name: self.parse_domain_name()?,
            r#type: RecordType::from(self.read_u16()?),
            class: self.read_u16()?,
        })
    }

    // Resource section format https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.3
    pub fn parse_answer(&mut self) -> Result<Answer, ParseError> {
        let name = self.parse_domain_name()?;
        let record_type = RecordType::from(self.read_u16()?);
        let class = self.read_u16()?;
        let ttl = self.read_u32()?;
        let len = self.read_u16()?;

        let rdata_start = self.position;
        let rdata_end = rdata_start + len as usize;
        // make sure the whole RDATA is present before decoding any of it
        self.slice(rdata_start, len as usize)?;

        let meta = AnswerMeta {
            name,
            class,
            len,
            ttl,
            r#type: record_type,
        };

        let invalid = ParseError::InvalidRdata {
            record_type,
            position: rdata_start,
        };

        // See Section 3.3 Standard RRs (https://datatracker.ietf.org/doc/html/rfc1035#section-3.3) for an overview
        // of how to parse certain record types
        let value = match record_type {
            // A https://datatracker.ietf.org/doc/html/rfc1035#section-3.4.1
            RecordType::A => {
                if len != 4 {
                    return Err(invalid);
                }
                AnswerValue::A {
                    ipv4: self.advance_n::<4>()?.into(),
                }
            }
            // AAAA https://datatracker.ietf.org/doc/html/rfc3596#section-2.2
            RecordType::AAAA => {
                if len != 16 {
                    return Err(invalid);
                }
                AnswerValue::AAAA {
                    ipv6: self.advance_n::<16>()?.into(),
                }
            }
            // CNAME https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.1
            RecordType::CNAME => AnswerValue::CNAME {
                cname: self.parse_domain_name()?,
            },
            // NS https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.11
            RecordType::NS => AnswerValue::NS {
                ns: self.parse_domain_name()?,
            },
            // MX https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.9
            RecordType::MX => AnswerValue::MX {
                preference: self.read_u16()?,
                exchange: self.parse_domain_name()?,
            },
            // TXT https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.14
            RecordType::TXT => {
                let mut segments = vec![];
                while self.position < rdata_end {
                    let segment_len = self.advance_n::<1>()?[0] as usize;
                    segments.push(self.advance(segment_len)?.to_vec());
                }
                AnswerValue::TXT { segments }
            }
            // SOA https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.13
            RecordType::SOA => AnswerValue::SOA {
                mname: self.parse_domain_name()?,
                rname: self.parse_domain_name()?,
                serial: self.read_u32()?,
                refresh: self.read_u32()?,
                retry: self.read_u32()?,
                expire: self.read_u32()?,
                minimum: self.read_u32()?,
            },
            RecordType::Unknown(_) => AnswerValue::Other {
                rdata: self.advance(len as usize)?.to_vec(),
            },
        };

        if self.position > rdata_end {
            return Err(invalid);
        }
        // RDLENGTH is authoritative for where the next record starts
        self.position = rdata_end;

        Ok(Answer::new(meta, value))
    }

    /// Parses header, question and answer sections. Authority and additional
    /// records are left unread since nothing downstream looks at them.
    pub fn parse(&mut self) -> Result<DnsPacket, ParseError> {
        self.position = 0;
        let header = self.parse_header()?;

        let questions = (0..header.question_count)
            .map(|_| self.parse_question())
            .collect::<Result<Vec<_>, _>>()?;

        let answers = (0..header.answer_count)
            .map(|_| self.parse_answer())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DnsPacket {
            header,
            questions,
            answers,
        })
    }
}

#[derive(Clone, Debug)]
pub struct DnsPacket {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
}

impl DnsPacket {
    /// Multiple questions are unsupported by most nameservers anyways, see
    /// https://stackoverflow.com/questions/4082081/requesting-a-and-aaaa-records-in-single-dns-query/4083071#4083071.
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }
}
