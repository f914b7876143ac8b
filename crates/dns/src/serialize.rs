use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    error::EncodeError,
    parse::parser::MAX_UDP_PACKET_LEN,
    protocol::{
        answer::{Answer, AnswerValue},
        header::{Flags, Header, HEADER_LEN},
        question::Question,
    },
};

const MAX_LABEL_LEN: usize = 63;

/// Encodes `domain_name` as a sequence of length-prefixed labels. A trailing dot is
/// accepted, an empty name encodes the root.
pub fn encode_domain_name(domain_name: &str) -> Result<Vec<u8>, EncodeError> {
    let mut encoded = Vec::with_capacity(domain_name.len() + 2);
    for part in domain_name.split('.').filter(|part| !part.is_empty()) {
        if part.len() > MAX_LABEL_LEN {
            return Err(EncodeError::LabelTooLong(part.into()));
        }
        encoded.push(part.len() as u8);
        encoded.extend(part.as_bytes());
    }
    encoded.push(0);
    Ok(encoded)
}

fn put_question(buf: &mut BytesMut, question: &Question) -> Result<(), EncodeError> {
    buf.put_slice(&encode_domain_name(&question.domain_name)?);
    buf.put_u16(question.r#type.into());
    buf.put_u16(question.class);
    Ok(())
}

fn put_character_string(buf: &mut BytesMut, data: &[u8]) -> Result<(), EncodeError> {
    let len = u8::try_from(data.len()).map_err(|_| EncodeError::StringTooLong)?;
    buf.put_u8(len);
    buf.put_slice(data);
    Ok(())
}

fn encode_rdata(value: &AnswerValue) -> Result<BytesMut, EncodeError> {
    let mut rdata = BytesMut::new();
    match value {
        AnswerValue::A { ipv4 } => rdata.put_slice(&ipv4.octets()),
        AnswerValue::AAAA { ipv6 } => rdata.put_slice(&ipv6.octets()),
        AnswerValue::CNAME { cname } => rdata.put_slice(&encode_domain_name(cname)?),
        AnswerValue::NS { ns } => rdata.put_slice(&encode_domain_name(ns)?),
        AnswerValue::MX {
            preference,
            exchange,
        } => {
            rdata.put_u16(*preference);
            rdata.put_slice(&encode_domain_name(exchange)?);
        }
        AnswerValue::TXT { segments } => {
            for segment in segments {
                put_character_string(&mut rdata, segment)?;
            }
        }
        AnswerValue::SOA {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        } => {
            rdata.put_slice(&encode_domain_name(mname)?);
            rdata.put_slice(&encode_domain_name(rname)?);
            rdata.put_u32(*serial);
            rdata.put_u32(*refresh);
            rdata.put_u32(*retry);
            rdata.put_u32(*expire);
            rdata.put_u32(*minimum);
        }
        AnswerValue::Other { rdata: raw } => rdata.put_slice(raw),
    }
    Ok(rdata)
}

fn put_answer(buf: &mut BytesMut, answer: &Answer) -> Result<(), EncodeError> {
    let rdata = encode_rdata(&answer.value)?;
    let rdata_len = u16::try_from(rdata.len()).map_err(|_| EncodeError::RdataTooLong)?;

    buf.put_slice(&encode_domain_name(&answer.meta.name)?);
    buf.put_u16(answer.meta.r#type.into());
    buf.put_u16(answer.meta.class);
    buf.put_u32(answer.meta.ttl);
    buf.put_u16(rdata_len);
    buf.put(rdata);
    Ok(())
}

/// Builds a recursive query (RD set) for a single question.
pub fn encode_query(id: u16, question: &Question) -> Result<Bytes, EncodeError> {
    let header = Header {
        request_id: id,
        flags: Flags::recursive_query(),
        question_count: 1,
        ..Header::default()
    };

    let mut buf = BytesMut::with_capacity(HEADER_LEN + question.domain_name.len() + 6);
    let raw_header: [u8; HEADER_LEN] = header.into();
    buf.put_slice(&raw_header);
    put_question(&mut buf, question)?;
    Ok(buf.freeze())
}

/// Builds a response carrying `answers` for `question`. Names are written without
/// compression and the section counts in `header` are overwritten to match.
pub fn encode_response(
    header: Header,
    question: &Question,
    answers: &[Answer],
) -> Result<Bytes, EncodeError> {
    let header = Header {
        question_count: 1,
        answer_count: answers.len() as u16,
        authority_count: 0,
        additional_count: 0,
        ..header
    };

    let mut buf = BytesMut::with_capacity(MAX_UDP_PACKET_LEN);
    let raw_header: [u8; HEADER_LEN] = header.into();
    buf.put_slice(&raw_header);
    put_question(&mut buf, question)?;
    for answer in answers {
        put_answer(&mut buf, answer)?;
    }
    Ok(buf.freeze())
}
