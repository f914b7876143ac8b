use std::{
    io::ErrorKind,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket},
    time::{Duration, Instant},
};

use tracing::debug;

use crate::{
    error::ResolveError,
    parse::parser::{DnsPacket, DnsPacketBuffer, DnsParser, MAX_UDP_PACKET_LEN},
    protocol::{question::Question, record_type::RecordType, response_code::ResponseCode},
    serialize::encode_query,
};

pub const DEFAULT_PORT: u16 = 53;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Turns `1.1.1.1`, `1.1.1.1:5353`, `::1`, `[::1]:53`, `ns1.example.com` or
/// `ns1.example.com:53` into a socket address, using port 53 when none is given.
pub fn parse_server_address(server: &str) -> Result<SocketAddr, ResolveError> {
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = server.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }
    if let Some(ip) = server
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|inner| inner.parse::<Ipv6Addr>().ok())
    {
        return Ok(SocketAddr::new(IpAddr::V6(ip), DEFAULT_PORT));
    }

    let resolved = if server.contains(':') {
        server.to_socket_addrs()
    } else {
        (server, DEFAULT_PORT).to_socket_addrs()
    };
    resolved
        .map_err(|e| {
            debug!(server, error = %e, "could not resolve server address");
            ResolveError::NoAddress(server.into())
        })?
        .next()
        .ok_or_else(|| ResolveError::NoAddress(server.into()))
}

fn map_io_error(e: std::io::Error) -> ResolveError {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => ResolveError::Timeout,
        _ => ResolveError::Io(e),
    }
}

/// Sends `request` to `server` over UDP and waits for a single reply from that address.
///
/// Returns the receive buffer together with the number of bytes that were written into it.
/// `timeout` bounds the whole wait, datagrams from other senders do not extend it.
pub fn exchange(
    request: &[u8],
    server: SocketAddr,
    timeout: Duration,
) -> Result<(DnsPacketBuffer, usize), ResolveError> {
    let local: SocketAddr = match server {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(local)?;
    socket.set_write_timeout(Some(timeout))?;

    let deadline = Instant::now() + timeout;
    socket.send_to(request, server).map_err(map_io_error)?;

    let mut response = [0; MAX_UDP_PACKET_LEN];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ResolveError::Timeout);
        }
        socket.set_read_timeout(Some(remaining))?;
        let (len, sender) = socket.recv_from(&mut response).map_err(map_io_error)?;
        if sender == server {
            return Ok((response, len));
        }
        debug!(%sender, %server, "dropping datagram from unexpected sender");
    }
}

/// Resolves INternet records of `record_type` for `domain` using the DNS server `server`.
///
/// `NXDOMAIN` is an answer like any other and yields a packet without answers, while
/// servers refusing or failing to answer are reported as errors.
pub fn query(
    domain: &str,
    server: &str,
    record_type: RecordType,
    timeout: Duration,
) -> Result<DnsPacket, ResolveError> {
    let address = parse_server_address(server)?;
    let id = fastrand::u16(..);
    let request = encode_query(id, &Question::new(domain, record_type))?;

    let (response, len) = exchange(&request, address, timeout)?;
    let packet = DnsParser::new(&response[..len]).parse()?;

    if packet.header.request_id != id {
        return Err(ResolveError::IdMismatch {
            expected: id,
            received: packet.header.request_id,
        });
    }
    if packet.header.flags.truncation {
        return Err(ResolveError::Truncated);
    }
    match packet.header.flags.rcode() {
        ResponseCode::NOERROR | ResponseCode::NXDOMAIN => {}
        rcode => return Err(ResolveError::ServerFailure(rcode)),
    }

    debug!(
        domain,
        server,
        %record_type,
        answers = packet.answers.len(),
        "query answered"
    );
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use std::{
        net::{Ipv4Addr, SocketAddr, UdpSocket},
        thread,
        time::{Duration, Instant},
    };

    use super::{parse_server_address, query};
    use crate::{
        error::ResolveError,
        parse::parser::DnsParser,
        protocol::{
            answer::{Answer, AnswerMeta, AnswerValue},
            header::{Flags, Header},
            record_type::RecordType,
        },
        serialize::encode_response,
    };

    /// Answers exactly one query with a single A record; `id_offset` lets tests
    /// corrupt the response id and `flags` the header flags.
    fn serve_once(id_offset: u16, flags: u16) -> SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let address = socket.local_addr().unwrap();

        thread::spawn(move || {
            let mut buf = [0u8; 512];
            let (len, client) = socket.recv_from(&mut buf).unwrap();
            let request = DnsParser::new(&buf[..len]).parse().unwrap();
            let question = request.question().unwrap().clone();

            let answer = Answer::new(
                AnswerMeta {
                    name: question.domain_name.clone(),
                    r#type: RecordType::A,
                    class: 1,
                    ttl: 60,
                    len: 4,
                },
                AnswerValue::A {
                    ipv4: Ipv4Addr::new(192, 0, 2, 1),
                },
            );
            let header = Header {
                request_id: request.header.request_id.wrapping_add(id_offset),
                flags: Flags::from(flags),
                ..Default::default()
            };
            let reply = encode_response(header, &question, &[answer]).unwrap();
            socket.send_to(&reply, client).unwrap();
        });

        address
    }

    #[test]
    fn test_parse_server_address() {
        assert_eq!(
            parse_server_address("1.1.1.1").unwrap(),
            "1.1.1.1:53".parse().unwrap()
        );
        assert_eq!(
            parse_server_address("127.0.0.1:5353").unwrap(),
            "127.0.0.1:5353".parse().unwrap()
        );
        assert_eq!(
            parse_server_address("::1").unwrap(),
            "[::1]:53".parse().unwrap()
        );
        assert_eq!(
            parse_server_address("[::1]").unwrap(),
            "[::1]:53".parse().unwrap()
        );
    }

    #[test]
    fn test_query_local_server() {
        let server = serve_once(0, 0x8180).to_string();
        let packet = query("example.com", &server, RecordType::A, Duration::from_secs(2)).unwrap();
        assert_eq!(packet.answers.len(), 1);
        assert_eq!(
            packet.answers[0].value,
            AnswerValue::A {
                ipv4: Ipv4Addr::new(192, 0, 2, 1)
            }
        );
    }

    #[test]
    fn test_query_id_mismatch() {
        let server = serve_once(1, 0x8180).to_string();
        let result = query("example.com", &server, RecordType::A, Duration::from_secs(2));
        assert!(matches!(result, Err(ResolveError::IdMismatch { .. })));
    }

    #[test]
    fn test_query_server_failure() {
        // SERVFAIL
        let server = serve_once(0, 0x8182).to_string();
        let result = query("example.com", &server, RecordType::A, Duration::from_secs(2));
        assert!(matches!(result, Err(ResolveError::ServerFailure(_))));
    }

    #[test]
    fn test_query_timeout() {
        // bound but never answering
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server = silent.local_addr().unwrap().to_string();
        let result = query(
            "example.com",
            &server,
            RecordType::A,
            Duration::from_millis(100),
        );
        assert!(matches!(result, Err(ResolveError::Timeout)));
    }

    #[test]
    fn test_query_timeout_with_stray_datagrams() {
        // reads the query but never answers, while another socket keeps
        // sending junk to the client
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let server = silent.local_addr().unwrap().to_string();
        thread::spawn(move || {
            let mut buf = [0u8; 512];
            let (_, client) = silent.recv_from(&mut buf).unwrap();
            let noise = UdpSocket::bind("127.0.0.1:0").unwrap();
            for _ in 0..15 {
                let _ = noise.send_to(b"junk", client);
                thread::sleep(Duration::from_millis(80));
            }
        });

        let started = Instant::now();
        let result = query(
            "example.com",
            &server,
            RecordType::A,
            Duration::from_millis(200),
        );
        assert!(matches!(result, Err(ResolveError::Timeout)));
        assert!(started.elapsed() < Duration::from_millis(600));
    }
}
