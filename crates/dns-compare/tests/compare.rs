use std::{
    collections::HashMap,
    io::Write,
    net::{Ipv4Addr, UdpSocket},
    sync::Arc,
    thread,
    time::Duration,
};

use dns::{
    parse::parser::DnsParser,
    protocol::{
        answer::{Answer, AnswerMeta, AnswerValue},
        header::{Flags, Header},
        record_type::RecordType as WireType,
    },
    serialize::encode_response,
};
use dns_compare::{
    check::{CheckPlan, NameReport, ServerPair, TransportPolicy},
    classify::Severity,
    config::CompareConfig,
    fetch::UdpFetcher,
    names::NameSource,
    record::RecordType,
};

type Zone = HashMap<(String, u16), Vec<AnswerValue>>;

/// Starts a UDP name server on localhost that answers from `zone` until the test
/// process exits. Unknown names get an empty NOERROR answer.
fn spawn_server(zone: Zone) -> String {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let address = socket.local_addr().unwrap().to_string();

    thread::spawn(move || loop {
        let mut buf = [0u8; 512];
        let Ok((len, client)) = socket.recv_from(&mut buf) else {
            return;
        };
        let request = DnsParser::new(&buf[..len]).parse().unwrap();
        let question = request.question().unwrap().clone();
        let key: (String, u16) = (question.domain_name.clone(), question.r#type.into());

        let answers: Vec<_> = zone
            .get(&key)
            .into_iter()
            .flatten()
            .map(|value| {
                Answer::new(
                    AnswerMeta {
                        name: question.domain_name.clone(),
                        r#type: question.r#type,
                        class: 1,
                        ttl: 300,
                        len: 0,
                    },
                    value.clone(),
                )
            })
            .collect();

        let header = Header {
            request_id: request.header.request_id,
            flags: Flags::from(0x8180_u16),
            ..Default::default()
        };
        let reply = encode_response(header, &question, &answers).unwrap();
        socket.send_to(&reply, client).unwrap();
    });

    address
}

fn a(octet: u8) -> AnswerValue {
    AnswerValue::A {
        ipv4: Ipv4Addr::new(10, 0, 0, octet),
    }
}

fn ns(host: &str) -> AnswerValue {
    AnswerValue::NS { ns: host.into() }
}

fn insert(zone: &mut Zone, name: &str, r#type: WireType, values: Vec<AnswerValue>) {
    zone.insert((name.into(), r#type.into()), values);
}

fn run(config: &CompareConfig) -> (Vec<NameReport>, dns_compare::report::Summary) {
    let source = Arc::new(UdpFetcher::new(config.timeout));
    let mut reports = vec![];
    let summary =
        dns_compare::run(config, source, |report| reports.push(report.clone())).unwrap();
    reports.sort_by(|x, y| x.name.cmp(&y.name));
    (reports, summary)
}

#[test]
fn test_compare_two_servers() {
    let mut first = Zone::new();
    insert(&mut first, "example.com", WireType::A, vec![a(1), a(2)]);
    insert(
        &mut first,
        "example.com",
        WireType::NS,
        vec![ns("ns1.example.com"), ns("ns2.example.com")],
    );
    insert(
        &mut first,
        "example.com",
        WireType::TXT,
        vec![
            AnswerValue::TXT {
                segments: vec![b"v=spf1 -all".to_vec()],
            },
            AnswerValue::TXT {
                segments: vec![b"site-verification=abc".to_vec()],
            },
        ],
    );
    insert(&mut first, "www.example.com", WireType::A, vec![a(1)]);

    let mut second = Zone::new();
    // same addresses, different order
    insert(&mut second, "example.com", WireType::A, vec![a(2), a(1)]);
    insert(
        &mut second,
        "example.com",
        WireType::NS,
        vec![ns("ns1.example.com"), ns("ns3.example.com")],
    );
    insert(
        &mut second,
        "example.com",
        WireType::TXT,
        vec![AnswerValue::TXT {
            segments: vec![b"v=spf1 -all".to_vec()],
        }],
    );
    insert(&mut second, "www.example.com", WireType::A, vec![a(9)]);

    let mut names = tempfile::NamedTempFile::new().unwrap();
    writeln!(names, "example.com\n# comment\nwww.example.com").unwrap();

    let mut config = CompareConfig::new(
        ServerPair::new(spawn_server(first), spawn_server(second)),
        NameSource::File(names.path().to_path_buf()),
    );
    config.workers = 2;
    config.timeout = Duration::from_secs(2);

    let (reports, summary) = run(&config);
    assert_eq!(reports.len(), 2);
    assert_eq!(summary.names, 2);
    assert_eq!(summary.exit_code(), 1);

    let apex = &reports[0];
    assert_eq!(apex.name, "example.com");
    let by_type = |t: RecordType| {
        apex.results
            .iter()
            .find(|r| r.record_type == t)
            .unwrap()
    };

    let a_result = by_type(RecordType::A);
    assert_eq!(a_result.severity(), Severity::Ok);
    assert_eq!(a_result.equal_values, vec!["10.0.0.1", "10.0.0.2"]);

    let ns_result = by_type(RecordType::NS);
    assert_eq!(ns_result.severity(), Severity::Warn);
    assert_eq!(ns_result.findings[0].message, "ns2.example.com != ns3.example.com");

    let txt_result = by_type(RecordType::TXT);
    assert_eq!(txt_result.severity(), Severity::Error);
    assert_eq!(txt_result.findings[0].message, "2 vs 1 records");

    assert_eq!(by_type(RecordType::MX).findings[0].message, "0 records");

    let www = &reports[1];
    assert_eq!(www.name, "www.example.com");
    assert_eq!(www.severity, Severity::Error);
}

#[test]
fn test_unreachable_server() {
    let mut zone = Zone::new();
    insert(&mut zone, "example.com", WireType::A, vec![a(1)]);
    let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
    let silent_address = silent.local_addr().unwrap().to_string();

    let mut config = CompareConfig::new(
        ServerPair::new(spawn_server(zone), silent_address.clone()),
        NameSource::Single("example.com".into()),
    );
    config.timeout = Duration::from_millis(200);
    config.plan = CheckPlan::new(&[RecordType::A], &[]).unwrap();

    let (reports, _) = run(&config);
    let result = &reports[0].results[0];
    assert_eq!(result.severity(), Severity::Error);
    assert_eq!(result.findings[0].message, "1 vs 0 records");

    config.transport_policy = TransportPolicy::Report;
    let (reports, summary) = run(&config);
    let result = &reports[0].results[0];
    assert_eq!(result.findings.len(), 1);
    assert_eq!(
        result.findings[0].message,
        format!("lookup failed on {silent_address}: Query timed out")
    );
    assert_eq!(summary.error, 1);
}

#[test]
fn test_empty_name_list() {
    let dir = tempfile::tempdir().unwrap();
    let config = CompareConfig::new(
        ServerPair::new("127.0.0.1:1", "127.0.0.1:2"),
        NameSource::File(dir.path().join("missing.txt")),
    );

    let (reports, summary) = run(&config);
    assert!(reports.is_empty());
    assert_eq!(summary.names, 0);
    assert_eq!(summary.exit_code(), 0);
}
