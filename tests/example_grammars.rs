//! End-to-end runs of the bundled grammars

use pegcomb::grammars::Example;
use pegcomb::{render_captures, Capture, CaptureList};
use rstest::rstest;

fn flatten(captures: &CaptureList, input: &str, out: &mut Vec<(String, String)>) {
    for capture in captures {
        out.push((capture.tag.clone(), capture.text(input).into_owned()));
        flatten(&capture.children, input, out);
    }
}

fn tags_and_text(captures: &CaptureList, input: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten(captures, input, &mut out);
    out
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(tag, text)| (tag.to_string(), text.to_string()))
        .collect()
}

#[test]
fn test_config_stanza_dump() {
    let config = Example::ConfigFile.get().unwrap();
    let input = "[server] host=localhost port=5672";
    let outcome = config.run(input).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.position, input.len());

    let expected = "\
[stanza: [server] host=localhost port=5672(0,33)
 [header: [server](0,8)
  [identifier: server(1,7)]
 ]
 [definition: host=localhost(9,23)
  [identifier: host(9,13)]
  [identifier: localhost(14,23)]
 ]
 [definition: port=5672(24,33)
  [identifier: port(24,28)]
  [identifier: 5672(29,33)]
 ]
]
";
    assert_eq!(render_captures(&outcome.captures, input), expected);
}

#[test]
fn test_config_multiple_stanzas() {
    let config = Example::ConfigFile.get().unwrap();
    let input = "[a] x=1 [b] y = 2";
    let outcome = config.run(input).unwrap();

    assert!(outcome.success);
    let stanzas: Vec<(usize, usize)> = outcome
        .captures
        .iter()
        .map(|c| (c.start, c.end))
        .collect();
    assert_eq!(stanzas, vec![(0, 8), (8, 17)]);
    assert_eq!(outcome.captures.find_all("definition").len(), 2);
}

#[rstest]
#[case("[server]")]
#[case("[server] host")]
#[case("host=localhost")]
#[case("[server] host=localhost [")]
#[case("[ser ver] a=b")]
fn test_config_rejects(#[case] input: &str) {
    let config = Example::ConfigFile.get().unwrap();
    assert!(!config.run(input).unwrap().success, "{:?} should not match", input);
}

#[test]
fn test_url_full_form() {
    let url = Example::EndpointUrl.get().unwrap();
    let input = "amqps://user/secret@tcp:broker.example.com:5671,ssl:backup:5672";
    let outcome = url.run(input).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.position, 63);

    let top: Vec<(&str, usize, usize)> = outcome
        .captures
        .iter()
        .map(|c| (c.tag.as_str(), c.start, c.end))
        .collect();
    assert_eq!(
        top,
        vec![
            ("scheme", 0, 5),
            ("username", 8, 12),
            ("password", 13, 19),
            ("endpoint", 20, 47),
            ("endpoint", 48, 63),
        ]
    );

    let first: &Capture = outcome.captures.get(3).unwrap();
    assert_eq!(
        first.children.iter().map(|c| c.tag.as_str()).collect::<Vec<_>>(),
        vec!["protocol", "host", "port"]
    );
    assert_eq!(first.children.get(1).unwrap().text(input), "broker.example.com");
}

#[rstest]
#[case("localhost", &[("endpoint", "localhost"), ("host", "localhost")])]
#[case("broker:5672", &[("endpoint", "broker:5672"), ("host", "broker"), ("port", "5672")])]
#[case(
    "amqp://guest@rdma:10.0.0.1",
    &[
        ("scheme", "amqp"),
        ("username", "guest"),
        ("endpoint", "rdma:10.0.0.1"),
        ("protocol", "rdma"),
        ("host", "10.0.0.1"),
    ]
)]
#[case(
    "sslhost:1,h2",
    &[
        ("endpoint", "sslhost:1"),
        ("host", "sslhost"),
        ("port", "1"),
        ("endpoint", "h2"),
        ("host", "h2"),
    ]
)]
fn test_url_accepts(#[case] input: &str, #[case] expected: &[(&str, &str)]) {
    let url = Example::EndpointUrl.get().unwrap();
    let outcome = url.run(input).unwrap();

    assert!(outcome.success, "{:?} should match", input);
    assert_eq!(tags_and_text(&outcome.captures, input), pairs(expected));
}

#[rstest]
#[case("")]
#[case("amqp://")]
#[case("host:123456")]
#[case("host:")]
#[case("user@")]
#[case("a,,b")]
#[case("host name")]
fn test_url_rejects(#[case] input: &str) {
    let url = Example::EndpointUrl.get().unwrap();
    let outcome = url.run(input).unwrap();
    assert!(!outcome.success, "{:?} should not match", input);
}

#[test]
fn test_abandoned_branch_captures_are_discarded() {
    // "broker" is first tried as a username, then re-read as a host
    let url = Example::EndpointUrl.get().unwrap();
    let outcome = url.run("broker:5672").unwrap();
    assert!(outcome.captures.find("username").is_none());
}

#[test]
fn test_captures_serialize_to_json() {
    let config = Example::ConfigFile.get().unwrap();
    let outcome = config.run("[s] k=v").unwrap();
    let json = serde_json::to_value(&outcome.captures).unwrap();

    assert_eq!(json[0]["tag"], "stanza");
    assert_eq!(json[0]["children"][0]["tag"], "header");
    assert_eq!(json[0]["children"][1]["start"], 4);
    assert_eq!(json[0]["children"][1]["end"], 7);
}
