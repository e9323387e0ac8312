//! End-to-end tests for the access-list engine
//!
//! These drive the public pipeline — validate → canonicalize → resolve
//! scope → build — the way the CLI does, over hand-built Targets.

use seedlist::acl::{apply_scope, canonicalize, cdn, validate, ScopePolicy};
use seedlist::{build_access_list, AclError, Target};

fn target(id: i64, urls: &[&str], scope: &str) -> Target {
    Target {
        id,
        urls: urls.iter().map(|u| u.to_string()).collect(),
        scope: Some(scope.to_string()),
        ..Target::default()
    }
}

#[test]
fn test_host_scope_end_to_end() {
    let t = target(1, &["http://www.example.co.uk/"], "root");
    let targets = vec![&t];

    assert_eq!(
        build_access_list(&targets, false, "surts").unwrap(),
        vec!["http://(uk,co,example,www)/".to_string()]
    );
    assert_eq!(
        build_access_list(&targets, false, "urls").unwrap(),
        vec!["http://www.example.co.uk/".to_string()]
    );
}

#[test]
fn test_subdomains_scope_end_to_end() {
    let t = target(1, &["http://www.example.co.uk/"], "subdomains");
    assert_eq!(
        build_access_list(&[&t], false, "surts").unwrap(),
        vec!["http://(uk,co,example,www,".to_string()]
    );
}

#[test]
fn test_nonsense_url_dropped_and_absent_from_all_formats() {
    let t = target(9, &["http://../"], "root");
    for format in ["urls", "surts", "pywb"] {
        assert!(
            build_access_list(&[&t], false, format).unwrap().is_empty(),
            "nonsense URL leaked into {} output",
            format
        );
    }
}

#[test]
fn test_cdn_only_build_renders_whole_table() {
    let surts = build_access_list(&[], true, "surts").unwrap();
    let mut expected: Vec<String> = cdn::cdn_entries().map(str::to_string).collect();
    expected.sort();
    assert_eq!(surts, expected);
}

#[test]
fn test_unknown_format_is_the_only_fatal_error() {
    // A batch full of rubbish URLs still succeeds...
    let bad = target(1, &["http://../", "http://example.com/a b"], "root");
    assert!(build_access_list(&[&bad], false, "urls").is_ok());

    // ...but an unknown format fails immediately.
    match build_access_list(&[&bad], false, "xml") {
        Err(AclError::UnsupportedFormat(name)) => assert_eq!(name, "xml"),
        other => panic!("expected UnsupportedFormat, got {:?}", other),
    }
}

#[test]
fn test_output_is_deterministic_across_duplicate_orderings() {
    let a = target(1, &["http://b.example.com/", "http://a.example.com/"], "root");
    let b = target(2, &["http://a.example.com/", "http://c.example.com/"], "root");

    let forward = build_access_list(&[&a, &b], false, "urls").unwrap();
    let reverse = build_access_list(&[&b, &a], false, "urls").unwrap();
    assert_eq!(forward, reverse);
    assert_eq!(
        forward,
        vec![
            "http://a.example.com/".to_string(),
            "http://b.example.com/".to_string(),
            "http://c.example.com/".to_string(),
        ]
    );
}

#[test]
fn test_duplicate_seed_listed_once() {
    let a = target(1, &["http://example.com/"], "root");
    let b = target(2, &["http://example.com/"], "subdomains");
    let urls = build_access_list(&[&a, &b], false, "urls").unwrap();
    assert_eq!(urls.len(), 1);

    // The two scopes produce distinct canonical forms, though:
    let surts = build_access_list(&[&a, &b], false, "surts").unwrap();
    assert_eq!(
        surts,
        vec![
            "http://(com,example)/".to_string(),
            "http://(com,example,".to_string(),
        ]
    );
}

#[test]
fn test_pywb_format_lines() {
    let t = target(1, &["http://www.example.co.uk/"], "subdomains");
    let rules = build_access_list(&[&t], false, "pywb").unwrap();
    assert_eq!(
        rules,
        vec![
            r#"uk,co,example,www - {"access": "allow", "url": "http://www.example.co.uk/"}"#
                .to_string()
        ]
    );
}

#[test]
fn test_pywb_descending_order_puts_specific_prefixes_first() {
    let open = target(1, &["http://example.com/"], "subdomains");
    let deep = target(2, &["http://example.com/very/specific/page"], "subdomains");
    let rules = build_access_list(&[&open, &deep], false, "pywb").unwrap();
    assert_eq!(rules.len(), 2);
    assert!(
        rules[0].starts_with("com,example)/very/specific/page"),
        "longer prefix should sort first, got: {:?}",
        rules
    );
}

#[test]
fn test_validator_and_canonicalizer_agree_on_acceptance() {
    // Anything the validator accepts either canonicalizes or is a
    // host-less URL; no accepted URL is silently lost by the builder.
    let samples = [
        "http://example.com/",
        "https://example.com/path?x=1",
        "http://sub.example.co.uk/deep/path",
        "http:///nohost",
    ];
    for sample in samples {
        assert!(validate(sample).is_ok());
        let t = target(1, &[sample], "root");
        let urls = build_access_list(&[&t], false, "urls").unwrap();
        assert_eq!(urls, vec![sample.to_string()]);
    }
}

#[test]
fn test_scope_only_narrows_never_widens() {
    let bare = canonicalize("http://example.com/").unwrap();
    assert!(bare.is_open());
    let narrowed = apply_scope(bare, Some(ScopePolicy::Root));
    assert!(!narrowed.is_open());

    let with_path = canonicalize("http://example.com/path").unwrap();
    let resolved = apply_scope(with_path.clone(), Some(ScopePolicy::Subdomains));
    assert_eq!(with_path, resolved);
}
