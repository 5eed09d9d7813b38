mod common;

use std::net::Ipv4Addr;

use common::MockDnsClient;
use sluice::access::cidr::mask;
use sluice::access::{CidrBlock, HtAccess, HtAccessError, HtAccessRule, NopDnsClient, parse_htaccess_rules};

fn block(s: &str) -> CidrBlock {
    s.parse().unwrap()
}

#[test]
fn test_cidr_matches_exactly_addresses_sharing_the_prefix() {
    let prefixes = [
        Ipv4Addr::new(0, 0, 0, 0),
        Ipv4Addr::new(10, 0, 0, 0),
        Ipv4Addr::new(192, 168, 4, 128),
        Ipv4Addr::new(255, 255, 255, 255),
    ];
    let addresses = [
        Ipv4Addr::new(0, 0, 0, 0),
        Ipv4Addr::new(10, 0, 0, 1),
        Ipv4Addr::new(10, 255, 0, 1),
        Ipv4Addr::new(192, 168, 4, 129),
        Ipv4Addr::new(192, 168, 5, 1),
        Ipv4Addr::new(255, 255, 255, 254),
    ];

    for prefix in prefixes {
        for length in 0..=32u8 {
            let network = Ipv4Addr::from(u32::from(prefix) & mask(length));
            let cidr = CidrBlock::new(network, length).unwrap();
            for addr in addresses {
                let expected = u32::from(addr) & mask(length) == u32::from(network);
                assert_eq!(cidr.matches(addr), expected, "{cidr} vs {addr}");
            }
        }
    }
}

#[test]
fn test_cidr_zero_length_matches_everything() {
    let all = block("0.0.0.0/0");
    assert!(all.matches(Ipv4Addr::new(1, 2, 3, 4)));
    assert!(all.matches(Ipv4Addr::BROADCAST));
}

#[test]
fn test_cidr_parse_errors() {
    assert!("10.0.0.0".parse::<CidrBlock>().is_err());
    assert!("10.0.0.0/".parse::<CidrBlock>().is_err());
    assert!("10.0.0/8".parse::<CidrBlock>().is_err());
    assert!("10.0.0.0/33".parse::<CidrBlock>().is_err());
    assert!("10.0.0.1/8".parse::<CidrBlock>().is_err());
}

#[test]
fn test_first_matching_rule_wins() {
    let rules = HtAccess::new(vec![
        HtAccessRule {
            block: block("10.1.0.0/16"),
            allow: true,
        },
        HtAccessRule {
            block: block("10.0.0.0/8"),
            allow: false,
        },
    ]);

    assert!(rules.allows(Ipv4Addr::new(10, 1, 2, 3)));
    assert!(!rules.allows(Ipv4Addr::new(10, 2, 2, 3)));
    // Nothing matches: allowed.
    assert!(rules.allows(Ipv4Addr::new(172, 16, 0, 1)));
}

#[test]
fn test_empty_rule_list_allows_everyone() {
    assert!(HtAccess::default().allows(Ipv4Addr::new(8, 8, 8, 8)));
}

#[test]
fn test_parse_rules_in_order() {
    let contents = "\
# office
allow from 192.168.0.0/16

deny from 0.0.0.0/0
";
    let htaccess = parse_htaccess_rules(contents, &NopDnsClient).unwrap();

    assert_eq!(
        htaccess.rules(),
        &[
            HtAccessRule {
                block: block("192.168.0.0/16"),
                allow: true
            },
            HtAccessRule {
                block: block("0.0.0.0/0"),
                allow: false
            },
        ]
    );
    assert!(htaccess.allows(Ipv4Addr::new(192, 168, 3, 3)));
    assert!(!htaccess.allows(Ipv4Addr::new(8, 8, 8, 8)));
}

#[test]
fn test_parse_single_address_is_host_block() {
    let htaccess = parse_htaccess_rules("deny from 1.2.3.4", &NopDnsClient).unwrap();

    assert_eq!(htaccess.rules()[0].block, CidrBlock::host(Ipv4Addr::new(1, 2, 3, 4)));
    assert!(!htaccess.allows(Ipv4Addr::new(1, 2, 3, 4)));
    assert!(htaccess.allows(Ipv4Addr::new(1, 2, 3, 5)));
}

#[test]
fn test_parse_host_names_through_dns() {
    let dns = MockDnsClient::new().with(
        "lab.example",
        &[Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)],
    );

    let htaccess = parse_htaccess_rules("deny from lab.example\n", &dns).unwrap();

    assert_eq!(htaccess.rules().len(), 2);
    assert!(!htaccess.allows(Ipv4Addr::new(10, 0, 0, 2)));
    assert!(htaccess.allows(Ipv4Addr::new(10, 0, 0, 3)));
}

#[test]
fn test_parse_errors_name_the_line() {
    let dns = MockDnsClient::new();

    assert!(matches!(
        parse_htaccess_rules("allow from 10.0.0.0/8\nallow 10.0.0.0/8", &dns),
        Err(HtAccessError::InvalidLine { line: 2, .. })
    ));
    assert!(matches!(
        parse_htaccess_rules("permit from 10.0.0.0/8", &dns),
        Err(HtAccessError::InvalidDirective { line: 1, .. })
    ));
    assert!(matches!(
        parse_htaccess_rules("deny from 10.0.0.1/8", &dns),
        Err(HtAccessError::Dns { line: 1, .. })
    ));
    assert!(matches!(
        parse_htaccess_rules("deny from unknown.example", &dns),
        Err(HtAccessError::Dns { line: 1, .. })
    ));
}

#[test]
fn test_parse_falls_back_to_dns_when_not_a_cidr_block() {
    let dns = MockDnsClient::new()
        .with("lab/printers", &[Ipv4Addr::new(10, 9, 9, 9)])
        .with("10.0.0.1/8", &[Ipv4Addr::new(10, 0, 0, 1)]);

    let htaccess = parse_htaccess_rules("deny from lab/printers\ndeny from 10.0.0.1/8\n", &dns).unwrap();

    assert_eq!(
        htaccess.rules().iter().map(|rule| rule.block).collect::<Vec<_>>(),
        vec![
            CidrBlock::host(Ipv4Addr::new(10, 9, 9, 9)),
            CidrBlock::host(Ipv4Addr::new(10, 0, 0, 1)),
        ]
    );
    assert!(!htaccess.allows(Ipv4Addr::new(10, 9, 9, 9)));
    assert!(htaccess.allows(Ipv4Addr::new(10, 0, 0, 2)));
}
