//! Reply classification against synthesized frames

mod common;

use pnet::packet::ethernet::EtherTypes;
use pnet::packet::ip::IpNextHeaderProtocols;
use synfrag_core::TestType;
use synfrag_net::ethernet::build_ethernet;
use synfrag_net::icmp::{build_icmp_echo, build_icmpv6_echo};
use synfrag_net::ipv4::build_ipv4;
use synfrag_net::ipv6::build_ipv6;
use synfrag_net::tcp::build_tcp_syn;
use synfrag_probe::reply_matches;

use common::test_addrs;

const ETH: usize = 14;

/// A TCP reply with ports swapped and the given flags byte.
fn tcp4_reply(flags: u8) -> Vec<u8> {
    let addrs = test_addrs();
    let mut frame = vec![0u8; 54];
    build_ethernet(&mut frame, addrs.dst_mac, addrs.src_mac, EtherTypes::Ipv4).unwrap();
    let ip = &mut frame[ETH..];
    build_ipv4(
        ip,
        "10.0.0.2".parse().unwrap(),
        "10.0.0.1".parse().unwrap(),
        IpNextHeaderProtocols::Tcp,
    )
    .unwrap();
    build_tcp_syn(ip, 20, 80, 44128, 0x1000).unwrap();
    frame[ETH + 20 + 13] = flags;
    frame
}

fn tcp6_reply(flags: u8) -> Vec<u8> {
    let addrs = test_addrs();
    let mut frame = vec![0u8; 74];
    build_ethernet(&mut frame, addrs.dst_mac, addrs.src_mac, EtherTypes::Ipv6).unwrap();
    let ip = &mut frame[ETH..];
    build_ipv6(
        ip,
        "fe80::2".parse().unwrap(),
        "fe80::1".parse().unwrap(),
        IpNextHeaderProtocols::Tcp,
        20,
    )
    .unwrap();
    build_tcp_syn(ip, 40, 443, 44128, 0x1000).unwrap();
    frame[ETH + 40 + 13] = flags;
    frame
}

/// An ICMP echo reply; `id` lets tests mismatch the identifier.
fn icmp4_reply(id: u16) -> Vec<u8> {
    let mut frame = vec![0u8; ETH + 20 + 48];
    build_ethernet(
        &mut frame,
        test_addrs().dst_mac,
        test_addrs().src_mac,
        EtherTypes::Ipv4,
    )
    .unwrap();
    let ip = &mut frame[ETH..];
    build_ipv4(
        ip,
        "10.0.0.2".parse().unwrap(),
        "10.0.0.1".parse().unwrap(),
        IpNextHeaderProtocols::Icmp,
    )
    .unwrap();
    build_icmp_echo(ip, 20, 40).unwrap();
    frame[ETH + 20] = 0; // echo reply
    frame[ETH + 24..ETH + 26].copy_from_slice(&id.to_be_bytes());
    frame
}

fn icmp6_reply(id: u16) -> Vec<u8> {
    let mut frame = vec![0u8; ETH + 40 + 48];
    build_ethernet(
        &mut frame,
        test_addrs().dst_mac,
        test_addrs().src_mac,
        EtherTypes::Ipv6,
    )
    .unwrap();
    let ip = &mut frame[ETH..];
    build_ipv6(
        ip,
        "fe80::2".parse().unwrap(),
        "fe80::1".parse().unwrap(),
        IpNextHeaderProtocols::Icmpv6,
        48,
    )
    .unwrap();
    build_icmpv6_echo(ip, 40, 40).unwrap();
    frame[ETH + 40] = 129; // echo reply
    frame[ETH + 44..ETH + 46].copy_from_slice(&id.to_be_bytes());
    frame
}

#[test]
fn syn_ack_accepts() {
    assert!(reply_matches(TestType::Ipv4Tcp, &tcp4_reply(0x12)));
    assert!(reply_matches(TestType::Ipv4FragTcp, &tcp4_reply(0x12)));
    assert!(reply_matches(TestType::Ipv6FragOptionedTcp, &tcp6_reply(0x12)));
}

#[test]
fn bare_syn_accepts() {
    assert!(reply_matches(TestType::Ipv4Tcp, &tcp4_reply(0x02)));
}

#[test]
fn rst_rejects() {
    // RST+ACK, and RST even with SYN set
    assert!(!reply_matches(TestType::Ipv4Tcp, &tcp4_reply(0x14)));
    assert!(!reply_matches(TestType::Ipv4Tcp, &tcp4_reply(0x16)));
    assert!(!reply_matches(TestType::Ipv6Tcp, &tcp6_reply(0x14)));
}

#[test]
fn ack_without_syn_rejects() {
    assert!(!reply_matches(TestType::Ipv4Tcp, &tcp4_reply(0x10)));
}

#[test]
fn echo_reply_with_matching_id_accepts() {
    assert!(reply_matches(TestType::Ipv4FragIcmp, &icmp4_reply(44128)));
    assert!(reply_matches(TestType::Ipv6FragIcmp6, &icmp6_reply(44128)));
    assert!(reply_matches(
        TestType::Ipv6FragOptionedIcmp6,
        &icmp6_reply(44128)
    ));
}

#[test]
fn echo_reply_with_wrong_id_rejects() {
    assert!(!reply_matches(TestType::Ipv4FragIcmp, &icmp4_reply(4412)));
    assert!(!reply_matches(TestType::Ipv6FragIcmp6, &icmp6_reply(1)));
}

#[test]
fn echo_request_rejects() {
    let mut frame = icmp4_reply(44128);
    frame[ETH + 20] = 8; // echo request, not a reply
    assert!(!reply_matches(TestType::Ipv4FragIcmp, &frame));
}

#[test]
fn transport_mismatch_rejects() {
    // A TCP reply cannot satisfy an echo test and vice versa.
    assert!(!reply_matches(TestType::Ipv4FragIcmp, &tcp4_reply(0x12)));
    assert!(!reply_matches(TestType::Ipv4Tcp, &icmp4_reply(44128)));
}

#[test]
fn family_mismatch_rejects() {
    assert!(!reply_matches(TestType::Ipv6Tcp, &tcp4_reply(0x12)));
    assert!(!reply_matches(TestType::Ipv4Tcp, &tcp6_reply(0x12)));
}

#[test]
fn garbage_frames_reject() {
    assert!(!reply_matches(TestType::Ipv4Tcp, &[]));
    assert!(!reply_matches(TestType::Ipv4Tcp, &[0u8; 10]));
    let mut frame = tcp4_reply(0x12);
    frame[12] = 0x08;
    frame[13] = 0x06; // ARP
    assert!(!reply_matches(TestType::Ipv4Tcp, &frame));
}
