//! Reply classification
//!
//! A TCP probe succeeded when the reply carries SYN without RST (the
//! target would complete a handshake). An echo probe succeeded when the
//! reply is an Echo-Reply bearing our identifier. Anything else the
//! filter let through is a mismatch, reported but counted as failure.

use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::icmp::{echo_reply::EchoReplyPacket, IcmpPacket, IcmpTypes};
use pnet::packet::icmpv6::{Icmpv6Packet, Icmpv6Types};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::tcp::{TcpFlags, TcpPacket};
use pnet::packet::Packet;
use synfrag_core::{TestType, SOURCE_PORT};

/// Decide whether a captured frame is the reply the test hoped for.
pub fn reply_matches(test: TestType, frame: &[u8]) -> bool {
    let Some(eth) = EthernetPacket::new(frame) else {
        return false;
    };
    match eth.get_ethertype() {
        EtherTypes::Ipv4 if test.is_ipv4() => {
            let Some(ip) = Ipv4Packet::new(eth.payload()) else {
                return false;
            };
            match ip.get_next_level_protocol() {
                IpNextHeaderProtocols::Tcp if test.is_tcp() => tcp_accepts(ip.payload()),
                IpNextHeaderProtocols::Icmp if test.is_icmp() => icmp_accepts(ip.payload()),
                _ => false,
            }
        }
        EtherTypes::Ipv6 if test.is_ipv6() => {
            let Some(ip) = Ipv6Packet::new(eth.payload()) else {
                return false;
            };
            match ip.get_next_header() {
                IpNextHeaderProtocols::Tcp if test.is_tcp() => tcp_accepts(ip.payload()),
                IpNextHeaderProtocols::Icmpv6 if test.is_icmp() => icmpv6_accepts(ip.payload()),
                _ => false,
            }
        }
        _ => false,
    }
}

fn tcp_accepts(l4: &[u8]) -> bool {
    let Some(tcp) = TcpPacket::new(l4) else {
        return false;
    };
    let flags = tcp.get_flags();
    flags & TcpFlags::SYN != 0 && flags & TcpFlags::RST == 0
}

fn icmp_accepts(l4: &[u8]) -> bool {
    let Some(icmp) = IcmpPacket::new(l4) else {
        return false;
    };
    if icmp.get_icmp_type() != IcmpTypes::EchoReply {
        return false;
    }
    EchoReplyPacket::new(l4).is_some_and(|echo| echo.get_identifier() == SOURCE_PORT)
}

fn icmpv6_accepts(l4: &[u8]) -> bool {
    let Some(icmp6) = Icmpv6Packet::new(l4) else {
        return false;
    };
    if icmp6.get_icmpv6_type() != Icmpv6Types::EchoReply {
        return false;
    }
    // Identifier sits in the first two payload octets.
    let body = icmp6.payload();
    body.len() >= 2 && body[..2] == SOURCE_PORT.to_be_bytes()
}
