//! ICMP and ICMPv6 echo-request builders
//!
//! Both echoes carry the shared source-port constant as their identifier,
//! sequence 1, and a 0x01-filled payload.

use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{IcmpCode, IcmpTypes};
use pnet::packet::icmpv6::{Icmpv6Code, Icmpv6Types, MutableIcmpv6Packet};
use pnet::packet::MutablePacket;
use synfrag_core::{Error, Result, SOURCE_PORT};

use crate::checksum::{self, ChecksumProto};

/// Echo header size (type, code, checksum, identifier, sequence) for both
/// families.
pub const ICMP_ECHO_LEN: usize = 8;

/// Write an ICMP echo request of `ICMP_ECHO_LEN + payload_len` octets at
/// `l4_offset` within `ip` and checksum it (no pseudo-header for IPv4).
pub fn build_icmp_echo(ip: &mut [u8], l4_offset: usize, payload_len: usize) -> Result<()> {
    let total = ICMP_ECHO_LEN + payload_len;
    if ip.len() < l4_offset + total {
        return Err(Error::Checksum(format!(
            "{}-octet region too short for a {}-octet ICMP echo at offset {}",
            ip.len(),
            total,
            l4_offset
        )));
    }
    {
        let mut echo = MutableEchoRequestPacket::new(&mut ip[l4_offset..l4_offset + total])
            .ok_or_else(|| Error::Checksum("ICMP echo region unavailable".to_string()))?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode(0));
        echo.set_checksum(0);
        echo.set_identifier(SOURCE_PORT);
        echo.set_sequence_number(1);
        for b in echo.payload_mut() {
            *b = 0x01;
        }
    }
    checksum::finalize(ip, ChecksumProto::Icmp, total)
}

/// Write an ICMPv6 echo request at `l4_offset` within `ip` and checksum it
/// against the enclosing IPv6 header's pseudo-header.
pub fn build_icmpv6_echo(ip: &mut [u8], l4_offset: usize, payload_len: usize) -> Result<()> {
    let total = ICMP_ECHO_LEN + payload_len;
    if ip.len() < l4_offset + total {
        return Err(Error::Checksum(format!(
            "{}-octet region too short for a {}-octet ICMPv6 echo at offset {}",
            ip.len(),
            total,
            l4_offset
        )));
    }
    {
        let mut echo = MutableIcmpv6Packet::new(&mut ip[l4_offset..l4_offset + total])
            .ok_or_else(|| Error::Checksum("ICMPv6 echo region unavailable".to_string()))?;
        echo.set_icmpv6_type(Icmpv6Types::EchoRequest);
        echo.set_icmpv6_code(Icmpv6Code(0));
        echo.set_checksum(0);
        // Identifier and sequence live in the first four payload octets.
        let body = echo.payload_mut();
        body[..2].copy_from_slice(&SOURCE_PORT.to_be_bytes());
        body[2..4].copy_from_slice(&1u16.to_be_bytes());
        for b in &mut body[4..] {
            *b = 0x01;
        }
    }
    checksum::finalize(ip, ChecksumProto::Icmpv6, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipv4::{build_ipv4, IPV4_LEN};
    use crate::ipv6::{build_ipv6, IPV6_LEN};
    use pnet::packet::icmp::{echo_request::EchoRequestPacket, IcmpPacket};
    use pnet::packet::icmpv6::Icmpv6Packet;
    use pnet::packet::ip::IpNextHeaderProtocols;

    #[test]
    fn test_icmp_echo_fields() {
        let mut ip = [0u8; IPV4_LEN + ICMP_ECHO_LEN + 40];
        build_ipv4(
            &mut ip,
            "10.0.0.1".parse().unwrap(),
            "10.0.0.2".parse().unwrap(),
            IpNextHeaderProtocols::Icmp,
        )
        .unwrap();
        build_icmp_echo(&mut ip, IPV4_LEN, 40).unwrap();

        let icmp = IcmpPacket::new(&ip[IPV4_LEN..]).unwrap();
        assert_eq!(icmp.get_icmp_type(), IcmpTypes::EchoRequest);
        assert_eq!(icmp.get_icmp_code(), IcmpCode(0));
        let echo = EchoRequestPacket::new(&ip[IPV4_LEN..]).unwrap();
        assert_eq!(echo.get_identifier(), SOURCE_PORT);
        assert_eq!(echo.get_sequence_number(), 1);
        assert!(ip[IPV4_LEN + ICMP_ECHO_LEN..].iter().all(|&b| b == 0x01));
    }

    #[test]
    fn test_icmpv6_echo_fields() {
        let mut ip = [0u8; IPV6_LEN + ICMP_ECHO_LEN + 40];
        build_ipv6(
            &mut ip,
            "fe80::1".parse().unwrap(),
            "fe80::2".parse().unwrap(),
            IpNextHeaderProtocols::Icmpv6,
            (ICMP_ECHO_LEN + 40) as u16,
        )
        .unwrap();
        build_icmpv6_echo(&mut ip, IPV6_LEN, 40).unwrap();

        let icmp6 = Icmpv6Packet::new(&ip[IPV6_LEN..]).unwrap();
        assert_eq!(icmp6.get_icmpv6_type(), Icmpv6Types::EchoRequest);
        assert_eq!(icmp6.get_icmpv6_code(), Icmpv6Code(0));
        assert_eq!(
            u16::from_be_bytes([ip[IPV6_LEN + 4], ip[IPV6_LEN + 5]]),
            SOURCE_PORT
        );
        assert_eq!(u16::from_be_bytes([ip[IPV6_LEN + 6], ip[IPV6_LEN + 7]]), 1);
        assert!(ip[IPV6_LEN + ICMP_ECHO_LEN..].iter().all(|&b| b == 0x01));
    }

    #[test]
    fn test_short_region_rejected() {
        let mut ip = [0u8; IPV4_LEN + ICMP_ECHO_LEN];
        assert!(build_icmp_echo(&mut ip, IPV4_LEN, 40).is_err());
    }
}
