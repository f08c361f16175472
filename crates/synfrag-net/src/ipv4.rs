//! IPv4 header builders
//!
//! Every variant starts from the bare header and mutates the fields that
//! differ, then recomputes the header checksum. Total lengths follow the
//! split policy: a short first fragment carries exactly 8 octets of L4, an
//! optioned first fragment pads the header with NOP options until the
//! on-wire length reaches the 68-octet minimum IP MTU.

use pnet::packet::ip::IpNextHeaderProtocol;
use pnet::packet::ipv4::{Ipv4Flags, MutableIpv4Packet};
use std::net::Ipv4Addr;
use synfrag_core::{Error, Result};

use crate::checksum::{self, ChecksumProto};
use crate::tcp::TCP_LEN;
use crate::MIN_FRAGMENT_SIZE;

/// IPv4 header size without options.
pub const IPV4_LEN: usize = 20;

/// Platform-default TTL.
const DEFAULT_TTL: u8 = 64;

fn build_bare(
    ip: &mut [u8],
    src: Ipv4Addr,
    dst: Ipv4Addr,
    protocol: IpNextHeaderProtocol,
) -> Result<()> {
    if ip.len() < IPV4_LEN {
        return Err(Error::Checksum(format!(
            "{}-octet region too short for an IPv4 header",
            ip.len()
        )));
    }
    let mut pkt = MutableIpv4Packet::new(&mut ip[..IPV4_LEN])
        .ok_or_else(|| Error::Checksum("IPv4 header region unavailable".to_string()))?;
    pkt.set_version(4);
    pkt.set_header_length(5);
    pkt.set_dscp(0);
    pkt.set_ecn(0);
    pkt.set_total_length((IPV4_LEN + TCP_LEN) as u16);
    pkt.set_identification(0);
    pkt.set_flags(0);
    pkt.set_fragment_offset(0);
    pkt.set_ttl(DEFAULT_TTL);
    pkt.set_next_level_protocol(protocol);
    pkt.set_checksum(0);
    pkt.set_source(src);
    pkt.set_destination(dst);
    Ok(())
}

/// Unfragmented header: the bare prefix with a valid checksum.
pub fn build_ipv4(
    ip: &mut [u8],
    src: Ipv4Addr,
    dst: Ipv4Addr,
    protocol: IpNextHeaderProtocol,
) -> Result<()> {
    build_bare(ip, src, dst, protocol)?;
    checksum::finalize(ip, ChecksumProto::Ipv4Header, 0)
}

/// First fragment of a short pair: MF set, offset 0, exactly one 8-octet
/// unit of L4 data.
pub fn build_ipv4_short_frag1(
    ip: &mut [u8],
    src: Ipv4Addr,
    dst: Ipv4Addr,
    protocol: IpNextHeaderProtocol,
    frag_id: u16,
) -> Result<()> {
    build_bare(ip, src, dst, protocol)?;
    {
        let mut pkt = MutableIpv4Packet::new(&mut ip[..IPV4_LEN])
            .ok_or_else(|| Error::Checksum("IPv4 header region unavailable".to_string()))?;
        pkt.set_identification(frag_id);
        pkt.set_flags(Ipv4Flags::MoreFragments);
        pkt.set_total_length((IPV4_LEN + MIN_FRAGMENT_SIZE) as u16);
    }
    checksum::finalize(ip, ChecksumProto::Ipv4Header, 0)
}

/// First fragment padded above the 68-octet minimum IP MTU with NOP
/// options. `optlen` must be a positive multiple of 4; the options area is
/// NOP-filled with a final End-of-Options octet.
pub fn build_ipv4_optioned_frag1(
    ip: &mut [u8],
    src: Ipv4Addr,
    dst: Ipv4Addr,
    protocol: IpNextHeaderProtocol,
    frag_id: u16,
    optlen: usize,
) -> Result<()> {
    if optlen == 0 || optlen % 4 != 0 || IPV4_LEN + optlen > 60 {
        return Err(Error::Checksum(format!(
            "IPv4 options length {} must be a positive multiple of 4 within a 60-octet header",
            optlen
        )));
    }
    let header_len = IPV4_LEN + optlen;
    if ip.len() < header_len {
        return Err(Error::Checksum(format!(
            "{}-octet region too short for a {}-octet IPv4 header",
            ip.len(),
            header_len
        )));
    }
    build_bare(ip, src, dst, protocol)?;
    {
        let mut pkt = MutableIpv4Packet::new(&mut ip[..IPV4_LEN])
            .ok_or_else(|| Error::Checksum("IPv4 header region unavailable".to_string()))?;
        pkt.set_identification(frag_id);
        pkt.set_flags(Ipv4Flags::MoreFragments);
        pkt.set_header_length((header_len / 4) as u8);
        pkt.set_total_length((header_len + MIN_FRAGMENT_SIZE) as u16);
    }
    for b in &mut ip[IPV4_LEN..header_len - 1] {
        *b = 0x01; // NOP
    }
    ip[header_len - 1] = 0x00; // End of Options List
    checksum::finalize(ip, ChecksumProto::Ipv4Header, 0)
}

/// Second fragment: same identifier, MF clear, offset one 8-octet unit,
/// carrying `payload_len` octets of L4 continuation.
pub fn build_ipv4_frag2(
    ip: &mut [u8],
    src: Ipv4Addr,
    dst: Ipv4Addr,
    protocol: IpNextHeaderProtocol,
    frag_id: u16,
    payload_len: usize,
) -> Result<()> {
    build_bare(ip, src, dst, protocol)?;
    {
        let mut pkt = MutableIpv4Packet::new(&mut ip[..IPV4_LEN])
            .ok_or_else(|| Error::Checksum("IPv4 header region unavailable".to_string()))?;
        pkt.set_identification(frag_id);
        pkt.set_fragment_offset(1);
        pkt.set_total_length((IPV4_LEN + payload_len) as u16);
    }
    checksum::finalize(ip, ChecksumProto::Ipv4Header, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::packet::ip::IpNextHeaderProtocols;
    use pnet::packet::ipv4::Ipv4Packet;

    const SRC: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    const DST: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

    #[test]
    fn test_bare_header_fields() {
        let mut ip = [0u8; IPV4_LEN];
        build_ipv4(&mut ip, SRC, DST, IpNextHeaderProtocols::Tcp).unwrap();
        let pkt = Ipv4Packet::new(&ip).unwrap();
        assert_eq!(pkt.get_version(), 4);
        assert_eq!(pkt.get_header_length(), 5);
        assert_eq!(pkt.get_total_length(), 40);
        assert_eq!(pkt.get_identification(), 0);
        assert_eq!(pkt.get_flags(), 0);
        assert_eq!(pkt.get_fragment_offset(), 0);
        assert_eq!(pkt.get_ttl(), 64);
        assert_eq!(pkt.get_next_level_protocol(), IpNextHeaderProtocols::Tcp);
        assert_eq!(pkt.get_source(), SRC);
        assert_eq!(pkt.get_destination(), DST);
        assert_ne!(pkt.get_checksum(), 0);
    }

    #[test]
    fn test_short_frag1_discipline() {
        let mut ip = [0u8; IPV4_LEN];
        build_ipv4_short_frag1(&mut ip, SRC, DST, IpNextHeaderProtocols::Tcp, 0xbeef).unwrap();
        let pkt = Ipv4Packet::new(&ip).unwrap();
        assert_eq!(pkt.get_identification(), 0xbeef);
        assert_eq!(pkt.get_flags(), Ipv4Flags::MoreFragments);
        assert_eq!(pkt.get_fragment_offset(), 0);
        assert_eq!(pkt.get_total_length(), 28);
    }

    #[test]
    fn test_frag2_discipline() {
        let mut ip = [0u8; IPV4_LEN];
        build_ipv4_frag2(&mut ip, SRC, DST, IpNextHeaderProtocols::Tcp, 0xbeef, 12).unwrap();
        let pkt = Ipv4Packet::new(&ip).unwrap();
        assert_eq!(pkt.get_identification(), 0xbeef);
        assert_eq!(pkt.get_flags(), 0);
        assert_eq!(pkt.get_fragment_offset(), 1);
        assert_eq!(pkt.get_total_length(), 32);
    }

    #[test]
    fn test_optioned_frag1_meets_minimum_mtu() {
        let mut ip = [0u8; 60];
        build_ipv4_optioned_frag1(&mut ip, SRC, DST, IpNextHeaderProtocols::Tcp, 7, 40).unwrap();
        let pkt = Ipv4Packet::new(&ip).unwrap();
        assert_eq!(pkt.get_header_length(), 15);
        assert_eq!(pkt.get_total_length(), 68);
        assert_eq!(pkt.get_flags(), Ipv4Flags::MoreFragments);
        // NOP fill with a terminal End-of-Options octet
        assert!(ip[IPV4_LEN..59].iter().all(|&b| b == 0x01));
        assert_eq!(ip[59], 0x00);
    }

    #[test]
    fn test_optioned_frag1_rejects_bad_optlen() {
        let mut ip = [0u8; 60];
        for bad in [0usize, 3, 6, 44] {
            assert!(
                build_ipv4_optioned_frag1(&mut ip, SRC, DST, IpNextHeaderProtocols::Tcp, 7, bad)
                    .is_err(),
                "optlen {}",
                bad
            );
        }
    }

    #[test]
    fn test_short_region_rejected() {
        let mut ip = [0u8; 10];
        assert!(build_ipv4(&mut ip, SRC, DST, IpNextHeaderProtocols::Tcp).is_err());
    }
}
