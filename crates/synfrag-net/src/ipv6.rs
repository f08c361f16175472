//! IPv6 header and extension-header builders
//!
//! The fragmented variants chain extension headers exactly as RFC 8200
//! prescribes: base header, optional Destination Options (a single Pad-N
//! option), then the Fragment extension, then the upper-layer header. The
//! fragment Identification field carries the run's 16-bit identifier
//! zero-extended to 32 bits.

use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv6::MutableIpv6Packet;
use std::net::Ipv6Addr;
use synfrag_core::{Error, Result};

use crate::MIN_FRAGMENT_SIZE;

/// Fixed IPv6 header size.
pub const IPV6_LEN: usize = 40;

/// Fragment extension header size.
pub const FRAG_HDR_LEN: usize = 8;

/// Fixed part of a Destination Options header (next-header + length).
pub const DST_OPTS_HDR_LEN: usize = 2;

/// Default hop limit.
const DEFAULT_HOP_LIMIT: u8 = 64;

/// Round a requested Destination Options payload length up to the next
/// value satisfying `optlen mod 8 == 6`, so the encoded header (payload
/// plus its 2-octet fixed part) is a multiple of 8 octets. Rounding down
/// would be equally valid; rounding up guarantees at least the requested
/// padding.
pub fn fix_up_dest_options_len(optlen: u16) -> u16 {
    optlen + (14 - optlen % 8) % 8
}

fn build_base(
    ip: &mut [u8],
    src: Ipv6Addr,
    dst: Ipv6Addr,
    next_header: IpNextHeaderProtocol,
    payload_len: u16,
) -> Result<()> {
    if ip.len() < IPV6_LEN {
        return Err(Error::Checksum(format!(
            "{}-octet region too short for an IPv6 header",
            ip.len()
        )));
    }
    let mut pkt = MutableIpv6Packet::new(&mut ip[..IPV6_LEN])
        .ok_or_else(|| Error::Checksum("IPv6 header region unavailable".to_string()))?;
    pkt.set_version(6);
    pkt.set_traffic_class(0);
    pkt.set_flow_label(0);
    pkt.set_payload_length(payload_len);
    pkt.set_next_header(next_header);
    pkt.set_hop_limit(DEFAULT_HOP_LIMIT);
    pkt.set_source(src);
    pkt.set_destination(dst);
    Ok(())
}

fn write_fragment_header(
    ext: &mut [u8],
    next_header: IpNextHeaderProtocol,
    offset_units: u16,
    more_fragments: bool,
    frag_id: u16,
) {
    ext[0] = next_header.0;
    ext[1] = 0; // reserved
    let offset_and_flags = (offset_units << 3) | u16::from(more_fragments);
    ext[2..4].copy_from_slice(&offset_and_flags.to_be_bytes());
    ext[4..8].copy_from_slice(&u32::from(frag_id).to_be_bytes());
}

/// Unfragmented base header carrying `payload_len` octets of `protocol`.
pub fn build_ipv6(
    ip: &mut [u8],
    src: Ipv6Addr,
    dst: Ipv6Addr,
    protocol: IpNextHeaderProtocol,
    payload_len: u16,
) -> Result<()> {
    build_base(ip, src, dst, protocol, payload_len)
}

/// First fragment of a short pair: base header, Fragment extension with
/// MF set and offset 0, exactly one 8-octet unit of L4 data.
pub fn build_ipv6_short_frag1(
    ip: &mut [u8],
    src: Ipv6Addr,
    dst: Ipv6Addr,
    protocol: IpNextHeaderProtocol,
    frag_id: u16,
) -> Result<()> {
    let end = IPV6_LEN + FRAG_HDR_LEN;
    if ip.len() < end {
        return Err(Error::Checksum(format!(
            "{}-octet region too short for IPv6 + Fragment headers",
            ip.len()
        )));
    }
    build_base(
        ip,
        src,
        dst,
        IpNextHeaderProtocols::Ipv6Frag,
        (FRAG_HDR_LEN + MIN_FRAGMENT_SIZE) as u16,
    )?;
    write_fragment_header(&mut ip[IPV6_LEN..end], protocol, 0, true, frag_id);
    Ok(())
}

/// First fragment preceded by a Destination Options header sized so the
/// on-wire length reaches the 68-octet minimum. `optlen` must satisfy
/// `optlen mod 8 == 6` (see [`fix_up_dest_options_len`]); the options area
/// holds one zero-filled Pad-N option.
pub fn build_ipv6_optioned_frag1(
    ip: &mut [u8],
    src: Ipv6Addr,
    dst: Ipv6Addr,
    protocol: IpNextHeaderProtocol,
    frag_id: u16,
    optlen: usize,
) -> Result<()> {
    if optlen == 0 || optlen % 8 != 6 {
        return Err(Error::Checksum(format!(
            "Destination Options length {} does not satisfy optlen mod 8 == 6",
            optlen
        )));
    }
    let frag_at = IPV6_LEN + DST_OPTS_HDR_LEN + optlen;
    let end = frag_at + FRAG_HDR_LEN;
    if ip.len() < end {
        return Err(Error::Checksum(format!(
            "{}-octet region too short for IPv6 + Destination Options + Fragment headers",
            ip.len()
        )));
    }
    build_base(
        ip,
        src,
        dst,
        IpNextHeaderProtocols::Ipv6Opts,
        (DST_OPTS_HDR_LEN + optlen + FRAG_HDR_LEN + MIN_FRAGMENT_SIZE) as u16,
    )?;

    ip[IPV6_LEN] = IpNextHeaderProtocols::Ipv6Frag.0;
    ip[IPV6_LEN + 1] = (optlen / 8) as u8; // length in 8-octet units past the first
    ip[IPV6_LEN + 2] = 1; // Pad-N
    ip[IPV6_LEN + 3] = (optlen - 2) as u8;
    for b in &mut ip[IPV6_LEN + 4..frag_at] {
        *b = 0;
    }

    write_fragment_header(&mut ip[frag_at..end], protocol, 0, true, frag_id);
    Ok(())
}

/// Second fragment: base header, Fragment extension with the same
/// identifier, MF clear, offset one 8-octet unit, `payload_len` octets of
/// L4 continuation.
pub fn build_ipv6_frag2(
    ip: &mut [u8],
    src: Ipv6Addr,
    dst: Ipv6Addr,
    protocol: IpNextHeaderProtocol,
    frag_id: u16,
    payload_len: usize,
) -> Result<()> {
    let end = IPV6_LEN + FRAG_HDR_LEN;
    if ip.len() < end {
        return Err(Error::Checksum(format!(
            "{}-octet region too short for IPv6 + Fragment headers",
            ip.len()
        )));
    }
    build_base(
        ip,
        src,
        dst,
        IpNextHeaderProtocols::Ipv6Frag,
        (FRAG_HDR_LEN + payload_len) as u16,
    )?;
    write_fragment_header(&mut ip[IPV6_LEN..end], protocol, 1, false, frag_id);
    Ok(())
}
