//! One's-complement checksums over in-place packet buffers
//!
//! The single entry point is [`finalize`]: given a buffer positioned at the
//! start of an IP header, a protocol selector, and the upper-layer length,
//! it locates the L4 header (IHL for IPv4, a next-header walk over
//! Destination-Options and Fragment extensions for IPv6), folds in the
//! appropriate pseudo-header, and writes the checksum field on the wire.
//! ICMP over IPv4 has no pseudo-header by convention.
//!
//! This runs after a builder has laid out its header, mirroring how each
//! builder's last act is a checksum pass over the enclosing IP packet.

use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::util;
use synfrag_core::{Error, Result};

/// Which checksum to compute and where it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumProto {
    /// The IPv4 header checksum itself
    Ipv4Header,
    /// TCP over either address family
    Tcp,
    /// ICMP over IPv4 (no pseudo-header)
    Icmp,
    /// ICMPv6 (IPv6 pseudo-header)
    Icmpv6,
}

/// Offset of the checksum field inside a TCP header.
const TCP_CKSUM_AT: usize = 16;
/// Offset of the checksum field inside an ICMP/ICMPv6 header.
const ICMP_CKSUM_AT: usize = 2;

/// Compute the selected checksum over `ip` and write it in place.
///
/// `ip` starts at the IP header; `l4_len` is the upper-layer header plus
/// payload length. Fails only on contract violations: a version nibble
/// that does not match the selector, or a buffer too short for the layout
/// it claims.
pub fn finalize(ip: &mut [u8], proto: ChecksumProto, l4_len: usize) -> Result<()> {
    match proto {
        ChecksumProto::Ipv4Header => ipv4_header(ip),
        ChecksumProto::Tcp => transport(ip, l4_len, TCP_CKSUM_AT, IpNextHeaderProtocols::Tcp.0),
        ChecksumProto::Icmp => icmp_v4(ip, l4_len),
        ChecksumProto::Icmpv6 => {
            if version(ip)? != 6 {
                return Err(Error::Checksum(
                    "ICMPv6 checksum requested on a non-IPv6 packet".to_string(),
                ));
            }
            transport(ip, l4_len, ICMP_CKSUM_AT, IpNextHeaderProtocols::Icmpv6.0)
        }
    }
}

fn version(ip: &[u8]) -> Result<u8> {
    ip.first()
        .map(|b| b >> 4)
        .ok_or_else(|| Error::Checksum("empty buffer handed to checksum unit".to_string()))
}

fn ipv4_header(ip: &mut [u8]) -> Result<()> {
    if version(ip)? != 4 {
        return Err(Error::Checksum(
            "IPv4 header checksum requested on a non-IPv4 packet".to_string(),
        ));
    }
    let ihl = usize::from(ip[0] & 0x0f) * 4;
    if ihl < 20 || ip.len() < ihl {
        return Err(Error::Checksum(format!(
            "IPv4 header length {} out of range for {}-octet buffer",
            ihl,
            ip.len()
        )));
    }
    // Word 5 is the Header Checksum field.
    let sum = util::checksum(&ip[..ihl], 5);
    ip[10..12].copy_from_slice(&sum.to_be_bytes());
    Ok(())
}

fn icmp_v4(ip: &mut [u8], l4_len: usize) -> Result<()> {
    if version(ip)? != 4 {
        return Err(Error::Checksum(
            "ICMP checksum requested on a non-IPv4 packet".to_string(),
        ));
    }
    let l4 = ipv4_l4_offset(ip)?;
    if ip.len() < l4 + l4_len || l4_len < ICMP_CKSUM_AT + 2 {
        return Err(Error::Checksum(format!(
            "ICMP region {}+{} does not fit in {}-octet buffer",
            l4,
            l4_len,
            ip.len()
        )));
    }
    let sum = util::checksum(&ip[l4..l4 + l4_len], ICMP_CKSUM_AT / 2);
    ip[l4 + ICMP_CKSUM_AT..l4 + ICMP_CKSUM_AT + 2].copy_from_slice(&sum.to_be_bytes());
    Ok(())
}

fn transport(ip: &mut [u8], l4_len: usize, cksum_at: usize, proto: u8) -> Result<()> {
    let (pseudo, l4) = match version(ip)? {
        4 => {
            let l4 = ipv4_l4_offset(ip)?;
            let mut pseudo = Vec::with_capacity(12 + l4_len);
            pseudo.extend_from_slice(&ip[12..16]); // source
            pseudo.extend_from_slice(&ip[16..20]); // destination
            pseudo.push(0);
            pseudo.push(proto);
            pseudo.extend_from_slice(&(l4_len as u16).to_be_bytes());
            (pseudo, l4)
        }
        6 => {
            let l4 = ipv6_l4_offset(ip)?;
            let mut pseudo = Vec::with_capacity(40 + l4_len);
            pseudo.extend_from_slice(&ip[8..24]); // source
            pseudo.extend_from_slice(&ip[24..40]); // destination
            pseudo.extend_from_slice(&(l4_len as u32).to_be_bytes());
            pseudo.extend_from_slice(&[0, 0, 0]);
            pseudo.push(proto);
            (pseudo, l4)
        }
        v => {
            return Err(Error::Checksum(format!(
                "unsupported IP version nibble {}",
                v
            )))
        }
    };

    if ip.len() < l4 + l4_len || l4_len < cksum_at + 2 {
        return Err(Error::Checksum(format!(
            "transport region {}+{} does not fit in {}-octet buffer",
            l4,
            l4_len,
            ip.len()
        )));
    }

    let mut data = pseudo;
    let pseudo_len = data.len();
    data.extend_from_slice(&ip[l4..l4 + l4_len]);
    let sum = util::checksum(&data, (pseudo_len + cksum_at) / 2);
    ip[l4 + cksum_at..l4 + cksum_at + 2].copy_from_slice(&sum.to_be_bytes());
    Ok(())
}

fn ipv4_l4_offset(ip: &[u8]) -> Result<usize> {
    if ip.len() < 20 {
        return Err(Error::Checksum("truncated IPv4 header".to_string()));
    }
    let ihl = usize::from(ip[0] & 0x0f) * 4;
    if ihl < 20 || ip.len() < ihl {
        return Err(Error::Checksum(format!("bad IPv4 IHL {}", ihl)));
    }
    Ok(ihl)
}

/// Walk the extension chain a probe can emit (Destination Options,
/// Fragment) to the upper-layer header.
fn ipv6_l4_offset(ip: &[u8]) -> Result<usize> {
    if ip.len() < 40 {
        return Err(Error::Checksum("truncated IPv6 header".to_string()));
    }
    let mut next = ip[6];
    let mut offset = 40usize;
    loop {
        match next {
            60 => {
                // Destination Options: length field counts 8-octet units
                // beyond the first.
                if ip.len() < offset + 2 {
                    return Err(Error::Checksum(
                        "truncated Destination Options header".to_string(),
                    ));
                }
                next = ip[offset];
                offset += (usize::from(ip[offset + 1]) + 1) * 8;
            }
            44 => {
                if ip.len() < offset + 8 {
                    return Err(Error::Checksum("truncated Fragment header".to_string()));
                }
                next = ip[offset];
                offset += 8;
            }
            _ => return Ok(offset),
        }
        if offset > ip.len() {
            return Err(Error::Checksum(
                "IPv6 extension chain runs past the buffer".to_string(),
            ));
        }
    }
}
