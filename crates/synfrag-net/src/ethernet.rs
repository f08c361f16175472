//! Ethernet II framing

use pnet::packet::ethernet::{EtherType, MutableEthernetPacket};
use pnet::util::MacAddr;
use synfrag_core::{Error, Result};

/// Ethernet II header size.
pub const ETHERNET_LEN: usize = 14;

/// Parse a colon-hex MAC string (`aa:bb:cc:dd:ee:ff`).
pub fn parse_mac(s: &str) -> Result<MacAddr> {
    s.parse::<MacAddr>()
        .map_err(|_| Error::Address(format!("unable to parse MAC address: {}", s)))
}

/// Write an Ethernet II header at the start of `frame`.
pub fn build_ethernet(
    frame: &mut [u8],
    src: MacAddr,
    dst: MacAddr,
    ethertype: EtherType,
) -> Result<()> {
    let frame_len = frame.len();
    let mut eth = MutableEthernetPacket::new(frame).ok_or_else(|| {
        Error::Checksum(format!(
            "{}-octet region too short for an Ethernet header",
            frame_len
        ))
    })?;
    eth.set_destination(dst);
    eth.set_source(src);
    eth.set_ethertype(ethertype);
    Ok(())
}
