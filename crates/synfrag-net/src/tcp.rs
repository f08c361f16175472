//! TCP SYN builder

use pnet::packet::tcp::{MutableTcpPacket, TcpFlags};
use synfrag_core::{Error, Result};

use crate::checksum::{self, ChecksumProto};

/// TCP header size without options.
pub const TCP_LEN: usize = 20;

/// Advertised receive window.
pub const TCP_WINDOW: u16 = 65535;

/// Write a SYN at `l4_offset` within `ip` (the region starting at the IP
/// header) and checksum it against the enclosing IPv4 or IPv6 envelope.
/// The offset is explicit because the optioned recipes stage the header
/// past the options/extension area, not where the second fragment will
/// later want it.
pub fn build_tcp_syn(
    ip: &mut [u8],
    l4_offset: usize,
    src_port: u16,
    dst_port: u16,
    seq: u32,
) -> Result<()> {
    if ip.len() < l4_offset + TCP_LEN {
        return Err(Error::Checksum(format!(
            "{}-octet region too short for a TCP header at offset {}",
            ip.len(),
            l4_offset
        )));
    }
    {
        let mut tcp = MutableTcpPacket::new(&mut ip[l4_offset..l4_offset + TCP_LEN])
            .ok_or_else(|| Error::Checksum("TCP header region unavailable".to_string()))?;
        tcp.set_source(src_port);
        tcp.set_destination(dst_port);
        tcp.set_sequence(seq);
        tcp.set_acknowledgement(0);
        tcp.set_data_offset((TCP_LEN / 4) as u8);
        tcp.set_reserved(0);
        tcp.set_flags(TcpFlags::SYN);
        tcp.set_window(TCP_WINDOW);
        tcp.set_checksum(0);
        tcp.set_urgent_ptr(0);
    }
    checksum::finalize(ip, ChecksumProto::Tcp, TCP_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipv4::{build_ipv4, IPV4_LEN};
    use pnet::packet::ip::IpNextHeaderProtocols;
    use pnet::packet::tcp::TcpPacket;

    #[test]
    fn test_syn_fields() {
        let mut ip = [0u8; IPV4_LEN + TCP_LEN];
        build_ipv4(
            &mut ip,
            "10.0.0.1".parse().unwrap(),
            "10.0.0.2".parse().unwrap(),
            IpNextHeaderProtocols::Tcp,
        )
        .unwrap();
        build_tcp_syn(&mut ip, IPV4_LEN, 44128, 80, 0xdeadbeef).unwrap();

        let tcp = TcpPacket::new(&ip[IPV4_LEN..]).unwrap();
        assert_eq!(tcp.get_source(), 44128);
        assert_eq!(tcp.get_destination(), 80);
        assert_eq!(tcp.get_sequence(), 0xdeadbeef);
        assert_eq!(tcp.get_acknowledgement(), 0);
        assert_eq!(tcp.get_data_offset(), 5);
        assert_eq!(tcp.get_flags(), TcpFlags::SYN);
        assert_eq!(tcp.get_window(), TCP_WINDOW);
        assert_eq!(tcp.get_urgent_ptr(), 0);
        assert_ne!(tcp.get_checksum(), 0);
    }

    #[test]
    fn test_short_region_rejected() {
        let mut ip = [0u8; IPV4_LEN + TCP_LEN - 1];
        assert!(build_tcp_syn(&mut ip, IPV4_LEN, 44128, 80, 1).is_err());
    }
}
