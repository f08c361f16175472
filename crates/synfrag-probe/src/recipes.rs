//! The ten probe recipes
//!
//! Every fragmented recipe follows the same split policy: stage the
//! complete packet in the frame buffer as if unfragmented, transmit the
//! first-fragment prefix carrying exactly the first 8 octets of the L4
//! header, then rewrite the IP envelope in place as the second fragment,
//! pull the L4 tail down to sit immediately after it, and transmit again.
//! Splitting inside the L4 header is the point of the tool: the first
//! fragment alone cannot satisfy a port- or type-based filtering decision.
//!
//! TCP recipes draw the sequence number before the fragment identifier,
//! so a fragmented run and its plain counterpart produce byte-identical
//! L4 sections from the same RNG state.

use pnet::packet::ethernet::EtherTypes;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::util::MacAddr;
use rand::Rng;
use synfrag_core::{Error, ProbeConfig, Result, TestType, SOURCE_PORT};
use synfrag_net::ethernet::{build_ethernet, ETHERNET_LEN};
use synfrag_net::icmp::{build_icmp_echo, build_icmpv6_echo, ICMP_ECHO_LEN};
use synfrag_net::ipv4::{
    build_ipv4, build_ipv4_frag2, build_ipv4_optioned_frag1, build_ipv4_short_frag1, IPV4_LEN,
};
use synfrag_net::ipv6::{
    build_ipv6, build_ipv6_frag2, build_ipv6_optioned_frag1, build_ipv6_short_frag1,
    fix_up_dest_options_len, DST_OPTS_HDR_LEN, FRAG_HDR_LEN, IPV6_LEN,
};
use synfrag_net::tcp::{build_tcp_syn, TCP_LEN};
use synfrag_net::{FrameBuffer, LinkIo, MIN_FRAGMENT_SIZE, MIN_PACKET_SIZE};

/// Echo payload carried by every ICMP/ICMPv6 recipe. Must exceed 6 octets
/// or an optioned first fragment would already hold the whole datagram and
/// the second fragment would be empty.
pub const PING_PAYLOAD_LEN: usize = 40;

/// IPv4 options padding; a multiple of 4 that lifts the first fragment to
/// the 68-octet minimum.
pub const IPV4_OPTIONS_LEN: usize = 40;

/// Destination Options length for the IPv6 optioned recipes: the smallest
/// legal value that lifts the first fragment to the 68-octet minimum.
pub fn ipv6_options_len() -> usize {
    fix_up_dest_options_len(
        (MIN_PACKET_SIZE - IPV6_LEN - DST_OPTS_HDR_LEN - FRAG_HDR_LEN - MIN_FRAGMENT_SIZE) as u16,
    ) as usize
}

/// Source and next-hop hardware addresses, resolved by the orchestrator
/// before dispatch so recipes stay free of system lookups.
#[derive(Debug, Clone, Copy)]
pub struct LinkAddrs {
    pub src_mac: MacAddr,
    pub dst_mac: MacAddr,
}

/// Dispatch one probe to its recipe.
pub fn run<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    match cfg.test {
        TestType::Ipv4Tcp => ipv4_syn(cfg, addrs, link, rng),
        TestType::Ipv4FragTcp => ipv4_short_tcp_frag(cfg, addrs, link, rng),
        TestType::Ipv4FragIcmp => ipv4_short_icmp_frag(cfg, addrs, link, rng),
        TestType::Ipv4FragOptionedTcp => ipv4_optioned_tcp_frag(cfg, addrs, link, rng),
        TestType::Ipv4FragOptionedIcmp => ipv4_optioned_icmp_frag(cfg, addrs, link, rng),
        TestType::Ipv6Tcp => ipv6_syn(cfg, addrs, link, rng),
        TestType::Ipv6FragTcp => ipv6_short_tcp_frag(cfg, addrs, link, rng),
        TestType::Ipv6FragIcmp6 => ipv6_short_icmp_frag(cfg, addrs, link, rng),
        TestType::Ipv6FragOptionedTcp => ipv6_optioned_tcp_frag(cfg, addrs, link, rng),
        TestType::Ipv6FragOptionedIcmp6 => ipv6_optioned_icmp_frag(cfg, addrs, link, rng),
    }
}

fn transmit(link: &mut dyn LinkIo, buf: &FrameBuffer, len: usize) -> Result<()> {
    let written = link.inject(buf.frame(len)?)?;
    if written != len {
        return Err(Error::Inject(format!(
            "short link-level write: {} of {} octets",
            written, len
        )));
    }
    tracing::debug!(len, "transmitted");
    Ok(())
}

/* IPv4 recipes */

fn ipv4_syn<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv4_addrs()?;
    let seq: u32 = rng.gen();

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv4)?;
    build_ipv4(ip, src, dst, IpNextHeaderProtocols::Tcp)?;
    build_tcp_syn(ip, IPV4_LEN, SOURCE_PORT, cfg.dst_port()?, seq)?;

    transmit(link, &buf, ETHERNET_LEN + IPV4_LEN + TCP_LEN)
}

fn ipv4_short_tcp_frag<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv4_addrs()?;
    let seq: u32 = rng.gen();
    let frag_id: u16 = rng.gen();

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv4)?;
    build_ipv4_short_frag1(ip, src, dst, IpNextHeaderProtocols::Tcp, frag_id)?;
    build_tcp_syn(ip, IPV4_LEN, SOURCE_PORT, cfg.dst_port()?, seq)?;
    transmit(link, &buf, ETHERNET_LEN + IPV4_LEN + MIN_FRAGMENT_SIZE)?;

    let tail = TCP_LEN - MIN_FRAGMENT_SIZE;
    let (_, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ipv4_frag2(ip, src, dst, IpNextHeaderProtocols::Tcp, frag_id, tail)?;
    ip.copy_within(IPV4_LEN + MIN_FRAGMENT_SIZE..IPV4_LEN + TCP_LEN, IPV4_LEN);
    transmit(link, &buf, ETHERNET_LEN + IPV4_LEN + tail)
}

fn ipv4_short_icmp_frag<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv4_addrs()?;
    let frag_id: u16 = rng.gen();

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv4)?;
    build_ipv4_short_frag1(ip, src, dst, IpNextHeaderProtocols::Icmp, frag_id)?;
    build_icmp_echo(ip, IPV4_LEN, PING_PAYLOAD_LEN)?;
    transmit(link, &buf, ETHERNET_LEN + IPV4_LEN + MIN_FRAGMENT_SIZE)?;

    let tail = ICMP_ECHO_LEN + PING_PAYLOAD_LEN - MIN_FRAGMENT_SIZE;
    let (_, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ipv4_frag2(ip, src, dst, IpNextHeaderProtocols::Icmp, frag_id, tail)?;
    ip.copy_within(
        IPV4_LEN + MIN_FRAGMENT_SIZE..IPV4_LEN + ICMP_ECHO_LEN + PING_PAYLOAD_LEN,
        IPV4_LEN,
    );
    transmit(link, &buf, ETHERNET_LEN + IPV4_LEN + tail)
}

fn ipv4_optioned_tcp_frag<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv4_addrs()?;
    let seq: u32 = rng.gen();
    let frag_id: u16 = rng.gen();
    let l4_at = IPV4_LEN + IPV4_OPTIONS_LEN;

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv4)?;
    build_ipv4_optioned_frag1(
        ip,
        src,
        dst,
        IpNextHeaderProtocols::Tcp,
        frag_id,
        IPV4_OPTIONS_LEN,
    )?;
    build_tcp_syn(ip, l4_at, SOURCE_PORT, cfg.dst_port()?, seq)?;
    transmit(link, &buf, ETHERNET_LEN + l4_at + MIN_FRAGMENT_SIZE)?;

    let tail = TCP_LEN - MIN_FRAGMENT_SIZE;
    let (_, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ipv4_frag2(ip, src, dst, IpNextHeaderProtocols::Tcp, frag_id, tail)?;
    ip.copy_within(l4_at + MIN_FRAGMENT_SIZE..l4_at + TCP_LEN, IPV4_LEN);
    transmit(link, &buf, ETHERNET_LEN + IPV4_LEN + tail)
}

fn ipv4_optioned_icmp_frag<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv4_addrs()?;
    let frag_id: u16 = rng.gen();
    let l4_at = IPV4_LEN + IPV4_OPTIONS_LEN;

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv4)?;
    build_ipv4_optioned_frag1(
        ip,
        src,
        dst,
        IpNextHeaderProtocols::Icmp,
        frag_id,
        IPV4_OPTIONS_LEN,
    )?;
    build_icmp_echo(ip, l4_at, PING_PAYLOAD_LEN)?;
    transmit(link, &buf, ETHERNET_LEN + l4_at + MIN_FRAGMENT_SIZE)?;

    let tail = ICMP_ECHO_LEN + PING_PAYLOAD_LEN - MIN_FRAGMENT_SIZE;
    let (_, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ipv4_frag2(ip, src, dst, IpNextHeaderProtocols::Icmp, frag_id, tail)?;
    ip.copy_within(
        l4_at + MIN_FRAGMENT_SIZE..l4_at + ICMP_ECHO_LEN + PING_PAYLOAD_LEN,
        IPV4_LEN,
    );
    transmit(link, &buf, ETHERNET_LEN + IPV4_LEN + tail)
}

/* IPv6 recipes */

fn ipv6_syn<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv6_addrs()?;
    let seq: u32 = rng.gen();

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv6)?;
    build_ipv6(ip, src, dst, IpNextHeaderProtocols::Tcp, TCP_LEN as u16)?;
    build_tcp_syn(ip, IPV6_LEN, SOURCE_PORT, cfg.dst_port()?, seq)?;

    transmit(link, &buf, ETHERNET_LEN + IPV6_LEN + TCP_LEN)
}

fn ipv6_short_tcp_frag<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv6_addrs()?;
    let seq: u32 = rng.gen();
    let frag_id: u16 = rng.gen();
    let l4_at = IPV6_LEN + FRAG_HDR_LEN;

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv6)?;
    build_ipv6_short_frag1(ip, src, dst, IpNextHeaderProtocols::Tcp, frag_id)?;
    build_tcp_syn(ip, l4_at, SOURCE_PORT, cfg.dst_port()?, seq)?;
    transmit(link, &buf, ETHERNET_LEN + l4_at + MIN_FRAGMENT_SIZE)?;

    let tail = TCP_LEN - MIN_FRAGMENT_SIZE;
    let (_, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ipv6_frag2(ip, src, dst, IpNextHeaderProtocols::Tcp, frag_id, tail)?;
    ip.copy_within(
        l4_at + MIN_FRAGMENT_SIZE..l4_at + TCP_LEN,
        IPV6_LEN + FRAG_HDR_LEN,
    );
    transmit(link, &buf, ETHERNET_LEN + IPV6_LEN + FRAG_HDR_LEN + tail)
}

fn ipv6_short_icmp_frag<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv6_addrs()?;
    let frag_id: u16 = rng.gen();
    let l4_at = IPV6_LEN + FRAG_HDR_LEN;

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv6)?;
    build_ipv6_short_frag1(ip, src, dst, IpNextHeaderProtocols::Icmpv6, frag_id)?;
    build_icmpv6_echo(ip, l4_at, PING_PAYLOAD_LEN)?;
    transmit(link, &buf, ETHERNET_LEN + l4_at + MIN_FRAGMENT_SIZE)?;

    let tail = ICMP_ECHO_LEN + PING_PAYLOAD_LEN - MIN_FRAGMENT_SIZE;
    let (_, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ipv6_frag2(ip, src, dst, IpNextHeaderProtocols::Icmpv6, frag_id, tail)?;
    ip.copy_within(
        l4_at + MIN_FRAGMENT_SIZE..l4_at + ICMP_ECHO_LEN + PING_PAYLOAD_LEN,
        IPV6_LEN + FRAG_HDR_LEN,
    );
    transmit(link, &buf, ETHERNET_LEN + IPV6_LEN + FRAG_HDR_LEN + tail)
}

fn ipv6_optioned_tcp_frag<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv6_addrs()?;
    let seq: u32 = rng.gen();
    let frag_id: u16 = rng.gen();
    let optlen = ipv6_options_len();
    let l4_at = IPV6_LEN + DST_OPTS_HDR_LEN + optlen + FRAG_HDR_LEN;

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv6)?;
    build_ipv6_optioned_frag1(ip, src, dst, IpNextHeaderProtocols::Tcp, frag_id, optlen)?;
    build_tcp_syn(ip, l4_at, SOURCE_PORT, cfg.dst_port()?, seq)?;
    transmit(link, &buf, ETHERNET_LEN + l4_at + MIN_FRAGMENT_SIZE)?;

    let tail = TCP_LEN - MIN_FRAGMENT_SIZE;
    let (_, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ipv6_frag2(ip, src, dst, IpNextHeaderProtocols::Tcp, frag_id, tail)?;
    ip.copy_within(
        l4_at + MIN_FRAGMENT_SIZE..l4_at + TCP_LEN,
        IPV6_LEN + FRAG_HDR_LEN,
    );
    transmit(link, &buf, ETHERNET_LEN + IPV6_LEN + FRAG_HDR_LEN + tail)
}

fn ipv6_optioned_icmp_frag<R: Rng>(
    cfg: &ProbeConfig,
    addrs: LinkAddrs,
    link: &mut dyn LinkIo,
    rng: &mut R,
) -> Result<()> {
    let (src, dst) = cfg.ipv6_addrs()?;
    let frag_id: u16 = rng.gen();
    let optlen = ipv6_options_len();
    let l4_at = IPV6_LEN + DST_OPTS_HDR_LEN + optlen + FRAG_HDR_LEN;

    let mut buf = FrameBuffer::new();
    let (eth, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ethernet(eth, addrs.src_mac, addrs.dst_mac, EtherTypes::Ipv6)?;
    build_ipv6_optioned_frag1(ip, src, dst, IpNextHeaderProtocols::Icmpv6, frag_id, optlen)?;
    build_icmpv6_echo(ip, l4_at, PING_PAYLOAD_LEN)?;
    transmit(link, &buf, ETHERNET_LEN + l4_at + MIN_FRAGMENT_SIZE)?;

    let tail = ICMP_ECHO_LEN + PING_PAYLOAD_LEN - MIN_FRAGMENT_SIZE;
    let (_, ip) = buf.split_at_mut(ETHERNET_LEN)?;
    build_ipv6_frag2(ip, src, dst, IpNextHeaderProtocols::Icmpv6, frag_id, tail)?;
    ip.copy_within(
        l4_at + MIN_FRAGMENT_SIZE..l4_at + ICMP_ECHO_LEN + PING_PAYLOAD_LEN,
        IPV6_LEN + FRAG_HDR_LEN,
    );
    transmit(link, &buf, ETHERNET_LEN + IPV6_LEN + FRAG_HDR_LEN + tail)
}
