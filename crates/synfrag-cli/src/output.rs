//! Reply pretty-printer
//!
//! Renders the harvested Ethernet frame layer by layer before the verdict
//! is announced, so a failed run still shows what actually came back.

use colored::Colorize;
use pnet::packet::ethernet::{EtherType, EtherTypes, EthernetPacket};
use pnet::packet::icmp::{echo_reply::EchoReplyPacket, echo_request::EchoRequestPacket, IcmpPacket};
use pnet::packet::icmpv6::Icmpv6Packet;
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::tcp::{TcpFlags, TcpPacket};
use pnet::packet::Packet;

/// Print a captured frame's headers to stdout.
pub fn print_frame(frame: &[u8]) {
    let Some(eth) = EthernetPacket::new(frame) else {
        println!("(frame too short to parse)");
        return;
    };
    print_ethernet(&eth);

    match eth.get_ethertype() {
        EtherTypes::Ipv4 => {
            if let Some(ip) = Ipv4Packet::new(eth.payload()) {
                print_ipv4(&ip);
                match ip.get_next_level_protocol() {
                    IpNextHeaderProtocols::Tcp => print_tcp(ip.payload()),
                    IpNextHeaderProtocols::Icmp => print_icmp(ip.payload()),
                    other => println!("  (unparsed payload, protocol {})", other.0),
                }
            }
        }
        EtherTypes::Ipv6 => {
            if let Some(ip) = Ipv6Packet::new(eth.payload()) {
                print_ipv6(&ip);
                match ip.get_next_header() {
                    IpNextHeaderProtocols::Tcp => print_tcp(ip.payload()),
                    IpNextHeaderProtocols::Icmpv6 => print_icmpv6(ip.payload()),
                    other => println!("  (unparsed payload, next header {})", other.0),
                }
            }
        }
        other => println!("  (unknown ethertype 0x{:04x})", other.0),
    }
}

fn ethertype_name(t: EtherType) -> &'static str {
    match t {
        EtherTypes::Ipv4 => "IPv4",
        EtherTypes::Ipv6 => "IPv6",
        EtherTypes::Arp => "ARP",
        _ => "unknown",
    }
}

fn protocol_name(p: IpNextHeaderProtocol) -> &'static str {
    match p {
        IpNextHeaderProtocols::Tcp => "TCP",
        IpNextHeaderProtocols::Udp => "UDP",
        IpNextHeaderProtocols::Icmp => "ICMP",
        IpNextHeaderProtocols::Icmpv6 => "ICMPv6",
        IpNextHeaderProtocols::Ipv6Frag => "Fragment",
        IpNextHeaderProtocols::Ipv6Opts => "DstOpts",
        _ => "unknown",
    }
}

fn tcp_flag_names(flags: u8) -> String {
    let names = [
        (TcpFlags::FIN, "FIN"),
        (TcpFlags::SYN, "SYN"),
        (TcpFlags::RST, "RST"),
        (TcpFlags::PSH, "PSH"),
        (TcpFlags::ACK, "ACK"),
        (TcpFlags::URG, "URG"),
    ];
    let set: Vec<&str> = names
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect();
    if set.is_empty() {
        "none".to_string()
    } else {
        set.join("|")
    }
}

fn print_ethernet(eth: &EthernetPacket<'_>) {
    println!(
        "{} ethertype 0x{:04x} ({})",
        "Ethernet Frame:".bold(),
        eth.get_ethertype().0,
        ethertype_name(eth.get_ethertype())
    );
    println!("  Src MAC: {}", eth.get_source());
    println!("  Dst MAC: {}", eth.get_destination());
}

fn print_ipv4(ip: &Ipv4Packet<'_>) {
    println!("{}", "IPv4 Packet:".bold());
    println!("  Src IP: {}", ip.get_source());
    println!("  Dst IP: {}", ip.get_destination());
    println!(
        "  Protocol: {} ({})",
        ip.get_next_level_protocol().0,
        protocol_name(ip.get_next_level_protocol())
    );
    println!(
        "  Frag Offset: {} ({} bytes)   Flags: {:#05b}",
        ip.get_fragment_offset(),
        u32::from(ip.get_fragment_offset()) * 8,
        ip.get_flags()
    );
    println!(
        "  Header Length: {} ({} bytes)",
        ip.get_header_length(),
        u32::from(ip.get_header_length()) * 4
    );
}

fn print_ipv6(ip: &Ipv6Packet<'_>) {
    println!("{}", "IPv6 Packet:".bold());
    println!("  Src IP: {}", ip.get_source());
    println!("  Dst IP: {}", ip.get_destination());
    println!(
        "  Next Header: {} ({})",
        ip.get_next_header().0,
        protocol_name(ip.get_next_header())
    );
    println!("  Payload Length: {}", ip.get_payload_length());
}

fn print_tcp(l4: &[u8]) {
    let Some(tcp) = TcpPacket::new(l4) else {
        println!("  (truncated TCP header)");
        return;
    };
    println!("{}", "TCP Packet:".bold());
    println!("  Src Port: {}", tcp.get_source());
    println!("  Dst Port: {}", tcp.get_destination());
    println!("  Seq: {}  Ack: {}", tcp.get_sequence(), tcp.get_acknowledgement());
    println!(
        "  Flags: {} ({})",
        tcp.get_flags(),
        tcp_flag_names(tcp.get_flags())
    );
}

fn print_icmp(l4: &[u8]) {
    let Some(icmp) = IcmpPacket::new(l4) else {
        println!("  (truncated ICMP header)");
        return;
    };
    let icmp_type = icmp.get_icmp_type().0;
    let name = match icmp_type {
        0 => "echo reply",
        3 => "destination unreachable",
        8 => "echo request",
        11 => "time exceeded",
        _ => "other",
    };
    println!("{}", "ICMP Packet:".bold());
    println!("  Type: {} ({})", icmp_type, name);
    println!("  Code: {}", icmp.get_icmp_code().0);
    if icmp_type == 0 {
        if let Some(echo) = EchoReplyPacket::new(l4) {
            println!("  Echo Id: {}", echo.get_identifier());
        }
    } else if icmp_type == 8 {
        if let Some(echo) = EchoRequestPacket::new(l4) {
            println!("  Echo Id: {}", echo.get_identifier());
        }
    }
}

fn print_icmpv6(l4: &[u8]) {
    let Some(icmp6) = Icmpv6Packet::new(l4) else {
        println!("  (truncated ICMPv6 header)");
        return;
    };
    let icmp_type = icmp6.get_icmpv6_type().0;
    let name = match icmp_type {
        1 => "destination unreachable",
        128 => "echo request",
        129 => "echo reply",
        135 => "neighbor solicitation",
        136 => "neighbor advertisement",
        _ => "other",
    };
    println!("{}", "ICMPv6 Packet:".bold());
    println!("  Type: {} ({})", icmp_type, name);
    println!("  Code: {}", icmp6.get_icmpv6_code().0);
    if (icmp_type == 128 || icmp_type == 129) && icmp6.payload().len() >= 2 {
        let body = icmp6.payload();
        println!("  Echo Id: {}", u16::from_be_bytes([body[0], body[1]]));
    }
}
