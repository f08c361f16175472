//! CLI argument parsing

use std::net::IpAddr;
use std::time::Duration;

use clap::Parser;
use synfrag_core::{ProbeConfig, TestType, DEFAULT_TIMEOUT_SECS};

/// synfrag - IP fragmentation probe
///
/// Crafts deliberately fragmented TCP SYN and ICMP echo probes whose
/// transport header straddles the fragment boundary, injects them on a
/// chosen interface, and waits for a solicited reply to tell whether the
/// target (and everything in between) accepted them.
#[derive(Parser, Debug)]
#[command(
    name = "synfrag",
    version,
    about = "IP fragmentation probe for hosts and middleboxes",
    after_help = help_footer()
)]
pub struct Args {
    /// Local source IPv4 or IPv6 address
    #[arg(long, value_name = "IP")]
    pub srcip: IpAddr,

    /// Target address, same family as --srcip
    #[arg(long, value_name = "IP")]
    pub dstip: IpAddr,

    /// Next-hop Ethernet MAC (default gateway, or the target itself if
    /// on the local subnet)
    #[arg(long, value_name = "MAC")]
    pub dstmac: String,

    /// Packet source interface
    #[arg(long, value_name = "IFACE")]
    pub interface: String,

    /// Type of test to run (see the list below)
    #[arg(long, value_name = "TEST", value_parser = parse_test)]
    pub test: TestType,

    /// Destination port, required for TCP tests
    #[arg(long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub dstport: Option<u16>,

    /// Reply timeout in seconds
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,
}

impl Args {
    pub fn into_config(self) -> ProbeConfig {
        ProbeConfig {
            test: self.test,
            src_ip: self.srcip,
            dst_ip: self.dstip,
            dst_mac: self.dstmac,
            interface: self.interface,
            dst_port: self.dstport,
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

fn parse_test(s: &str) -> Result<TestType, String> {
    s.parse::<TestType>().map_err(|e| e.to_string())
}

fn help_footer() -> String {
    let mut footer = String::from("Available test types:\n");
    for test in TestType::ALL {
        footer.push_str("  ");
        footer.push_str(test.name());
        footer.push('\n');
    }
    footer.push_str(
        "\nAll TCP tests send a SYN; all ICMP/6 tests send a ping.\n\
         \"frag\" tests send fragments below the minimum packet size.\n\
         \"optioned\" tests send fragments that meet the minimum packet size.",
    );
    footer
}
