//! BPF reply filter construction
//!
//! The filter pins the reply direction: source is the probe's target,
//! destination is the probe's source, and TCP replies must come from the
//! probed port back to the fixed source port. The IPv6 form additionally
//! masks ICMPv6 neighbor solicitation/advertisement (types 135/136) so
//! NDP chatter never races the real reply.

use synfrag_core::{Error, ProbeConfig, Result, SOURCE_PORT};

/// Filter expression length budget, including the terminator the capture
/// layer appends.
pub const FILTER_MAX_LEN: usize = 203;

/// Build the reply filter for one probe run.
///
/// ICMP tests have no destination port; port 0 is substituted so the TCP
/// arm of the expression can never match.
pub fn reply_filter(cfg: &ProbeConfig) -> Result<String> {
    let port = cfg.dst_port.unwrap_or(0);
    let expr = if cfg.test.is_ipv4() {
        format!(
            "src {} and dst {} and (icmp or (tcp and src port {} and dst port {}))",
            cfg.dst_ip, cfg.src_ip, port, SOURCE_PORT
        )
    } else {
        format!(
            "src {} and dst {} and ((icmp6 and ip6[40] != 135 and ip6[40] != 136) \
             or (tcp and src port {} and dst port {}))",
            cfg.dst_ip, cfg.src_ip, port, SOURCE_PORT
        )
    };

    if expr.len() >= FILTER_MAX_LEN {
        return Err(Error::Filter(format!(
            "filter expression overflows the {}-octet budget ({} octets)",
            FILTER_MAX_LEN,
            expr.len()
        )));
    }
    Ok(expr)
}
