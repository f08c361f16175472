//! Single-shot probe orchestration
//!
//! One run: open the device twice (one handle to inject, one for the
//! listener to capture on), resolve addresses, arm the listener, wait for
//! its readiness signal, transmit, harvest, classify. The readiness recv
//! is the happens-before edge that keeps the reply from beating the
//! filter; nothing is retried after that.

use rand::rngs::StdRng;
use rand::SeedableRng;
use synfrag_core::{ProbeConfig, Result};
use synfrag_net::ethernet::parse_mac;
use synfrag_net::interface::mac_of;
use synfrag_net::{PcapLink, CAPTURE_LEN};

use crate::filter::reply_filter;
use crate::listener::Listener;
use crate::recipes::{self, LinkAddrs};
use crate::classify;

/// What one probe run produced.
#[derive(Debug)]
pub enum Outcome {
    /// The reply we hoped for; the target accepted the probe
    Accepted(Vec<u8>),
    /// A reply arrived but was not what we wanted
    Unexpected(Vec<u8>),
    /// No reply before the deadline
    TimedOut,
}

/// Run one probe to completion.
pub fn run_probe(cfg: &ProbeConfig) -> Result<Outcome> {
    cfg.validate()?;

    let addrs = LinkAddrs {
        src_mac: mac_of(&cfg.interface)?,
        dst_mac: parse_mac(&cfg.dst_mac)?,
    };

    let mut inject_link = PcapLink::open(&cfg.interface, CAPTURE_LEN)?;
    let mut capture_link = PcapLink::open(&cfg.interface, CAPTURE_LEN)?;
    capture_link.inbound_only()?;

    let filter = reply_filter(cfg)?;
    let listener = Listener::spawn(Box::new(capture_link), filter, cfg.timeout);
    listener.wait_ready()?;

    let mut rng = StdRng::seed_from_u64(u64::from(std::process::id()));
    recipes::run(cfg, addrs, &mut inject_link, &mut rng)?;
    tracing::info!(test = %cfg.test, "probe transmitted, waiting for reply");

    match listener.harvest()? {
        None => Ok(Outcome::TimedOut),
        Some(frame) => {
            if classify::reply_matches(cfg.test, &frame) {
                Ok(Outcome::Accepted(frame))
            } else {
                Ok(Outcome::Unexpected(frame))
            }
        }
    }
}
