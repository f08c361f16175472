//! Link-layer I/O
//!
//! [`LinkIo`] is the seam between the probe logic and the wire: install a
//! BPF expression, inject a frame, pull one frame back under a deadline.
//! [`PcapLink`] is the libpcap implementation; tests substitute recording
//! stubs.

use std::time::{Duration, Instant};

use pcap::{Active, Capture, Direction, Linktype};
use synfrag_core::{Error, Result};

use crate::frame::MAX_FRAME;

/// Capture snap length; the whole reply must fit.
pub const CAPTURE_LEN: usize = MAX_FRAME;

/// How long each blocking read may sit before the deadline is rechecked.
const POLL_INTERVAL_MS: i32 = 100;

/// Raw link-layer primitive the probe layer drives.
pub trait LinkIo: Send {
    /// Compile and install a BPF filter expression.
    fn set_filter(&mut self, expr: &str) -> Result<()>;

    /// Inject one frame; returns the number of octets written.
    fn inject(&mut self, frame: &[u8]) -> Result<usize>;

    /// Block until one frame arrives or the deadline passes.
    fn next_frame(&mut self, deadline: Duration) -> Result<Option<Vec<u8>>>;
}

/// libpcap-backed implementation. Ethernet II only; any other datalink is
/// refused at open time.
pub struct PcapLink {
    cap: Capture<Active>,
}

impl PcapLink {
    /// Open `interface` with promiscuous mode off, immediate delivery, and
    /// the given snap length.
    pub fn open(interface: &str, caplen: usize) -> Result<Self> {
        let cap = Capture::from_device(interface)
            .map_err(|e| Error::Interface(format!("cannot open {}: {}", interface, e)))?
            .snaplen(caplen as i32)
            .promisc(false)
            .immediate_mode(true)
            .timeout(POLL_INTERVAL_MS)
            .open()
            .map_err(|e| Error::Interface(format!("cannot activate {}: {}", interface, e)))?;

        let datalink = cap.get_datalink();
        if datalink != Linktype::ETHERNET {
            return Err(Error::Interface(format!(
                "{} is not an Ethernet interface (datalink {:?})",
                interface, datalink
            )));
        }

        tracing::debug!(interface, caplen, "capture device opened");
        Ok(Self { cap })
    }

    /// Restrict capture to frames arriving on the wire, so our own
    /// transmissions never match the reply filter.
    pub fn inbound_only(&mut self) -> Result<()> {
        self.cap
            .direction(Direction::In)
            .map_err(|e| Error::Interface(format!("cannot set capture direction: {}", e)))
    }
}

impl LinkIo for PcapLink {
    fn set_filter(&mut self, expr: &str) -> Result<()> {
        tracing::debug!(filter = expr, "installing BPF filter");
        self.cap
            .filter(expr, true)
            .map_err(|e| Error::Filter(format!("BPF compile/install failed: {}", e)))
    }

    fn inject(&mut self, frame: &[u8]) -> Result<usize> {
        self.cap
            .sendpacket(frame)
            .map_err(|e| Error::Inject(format!("link-level write failed: {}", e)))?;
        tracing::debug!(len = frame.len(), "frame injected");
        Ok(frame.len())
    }

    fn next_frame(&mut self, deadline: Duration) -> Result<Option<Vec<u8>>> {
        let due = Instant::now() + deadline;
        loop {
            match self.cap.next_packet() {
                Ok(packet) => {
                    if packet.header.len > packet.header.caplen {
                        return Err(Error::ChildComm(format!(
                            "capture truncated: {} of {} octets",
                            packet.header.caplen, packet.header.len
                        )));
                    }
                    tracing::debug!(len = packet.data.len(), "frame captured");
                    return Ok(Some(packet.data.to_vec()));
                }
                Err(pcap::Error::TimeoutExpired) => {
                    if Instant::now() >= due {
                        return Ok(None);
                    }
                }
                Err(e) => {
                    return Err(Error::Interface(format!("capture read failed: {}", e)));
                }
            }
        }
    }
}
