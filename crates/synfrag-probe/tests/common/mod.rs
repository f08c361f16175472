//! Shared test fixtures: a recording link stub and checksum helpers

#![allow(dead_code)]

use std::time::Duration;

use pnet::util::MacAddr;
use rand::rngs::StdRng;
use rand::SeedableRng;
use synfrag_core::{ProbeConfig, Result, TestType};
use synfrag_net::LinkIo;
use synfrag_probe::recipes::{self, LinkAddrs};

/// In-memory link: records filters and injected frames, plays back one
/// scripted reply.
pub struct StubLink {
    pub filters: Vec<String>,
    pub frames: Vec<Vec<u8>>,
    pub reply: Option<Vec<u8>>,
}

impl StubLink {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            frames: Vec::new(),
            reply: None,
        }
    }

    pub fn with_reply(reply: Vec<u8>) -> Self {
        Self {
            reply: Some(reply),
            ..Self::new()
        }
    }
}

impl LinkIo for StubLink {
    fn set_filter(&mut self, expr: &str) -> Result<()> {
        self.filters.push(expr.to_string());
        Ok(())
    }

    fn inject(&mut self, frame: &[u8]) -> Result<usize> {
        self.frames.push(frame.to_vec());
        Ok(frame.len())
    }

    fn next_frame(&mut self, _deadline: Duration) -> Result<Option<Vec<u8>>> {
        Ok(self.reply.take())
    }
}

pub fn test_addrs() -> LinkAddrs {
    LinkAddrs {
        src_mac: MacAddr::new(0x02, 0x00, 0x00, 0x00, 0x00, 0x01),
        dst_mac: MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff),
    }
}

pub fn config(test: TestType) -> ProbeConfig {
    let (src, dst, port) = if test.is_ipv4() {
        ("10.0.0.1", "10.0.0.2", 80)
    } else {
        ("fe80::1", "fe80::2", 443)
    };
    ProbeConfig {
        test,
        src_ip: src.parse().unwrap(),
        dst_ip: dst.parse().unwrap(),
        dst_mac: "aa:bb:cc:dd:ee:ff".to_string(),
        interface: "eth0".to_string(),
        dst_port: test.requires_port().then_some(port),
        timeout: Duration::from_secs(10),
    }
}

/// Drive one recipe against a stub link and return the injected frames.
pub fn run_recipe(test: TestType, seed: u64) -> Vec<Vec<u8>> {
    let cfg = config(test);
    let mut link = StubLink::new();
    let mut rng = StdRng::seed_from_u64(seed);
    recipes::run(&cfg, test_addrs(), &mut link, &mut rng).unwrap();
    link.frames
}

/// One's-complement fold; a region containing a valid checksum sums to
/// 0xFFFF.
pub fn fold(data: &[u8]) -> u16 {
    let mut sum = 0u32;
    let mut chunks = data.chunks_exact(2);
    for w in &mut chunks {
        sum += u32::from(u16::from_be_bytes([w[0], w[1]]));
    }
    if let [last] = chunks.remainder() {
        sum += u32::from(u16::from_be_bytes([*last, 0]));
    }
    while sum > 0xffff {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    sum as u16
}

/// Fold an IPv4 transport region together with its pseudo-header.
pub fn fold_v4_transport(ip: &[u8], proto: u8, l4: &[u8]) -> u16 {
    let mut data = Vec::new();
    data.extend_from_slice(&ip[12..20]);
    data.push(0);
    data.push(proto);
    data.extend_from_slice(&(l4.len() as u16).to_be_bytes());
    data.extend_from_slice(l4);
    fold(&data)
}

/// Fold an IPv6 transport region together with its pseudo-header.
pub fn fold_v6_transport(ip: &[u8], proto: u8, l4: &[u8]) -> u16 {
    let mut data = Vec::new();
    data.extend_from_slice(&ip[8..40]);
    data.extend_from_slice(&(l4.len() as u32).to_be_bytes());
    data.extend_from_slice(&[0, 0, 0, proto]);
    data.extend_from_slice(l4);
    fold(&data)
}
