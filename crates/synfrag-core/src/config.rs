//! Probe configuration

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::TestType;

/// Everything one probe run needs, parsed but not yet resolved against the
/// network (MAC strings stay textual until the Ethernet builder consumes
/// them; the interface MAC is looked up at run time).
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Which of the ten probe variants to run
    pub test: TestType,
    /// Local source address; family must match the test
    pub src_ip: IpAddr,
    /// Target address, same family as `src_ip`
    pub dst_ip: IpAddr,
    /// Next-hop MAC as a colon-hex string
    pub dst_mac: String,
    /// Outbound device name
    pub interface: String,
    /// Target TCP port; required by the six TCP tests
    pub dst_port: Option<u16>,
    /// Reply deadline
    pub timeout: Duration,
}

impl ProbeConfig {
    /// Check cross-field consistency before any network resource is touched.
    pub fn validate(&self) -> Result<()> {
        if self.src_ip.is_ipv4() != self.dst_ip.is_ipv4() {
            return Err(Error::Address(
                "source and destination addresses must be the same family".to_string(),
            ));
        }
        if self.test.is_ipv4() != self.src_ip.is_ipv4() {
            return Err(Error::Address(format!(
                "test {} does not match the address family of {}",
                self.test, self.src_ip
            )));
        }
        if self.test.requires_port() && self.dst_port.is_none() {
            return Err(Error::Usage(format!(
                "test {} requires --dstport",
                self.test
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::Usage("timeout must be at least 1 second".to_string()));
        }
        Ok(())
    }

    /// Source/destination as IPv4, for the v4 recipes.
    pub fn ipv4_addrs(&self) -> Result<(Ipv4Addr, Ipv4Addr)> {
        match (self.src_ip, self.dst_ip) {
            (IpAddr::V4(s), IpAddr::V4(d)) => Ok((s, d)),
            _ => Err(Error::Address(
                "expected IPv4 source and destination".to_string(),
            )),
        }
    }

    /// Source/destination as IPv6, for the v6 recipes.
    pub fn ipv6_addrs(&self) -> Result<(Ipv6Addr, Ipv6Addr)> {
        match (self.src_ip, self.dst_ip) {
            (IpAddr::V6(s), IpAddr::V6(d)) => Ok((s, d)),
            _ => Err(Error::Address(
                "expected IPv6 source and destination".to_string(),
            )),
        }
    }

    /// Destination port, or a usage error for TCP tests missing one.
    pub fn dst_port(&self) -> Result<u16> {
        self.dst_port
            .ok_or_else(|| Error::Usage("destination port not set".to_string()))
    }
}
