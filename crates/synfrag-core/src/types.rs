//! Test taxonomy and shared wire constants

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// TCP source port used by every probe. Doubles as the ICMP/ICMPv6 echo
/// identifier, so replies can be matched with one constant.
pub const SOURCE_PORT: u16 = 44128;

/// Default reply deadline, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The ten probe variants: {IPv4, IPv6} x {plain SYN, short-fragmented SYN,
/// short-fragmented echo, optioned-fragmented SYN, optioned-fragmented echo},
/// minus the two plain-echo combinations that do not exist.
///
/// Two orthogonal predicates derive from the tag: address family and
/// transport. The textual names are the stable CLI surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestType {
    Ipv4Tcp,
    Ipv4FragTcp,
    Ipv4FragIcmp,
    Ipv4FragOptionedTcp,
    Ipv4FragOptionedIcmp,
    Ipv6Tcp,
    Ipv6FragTcp,
    Ipv6FragIcmp6,
    Ipv6FragOptionedTcp,
    Ipv6FragOptionedIcmp6,
}

impl TestType {
    /// All variants, in the order they are listed in usage output.
    pub const ALL: [TestType; 10] = [
        TestType::Ipv4Tcp,
        TestType::Ipv4FragTcp,
        TestType::Ipv4FragIcmp,
        TestType::Ipv4FragOptionedTcp,
        TestType::Ipv4FragOptionedIcmp,
        TestType::Ipv6Tcp,
        TestType::Ipv6FragTcp,
        TestType::Ipv6FragIcmp6,
        TestType::Ipv6FragOptionedTcp,
        TestType::Ipv6FragOptionedIcmp6,
    ];

    /// Stable textual name as accepted by `--test`.
    pub fn name(&self) -> &'static str {
        match self {
            TestType::Ipv4Tcp => "v4-tcp",
            TestType::Ipv4FragTcp => "v4-frag-tcp",
            TestType::Ipv4FragIcmp => "v4-frag-icmp",
            TestType::Ipv4FragOptionedTcp => "v4-frag-optioned-tcp",
            TestType::Ipv4FragOptionedIcmp => "v4-frag-optioned-icmp",
            TestType::Ipv6Tcp => "v6-tcp",
            TestType::Ipv6FragTcp => "v6-frag-tcp",
            TestType::Ipv6FragIcmp6 => "v6-frag-icmp6",
            TestType::Ipv6FragOptionedTcp => "v6-frag-optioned-tcp",
            TestType::Ipv6FragOptionedIcmp6 => "v6-frag-optioned-icmp6",
        }
    }

    /// True for the six SYN-carrying variants.
    pub fn is_tcp(&self) -> bool {
        matches!(
            self,
            TestType::Ipv4Tcp
                | TestType::Ipv4FragTcp
                | TestType::Ipv4FragOptionedTcp
                | TestType::Ipv6Tcp
                | TestType::Ipv6FragTcp
                | TestType::Ipv6FragOptionedTcp
        )
    }

    /// True for the four echo-carrying variants.
    pub fn is_icmp(&self) -> bool {
        !self.is_tcp()
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(
            self,
            TestType::Ipv4Tcp
                | TestType::Ipv4FragTcp
                | TestType::Ipv4FragIcmp
                | TestType::Ipv4FragOptionedTcp
                | TestType::Ipv4FragOptionedIcmp
        )
    }

    pub fn is_ipv6(&self) -> bool {
        !self.is_ipv4()
    }

    /// TCP tests need a destination port; echo tests do not.
    pub fn requires_port(&self) -> bool {
        self.is_tcp()
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TestType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| Error::Usage(format!("unknown test type: {}", s)))
    }
}
