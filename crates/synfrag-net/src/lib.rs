//! synfrag packet construction and link-layer I/O
//!
//! Bit-exact assembly of Ethernet + IPv4/IPv6 (+ extension headers) +
//! TCP/ICMP/ICMPv6 headers into a fixed 1500-octet frame buffer, plus the
//! libpcap-backed link primitive the probe layer injects and captures
//! through. Builders write into caller-supplied slices at caller-chosen
//! offsets and finish by invoking the checksum unit, so a fragmented
//! recipe can lay out the full packet once and rewrite only the IP
//! envelope for the second fragment.

pub mod checksum;
pub mod ethernet;
pub mod frame;
pub mod icmp;
pub mod interface;
pub mod ipv4;
pub mod ipv6;
pub mod link;
pub mod tcp;

/// Fragment offsets count in units of 8 octets; the first fragment of every
/// probe carries exactly one unit of L4 data.
pub const MIN_FRAGMENT_SIZE: usize = 8;

/// RFC 791 minimum IP MTU. Optioned first fragments are padded to at least
/// this many octets so paths that drop undersized fragments still forward
/// them.
pub const MIN_PACKET_SIZE: usize = 68;

pub use checksum::ChecksumProto;
pub use ethernet::{build_ethernet, parse_mac, ETHERNET_LEN};
pub use frame::{FrameBuffer, MAX_FRAME};
pub use interface::mac_of;
pub use link::{LinkIo, PcapLink, CAPTURE_LEN};
