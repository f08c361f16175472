//! Fixed-capacity frame buffer
//!
//! Every recipe stages its packet, fragmented or not, in one of these.
//! The buffer never grows; builders receive bounds-checked regions instead
//! of raw offsets, so the "headers plus payload must fit" invariant is
//! enforced at construction time rather than by convention.

use synfrag_core::{Error, Result};

/// Capacity of the staging buffer and the capture snap length.
pub const MAX_FRAME: usize = 1500;

/// A 1500-octet staging area for one probe's frames.
///
/// Both fragments of a pair are assembled here in turn: the recipe writes
/// the complete packet as if unfragmented, transmits the first-fragment
/// prefix, then rewrites the IP envelope in place and pulls the L4 tail
/// down for the second transmission.
pub struct FrameBuffer {
    data: Box<[u8; MAX_FRAME]>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; MAX_FRAME]),
        }
    }

    /// Split into link-layer and network-layer regions.
    pub fn split_at_mut(&mut self, mid: usize) -> Result<(&mut [u8], &mut [u8])> {
        if mid > MAX_FRAME {
            return Err(Error::Checksum(format!(
                "frame split at {} exceeds {}-octet buffer",
                mid, MAX_FRAME
            )));
        }
        Ok(self.data.split_at_mut(mid))
    }

    /// The first `len` octets, ready for injection.
    pub fn frame(&self, len: usize) -> Result<&[u8]> {
        if len > MAX_FRAME {
            return Err(Error::Checksum(format!(
                "frame length {} exceeds {}-octet buffer",
                len, MAX_FRAME
            )));
        }
        Ok(&self.data[..len])
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
