//! Error types for the synfrag core library

use std::io;
use thiserror::Error;

/// Result type alias for probe operations
pub type Result<T> = std::result::Result<T, Error>;

/// The stable set of failure kinds a probe run can produce.
///
/// Everything except [`Error::Timeout`] is fatal and terminates the run
/// with a diagnostic on stderr. A timeout is an ordinary negative result:
/// the probe was sent, nothing came back.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid command-line argument
    #[error("Usage error: {0}")]
    Usage(String),

    /// Cannot open the device, wrong datalink, or cannot read its MAC
    #[error("Interface error: {0}")]
    Interface(String),

    /// Malformed source or destination address (unparsable, wrong family)
    #[error("Address error: {0}")]
    Address(String),

    /// BPF compile or install failed, or the filter expression overflowed
    #[error("Filter error: {0}")]
    Filter(String),

    /// Link-level write failed or returned short
    #[error("Inject error: {0}")]
    Inject(String),

    /// Listener delivered fewer bytes than expected or an impossible length
    #[error("Listener communication error: {0}")]
    ChildComm(String),

    /// Internal contract violation in the checksum/builder layer; fatal
    #[error("Checksum failure: {0}")]
    Checksum(String),

    /// The listener reported no reply before the deadline
    #[error("timed out waiting for a reply")]
    Timeout,

    /// I/O errors with automatic conversion
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Process exit code for this error: 2 for usage problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Interface("no such device: eth9".to_string());
        assert_eq!(err.to_string(), "Interface error: no such device: eth9");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::Usage("missing --dstip".into()).exit_code(), 2);
        assert_eq!(Error::Timeout.exit_code(), 1);
        assert_eq!(Error::Inject("short write".into()).exit_code(), 1);
        assert_eq!(Error::Checksum("bad version nibble".into()).exit_code(), 1);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "raw socket");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
