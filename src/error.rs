use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    /// Malformed caller input: bad pool id, payload length, bounds, byte count.
    InvalidArgument(String),
    /// Seed material was not exactly 64 bytes; carries the offending length.
    InvalidSeedLength(usize),
    /// An output operation was attempted before any successful seed.
    NotSeeded,
    /// Broken internal invariant (e.g. a poisoned lock). Never retried.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::InvalidSeedLength(n) => {
                write!(f, "invalid seed length: expected 64 bytes, got {}", n)
            }
            Error::NotSeeded => write!(f, "generator is not seeded"),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_io() {
        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let msg = format!("{}", err);
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_display_invalid_argument() {
        let err = Error::InvalidArgument("pool id 40 out of range".into());
        let msg = format!("{}", err);
        assert!(msg.contains("invalid argument"));
        assert!(msg.contains("pool id 40"));
    }

    #[test]
    fn test_display_invalid_seed_length() {
        let err = Error::InvalidSeedLength(63);
        let msg = format!("{}", err);
        assert!(msg.contains("expected 64 bytes"));
        assert!(msg.contains("63"));
    }

    #[test]
    fn test_display_not_seeded() {
        let msg = format!("{}", Error::NotSeeded);
        assert!(msg.contains("not seeded"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("expected Error::Io"),
        }
    }
}
