use std::{fmt, io};

/// Convenience alias over [`ErrorKind`].
pub type Result<T> = std::result::Result<T, ErrorKind>;

/// Errors that can occur in the FastPass stack.
#[derive(Debug)]
pub enum ErrorKind {
    /// Wrapper around a std io error.
    IOError(io::Error),
    /// An inbound datagram could not be decoded.
    DecodingError(DecodingErrorKind),
    /// A configuration value was rejected at construction.
    InvalidConfig(&'static str),
}

/// The reason an inbound datagram failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingErrorKind {
    /// Shorter than the header plus one payload byte.
    PacketTooShort,
    /// A payload type nibble this engine does not understand.
    UnknownPayloadType(u8),
    /// A RESET payload with fewer than 8 bytes remaining.
    IncompleteReset,
    /// An ALLOC payload shorter than its own length fields claim.
    IncompleteAlloc,
    /// An ACK payload with fewer than 6 bytes remaining.
    IncompleteAck,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::IOError(e) => write!(fmt, "an IO error occurred: {}", e),
            ErrorKind::DecodingError(e) => write!(fmt, "could not decode datagram: {}", e),
            ErrorKind::InvalidConfig(reason) => write!(fmt, "invalid configuration: {}", reason),
        }
    }
}

impl fmt::Display for DecodingErrorKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodingErrorKind::PacketTooShort => write!(fmt, "packet below minimal size"),
            DecodingErrorKind::UnknownPayloadType(t) => {
                write!(fmt, "unknown payload type {}", t)
            }
            DecodingErrorKind::IncompleteReset => write!(fmt, "incomplete RESET payload"),
            DecodingErrorKind::IncompleteAlloc => write!(fmt, "incomplete ALLOC payload"),
            DecodingErrorKind::IncompleteAck => write!(fmt, "incomplete ACK payload"),
        }
    }
}

impl std::error::Error for ErrorKind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ErrorKind::IOError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ErrorKind {
    fn from(inner: io::Error) -> Self {
        ErrorKind::IOError(inner)
    }
}

impl From<DecodingErrorKind> for ErrorKind {
    fn from(inner: DecodingErrorKind) -> Self {
        ErrorKind::DecodingError(inner)
    }
}
