use std::fmt;
use std::io;
use std::result;

/// A type alias for `Result<T, lenient_csv::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing CSV data.
///
/// Malformed CSV is never an error: the reader always finds *a* parse. The
/// only failures come from the underlying source or sink, or from values
/// that cannot be serialized as a flat record.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error that occurred while reading or writing CSV data.
    ///
    /// The underlying error is passed through unmodified.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The character source contained bytes that are not valid UTF-8.
    #[error("CSV parse error: {err}")]
    Utf8 {
        /// The corresponding UTF-8 error.
        err: Utf8Error,
    },
    /// A value given to `Writer::serialize` has no CSV representation.
    #[error("CSV serialize error: {0}")]
    Serialize(String),
}

impl Error {
    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Io(_) => true,
            _ => false,
        }
    }
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Error {
        Error::Utf8 { err }
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Error {
        Error::Serialize(msg.to_string())
    }
}

/// An invalid UTF-8 sequence found while decoding a byte stream into
/// characters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Utf8Error {
    /// The byte offset, from the start of the stream, of the invalid
    /// sequence.
    byte: u64,
    /// The number of bytes in the invalid sequence.
    len: usize,
}

/// Create a new UTF-8 error.
pub(crate) fn new_utf8_error(byte: u64, len: usize) -> Utf8Error {
    Utf8Error { byte, len }
}

impl Utf8Error {
    /// The byte offset, from the start of the stream, of the invalid
    /// sequence.
    pub fn byte(&self) -> u64 {
        self.byte
    }

    /// The number of bytes in the invalid sequence.
    pub fn len(&self) -> usize {
        self.len
    }
}

impl fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid utf-8: {} invalid byte(s) at byte offset {}",
            self.len, self.byte
        )
    }
}

impl std::error::Error for Utf8Error {}
