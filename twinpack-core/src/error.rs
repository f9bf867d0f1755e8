//! Error types shared by every wire format.

use core::fmt::{self, Display};

/// Result type used throughout twinpack.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Error raised while encoding, decoding or resolving formatters.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The specific kind of error
    pub kind: ErrorKind,
    /// Byte offset into the buffer where the error was detected, if known
    pub offset: Option<usize>,
}

impl Error {
    /// Create an error without position information.
    pub const fn new(kind: ErrorKind) -> Self {
        Error { kind, offset: None }
    }

    /// Create an error located at `offset`.
    pub const fn at(kind: ErrorKind, offset: usize) -> Self {
        Error {
            kind,
            offset: Some(offset),
        }
    }

    /// A leading byte that has no meaning for the requested decode operation.
    pub const fn invalid_code(
        code: u8,
        format_name: &'static str,
        expected: &'static str,
        offset: usize,
    ) -> Self {
        Self::at(
            ErrorKind::InvalidCode {
                code,
                format_name,
                expected,
            },
            offset,
        )
    }

    /// The buffer ended before `needed` more bytes could be read.
    pub const fn eof(needed: usize, offset: usize) -> Self {
        Self::at(ErrorKind::UnexpectedEof { needed }, offset)
    }

    /// No formatter is registered for `T`.
    pub fn no_formatter<T: ?Sized>() -> Self {
        Self::new(ErrorKind::NoFormatter {
            type_name: core::any::type_name::<T>(),
        })
    }

    /// `T` cannot be used as an object key in a text format.
    pub fn unsupported_key<T: ?Sized>() -> Self {
        Self::new(ErrorKind::UnsupportedKey {
            type_name: core::any::type_name::<T>(),
        })
    }

    /// A value was decoded but is not acceptable for the target type.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidValue {
            message: message.into(),
        })
    }

    /// Attach a position unless one is already recorded.
    pub fn with_offset(mut self, offset: usize) -> Self {
        if self.offset.is_none() {
            self.offset = Some(offset);
        }
        self
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} at offset {offset}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {}

/// Specific error kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Leading byte not valid for the requested operation
    InvalidCode {
        /// The offending byte
        code: u8,
        /// Textual wire-format name of that byte
        format_name: &'static str,
        /// What the decoder was asked to read
        expected: &'static str,
    },
    /// Reading past the end of the buffer
    UnexpectedEof {
        /// How many more bytes were required
        needed: usize,
    },
    /// Extension header whose type code or length does not match the reader
    InvalidExtension {
        /// The extension type code found
        type_code: i8,
        /// The declared payload length
        length: u32,
        /// What the decoder was asked to read
        expected: &'static str,
    },
    /// String payload is not valid UTF-8
    InvalidUtf8,
    /// Unexpected token in text input
    UnexpectedToken {
        /// The byte that was found
        got: u8,
        /// What was expected instead
        expected: &'static str,
    },
    /// Malformed escape sequence in a text string
    InvalidEscape,
    /// A numeric token could not be parsed as the target type
    InvalidNumber {
        /// The target type
        target: &'static str,
    },
    /// A numeric value does not fit the target type
    NumberOutOfRange {
        /// The target type
        target: &'static str,
    },
    /// Dictionary key type without a property-name-capable formatter
    UnsupportedKey {
        /// The key type
        type_name: &'static str,
    },
    /// A record or tuple member absent from the input
    MissingField {
        /// The member name
        name: &'static str,
    },
    /// No formatter registered for a type
    NoFormatter {
        /// The requested type
        type_name: &'static str,
    },
    /// The buffer could not grow to the requested length
    Allocation {
        /// Requested length in bytes
        requested: usize,
    },
    /// Invalid value for the target type
    InvalidValue {
        /// Description of why the value is invalid
        message: String,
    },
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidCode {
                code,
                format_name,
                expected,
            } => write!(
                f,
                "invalid code 0x{code:02x} ({format_name}) while reading {expected}"
            ),
            ErrorKind::UnexpectedEof { needed } => {
                write!(f, "unexpected end of input, {needed} more byte(s) needed")
            }
            ErrorKind::InvalidExtension {
                type_code,
                length,
                expected,
            } => write!(
                f,
                "invalid extension (type {type_code}, length {length}) while reading {expected}"
            ),
            ErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            ErrorKind::UnexpectedToken { got, expected } => {
                if got.is_ascii_graphic() {
                    write!(f, "unexpected token '{}', expected {expected}", *got as char)
                } else {
                    write!(f, "unexpected byte 0x{got:02x}, expected {expected}")
                }
            }
            ErrorKind::InvalidEscape => write!(f, "invalid escape sequence"),
            ErrorKind::InvalidNumber { target } => write!(f, "invalid number for {target}"),
            ErrorKind::NumberOutOfRange { target } => write!(f, "number out of range for {target}"),
            ErrorKind::UnsupportedKey { type_name } => {
                write!(f, "{type_name} cannot be used as a property name")
            }
            ErrorKind::MissingField { name } => write!(f, "missing field `{name}`"),
            ErrorKind::NoFormatter { type_name } => {
                write!(f, "no formatter registered for {type_name}")
            }
            ErrorKind::Allocation { requested } => {
                write!(f, "cannot grow buffer to {requested} bytes")
            }
            ErrorKind::InvalidValue { message } => write!(f, "invalid value: {message}"),
        }
    }
}

impl ErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCode { .. } => "twinpack::invalid_code",
            ErrorKind::UnexpectedEof { .. } => "twinpack::unexpected_eof",
            ErrorKind::InvalidExtension { .. } => "twinpack::invalid_extension",
            ErrorKind::InvalidUtf8 => "twinpack::invalid_utf8",
            ErrorKind::UnexpectedToken { .. } => "twinpack::unexpected_token",
            ErrorKind::InvalidEscape => "twinpack::invalid_escape",
            ErrorKind::InvalidNumber { .. } => "twinpack::invalid_number",
            ErrorKind::NumberOutOfRange { .. } => "twinpack::number_out_of_range",
            ErrorKind::UnsupportedKey { .. } => "twinpack::unsupported_key",
            ErrorKind::MissingField { .. } => "twinpack::missing_field",
            ErrorKind::NoFormatter { .. } => "twinpack::no_formatter",
            ErrorKind::Allocation { .. } => "twinpack::allocation",
            ErrorKind::InvalidValue { .. } => "twinpack::invalid_value",
        }
    }

    /// Whether this error comes from malformed or truncated input.
    pub const fn is_decode(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidCode { .. }
                | ErrorKind::UnexpectedEof { .. }
                | ErrorKind::InvalidExtension { .. }
                | ErrorKind::InvalidUtf8
                | ErrorKind::UnexpectedToken { .. }
                | ErrorKind::InvalidEscape
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_code_names_byte_and_format() {
        let err = Error::invalid_code(0xc1, "never used", "int32", 3);
        assert_eq!(
            err.to_string(),
            "invalid code 0xc1 (never used) while reading int32 at offset 3"
        );
        assert_eq!(err.kind.code(), "twinpack::invalid_code");
        assert!(err.kind.is_decode());
    }

    #[test]
    fn with_offset_keeps_first_position() {
        let err = Error::eof(2, 7).with_offset(9);
        assert_eq!(err.offset, Some(7));
        let err = Error::invalid_value("nope").with_offset(9);
        assert_eq!(err.offset, Some(9));
    }
}
