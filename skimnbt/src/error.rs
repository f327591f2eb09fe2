//! Contains the Error and Result type used by the inflater, cursor and decoder.

use crate::Tag;

/// An error decoding a single chunk. Errors never outlive the chunk they were
/// raised for; callers are expected to record them and move on to the next
/// chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Any other errors. Users should not match on this variant and should
    /// instead use a wildcard `_`. Errors in this category may be moved to new
    /// variants.
    Other,

    /// The zlib stream was malformed, or there was no data at all.
    Decompression,

    /// A read needed more bytes than remained in the buffer.
    Truncated,

    /// A tag byte outside of the known range 0..=12.
    UnknownTag(u8),

    /// An end tag turned up where a value was expected, eg a non-empty list of
    /// end tags.
    UnexpectedEnd,

    /// A negative or overflowing array or list length.
    InvalidLength(i64),

    /// Data did not start with a compound tag.
    NoRootCompound(Tag),

    /// Expected Java CESU-8 string data but was not valid. Contains the
    /// offending bytes.
    Nonunicode(Vec<u8>),

    /// Compounds and lists nested deeper than
    /// [`MAX_DEPTH`][crate::de::MAX_DEPTH].
    DepthLimit,

    /// A skip list whose prefixes would make the skip decision depend on the
    /// order they are checked in.
    InvalidSkipList,
}

impl Error {
    /// Get the kind of error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, ErrorKind::Truncated)
    }

    pub(crate) fn bespoke(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind: ErrorKind::Other,
        }
    }

    pub(crate) fn decompression(msg: impl std::fmt::Display) -> Self {
        Self {
            msg: format!("invalid zlib data: {}", msg),
            kind: ErrorKind::Decompression,
        }
    }

    pub(crate) fn truncated(wanted: usize, available: usize) -> Self {
        Self {
            msg: format!(
                "truncated: needed {} bytes, only {} remain",
                wanted, available
            ),
            kind: ErrorKind::Truncated,
        }
    }

    pub(crate) fn unknown_tag(tag: u8) -> Self {
        Self {
            msg: format!("invalid nbt tag value: {}", tag),
            kind: ErrorKind::UnknownTag(tag),
        }
    }

    pub(crate) fn unexpected_end() -> Self {
        Self {
            msg: "end tag found where a value was expected".to_owned(),
            kind: ErrorKind::UnexpectedEnd,
        }
    }

    pub(crate) fn invalid_length(len: i64) -> Self {
        Self {
            msg: format!("invalid length: {}", len),
            kind: ErrorKind::InvalidLength(len),
        }
    }

    pub(crate) fn no_root_compound(found: Tag) -> Self {
        Self {
            msg: format!("invalid nbt: expected root compound, found {:?}", found),
            kind: ErrorKind::NoRootCompound(found),
        }
    }

    pub(crate) fn nonunicode(data: &[u8]) -> Self {
        Self {
            msg: format!(
                "invalid nbt string: nonunicode: {}",
                String::from_utf8_lossy(data)
            ),
            kind: ErrorKind::Nonunicode(data.to_vec()),
        }
    }

    pub(crate) fn depth_limit(max: usize) -> Self {
        Self {
            msg: format!("invalid nbt: nested deeper than {} levels", max),
            kind: ErrorKind::DepthLimit,
        }
    }

    pub(crate) fn invalid_skip_list(msg: impl Into<String>) -> Self {
        Self {
            msg: format!("invalid skip list: {}", msg.into()),
            kind: ErrorKind::InvalidSkipList,
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Self {
                msg: e.to_string(),
                kind: ErrorKind::Truncated,
            },
            _ => Self::bespoke(format!("io error: {}", e)),
        }
    }
}

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;
