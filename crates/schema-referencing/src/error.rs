use std::{error, fmt, str::Utf8Error};

/// Failures that can occur while building a [`crate::Registry`] or resolving
/// a reference through a [`crate::Resolver`].
#[derive(Debug)]
pub enum Error {
    /// `$schema` did not match any known dialect.
    UnknownSpecification { schema: String },
    /// A URI reference could not be parsed.
    InvalidUri { value: String },
    /// Percent-decoding a JSON-Pointer segment produced invalid UTF-8.
    InvalidPercentEncoding { pointer: String, source: Utf8Error },
    /// An array index token in a pointer was not a valid `usize`.
    InvalidArrayIndex {
        pointer: String,
        segment: String,
        source: std::num::ParseIntError,
    },
    /// A JSON-Pointer did not resolve to anything in the target document.
    PointerToNowhere { pointer: String },
    /// An anchor name is not present in the resource it was looked up in.
    NoSuchAnchor { anchor: String, resource: String },
    /// An anchor's grammar is invalid for the dialect in use.
    InvalidAnchor { value: String },
    /// No resource is registered under the given base URI.
    NoSuchResource { uri: String },
    /// The caller-supplied retriever refused or failed to fetch a document.
    Unretrievable {
        uri: String,
        source: Box<dyn error::Error + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn invalid_percent_encoding(pointer: &str, source: Utf8Error) -> Self {
        Error::InvalidPercentEncoding {
            pointer: pointer.to_string(),
            source,
        }
    }

    pub(crate) fn invalid_array_index(
        pointer: &str,
        segment: &str,
        source: std::num::ParseIntError,
    ) -> Self {
        Error::InvalidArrayIndex {
            pointer: pointer.to_string(),
            segment: segment.to_string(),
            source,
        }
    }

    pub(crate) fn pointer_to_nowhere(pointer: &str) -> Self {
        Error::PointerToNowhere {
            pointer: pointer.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownSpecification { schema } => {
                write!(f, "Unknown specification: {schema}")
            }
            Error::InvalidUri { value } => write!(f, "Invalid URI reference: {value}"),
            Error::InvalidPercentEncoding { pointer, .. } => write!(
                f,
                "Invalid percent encoding in pointer '{pointer}': the decoded bytes do not represent valid UTF-8"
            ),
            Error::InvalidArrayIndex { pointer, segment, .. } => write!(
                f,
                "Failed to parse array index '{segment}' in pointer '{pointer}'"
            ),
            Error::PointerToNowhere { pointer } => {
                write!(f, "Pointer '{pointer}' does not exist")
            }
            Error::NoSuchAnchor { anchor, resource } => {
                write!(f, "No such anchor '{anchor}' in resource '{resource}'")
            }
            Error::InvalidAnchor { value } => write!(f, "Invalid anchor: {value}"),
            Error::NoSuchResource { uri } => write!(f, "Resource '{uri}' is not registered"),
            Error::Unretrievable { uri, .. } => write!(f, "Failed to retrieve resource '{uri}'"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::InvalidPercentEncoding { source, .. } => Some(source),
            Error::InvalidArrayIndex { source, .. } => Some(source),
            Error::Unretrievable { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
