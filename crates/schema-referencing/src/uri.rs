use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::{error::Error, Uri, UriRef};

/// Synthetic base used for schema documents with no `$id` and no
/// caller-provided base URI. Kept out-of-band (a scheme no real document
/// would ever use) so it never collides with a genuine resource.
pub static DEFAULT_ROOT_URI: Lazy<Uri<String>> =
    Lazy::new(|| Uri::parse("json-schema:///".to_string()).expect("static URI is valid"));

const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// Percent-encode a string for use inside a URI fragment (anchor name).
pub(crate) fn encode_to(value: &str, buffer: &mut String) {
    for piece in utf8_percent_encode(value, FRAGMENT) {
        buffer.push_str(piece);
    }
}

pub(crate) fn from_str(value: &str) -> Result<Uri<String>, Error> {
    Uri::parse(value.to_string()).map_err(|_| Error::InvalidUri {
        value: value.to_string(),
    })
}

/// Resolve `reference` against `base`, producing an absolute URI.
pub(crate) fn resolve_against(base: &Uri<&str>, reference: &str) -> Result<Uri<String>, Error> {
    let reference = UriRef::parse(reference).map_err(|_| Error::InvalidUri {
        value: reference.to_string(),
    })?;
    reference.resolve_against(base).map_err(|_| Error::InvalidUri {
        value: reference.as_str().to_string(),
    })
}
