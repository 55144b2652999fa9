use std::{error, fmt};

use serde_json::Value;

/// A caller-supplied fetcher for schema documents not already in a
/// [`crate::Registry`]. Transport, retries and timeouts are entirely the
/// implementor's concern (§4.F / §5 "loader carries its own deadline
/// contract"); this trait only narrows the interface to `uri -> document`.
pub trait Retrieve: Send + Sync {
    /// # Errors
    /// Any failure to produce a document for `uri` (not found, network
    /// error, parse error) should be returned as a boxed error; the registry
    /// wraps it in [`crate::Error::Unretrievable`].
    fn retrieve(&self, uri: &str) -> Result<Value, Box<dyn error::Error + Send + Sync>>;
}

/// Rejects every remote reference. Matches the documented default
/// (`remoteLoader` default: rejects all remote refs, §6.3): a compiled
/// schema never performs surprise network or filesystem I/O unless the
/// caller opts in.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRetriever;

impl Retrieve for DefaultRetriever {
    fn retrieve(&self, uri: &str) -> Result<Value, Box<dyn error::Error + Send + Sync>> {
        Err(Box::new(NoRetrieverConfigured {
            uri: uri.to_string(),
        }))
    }
}

#[derive(Debug)]
struct NoRetrieverConfigured {
    uri: String,
}

impl fmt::Display for NoRetrieverConfigured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "External reference '{}' could not be fetched: no retriever is configured",
            self.uri
        )
    }
}

impl error::Error for NoRetrieverConfigured {}
