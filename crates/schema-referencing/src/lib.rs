//! URI-based resource registry and resolver for JSON Schema reference graphs.
//!
//! This crate is dialect-agnostic about *validation* semantics but knows the
//! 2020-12 shape of a schema resource: where `$id`, `$anchor`,
//! `$dynamicAnchor` and subresources live. It builds a [`Registry`] of
//! [`Resource`]s indexed by absolute URI, and hands out [`Resolver`]s that
//! walk `$ref`/JSON-Pointer/anchor targets while tracking the dynamic scope
//! needed for `$dynamicRef`.

mod anchors;
mod error;
mod registry;
mod resolver;
mod resource;
mod retriever;
mod segments;
mod specification;
mod uri;

pub use anchors::Anchor;
pub use error::Error;
pub use registry::{Registry, RegistryOptions};
pub use resolver::{Resolved, Resolver};
pub use resource::{Resource, ResourceRef};
pub use retriever::{DefaultRetriever, Retrieve};
pub use segments::Segments;
pub use specification::Draft;

/// A borrowed or owned absolute URI reference, as produced by `fluent_uri`.
pub type Uri<T> = fluent_uri::Uri<T>;
pub type UriRef<T> = fluent_uri::UriRef<T>;
