//! Path representations used during compilation and evaluation.
//!
//! Two shapes exist on purpose: [`JsonPointer`] is an owned, `Vec`-backed
//! pointer used wherever a path needs to outlive the call that produced it
//! (schema locations stored on compiled nodes, error records).
//! [`JsonPointerNode`] is a borrowed linked list, one frame per recursion
//! level, so walking deeper into an instance during evaluation costs no
//! allocation — the path is only rendered to a [`JsonPointer`] when an error
//! is actually produced.
use std::fmt;
use std::fmt::Write as _;

/// One segment of a JSON Pointer: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathChunk {
    Key(String),
    Index(usize),
    /// A literal keyword name contributed by the compiler (e.g. `"properties"`),
    /// as opposed to data-driven segments coming from the instance.
    Keyword(&'static str),
}

impl From<String> for PathChunk {
    fn from(value: String) -> Self {
        PathChunk::Key(value)
    }
}

impl From<&'static str> for PathChunk {
    fn from(value: &'static str) -> Self {
        PathChunk::Keyword(value)
    }
}

impl From<usize> for PathChunk {
    fn from(value: usize) -> Self {
        PathChunk::Index(value)
    }
}

/// An owned JSON Pointer (RFC 6901), e.g. `/properties/name/minLength`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPointer(Vec<PathChunk>);

impl JsonPointer {
    #[must_use]
    pub fn new() -> Self {
        JsonPointer(Vec::new())
    }

    #[must_use]
    pub fn push(&self, chunk: impl Into<PathChunk>) -> Self {
        let mut chunks = self.0.clone();
        chunks.push(chunk.into());
        JsonPointer(chunks)
    }

    #[must_use]
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.0 {
            f.write_str("/")?;
            match chunk {
                PathChunk::Key(key) => write_escaped(f, key)?,
                PathChunk::Keyword(key) => write_escaped(f, key)?,
                PathChunk::Index(idx) => write!(f, "{idx}")?,
            }
        }
        Ok(())
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for ch in value.chars() {
        match ch {
            '~' => f.write_str("~0")?,
            '/' => f.write_str("~1")?,
            other => f.write_char(other)?,
        }
    }
    Ok(())
}

/// One frame of a borrowed, stack-allocated JSON Pointer built while
/// recursing into an instance during evaluation.
#[derive(Debug, Clone, Copy)]
pub enum JsonPointerNode<'a> {
    Root,
    Chunk {
        parent: &'a JsonPointerNode<'a>,
        chunk: Chunk<'a>,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum Chunk<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> JsonPointerNode<'a> {
    #[must_use]
    pub fn push_key(&'a self, key: &'a str) -> JsonPointerNode<'a> {
        JsonPointerNode::Chunk {
            parent: self,
            chunk: Chunk::Key(key),
        }
    }

    #[must_use]
    pub fn push_index(&'a self, index: usize) -> JsonPointerNode<'a> {
        JsonPointerNode::Chunk {
            parent: self,
            chunk: Chunk::Index(index),
        }
    }
}

impl From<&JsonPointerNode<'_>> for JsonPointer {
    fn from(node: &JsonPointerNode<'_>) -> Self {
        let mut chunks = Vec::new();
        let mut current = node;
        loop {
            match current {
                JsonPointerNode::Root => break,
                JsonPointerNode::Chunk { parent, chunk } => {
                    chunks.push(match chunk {
                        Chunk::Key(key) => PathChunk::Key((*key).to_string()),
                        Chunk::Index(idx) => PathChunk::Index(*idx),
                    });
                    current = parent;
                }
            }
        }
        chunks.reverse();
        JsonPointer(chunks)
    }
}

/// An absolute schema location: the base URI of the resource a keyword was
/// compiled from, plus the pointer into that resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub base_uri: String,
    pub pointer: JsonPointer,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.base_uri, self.pointer)
    }
}
