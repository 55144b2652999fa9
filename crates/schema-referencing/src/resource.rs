use std::borrow::Cow;

use serde_json::Value;

use crate::{error::Error, segments::Segments, Anchor, Draft, Resolved, Resolver};

/// A document with a concrete interpretation under a JSON Schema dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub(crate) contents: Value,
    draft: Draft,
}

impl Resource {
    pub(crate) fn new(contents: Value, draft: Draft) -> Self {
        Self { contents, draft }
    }

    #[must_use]
    pub fn contents(&self) -> &Value {
        &self.contents
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// Build a resource, auto-detecting its dialect from `$schema`.
    pub fn from_contents(contents: Value) -> Result<Resource, Error> {
        Ok(Draft::default().detect(&contents)?.create_resource(contents))
    }

    pub(crate) fn from_contents_and_draft(contents: Value, draft: Draft) -> Result<Resource, Error> {
        Ok(draft.detect(&contents)?.create_resource(contents))
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.as_ref().id()
    }

    pub(crate) fn subresources(&self) -> Box<dyn Iterator<Item = Result<Resource, Error>> + '_> {
        let draft = self.draft;
        Box::new(
            self.draft
                .subresources_of(&self.contents)
                .map(move |contents| Resource::from_contents_and_draft(contents, draft)),
        )
    }

    pub(crate) fn anchors(&self) -> impl Iterator<Item = Anchor> + '_ {
        self.draft.anchors(&self.contents)
    }

    /// Traverse a JSON Pointer from this resource's root, threading the
    /// resolver through any `$id`-bearing subresource boundaries crossed
    /// along the way so the returned [`Resolved`] carries the correct
    /// dynamic scope.
    pub(crate) fn pointer<'r>(
        &'r self,
        pointer: &str,
        mut resolver: Resolver<'r>,
    ) -> Result<Resolved<'r>, Error> {
        let mut contents = &self.contents;
        let mut segments = Segments::new();
        let original_pointer = pointer;
        let decoded = percent_encoding::percent_decode_str(&pointer[1..])
            .decode_utf8()
            .map_err(|err| Error::invalid_percent_encoding(original_pointer, err))?;
        for segment in decoded.split('/') {
            if let Some(array) = contents.as_array() {
                let idx: usize = segment
                    .parse()
                    .map_err(|err| Error::invalid_array_index(original_pointer, segment, err))?;
                contents = array
                    .get(idx)
                    .ok_or_else(|| Error::pointer_to_nowhere(original_pointer))?;
                segments.push(idx);
            } else {
                let segment = unescape_segment(segment);
                contents = contents
                    .get(segment.as_ref())
                    .ok_or_else(|| Error::pointer_to_nowhere(original_pointer))?;
                segments.push(segment);
            }
            let previous = resolver.clone();
            let next = self.draft.maybe_in_subresource(
                &segments,
                &resolver,
                self.draft.create_resource_ref(contents),
            )?;
            if next != previous {
                segments = Segments::new();
            }
            resolver = next;
        }
        Ok(Resolved::new(contents, resolver, self.draft()))
    }

    #[must_use]
    pub fn as_ref(&self) -> ResourceRef<'_> {
        ResourceRef::new(&self.contents, self.draft)
    }
}

/// A borrowed view of a [`Resource`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ResourceRef<'a> {
    contents: &'a Value,
    draft: Draft,
}

impl<'a> ResourceRef<'a> {
    #[must_use]
    pub fn new(contents: &'a Value, draft: Draft) -> Self {
        ResourceRef { contents, draft }
    }

    #[must_use]
    pub fn id(&self) -> Option<&'a str> {
        self.draft.id_of(self.contents).map(|id| id.trim_end_matches('#'))
    }

    #[must_use]
    pub fn contents(&self) -> &'a Value {
        self.contents
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }
}

/// Decode `~1`/`~0` escapes in one JSON-Pointer segment, single-pass and
/// allocation-free on the (common) no-escape path.
fn unescape_segment(mut segment: &str) -> Cow<'_, str> {
    let Some(mut tilde_idx) = segment.find('~') else {
        return Cow::Borrowed(segment);
    };

    let mut buffer = String::with_capacity(segment.len());
    loop {
        let (before, after) = segment.split_at(tilde_idx);
        buffer.push_str(before);
        segment = &after[1..];
        let next_char_size = match segment.chars().next() {
            Some('1') => {
                buffer.push('/');
                1
            }
            Some('0') => {
                buffer.push('~');
                1
            }
            Some(next) => {
                buffer.push('~');
                buffer.push(next);
                next.len_utf8()
            }
            None => {
                buffer.push('~');
                break;
            }
        };
        segment = &segment[next_char_size..];
        let Some(next_tilde_idx) = segment.find('~') else {
            buffer.push_str(segment);
            break;
        };
        tilde_idx = next_tilde_idx;
    }
    Cow::Owned(buffer)
}

#[cfg(test)]
mod tests {
    use super::unescape_segment;
    use test_case::test_case;

    #[test_case("abc")]
    #[test_case("a~0b")]
    #[test_case("a~1b")]
    #[test_case("~01")]
    #[test_case("~")]
    #[test_case("~~")]
    #[test_case("")]
    #[test_case("a/d")]
    fn unescape_matches_double_replace(input: &str) {
        let unescaped = unescape_segment(input);
        let double_replaced = input.replace("~1", "/").replace("~0", "~");
        assert_eq!(unescaped, double_replaced);
    }
}
