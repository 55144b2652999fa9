/// A sequence of JSON-Pointer segments accumulated while walking into a
/// resource, reset whenever the walk crosses a subresource boundary (a
/// nested `$id`). Used to compute the pointer *relative to the innermost
/// enclosing resource*, which is what anchors and `$dynamicAnchor` are
/// indexed under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments(Vec<Segment>);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

impl Segments {
    #[must_use]
    pub fn new() -> Self {
        Segments(Vec::new())
    }

    pub fn push(&mut self, segment: impl Into<SegmentValue>) {
        match segment.into() {
            SegmentValue::Key(key) => self.0.push(Segment::Key(key)),
            SegmentValue::Index(index) => self.0.push(Segment::Index(index)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a JSON Pointer string, e.g. `/properties/foo/0`.
    #[must_use]
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            out.push('/');
            match segment {
                Segment::Key(key) => {
                    for ch in key.chars() {
                        match ch {
                            '~' => out.push_str("~0"),
                            '/' => out.push_str("~1"),
                            other => out.push(other),
                        }
                    }
                }
                Segment::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }
}

pub enum SegmentValue {
    Key(String),
    Index(usize),
}

impl<'a> From<std::borrow::Cow<'a, str>> for SegmentValue {
    fn from(value: std::borrow::Cow<'a, str>) -> Self {
        SegmentValue::Key(value.into_owned())
    }
}

impl From<usize> for SegmentValue {
    fn from(value: usize) -> Self {
        SegmentValue::Index(value)
    }
}
