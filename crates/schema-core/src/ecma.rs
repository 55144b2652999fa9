//! Translate an ECMA-262 regex source (as used by `pattern` /
//! `patternProperties`) into a source `fancy_regex` accepts, papering over
//! the handful of syntax differences rather than reimplementing a regex
//! engine (component B).
use std::{borrow::Cow, sync::Arc};

use fancy_regex::Regex;
use regex_syntax::ast::{self, parse::Parser, Ast, ClassPerl, ClassPerlKind, ClassSetItem, Span, Visitor};

use crate::error::{CompileError, CompileErrorKind};

/// Translate then compile an ECMA-flavored pattern.
///
/// # Errors
/// [`CompileError`] with [`CompileErrorKind::RegexCompile`] if the
/// translated source still fails to compile.
pub fn compile(source: &str) -> Result<Arc<Regex>, CompileError> {
    let translated = to_rust_regex(source);
    Regex::new(&translated)
        .map(Arc::new)
        .map_err(|err| {
            CompileError::new(CompileErrorKind::RegexCompile {
                pattern: source.to_string(),
                source: err,
            })
        })
}

/// Best-effort ECMA -> Rust-regex-syntax source translation:
/// - Unescaped literal `{`/`}` (not part of a `{n,m}` repetition) are escaped,
///   since ECMA tolerates them as literals but `regex-syntax` does not.
/// - `\d`, `\w`, `\s` and their negations are rewritten into the explicit
///   ASCII ranges ECMA defines them as by default, since `fancy-regex` would
///   otherwise treat them as Unicode-aware classes.
///
/// Patterns `regex-syntax` cannot parse at all (lookaround, backreferences,
/// and other constructs outside its grammar) pass through with only the
/// brace-escaping applied; `fancy-regex` sees the original class escapes and
/// reports its own error if the pattern turns out to be invalid.
#[must_use]
pub fn to_rust_regex(source: &str) -> String {
    let escaped = escape_literal_braces(source);
    rewrite_ascii_classes(&escaped).unwrap_or(escaped)
}

fn escape_literal_braces(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '{' if !looks_like_repetition(&mut chars.clone()) => {
                out.push_str("\\{");
            }
            '}' => out.push('}'),
            other => out.push(other),
        }
    }
    out
}

fn looks_like_repetition(chars: &mut std::iter::Peekable<std::str::Chars>) -> bool {
    let mut saw_digit = false;
    loop {
        match chars.peek() {
            Some(c) if c.is_ascii_digit() => {
                saw_digit = true;
                chars.next();
            }
            Some(',') => {
                chars.next();
            }
            Some('}') => return saw_digit,
            _ => return false,
        }
    }
}

/// Parse `source` as a `regex-syntax` AST and rewrite every `\d`/`\D`/`\w`/
/// `\W`/`\s`/`\S` node into an explicit ASCII character class, reparsing
/// after each rewrite since replacing a span shifts every later offset.
/// Returns `None` when `source` isn't valid `regex-syntax` grammar at all.
fn rewrite_ascii_classes(source: &str) -> Option<String> {
    let mut pattern = Cow::Borrowed(source);
    let mut ast = Parser::new().parse(&pattern).ok()?;
    loop {
        let translator = AsciiClassRewriter::new(pattern);
        let (rewritten, changed) = ast::visit(&ast, translator).ok()?;
        pattern = rewritten;
        if !changed {
            return Some(pattern.into_owned());
        }
        ast = Parser::new().parse(&pattern).ok()?;
    }
}

struct AsciiClassRewriter<'a> {
    pattern: Cow<'a, str>,
    offset: usize,
    changed: bool,
}

impl<'a> AsciiClassRewriter<'a> {
    fn new(pattern: Cow<'a, str>) -> Self {
        AsciiClassRewriter {
            pattern,
            offset: 0,
            changed: false,
        }
    }

    fn replace(&mut self, span: &Span, replacement: &str) {
        let Span { start, end } = span;
        match self.pattern {
            Cow::Borrowed(pattern) => {
                let prefix = &pattern[..start.offset];
                let suffix = &pattern[end.offset..];
                self.pattern = Cow::Owned(format!("{prefix}{replacement}{suffix}"));
            }
            Cow::Owned(ref mut buffer) => {
                buffer.replace_range(start.offset + self.offset..end.offset + self.offset, replacement);
            }
        }
        self.offset += replacement.len() - (end.offset - start.offset);
        self.changed = true;
    }

    fn rewrite_perl(&mut self, cls: &ClassPerl) {
        let replacement = match (&cls.kind, cls.negated) {
            (ClassPerlKind::Digit, false) => "[0-9]",
            (ClassPerlKind::Digit, true) => "[^0-9]",
            (ClassPerlKind::Word, false) => "[A-Za-z0-9_]",
            (ClassPerlKind::Word, true) => "[^A-Za-z0-9_]",
            (ClassPerlKind::Space, false) => "[ \t\n\r\u{b}\u{c}]",
            (ClassPerlKind::Space, true) => "[^ \t\n\r\u{b}\u{c}]",
        };
        self.replace(&cls.span, replacement);
    }
}

impl<'a> Visitor for AsciiClassRewriter<'a> {
    type Output = (Cow<'a, str>, bool);
    type Err = ast::Error;

    fn finish(self) -> Result<Self::Output, Self::Err> {
        Ok((self.pattern, self.changed))
    }

    /// Classes nested inside a bracket expression, e.g. the `\d` in `[\d-]`.
    fn visit_class_set_item_pre(&mut self, item: &ClassSetItem) -> Result<(), Self::Err> {
        if let ClassSetItem::Perl(cls) = item {
            self.rewrite_perl(cls);
        }
        Ok(())
    }

    /// A bare top-level class, e.g. `\d` outside any bracket expression. Only
    /// one gets rewritten per pass; the outer loop reparses and catches the
    /// rest, since an in-place edit here would need offsets relative to a
    /// traversal order `visit_class_set_item_pre` doesn't share.
    fn visit_post(&mut self, ast: &Ast) -> Result<(), Self::Err> {
        if self.changed {
            return Ok(());
        }
        if let Ast::ClassPerl(perl) = ast {
            self.rewrite_perl(perl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_simple_patterns_untouched() {
        assert_eq!(to_rust_regex("^[a-z]+$"), "^[a-z]+$");
    }

    #[test]
    fn escapes_literal_braces() {
        assert_eq!(to_rust_regex("a{b}"), "a\\{b}");
    }

    #[test]
    fn preserves_repetition_braces() {
        assert_eq!(to_rust_regex("a{1,3}"), "a{1,3}");
    }

    #[test]
    fn compiles_unicode_pattern() {
        assert!(compile("^\\p{L}+$").is_ok());
    }

    #[test]
    fn rewrites_digit_class_to_ascii() {
        assert_eq!(to_rust_regex(r"\d"), "[0-9]");
        assert_eq!(to_rust_regex(r"\D"), "[^0-9]");
    }

    #[test]
    fn rewrites_word_class_to_ascii() {
        assert_eq!(to_rust_regex(r"\w"), "[A-Za-z0-9_]");
        assert_eq!(to_rust_regex(r"\W"), "[^A-Za-z0-9_]");
    }

    #[test]
    fn rewrites_classes_inside_brackets() {
        assert_eq!(to_rust_regex(r"[\d\w]"), "[[0-9][A-Za-z0-9_]]");
    }

    #[test]
    fn rewrites_multiple_top_level_classes() {
        assert_eq!(to_rust_regex(r"\d+\w*"), "[0-9]+[A-Za-z0-9_]*");
    }

    #[test]
    fn ascii_digit_class_rejects_unicode_digits() {
        let regex = compile(r"^\d+$").unwrap();
        assert!(regex.is_match("123").unwrap());
        assert!(!regex.is_match("١٢٣").unwrap());
    }
}
