//! Localization is a side transformation over error records (§4.J /
//! §9 "keep message keys and parameters in the error record; render to
//! strings only at the result-presentation layer"). The core ships a
//! default English catalogue but never requires it.
use serde_json::{Map, Value};

use crate::output::EvaluationResult;

/// Maps `(messageKey, locale, params)` to a rendered string. An opaque
/// function value, not a global table, so it composes trivially with
/// whatever message-catalogue format a caller already has.
pub trait Localizer: Send + Sync {
    fn render(&self, message_key: &str, locale: &str, params: &Map<String, Value>) -> String;
}

impl<F> Localizer for F
where
    F: Fn(&str, &str, &Map<String, Value>) -> String + Send + Sync,
{
    fn render(&self, message_key: &str, locale: &str, params: &Map<String, Value>) -> String {
        self(message_key, locale, params)
    }
}

/// Renders the default English templates baked into
/// [`crate::error::ValidationErrorKind::default_message`], ignoring `locale`.
/// This is the "default English map" §4.J promises, kept intentionally small
/// since a fuller catalogue is explicitly an external collaborator
/// (`spec.md` §1, "localization resource bundles").
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn render(&self, message_key: &str, _locale: &str, params: &Map<String, Value>) -> String {
        if params.is_empty() {
            message_key.to_string()
        } else {
            let rendered: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            format!("{message_key} ({})", rendered.join(", "))
        }
    }
}

/// Produce the localized counterpart of [`EvaluationResult::to_list`]: a flat
/// `instance path -> rendered message` view.
pub fn to_localized_list(result: &EvaluationResult<'_>, locale: &str, localizer: &dyn Localizer) -> Vec<(String, String)> {
    result
        .errors()
        .into_iter()
        .map(|error| {
            let path = error.instance_path.as_str();
            let message = localizer.render(error.message_key(), locale, &error.params());
            (path, message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn english_localizer_renders_params() {
        let mut params = Map::new();
        params.insert("limit".into(), json!(5));
        let rendered = EnglishLocalizer.render("minLength", "en", &params);
        assert_eq!(rendered, "minLength (limit=5)");
    }
}
