use std::io::Read;

use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::FormSpec;

const FORM_SELECTOR: &str = "form";

// Form-submittable content category:
//  https://developer.mozilla.org/en-US/docs/Web/Guide/HTML/Content_categories#Form_submittable
const SUBMITTABLE_SELECTOR: &str = "button, input, keygen, object, select, textarea";

// Relative actions like "/contact" are resolved against this to read their path.
const PLACEHOLDER_ORIGIN: &str = "http://formsink.invalid/";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("form #{form} in document #{document} has no 'action' attribute")]
    MissingAction { document: usize, form: usize },
    #[error("could not parse 'action' URL {action:?}: {reason}")]
    UnparsableAction { action: String, reason: String },
    #[error("'action' URL {action:?} is not in the form '/foo'")]
    InvalidActionPath { action: String },
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse an HTML document from a byte stream. Invalid UTF-8 is replaced.
pub fn parse_document<R: Read>(mut reader: R) -> Result<Html, ExtractError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(Html::parse_document(&String::from_utf8_lossy(&buf)))
}

/// Parse each reader as an HTML document and extract every form in them.
pub fn forms_from_readers<I, R>(readers: I) -> Result<Vec<FormSpec>, ExtractError>
where
    I: IntoIterator<Item = R>,
    R: Read,
{
    let documents = readers
        .into_iter()
        .map(parse_document)
        .collect::<Result<Vec<_>, _>>()?;
    extract_forms(&documents)
}

/// Extract a [`FormSpec`] for every `<form>` in `documents`, in order.
///
/// The first malformed form aborts the whole extraction.
pub fn extract_forms<'a, I>(documents: I) -> Result<Vec<FormSpec>, ExtractError>
where
    I: IntoIterator<Item = &'a Html>,
{
    let form_selector = Selector::parse(FORM_SELECTOR).expect("hardcoded selector must parse");
    let submittable_selector =
        Selector::parse(SUBMITTABLE_SELECTOR).expect("hardcoded selector must parse");

    let mut forms = Vec::new();
    for (document_idx, document) in documents.into_iter().enumerate() {
        for (form_idx, form) in document.select(&form_selector).enumerate() {
            let action = form
                .value()
                .attr("action")
                .ok_or(ExtractError::MissingAction {
                    document: document_idx,
                    form: form_idx,
                })?;

            let mut spec = FormSpec::new(form_name(action)?);
            for element in form.select(&submittable_selector) {
                let Some(name) = element.value().attr("name") else {
                    continue;
                };

                let added = if is_file_input(&element) {
                    spec.add_file(name)
                } else {
                    spec.add_field(name)
                };
                if !added {
                    tracing::debug!(form = %spec.name, id = %name, "name already declared, keeping first");
                }
            }

            tracing::debug!(
                form = %spec.name,
                fields = ?spec.fields,
                files = ?spec.files,
                "extracted form"
            );
            forms.push(spec);
        }
    }

    Ok(forms)
}

/// Derive a form name from an `action` attribute, e.g. `https://example.com/contact` => `contact`.
fn form_name(action: &str) -> Result<String, ExtractError> {
    if action.chars().any(char::is_control) {
        return Err(ExtractError::UnparsableAction {
            action: action.to_string(),
            reason: "contains control characters".to_string(),
        });
    }

    let url = match Url::parse(action) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) if action.starts_with('/') => {
            let origin = Url::parse(PLACEHOLDER_ORIGIN).expect("hardcoded URL must parse");
            origin
                .join(action)
                .map_err(|e| ExtractError::UnparsableAction {
                    action: action.to_string(),
                    reason: e.to_string(),
                })?
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(ExtractError::InvalidActionPath {
                action: action.to_string(),
            })
        }
        Err(e) => {
            return Err(ExtractError::UnparsableAction {
                action: action.to_string(),
                reason: e.to_string(),
            })
        }
    };

    // Requests are matched on the decoded path, so names are stored decoded too
    let path = percent_decode_str(url.path())
        .decode_utf8()
        .map_err(|e| ExtractError::UnparsableAction {
            action: action.to_string(),
            reason: e.to_string(),
        })?;
    if path.chars().any(char::is_control) {
        return Err(ExtractError::UnparsableAction {
            action: action.to_string(),
            reason: "path decodes to control characters".to_string(),
        });
    }

    let name = path
        .strip_prefix('/')
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .ok_or_else(|| ExtractError::InvalidActionPath {
            action: action.to_string(),
        })?;

    Ok(name.to_string())
}

fn is_file_input(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    value.name() == "input"
        && value
            .attr("type")
            .is_some_and(|ty| ty.eq_ignore_ascii_case("file"))
}
