use crate::form::FormSpec;
use crate::identity::Identity;
use crate::message::{Attachment, Message};
use crate::submission::Submission;

/// Turns submissions into messages on behalf of one host identity.
///
/// Holds no mutable state, so one translator serves every request.
#[derive(Debug, Clone)]
pub struct Translator {
    identity: Identity,
}

impl Translator {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Build the message for one submission of `spec`.
    ///
    /// Problems with individual fields never fail the translation: a missing
    /// value renders as empty, only the first of several values or uploads is
    /// used, and uploads that are absent or cannot be opened are left out.
    /// Each of these is logged as a warning.
    pub fn translate(&self, spec: &FormSpec, submission: &Submission) -> Message {
        Message {
            from: self.identity.sender(),
            to: vec![self.identity.mailbox(&spec.name)],
            subject: format!("{} request", spec.name),
            body: render_body(spec, submission),
            attachments: collect_attachments(spec, submission),
        }
    }
}

fn render_body(spec: &FormSpec, submission: &Submission) -> String {
    let mut body = String::new();

    for id in &spec.fields {
        let values = submission.values(id);
        let value = match values {
            [] => {
                tracing::warn!(form = %spec.name, id = %id, "no value for id");
                ""
            }
            [first] => first.as_str(),
            [first, rest @ ..] => {
                tracing::warn!(
                    form = %spec.name,
                    id = %id,
                    discarded = rest.len(),
                    "multiple values for a single field, ignoring all but the first"
                );
                first.as_str()
            }
        };

        body.push_str(id);
        body.push_str(": ");
        body.push_str(value);
        body.push('\n');
    }

    body
}

fn collect_attachments(spec: &FormSpec, submission: &Submission) -> Vec<Attachment> {
    let mut attachments = Vec::new();

    for id in &spec.files {
        let upload = match submission.files(id) {
            [] => {
                tracing::warn!(form = %spec.name, id = %id, "no file for id");
                continue;
            }
            [first] => first,
            [first, rest @ ..] => {
                tracing::warn!(
                    form = %spec.name,
                    id = %id,
                    discarded = rest.len(),
                    "multiple files for a single field, ignoring all but the first"
                );
                first
            }
        };

        let data = match upload.open() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(form = %spec.name, id = %id, error = %e, "error opening file");
                continue;
            }
        };

        attachments.push(Attachment {
            // e.g. "picture" + "tiny.ppm" => "picture_tiny.ppm"
            name: format!("{}_{}", id, upload.file_name()),
            content_type: upload.content_type().map(str::to_string),
            data,
        });
    }

    attachments
}
