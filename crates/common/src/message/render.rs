use lettre::message::header::ContentType;
use lettre::message::{Attachment as AttachmentPart, Mailbox, MultiPart, SinglePart};

use super::{Address, Message};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("invalid content type {content_type:?} for attachment {attachment:?}: {reason}")]
    ContentType {
        attachment: String,
        content_type: String,
        reason: String,
    },
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
}

impl Address {
    /// Check that this address can be written into a message header.
    pub fn validate(&self) -> Result<(), MessageError> {
        self.to_mailbox().map(|_| ())
    }

    fn to_mailbox(&self) -> Result<Mailbox, MessageError> {
        let email = lettre::Address::new(&self.local, &self.domain).map_err(|source| {
            MessageError::Address {
                address: self.email(),
                source,
            }
        })?;
        Ok(Mailbox::new(self.name.clone(), email))
    }
}

impl Message {
    /// Serialize to RFC 5322 bytes: the text body first, then one part per attachment.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MessageError> {
        let mut builder = lettre::Message::builder()
            .from(self.from.to_mailbox()?)
            .subject(self.subject.clone());
        for to in &self.to {
            builder = builder.to(to.to_mailbox()?);
        }

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(self.body.clone()));
        for attachment in &self.attachments {
            let content_type = attachment
                .content_type
                .clone()
                .unwrap_or_else(|| {
                    mime_guess::from_path(&attachment.name)
                        .first()
                        .map(|mime| mime.to_string())
                        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
                });
            let parsed = ContentType::parse(&content_type).map_err(|e| MessageError::ContentType {
                attachment: attachment.name.clone(),
                content_type: content_type.clone(),
                reason: e.to_string(),
            })?;

            parts = parts.singlepart(
                AttachmentPart::new(attachment.name.clone()).body(attachment.data.to_vec(), parsed),
            );
        }

        Ok(builder.multipart(parts)?.formatted())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::message::Attachment;

    fn message() -> Message {
        Message {
            from: Address::new("FormSink", "example.org").with_name("FormSink"),
            to: vec![Address::new("contact", "example.org")],
            subject: "contact request".to_string(),
            body: "name: crasm\n".to_string(),
            attachments: vec![],
        }
    }

    fn render(message: &Message) -> String {
        String::from_utf8(message.to_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_validate_address() {
        assert!(Address::new("contact", "example.org").validate().is_ok());
        assert!(matches!(
            Address::new("contact(us)", "example.org").validate(),
            Err(MessageError::Address { address, .. }) if address == "contact(us)@example.org"
        ));
        assert!(Address::new("contact us", "example.org").validate().is_err());
    }

    #[test]
    fn test_headers_and_body() {
        let rendered = render(&message());

        assert!(rendered.contains("From: FormSink <FormSink@example.org>"));
        assert!(rendered.contains("To: contact@example.org"));
        assert!(rendered.contains("Subject: contact request"));
        assert!(rendered.contains("multipart/mixed"));
        assert!(rendered.contains("name: crasm"));
    }

    #[test]
    fn test_attachment_content_types() {
        let mut message = message();
        message.attachments = vec![
            Attachment {
                name: "report_data.csv".to_string(),
                content_type: Some("text/csv".to_string()),
                data: Bytes::from_static(b"a,b\n1,2\n"),
            },
            Attachment {
                name: "blob_unknown".to_string(),
                content_type: None,
                data: Bytes::from_static(b"\x00\x01"),
            },
        ];

        let rendered = render(&message);
        assert!(rendered.contains("report_data.csv"));
        assert!(rendered.contains("text/csv"));
        assert!(rendered.contains("blob_unknown"));
        assert!(rendered.contains(FALLBACK_CONTENT_TYPE));
    }

    #[test]
    fn test_invalid_address_is_an_error() {
        let mut message = message();
        message.to = vec![Address::new("not a mailbox", "example.org")];

        assert!(matches!(
            message.to_bytes(),
            Err(MessageError::Address { .. })
        ));
    }

    #[test]
    fn test_invalid_content_type_is_an_error() {
        let mut message = message();
        message.attachments = vec![Attachment {
            name: "x".to_string(),
            content_type: Some("not a content type".to_string()),
            data: Bytes::new(),
        }];

        assert!(matches!(
            message.to_bytes(),
            Err(MessageError::ContentType { .. })
        ));
    }
}
