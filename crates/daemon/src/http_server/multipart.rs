use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use bytes::BytesMut;
use tempfile::{NamedTempFile, TempPath};
use tokio::io::AsyncWriteExt;

use common::prelude::{FormSpec, Submission, UploadedFile};

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("value for {0:?} is not valid UTF-8")]
    InvalidText(String),
    #[error("failed to spool upload to disk: {0}")]
    Spool(#[from] std::io::Error),
    #[error("spool task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Read the parts of `multipart` that `spec` declares into a [`Submission`].
///
/// Parts with a file name are uploads, everything else is a text value.
/// Uploads are kept in memory while they fit in `max_memory` (shared by the
/// whole request); the rest are spooled to temporary files.
pub async fn read_submission(
    mut multipart: Multipart,
    spec: &FormSpec,
    max_memory: usize,
) -> Result<Submission, SubmissionError> {
    let mut submission = Submission::new();
    let mut budget = max_memory;

    while let Some(mut field) = multipart.next_field().await? {
        let Some(id) = field.name().map(str::to_string) else {
            tracing::debug!(form = %spec.name, "skipping unnamed part");
            continue;
        };
        if !spec.declares(&id) {
            tracing::debug!(form = %spec.name, id = %id, "skipping undeclared part");
            continue;
        }

        // Browsers send empty file inputs as a part with `filename=""`
        let file_name = field
            .file_name()
            .map(base_name)
            .filter(|name| !name.is_empty());

        match file_name {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let upload =
                    read_upload(&mut field, file_name, content_type, &mut budget).await?;
                submission.add_file(id, upload);
            }
            None => {
                let bytes = field.bytes().await?;
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|_| SubmissionError::InvalidText(id.clone()))?;
                budget = budget.saturating_sub(text.len());
                submission.add_value(id, text);
            }
        }
    }

    Ok(submission)
}

async fn read_upload(
    field: &mut Field<'_>,
    file_name: String,
    content_type: Option<String>,
    budget: &mut usize,
) -> Result<UploadedFile, SubmissionError> {
    let mut buffer = BytesMut::new();
    let mut spool: Option<(tokio::fs::File, TempPath)> = None;

    while let Some(chunk) = field.chunk().await? {
        if let Some((file, _)) = spool.as_mut() {
            file.write_all(&chunk).await?;
            continue;
        }

        if buffer.len() + chunk.len() > *budget {
            tracing::debug!(file = %file_name, "upload exceeds memory budget, spooling to disk");
            let (file, path) = tokio::task::spawn_blocking(NamedTempFile::new)
                .await??
                .into_parts();
            let mut file = tokio::fs::File::from_std(file);
            file.write_all(&buffer).await?;
            file.write_all(&chunk).await?;
            buffer.clear();
            spool = Some((file, path));
        } else {
            buffer.extend_from_slice(&chunk);
        }
    }

    match spool {
        Some((mut file, path)) => {
            file.flush().await?;
            Ok(UploadedFile::spooled(file_name, content_type, path))
        }
        None => {
            *budget -= buffer.len();
            Ok(UploadedFile::in_memory(
                file_name,
                content_type,
                buffer.freeze(),
            ))
        }
    }
}

/// Strip any directory components a client sent along with a file name.
fn base_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    use super::*;

    const BOUNDARY: &str = "formsinkboundary";

    struct Part {
        name: &'static str,
        file_name: Option<&'static str>,
        data: Vec<u8>,
    }

    fn value(name: &'static str, data: &[u8]) -> Part {
        Part {
            name,
            file_name: None,
            data: data.to_vec(),
        }
    }

    fn file(name: &'static str, file_name: &'static str, data: &[u8]) -> Part {
        Part {
            name,
            file_name: Some(file_name),
            data: data.to_vec(),
        }
    }

    async fn multipart(parts: Vec<Part>) -> Multipart {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            let disposition = match part.file_name {
                Some(file_name) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, file_name
                ),
                None => format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                ),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    fn spec() -> FormSpec {
        FormSpec::new("upload")
            .with_fields(["note"])
            .with_files(["small", "large"])
    }

    #[tokio::test]
    async fn test_reads_declared_parts_only() {
        let multipart = multipart(vec![
            value("note", b"hello"),
            value("note", b"again"),
            value("other", b"ignored"),
            file("small", "a.txt", b"tiny"),
        ])
        .await;

        let submission = read_submission(multipart, &spec(), 1024).await.unwrap();
        assert_eq!(submission.values("note"), ["hello", "again"]);
        assert!(submission.values("other").is_empty());

        let files = submission.files("small");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), "a.txt");
        assert_eq!(files[0].content_type(), Some("application/octet-stream"));
        assert_eq!(&files[0].open().unwrap()[..], b"tiny");
    }

    #[tokio::test]
    async fn test_large_uploads_are_spooled() {
        let large = vec![7u8; 4096];
        let multipart = multipart(vec![
            file("small", "small.bin", b"0123456789"),
            file("large", "large.bin", &large),
        ])
        .await;

        let submission = read_submission(multipart, &spec(), 1024).await.unwrap();
        assert_eq!(&submission.files("small")[0].open().unwrap()[..], b"0123456789");
        assert_eq!(submission.files("large")[0].open().unwrap().to_vec(), large);
    }

    #[tokio::test]
    async fn test_empty_file_input_is_a_value() {
        let multipart = multipart(vec![file("small", "", b"")]).await;

        let submission = read_submission(multipart, &spec(), 1024).await.unwrap();
        assert!(submission.files("small").is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_value_is_an_error() {
        let multipart = multipart(vec![value("note", &[0xff, 0xfe])]).await;

        let result = read_submission(multipart, &spec(), 1024).await;
        assert!(matches!(result, Err(SubmissionError::InvalidText(id)) if id == "note"));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("tiny.ppm"), "tiny.ppm");
        assert_eq!(base_name("/home/user/tiny.ppm"), "tiny.ppm");
        assert_eq!(base_name("C:\\Users\\user\\tiny.ppm"), "tiny.ppm");
        assert_eq!(base_name("dir/"), "");
    }
}
