use std::collections::HashMap;
use std::io;

use bytes::Bytes;
use tempfile::TempPath;

/// The decoded multipart payload of a single POST.
///
/// Holds zero or more text values and zero or more uploaded files per
/// identifier, in arrival order. Dropping a submission removes any uploads
/// that were spooled to disk.
#[derive(Debug, Default)]
pub struct Submission {
    values: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.values.entry(id.into()).or_default().push(value.into());
    }

    pub fn add_file(&mut self, id: impl Into<String>, file: UploadedFile) {
        self.files.entry(id.into()).or_default().push(file);
    }

    /// Text values submitted under `id`, in arrival order.
    pub fn values(&self, id: &str) -> &[String] {
        self.values.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Files uploaded under `id`, in arrival order.
    pub fn files(&self, id: &str) -> &[UploadedFile] {
        self.files.get(id).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug)]
enum UploadBody {
    Memory(Bytes),
    Spooled(TempPath),
}

/// One uploaded file part.
#[derive(Debug)]
pub struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    body: UploadBody,
}

impl UploadedFile {
    /// An upload held entirely in memory.
    pub fn in_memory(
        file_name: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            body: UploadBody::Memory(data.into()),
        }
    }

    /// An upload spooled to a temporary file, removed when this value is dropped.
    pub fn spooled(
        file_name: impl Into<String>,
        content_type: Option<String>,
        path: TempPath,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            body: UploadBody::Spooled(path),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Open the uploaded contents.
    ///
    /// In-memory uploads hand out a shared reference to the same buffer;
    /// spooled uploads are read back from disk, which may fail.
    pub fn open(&self) -> io::Result<Bytes> {
        match &self.body {
            UploadBody::Memory(data) => Ok(data.clone()),
            UploadBody::Spooled(path) => std::fs::read(path).map(Bytes::from),
        }
    }
}
