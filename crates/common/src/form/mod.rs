mod catalog;
mod extract;

pub use catalog::{Catalog, CatalogError};
pub use extract::{extract_forms, forms_from_readers, parse_document, ExtractError};

use serde::Serialize;

/// Declares which text fields and file uploads a submission endpoint accepts.
///
/// A `FormSpec` is derived from a `<form action="/name">` element: `name` is
/// the action path without its leading `/`, `fields` and `files` hold the
/// names of the form's submittable elements in document order. The two lists
/// never share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSpec {
    pub name: String,
    pub fields: Vec<String>,
    pub files: Vec<String>,
}

impl FormSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.add_field(field);
        }
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for file in files {
            self.add_file(file);
        }
        self
    }

    /// Whether `id` is declared as either a field or a file.
    pub fn declares(&self, id: &str) -> bool {
        self.fields.iter().any(|f| f == id) || self.files.iter().any(|f| f == id)
    }

    /// Appends a text field. Returns false if the name was already declared.
    pub fn add_field(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.declares(&id) {
            return false;
        }
        self.fields.push(id);
        true
    }

    /// Appends a file field. Returns false if the name was already declared.
    pub fn add_file(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.declares(&id) {
            return false;
        }
        self.files.push(id);
        true
    }
}
