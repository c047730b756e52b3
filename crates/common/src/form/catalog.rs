use std::collections::HashMap;

use scraper::Html;

use super::{extract_forms, ExtractError, FormSpec};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("must have at least one form")]
    Empty,
    #[error("form #{0} is missing")]
    MissingForm(usize),
    #[error("form #{0} has an empty name")]
    EmptyName(usize),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Immutable registry of every known form, keyed by name.
///
/// Built once at startup. Lookups take `&self` only, so a catalog can be shared
/// between any number of request handlers without locking.
#[derive(Debug, Clone)]
pub struct Catalog {
    forms: HashMap<String, FormSpec>,
}

impl Catalog {
    /// Build a catalog from a list of specs.
    ///
    /// Accepts either `FormSpec`s or `Option<FormSpec>`s; a `None` entry is
    /// rejected. When two specs share a name the later one replaces the earlier.
    pub fn build<I, S>(specs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Option<FormSpec>>,
    {
        let mut forms = HashMap::new();
        let mut count = 0;

        for (idx, spec) in specs.into_iter().enumerate() {
            count += 1;
            let spec: Option<FormSpec> = spec.into();
            let spec = spec.ok_or(CatalogError::MissingForm(idx))?;
            if spec.name.is_empty() {
                return Err(CatalogError::EmptyName(idx));
            }

            tracing::info!(
                form = %spec.name,
                fields = ?spec.fields,
                files = ?spec.files,
                "added form"
            );
            if let Some(previous) = forms.insert(spec.name.clone(), spec) {
                tracing::debug!(form = %previous.name, "form redefined, replacing earlier definition");
            }
        }

        if count == 0 {
            return Err(CatalogError::Empty);
        }

        Ok(Self { forms })
    }

    /// Extract every form from `documents` and build a catalog from them.
    pub fn from_documents<'a, I>(documents: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = &'a Html>,
    {
        Self::build(extract_forms(documents)?)
    }

    /// Look up a form by its exact name.
    pub fn get(&self, name: &str) -> Option<&FormSpec> {
        self.forms.get(name)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// All forms, sorted by name.
    pub fn forms(&self) -> Vec<&FormSpec> {
        let mut forms: Vec<_> = self.forms.values().collect();
        forms.sort_by(|a, b| a.name.cmp(&b.name));
        forms
    }
}
