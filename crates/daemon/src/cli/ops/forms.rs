use std::fmt::Write;
use std::path::PathBuf;

use clap::Args;

use formsink_daemon::service_state::load_catalog;
use formsink_daemon::StateSetupError;

/// Print the forms the given documents declare, without serving them.
#[derive(Args, Debug, Clone)]
pub struct Forms {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,

    /// HTML documents to read (defaults to the settings file's documents)
    pub documents: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum FormsError {
    #[error(transparent)]
    Catalog(#[from] StateSetupError),

    #[error("failed to encode catalog: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Forms {
    type Error = FormsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let documents = if self.documents.is_empty() {
            &ctx.settings.documents
        } else {
            &self.documents
        };
        let catalog = load_catalog(documents)?;

        if self.json {
            return Ok(serde_json::to_string_pretty(&catalog.forms())?);
        }

        let mut output = String::new();
        for spec in catalog.forms() {
            let _ = write!(
                output,
                "{}\n  fields: {}\n  files: {}\n",
                spec.name,
                spec.fields.join(", "),
                spec.files.join(", ")
            );
        }
        Ok(output.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::cli::op::{Op, OpContext};

    fn contact(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("contact.html");
        fs::write(
            &path,
            r#"<form action="/contact" method="post" enctype="multipart/form-data">
                 <input name="name"><input name="email">
                 <input type="file" name="picture">
               </form>"#,
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_lists_forms() {
        let dir = TempDir::new().unwrap();
        let forms = Forms {
            json: false,
            documents: vec![contact(&dir)],
        };

        let output = forms.execute(&OpContext::default()).await.unwrap();
        assert_eq!(output, "contact\n  fields: name, email\n  files: picture");
    }

    #[tokio::test]
    async fn test_lists_forms_as_json() {
        let dir = TempDir::new().unwrap();
        let forms = Forms {
            json: true,
            documents: vec![contact(&dir)],
        };

        let output = forms.execute(&OpContext::default()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["name"], "contact");
        assert_eq!(value[0]["files"][0], "picture");
    }

    #[tokio::test]
    async fn test_without_documents_fails() {
        let forms = Forms {
            json: false,
            documents: Vec::new(),
        };

        assert!(forms.execute(&OpContext::default()).await.is_err());
    }
}
