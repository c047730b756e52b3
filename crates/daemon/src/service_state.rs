use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::form::forms_from_readers;
use common::identity::IdentityError;
use common::prelude::*;

use crate::ServiceConfig;

/// Everything a request handler needs, built once at startup and shared
/// read-only between handlers.
#[derive(Clone, Debug)]
pub struct State {
    catalog: Arc<Catalog>,
    translator: Arc<Translator>,
    depositor: Arc<dyn Depositor>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to open document {path:?}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load forms: {0}")]
    Catalog(#[from] CatalogError),
    #[error("invalid hostname: {0}")]
    Identity(#[from] IdentityError),
    #[error("form {form:?} cannot receive mail: {source}")]
    Mailbox {
        form: String,
        #[source]
        source: MessageError,
    },
    #[error("failed to initialize maildir: {0}")]
    Maildir(#[from] DepositError),
}

impl State {
    pub fn new(catalog: Catalog, translator: Translator, depositor: Arc<dyn Depositor>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            translator: Arc::new(translator),
            depositor,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let identity = match &config.hostname {
            Some(hostname) => Identity::new(hostname.as_str())?,
            None => Identity::from_system(),
        };
        tracing::info!(domain = %identity.domain(), "sending as {}", identity.sender());

        let catalog = load_catalog(&config.documents)?;
        check_mailboxes(&catalog, &identity)?;
        let depositor = MaildirDepositor::create(&config.maildir, identity.domain())?;

        Ok(Self::new(
            catalog,
            Translator::new(identity),
            Arc::new(depositor),
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn depositor(&self) -> &dyn Depositor {
        self.depositor.as_ref()
    }
}

/// Open every document and build the catalog of the forms they declare.
pub fn load_catalog(documents: &[PathBuf]) -> Result<Catalog, StateSetupError> {
    let readers = documents
        .iter()
        .map(|path| open_document(path))
        .collect::<Result<Vec<_>, _>>()?;

    let forms = forms_from_readers(readers).map_err(CatalogError::from)?;
    Ok(Catalog::build(forms)?)
}

/// Every form is delivered to `<name>@<domain>`, so each name must be a valid
/// local part.
fn check_mailboxes(catalog: &Catalog, identity: &Identity) -> Result<(), StateSetupError> {
    for spec in catalog.forms() {
        identity
            .mailbox(&spec.name)
            .validate()
            .map_err(|source| StateSetupError::Mailbox {
                form: spec.name.clone(),
                source,
            })?;
    }
    Ok(())
}

fn open_document(path: &Path) -> Result<File, StateSetupError> {
    tracing::debug!(path = ?path, "reading document");
    File::open(path).map_err(|source| StateSetupError::Document {
        path: path.to_path_buf(),
        source,
    })
}
