use crate::message::Address;

/// Display name and local part of the sink's own mailbox.
pub const SERVICE_NAME: &str = "FormSink";

/// Used when the system host name cannot be determined.
pub const FALLBACK_DOMAIN: &str = "example.com";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("domain must not be empty")]
    EmptyDomain,
    #[error("domain {0:?} contains whitespace or '@'")]
    InvalidDomain(String),
}

/// Host identity the sink sends mail as, computed once at startup.
///
/// Every message is sent from `FormSink@<domain>` to `<form name>@<domain>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    domain: String,
}

impl Identity {
    pub fn new(domain: impl Into<String>) -> Result<Self, IdentityError> {
        let domain = domain.into();
        if domain.is_empty() {
            return Err(IdentityError::EmptyDomain);
        }
        if domain.contains(|c: char| c.is_whitespace() || c == '@') {
            return Err(IdentityError::InvalidDomain(domain));
        }
        Ok(Self { domain })
    }

    /// Identity for the machine's host name, falling back to `example.com`.
    pub fn from_system() -> Self {
        let hostname = nix::unistd::gethostname()
            .map_err(|e| e.to_string())
            .and_then(|name| {
                name.into_string()
                    .map_err(|_| "host name is not UTF-8".to_string())
            });

        match hostname.map(Self::new) {
            Ok(Ok(identity)) => identity,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "unusable host name, using {}", FALLBACK_DOMAIN);
                Self::fallback()
            }
            Err(e) => {
                tracing::warn!(error = %e, "couldn't read host name, using {}", FALLBACK_DOMAIN);
                Self::fallback()
            }
        }
    }

    fn fallback() -> Self {
        Self {
            domain: FALLBACK_DOMAIN.to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// `FormSink <FormSink@domain>`
    pub fn sender(&self) -> Address {
        Address::new(SERVICE_NAME, &self.domain).with_name(SERVICE_NAME)
    }

    /// The mailbox a form's submissions are delivered to, e.g. `contact@domain`.
    pub fn mailbox(&self, local: &str) -> Address {
        Address::new(local, &self.domain)
    }
}
