/**
 * Durable storage for outbound messages.
 *  - The `Depositor` trait
 *  - A maildir writer and an in-memory recorder
 */
pub mod depositor;
/**
 * Form specifications: extraction from HTML
 *  documents and the immutable catalog the
 *  server routes submissions with.
 */
pub mod form;
/**
 * The host identity messages are sent as.
 */
pub mod identity;
/**
 * Outbound message model and its
 *  RFC 5322 serialization.
 */
pub mod message;
pub mod submission;
/**
 * Submission -> message translation.
 */
pub mod translate;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::depositor::{DepositError, Depositor, MaildirDepositor, MemoryDepositor};
    pub use crate::form::{Catalog, CatalogError, ExtractError, FormSpec};
    pub use crate::identity::Identity;
    pub use crate::message::{Address, Attachment, Message, MessageError};
    pub use crate::submission::{Submission, UploadedFile};
    pub use crate::translate::Translator;
    pub use crate::version::build_info;
}
