use async_trait::async_trait;

mod maildir;
mod memory;

pub use maildir::MaildirDepositor;
pub use memory::MemoryDepositor;

use crate::message::{Message, MessageError};

#[derive(Debug, thiserror::Error)]
pub enum DepositError {
    #[error("failed to serialize message: {0}")]
    Message(#[from] MessageError),
    #[error("maildir i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("deposit task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("deposit rejected: {0}")]
    Rejected(String),
}

/// Durable storage for outbound messages.
///
/// `deposit` takes ownership of the message; once it returns `Ok` the message
/// has been recorded. Implementations must tolerate concurrent calls.
#[async_trait]
pub trait Depositor: Send + Sync + std::fmt::Debug + 'static {
    async fn deposit(&self, message: Message) -> Result<(), DepositError>;
}
