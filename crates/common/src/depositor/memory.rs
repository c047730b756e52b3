use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{DepositError, Depositor};
use crate::message::Message;

/// Depositor that keeps every message in memory, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryDepositor {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl MemoryDepositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every deposited message, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.messages.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

#[async_trait]
impl Depositor for MemoryDepositor {
    async fn deposit(&self, message: Message) -> Result<(), DepositError> {
        self.messages.lock().push(message);
        Ok(())
    }
}
