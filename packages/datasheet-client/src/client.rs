//! Client entry point.

use std::sync::Arc;

use crate::config::{ClientConfig, DatasheetOptions};
use crate::datasheet::Datasheet;
use crate::error::Result;
use crate::transport::{HttpTransport, Transport};

/// Entry point owning configuration and transport.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Creates a client talking HTTP to `config.api_base`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Opens a datasheet by id.
    pub fn datasheet(&self, id: impl Into<String>, options: DatasheetOptions) -> Datasheet {
        Datasheet::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.config),
            id,
            options,
        )
    }
}
