//! Client configuration.

use datasheet_types::{FieldKey, FieldKeyMap};

/// Environment variable overriding [`ClientConfig::api_base`].
pub const ENV_API_BASE: &str = "DATASHEET_API_BASE";
/// Environment variable supplying [`ClientConfig::token`].
pub const ENV_API_TOKEN: &str = "DATASHEET_API_TOKEN";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API host, without the `/fusion/v1` prefix
    pub api_base: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Page size used by full-collection fetches when the caller sets none
    pub default_page_size: u64,
    /// Largest page the server serves in one request
    pub max_page_size: u64,
    /// Largest number of records one create request may carry
    pub max_write_records: usize,
    /// Raise on a failed page mid-sequence instead of returning the rows
    /// gathered so far
    pub strict_pagination: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.vika.cn".to_string(),
            token: None,
            request_timeout_ms: 30000, // 30 seconds default
            default_page_size: 100,
            max_page_size: 1000,
            max_write_records: 10,
            strict_pagination: false,
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from defaults overlaid with
    /// `DATASHEET_API_BASE` / `DATASHEET_API_TOKEN`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(api_base) = std::env::var(ENV_API_BASE) {
            config.api_base = api_base;
        }
        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            config.token = Some(token);
        }
        config
    }
}

/// Per-datasheet options.
#[derive(Debug, Clone, Default)]
pub struct DatasheetOptions {
    /// Field addressing mode used for every request on this datasheet
    pub field_key: FieldKey,
    /// Optional alias → canonical key mapping
    pub field_key_map: Option<FieldKeyMap>,
}

impl DatasheetOptions {
    pub fn new(field_key: FieldKey) -> Self {
        Self {
            field_key,
            field_key_map: None,
        }
    }

    pub fn with_field_key_map(mut self, field_key_map: FieldKeyMap) -> Self {
        self.field_key_map = Some(field_key_map);
        self
    }
}
