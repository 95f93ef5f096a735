use serde::{Deserialize, Serialize};

/// Configuration for the contacts module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactsConfig {
    /// Upload directory, resolved under the server home dir when relative.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_upload_kb")]
    pub max_upload_kb: usize,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    #[serde(default = "default_ingest_enabled")]
    pub ingest_enabled: bool,
    #[serde(default = "default_ingest_poll_secs")]
    pub ingest_poll_secs: u64,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_kb: default_max_upload_kb(),
            page_size: default_page_size(),
            ingest_enabled: default_ingest_enabled(),
            ingest_poll_secs: default_ingest_poll_secs(),
        }
    }
}

fn default_upload_dir() -> String {
    "contacts".to_string()
}

fn default_max_upload_kb() -> usize {
    2048
}

fn default_page_size() -> u64 {
    10
}

fn default_ingest_enabled() -> bool {
    true
}

fn default_ingest_poll_secs() -> u64 {
    2
}
