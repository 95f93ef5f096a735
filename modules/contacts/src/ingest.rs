//! Background ingestion of uploaded contact files.
//!
//! Polls the upload directory, parses each JSON file as an array of
//! contacts, inserts the ones that pass validation and aren't already
//! present, and removes the file afterwards.

use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::error::DomainError;
use crate::domain::service::Service;
use crate::infra::files::UploadStore;

/// Shape of one element in an uploaded contacts file.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

pub struct IngestWorker {
    service: Arc<Service>,
    store: UploadStore,
    poll_interval: Duration,
}

impl IngestWorker {
    pub fn new(service: Arc<Service>, store: UploadStore, poll_interval: Duration) -> Self {
        Self {
            service,
            store,
            poll_interval,
        }
    }

    /// Run until the token is cancelled.
    pub async fn run(self, cancel: CancellationToken) {
        if let Err(e) = self.store.ensure_dir() {
            warn!("Could not create upload dir: {e:#}");
        }
        info!(
            "Ingest worker watching {} every {:?}",
            self.store.dir().display(),
            self.poll_interval
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Ingest worker stopping");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        warn!("Ingest sweep failed: {e:#}");
                    }
                }
            }
        }
    }

    /// One pass over the upload directory.
    pub async fn sweep(&self) -> anyhow::Result<()> {
        for path in self.store.json_files()? {
            self.process_file(&path).await;
            // The file is consumed either way; a bad file would otherwise be
            // retried on every tick.
            if let Err(e) = self.store.remove(&path) {
                warn!("Could not remove {}: {e:#}", path.display());
            }
        }
        Ok(())
    }

    async fn process_file(&self, path: &Path) {
        info!("Processing contact file {}", path.display());

        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not read {}: {e}", path.display());
                return;
            }
        };

        let contacts: Vec<IncomingContact> = match serde_json::from_slice(&raw) {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!("Could not parse {} as a contact list: {e}", path.display());
                return;
            }
        };

        let mut inserted = 0usize;
        for incoming in contacts {
            match self.ingest_one(incoming).await {
                Ok(true) => inserted += 1,
                Ok(false) => {}
                Err(e) => warn!("Skipping contact: {e}"),
            }
        }
        info!("Ingested {} contacts from {}", inserted, path.display());
    }

    /// Returns Ok(true) on insert, Ok(false) on a duplicate email.
    async fn ingest_one(&self, incoming: IncomingContact) -> Result<bool, DomainError> {
        let new = crate::contract::model::NewContact {
            name: incoming.name,
            email: incoming.email,
            phone: normalize_phone(&incoming.phone),
        };

        match self.service.create_contact(new).await {
            Ok(_) => Ok(true),
            Err(DomainError::EmailAlreadyExists { email }) => {
                debug!("Email {} is already in the store", email);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

/// Normalize North-American phone formats to `(XXX) XXX-XXXX`; anything
/// else passes through unchanged.
pub fn normalize_phone(phone: &str) -> String {
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    let (with_country, plain) = PATTERNS.get_or_init(|| {
        (
            Regex::new(r"^\+1-(\d{3})-(\d{3})-(\d{4})$").unwrap(),
            Regex::new(r"^(\d{3})-(\d{3})-(\d{4})$").unwrap(),
        )
    });

    let caps = with_country.captures(phone).or_else(|| plain.captures(phone));
    match caps {
        Some(c) => format!("({}) {}-{}", &c[1], &c[2], &c[3]),
        None => phone.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_formats() {
        assert_eq!(normalize_phone("+1-555-010-1234"), "(555) 010-1234");
        assert_eq!(normalize_phone("555-010-1234"), "(555) 010-1234");
    }

    #[test]
    fn passes_through_everything_else() {
        for raw in ["(555) 010-1234", "+44 20 7946 0958", "5550101234", ""] {
            assert_eq!(normalize_phone(raw), raw);
        }
    }
}
