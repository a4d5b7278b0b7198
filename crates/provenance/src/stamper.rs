//! Session provenance stamping
//!
//! The public IP is resolved at most once per session on a background thread
//! and written into a single write-once cell. Every signature placement reads
//! that cell; nothing ever re-resolves or rewrites it.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

use crate::lookup::{resolve_public_ip, IpLookup, LookupError};

/// Recorded when the address is not (yet) known
pub const UNKNOWN_IP: &str = "unknown";

/// Provenance attached to a signature at placement time
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceMetadata {
    pub ip_address: String,
    pub timestamp: DateTime<Utc>,
}

impl ProvenanceMetadata {
    /// Timestamp as RFC 3339 with an explicit UTC offset
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Shared, cheaply clonable handle to the session's resolved address
#[derive(Debug, Clone, Default)]
pub struct MetadataStamper {
    resolved: Arc<OnceLock<String>>,
    started: Arc<AtomicBool>,
}

impl MetadataStamper {
    /// Stamper with no resolution started; stamps `"unknown"` until one completes
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the one-shot background resolution
    ///
    /// Returns `None` if resolution was already started for this session.
    pub fn spawn_resolution<L>(&self, lookup: L) -> Option<ResolutionHandle>
    where
        L: IpLookup + 'static,
    {
        if self.started.swap(true, Ordering::AcqRel) {
            tracing::debug!("IP resolution already started; ignoring request");
            return None;
        }

        let cell = Arc::clone(&self.resolved);
        let worker_cell = Arc::clone(&self.resolved);
        let spawned = std::thread::Builder::new()
            .name("ip-lookup".to_string())
            .spawn(move || {
                let ip = resolve_and_log(&lookup);
                let _ = worker_cell.set(ip);
            });

        match spawned {
            Ok(thread) => Some(ResolutionHandle {
                thread: Some(thread),
                cell,
            }),
            Err(err) => {
                tracing::warn!(%err, "could not start IP lookup thread");
                let _ = self.resolved.set(UNKNOWN_IP.to_string());
                Some(ResolutionHandle { thread: None, cell })
            }
        }
    }

    /// Resolve on the calling thread; a no-op if resolution already started
    pub fn resolve_blocking(&self, lookup: &dyn IpLookup) -> String {
        if !self.started.swap(true, Ordering::AcqRel) {
            let _ = self.resolved.set(resolve_and_log(lookup));
        }
        self.ip_address()
    }

    /// Whether a resolution outcome (address or sentinel) has been cached
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Cached address, or `"unknown"` while unresolved
    pub fn ip_address(&self) -> String {
        self.resolved
            .get()
            .cloned()
            .unwrap_or_else(|| UNKNOWN_IP.to_string())
    }

    /// Provenance for a placement happening now
    pub fn stamp(&self) -> ProvenanceMetadata {
        self.stamp_at(Utc::now())
    }

    pub fn stamp_at(&self, timestamp: DateTime<Utc>) -> ProvenanceMetadata {
        ProvenanceMetadata {
            ip_address: self.ip_address(),
            timestamp,
        }
    }
}

fn resolve_and_log(lookup: &dyn IpLookup) -> String {
    match resolve_public_ip(lookup) {
        Some(ip) => {
            tracing::info!(ip = %ip, "resolved public IP");
            ip
        }
        None => {
            tracing::info!("public IP unavailable; recording '{}'", UNKNOWN_IP);
            UNKNOWN_IP.to_string()
        }
    }
}

/// Handle to the background resolution
pub struct ResolutionHandle {
    thread: Option<JoinHandle<()>>,
    cell: Arc<OnceLock<String>>,
}

impl ResolutionHandle {
    pub fn is_complete(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Block until resolution finishes and return the cached value
    pub fn wait(mut self) -> Result<String, LookupError> {
        if let Some(thread) = self.thread.take() {
            thread.join().map_err(|_| LookupError::WorkerPanicked)?;
        }
        Ok(self
            .cell
            .get()
            .cloned()
            .unwrap_or_else(|| UNKNOWN_IP.to_string()))
    }
}
