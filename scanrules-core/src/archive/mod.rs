//! Rule descriptor extraction from the packaged tool archive
//!
//! The tool ships as a ZIP archive with many unrelated entries. The
//! download is consumed as a stream and scanned entry by entry; only the
//! rule-info entry is read into memory, and scanning stops as soon as it
//! has been parsed.

mod entries;

use futures::TryStreamExt;
use reqwest::header::{ACCEPT_ENCODING, CONTENT_DISPOSITION};
use std::io::{BufReader, Read};
use tokio_util::io::{StreamReader, SyncIoBridge};

use crate::error::ArchiveError;
use crate::rules::RawRuleRecord;
use entries::LocalEntries;

const CONTENT_DISPOSITION_VALUE: &str = "attachment; filename=scan-tool.bala";

/// Downloads the tool archive and pulls the rule descriptors out of it
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    client: reqwest::Client,
    entry_path: String,
}

impl ArchiveExtractor {
    pub fn new(client: reqwest::Client, entry_path: impl Into<String>) -> Self {
        Self {
            client,
            entry_path: entry_path.into(),
        }
    }

    /// Download `archive_url` and return the rule records it ships
    pub async fn extract_rule_info(
        &self,
        archive_url: &str,
    ) -> Result<Vec<RawRuleRecord>, ArchiveError> {
        tracing::debug!("Downloading scan tool archive from {}", archive_url);

        let response = self
            .client
            .get(archive_url)
            .header(ACCEPT_ENCODING, "identity")
            .header(CONTENT_DISPOSITION, CONTENT_DISPOSITION_VALUE)
            .send()
            .await
            .map_err(|source| ArchiveError::Download {
                url: archive_url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ArchiveError::Status {
                url: archive_url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let stream = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
        let reader = StreamReader::new(stream);
        let entry_path = self.entry_path.clone();

        // The ZIP reader is blocking; bridge the body into a worker thread.
        // Dropping the bridge on return closes the connection.
        tokio::task::spawn_blocking(move || {
            let mut reader = SyncIoBridge::new(reader);
            scan_rule_info(&mut reader, &entry_path)
        })
        .await
        .map_err(|source| ArchiveError::Worker { source })?
    }
}

/// Scan a ZIP stream for `entry_path` and parse it as a rule descriptor array
///
/// Directories and other entries are skipped, including entries whose sizes
/// trail their data. Returns as soon as the entry has been parsed; the rest
/// of the stream is left unread.
pub fn scan_rule_info<R: Read>(
    reader: &mut R,
    entry_path: &str,
) -> Result<Vec<RawRuleRecord>, ArchiveError> {
    let mut entries = LocalEntries::new(BufReader::new(reader));

    while let Some(header) = entries.next_header()? {
        if header.is_dir() || header.name != entry_path {
            entries.skip(&header)?;
            continue;
        }

        let content = entries.read(&header)?;
        let records: Vec<RawRuleRecord> =
            serde_json::from_slice(&content).map_err(|source| ArchiveError::Malformed {
                entry: entry_path.to_string(),
                source,
            })?;

        tracing::debug!("Found {} rules in {}", records.len(), entry_path);
        return Ok(records);
    }

    Err(ArchiveError::EntryNotFound {
        entry: entry_path.to_string(),
    })
}
