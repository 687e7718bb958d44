use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tracks one in-progress multipart (streamed/chunked) upload, grounded on
/// the `MultipartUpload`/`UploadPart` shapes in
/// `examples/other_examples/6bce32f7_functionland-fula-api__crates-fula-cli-src-multipart.rs.rs`,
/// generalized from a CLI-local map to the job-cache-backed session spec.md
/// §3 describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSession {
    pub upload_id: String,
    pub user_id: i64,
    pub folder_id: i64,
    pub name: String,
    pub object_key: String,
    pub mime_type: String,
    /// Part number -> ETag, as returned by each `multipart_put_part`.
    pub parts: BTreeMap<u32, String>,
    pub bytes_received: i64,
    pub created_at: DateTime<Utc>,
}

impl UploadSession {
    pub fn next_part_number(&self) -> u32 {
        self.parts.keys().next_back().copied().unwrap_or(0) + 1
    }

    /// Parts must be contiguous from 1 for `multipart_complete` to accept
    /// the session.
    pub fn is_complete_sequence(&self) -> bool {
        self.parts
            .keys()
            .copied()
            .eq(1..=self.parts.len() as u32)
    }

    pub fn sorted_parts(&self) -> Vec<(u32, String)> {
        self.parts.iter().map(|(n, tag)| (*n, tag.clone())).collect()
    }
}
