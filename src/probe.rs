//! Start-up filesystem probe
//!
//! The deployment target does not allow file writes, so a failed append is
//! the expected outcome. The result is only logged.

use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const PROBE_DATA: &[u8] = b"data to append";

/// Returns `true` when the append succeeded
pub async fn probe_filesystem(path: &Path) -> bool {
    let result = async {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(PROBE_DATA).await?;
        file.flush().await
    }
    .await;

    match result {
        Ok(()) => {
            warn!(path = %path.display(), "Filesystem is writable");
            true
        }
        Err(err) => {
            info!(path = %path.display(), error = %err, "File unable to be created");
            false
        }
    }
}
