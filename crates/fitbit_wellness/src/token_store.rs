//! Injectable credential store for the rotated Fitbit refresh token, so the
//! orchestrator never touches file I/O directly.

use std::io;
use std::path::PathBuf;

use crate::SyncError;

const REFRESH_TOKEN_KEY: &str = "FITBIT_REFRESH_TOKEN=";

pub trait CredentialStore: Send + Sync {
    /// Persist a rotated refresh token so the next run can authenticate.
    fn write_rotated_token(&self, token: &str) -> Result<(), SyncError>;
}

/// Rewrites the `FITBIT_REFRESH_TOKEN=` line of a `KEY=VALUE` dotenv-style
/// file, preserving every other line. The line is appended when missing and
/// a missing file is a no-op. The update goes through a temp file and a
/// rename so concurrent readers never observe a partial write.
#[derive(Clone, Debug)]
pub struct EnvFileStore {
    path: PathBuf,
}

impl EnvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for EnvFileStore {
    fn write_rotated_token(&self, token: &str) -> Result<(), SyncError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(SyncError::Store(e)),
        };

        let mut updated = false;
        let mut lines: Vec<String> = Vec::new();
        for line in contents.lines() {
            if line.starts_with(REFRESH_TOKEN_KEY) {
                lines.push(format!("{REFRESH_TOKEN_KEY}{token}"));
                updated = true;
            } else {
                lines.push(line.to_string());
            }
        }
        if !updated {
            lines.push(format!("{REFRESH_TOKEN_KEY}{token}"));
        }
        let mut output = lines.join("\n");
        output.push('\n');

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".env".into());
        let tmp = self.path.with_file_name(format!("{file_name}.tmp"));
        std::fs::write(&tmp, output)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
