//! Transient audio files left behind by synthesis and capture

use std::path::PathBuf;

use tracing::{debug, warn};

/// File name patterns that count as transient artifacts
pub const ARTIFACT_PATTERNS: &[&str] = &["speech_*", "temp_speech*"];

/// The directory transient audio is written to
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Remove every matching file, returning how many were deleted
    pub fn sweep(&self) -> usize {
        let Some(dir) = self.dir.to_str() else {
            warn!(dir = %self.dir.display(), "artifact directory is not valid UTF-8, skipping sweep");
            return 0;
        };
        let dir = glob::Pattern::escape(dir);

        let mut removed = 0;
        for pattern in ARTIFACT_PATTERNS {
            let full = format!("{dir}/{pattern}");
            let paths = match glob::glob(&full) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!(pattern = %full, error = %e, "invalid artifact pattern");
                    continue;
                }
            };

            for entry in paths {
                match entry {
                    Ok(path) if path.is_file() => match std::fs::remove_file(&path) {
                        Ok(()) => {
                            debug!(path = %path.display(), "removed artifact");
                            removed += 1;
                        }
                        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove artifact"),
                    },
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "unreadable artifact entry"),
                }
            }
        }
        removed
    }
}
