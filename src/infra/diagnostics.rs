use crate::app::ports::{DebugArtifacts, DiagnosticSink};
use crate::constants::{LAST_CHECK_FILE, PAGE_DUMP_FILE, SCREENSHOT_FILE};
use crate::types::LastCheck;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Writes debug artifacts into a fixed directory, overwriting previous ones.
pub struct FsDiagnosticSink {
    dir: PathBuf,
}

impl FsDiagnosticSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, contents: &[u8]) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!("Could not create debug directory {}: {}", self.dir.display(), e);
            return;
        }
        let path = self.dir.join(name);
        match fs::write(&path, contents) {
            Ok(()) => debug!("Wrote {}", path.display()),
            Err(e) => warn!("Could not write {}: {}", path.display(), e),
        }
    }
}

impl DiagnosticSink for FsDiagnosticSink {
    fn record_failure(&self, artifacts: &DebugArtifacts) {
        if let Some(png) = &artifacts.screenshot {
            self.write(SCREENSHOT_FILE, png);
        }
        if let Some(html) = &artifacts.html {
            self.write(PAGE_DUMP_FILE, html.as_bytes());
        }
        info!(
            "Saved debug artifacts to {} ({})",
            self.dir.display(),
            artifacts.reason
        );
    }

    fn record_check(&self, check: &LastCheck) {
        match serde_json::to_vec_pretty(check) {
            Ok(json) => self.write(LAST_CHECK_FILE, &json),
            Err(e) => warn!("Error saving last check data: {}", e),
        }
    }
}

/// Keeps everything in memory; for tests and dry runs.
#[derive(Default)]
pub struct MemoryDiagnosticSink {
    failures: Mutex<Vec<DebugArtifacts>>,
    checks: Mutex<Vec<LastCheck>>,
}

impl MemoryDiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<DebugArtifacts> {
        self.failures.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn checks(&self) -> Vec<LastCheck> {
        self.checks.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl DiagnosticSink for MemoryDiagnosticSink {
    fn record_failure(&self, artifacts: &DebugArtifacts) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(artifacts.clone());
        }
    }

    fn record_check(&self, check: &LastCheck) {
        if let Ok(mut checks) = self.checks.lock() {
            checks.push(check.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WindReading;
    use tempfile::tempdir;

    #[test]
    fn test_fs_sink_writes_artifacts() {
        let dir = tempdir().unwrap();
        let sink = FsDiagnosticSink::new(dir.path().join("debug"));
        sink.record_failure(&DebugArtifacts {
            reason: "wind speed not found".into(),
            html: Some("<html></html>".into()),
            screenshot: Some(vec![0x89, b'P', b'N', b'G']),
        });

        let html = fs::read_to_string(sink.dir().join(PAGE_DUMP_FILE)).unwrap();
        assert_eq!(html, "<html></html>");
        assert_eq!(fs::read(sink.dir().join(SCREENSHOT_FILE)).unwrap().len(), 4);
    }

    #[test]
    fn test_fs_sink_skips_missing_screenshot() {
        let dir = tempdir().unwrap();
        let sink = FsDiagnosticSink::new(dir.path());
        sink.record_failure(&DebugArtifacts {
            reason: "load failed".into(),
            html: Some("x".into()),
            screenshot: None,
        });
        assert!(!dir.path().join(SCREENSHOT_FILE).exists());
        assert!(dir.path().join(PAGE_DUMP_FILE).exists());
    }

    #[test]
    fn test_fs_sink_writes_last_check() {
        let dir = tempdir().unwrap();
        let sink = FsDiagnosticSink::new(dir.path());
        let check = LastCheck::from_reading(&WindReading::new(9.0), 15.0);
        sink.record_check(&check);

        let raw = fs::read_to_string(dir.path().join(LAST_CHECK_FILE)).unwrap();
        let parsed: LastCheck = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, check);
        assert!(!parsed.above_threshold);
    }
}
