//! Shared test helpers: listener fixtures and log capture.

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use openhub_core::{ActionMode, Listener, ListenerName};

pub fn listener(name: &str, tags: &[&str], mode: ActionMode) -> Listener {
    Listener {
        name: ListenerName::from(name),
        project: "Virtualization:containers:Portus".to_string(),
        distribution: "openSUSE_Leap_15.0".to_string(),
        architecture: "x86_64".to_string(),
        package: name.to_string(),
        repository: "opensuse/portus".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        mode,
    }
}

/// In-memory sink for `tracing` output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock")).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route this thread's `tracing` events into the returned buffer until the
/// guard is dropped. Works with current-thread tokio tests, where spawned
/// tasks are polled on the test thread.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
