use std::{fs::File, fs::OpenOptions, io::Write, sync::Mutex};

use tracing::warn;

use crate::trace::trace::CaptureTraceEvent;

/// Appends capture decisions to a JSONL file. Failures are reported and
/// swallowed; tracing never interrupts a capture.
pub struct TraceLogger {
    sink: Option<Mutex<File>>,
}

impl TraceLogger {
    /// Open `path` for appending. An unopenable path yields a disabled logger.
    pub fn new(path: &str) -> Self {
        let sink = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| warn!(path, error = %e, "could not open trace file"))
            .ok()
            .map(Mutex::new);

        Self { sink }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log(&self, event: &CaptureTraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, decision = %event.decision, "unserializable trace event");
                return;
            }
        };

        match sink.lock() {
            Ok(mut file) => {
                if let Err(e) = writeln!(file, "{}", line) {
                    warn!(error = %e, "trace write failed");
                }
            }
            Err(_) => warn!("trace file lock poisoned, event dropped"),
        }
    }
}
