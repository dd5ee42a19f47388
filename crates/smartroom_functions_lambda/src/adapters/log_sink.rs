use std::sync::Mutex;

use serde_json::Value;
use smartroom_functions_core::contract::{LogEntry, Severity};

pub trait LogSink {
    fn emit(&self, entry: &LogEntry);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn emit(&self, entry: &LogEntry) {
        let fields = Value::Object(entry.fields.clone());
        let message = entry.message.as_str();
        match entry.severity {
            Severity::Debug => tracing::debug!(fields = %fields, "{message}"),
            Severity::Info => tracing::info!(fields = %fields, "{message}"),
            Severity::Warning => tracing::warn!(fields = %fields, "{message}"),
            Severity::Error => tracing::error!(fields = %fields, "{message}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemoryLogSink {
    fn emit(&self, entry: &LogEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry.clone()),
            Err(poisoned) => poisoned.into_inner().push(entry.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn memory_sink_preserves_emission_order() {
        let sink = MemoryLogSink::new();
        sink.emit(&LogEntry::info("first"));
        sink.emit(&LogEntry::info("second"));

        let messages: Vec<String> = sink
            .entries()
            .into_iter()
            .map(|entry| entry.message)
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[derive(Clone)]
    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for BufferWriter {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .expect("buffer lock should not be poisoned")
                .extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_tracing(entry: &LogEntry) -> Value {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = BufferWriter(buffer.clone());
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || TracingLogSink.emit(entry));

        let bytes = buffer.lock().expect("buffer lock should not be poisoned").clone();
        let output = String::from_utf8(bytes).expect("log output should be utf-8");
        let line = output.lines().next().expect("one line should be written");
        serde_json::from_str(line).expect("log line should be json")
    }

    #[test]
    fn tracing_sink_writes_message_fields_and_level() {
        let mut entry = LogEntry::info("New duty roster created for room: 101")
            .with_optional_field("hostel", Some("North"));
        entry.severity = Severity::Warning;

        let line = capture_tracing(&entry);
        assert_eq!(line["level"], "WARN");
        assert_eq!(
            line["fields"]["message"],
            "New duty roster created for room: 101"
        );
        let fields: Value = serde_json::from_str(
            line["fields"]["fields"]
                .as_str()
                .expect("fields should be rendered as text"),
        )
        .expect("fields should be json");
        assert_eq!(fields, serde_json::json!({"hostel": "North"}));
    }

    #[test]
    fn tracing_sink_maps_each_severity_to_a_level() {
        for (severity, level) in [
            (Severity::Debug, "DEBUG"),
            (Severity::Info, "INFO"),
            (Severity::Warning, "WARN"),
            (Severity::Error, "ERROR"),
        ] {
            let mut entry = LogEntry::info("level check");
            entry.severity = severity;
            assert_eq!(capture_tracing(&entry)["level"], level);
        }
    }
}
