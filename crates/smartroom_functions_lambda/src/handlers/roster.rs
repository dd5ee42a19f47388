use smartroom_functions_core::contract::{
    DocumentCreatedEvent, LogEntry, RosterRecord, ABSENT_FIELD_PLACEHOLDER,
};

use crate::adapters::log_sink::LogSink;

pub fn handle_roster_created(event: &DocumentCreatedEvent, log_sink: &dyn LogSink) {
    let record = event.roster_record();
    log_sink.emit(&roster_log_entry(&record));
}

pub fn roster_log_entry(record: &RosterRecord) -> LogEntry {
    let room = record
        .room_number
        .as_deref()
        .unwrap_or(ABSENT_FIELD_PLACEHOLDER);

    LogEntry::info(format!("New duty roster created for room: {room}"))
        .with_optional_field("hostel", record.hostel_name.as_deref())
        .with_optional_field("rotation", record.task_rotation.as_deref())
}
