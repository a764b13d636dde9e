//! Shared fixtures for the odata-filter integration tests

#![allow(dead_code)]

use entity_schema::{FieldSpec, FieldType, PropertySchema};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Notification properties with the backend names equal to the filter names
pub fn notification_schema() -> PropertySchema {
    PropertySchema::new(
        "notification",
        vec![
            FieldSpec::new("short_description", "short_description"),
            FieldSpec::new("start_date", "start_date"),
            FieldSpec::new("malfunction_start_date", "malfunction_start_date"),
            FieldSpec::new("malfunction_end_date", "malfunction_end_date"),
            FieldSpec::new("location", "location"),
            FieldSpec::new("priority", "priority").with_type(FieldType::Integer),
            FieldSpec::new("breakdown", "breakdown").with_type(FieldType::BooleanIntString),
            FieldSpec::new("reported_on", "reported_on").with_type(FieldType::Date),
        ],
    )
    .unwrap()
}

/// `count` distinct location names of the same length
pub fn locations(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Location{:03}", i)).collect()
}
