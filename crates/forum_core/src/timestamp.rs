//! Timestamp interceptor shared by every entity type.
//!
//! `createdAt`/`updatedAt` are epoch milliseconds. Creation stamps both;
//! edits restamp `updatedAt` only. Counter maintenance never restamps.

use crate::store::{Document, Update};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Stamps a document about to be inserted.
pub fn stamp_created(doc: &mut Document, now: i64) {
    doc.insert(CREATED_AT_FIELD.to_string(), Value::from(now));
    doc.insert(UPDATED_AT_FIELD.to_string(), Value::from(now));
}

/// Appends the `updatedAt` assignment to an edit delta.
pub fn stamp_updated(delta: Update, now: i64) -> Update {
    delta.set(UPDATED_AT_FIELD, now)
}

#[cfg(test)]
mod tests {
    use super::{stamp_created, stamp_updated, CREATED_AT_FIELD, UPDATED_AT_FIELD};
    use crate::store::{Document, Update};

    #[test]
    fn creation_stamps_both_fields_with_same_instant() {
        let mut doc = Document::new();
        stamp_created(&mut doc, 1_700_000_000_000);
        assert_eq!(doc[CREATED_AT_FIELD], 1_700_000_000_000_i64);
        assert_eq!(doc[UPDATED_AT_FIELD], 1_700_000_000_000_i64);
    }

    #[test]
    fn edit_stamp_touches_updated_at_only() {
        let delta = stamp_updated(Update::new().set("title", "x"), 42);
        assert!(delta.assigns(UPDATED_AT_FIELD));
        assert!(!delta.assigns(CREATED_AT_FIELD));
    }
}
