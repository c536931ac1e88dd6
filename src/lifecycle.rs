//! Status/lifecycle policy for incoming mail.
//!
//! A partial update is merged over the stored record by a pure function so
//! the stamping rules live in exactly one place, shared by the Postgres
//! repository and any test double:
//!
//! - `updated_at` is restamped on every update, whatever changed.
//! - Touching `status` (even to its current value) stamps `update_date`
//!   with the time of the call.
//! - An explicitly supplied `update_date` always wins over the auto-stamp,
//!   including an explicit null, which clears it.
//! - When `status` is absent, `update_date` is left alone unless explicitly
//!   supplied.
//!
//! Nothing here validates `update_date` against `incoming_date`; implausible
//! orderings are accepted as-is.

use chrono::{DateTime, Utc};

use crate::models::{IncomingMail, UpdateIncomingMailRequest};

/// Merges a partial update over an existing record, returning the record as
/// it should be persisted. Fields absent from `changes` keep their stored
/// value; `id` and `created_at` are never touched.
pub fn apply_update(
    existing: &IncomingMail,
    changes: &UpdateIncomingMailRequest,
    now: DateTime<Utc>,
) -> IncomingMail {
    let mut mail = existing.clone();

    if let Some(registration_number) = &changes.registration_number {
        mail.registration_number = registration_number.clone();
    }
    if let Some(sender_name) = &changes.sender_name {
        mail.sender_name = sender_name.clone();
    }
    if let Some(opd_name) = &changes.opd_name {
        mail.opd_name = opd_name.clone();
    }
    if let Some(letter_number) = &changes.letter_number {
        mail.letter_number = letter_number.clone();
    }
    if let Some(letter_subject) = &changes.letter_subject {
        mail.letter_subject = letter_subject.clone();
    }
    if let Some(receiver_name) = &changes.receiver_name {
        mail.receiver_name = receiver_name.clone();
    }
    if let Some(incoming_date) = changes.incoming_date {
        mail.incoming_date = incoming_date;
    }
    if let Some(status) = changes.status {
        mail.status = status;
        // Touching status marks progress.
        mail.update_date = Some(now);
    }
    if let Some(department) = changes.department {
        mail.department = department;
    }
    // An explicit update_date overrides the auto-stamp, explicit null included.
    if let Some(explicit_update_date) = changes.update_date {
        mail.update_date = explicit_update_date;
    }
    if let Some(notes) = &changes.notes {
        mail.notes = notes.clone();
    }

    mail.updated_at = now;
    mail
}
