//! UUIDv4 helper for `user_id` and `session_id` values.

use ::uuid::Uuid;

/// A random UUIDv4 in hyphenated lower-case form.
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}
