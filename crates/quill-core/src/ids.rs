//! UUIDv7 helpers for time-ordered identifiers.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// UUIDv7 embeds a Unix timestamp (milliseconds) in the first 48 bits,
/// providing natural time-ordering for primary keys.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check if a UUID is version 7.
#[inline]
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}
