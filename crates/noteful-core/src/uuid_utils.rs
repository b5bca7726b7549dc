//! UUID helpers for entity identifiers.
//!
//! Every entity id is a UUIDv7. The leading 48 bits carry a millisecond Unix
//! timestamp, so ids sort in creation order, which gives list queries a stable
//! tie-breaker when timestamps collide.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// # Example
///
/// ```
/// use noteful_core::uuid_utils::new_v7;
///
/// let a = new_v7();
/// let b = new_v7();
/// assert!(b > a);
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a client-supplied identifier.
///
/// Accepts the canonical hyphenated form (any case, surrounding whitespace is
/// not trimmed). Returns `None` for anything that is not a syntactically valid
/// UUID so callers can reject the request before touching storage.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    if raw.len() != 36 {
        return None;
    }
    Uuid::parse_str(raw).ok()
}
