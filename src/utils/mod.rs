//! Shared helpers.
//!
//! | Module | Purpose                                    |
//! |--------|--------------------------------------------|
//! | `date` | Current UTC year without a date crate      |
//! | `hash` | blake3 content digests                     |
//! | `path` | Path normalization and config resolution   |
//! | `xml`  | Markup escaping and minification           |

pub mod date;
pub mod hash;
pub mod path;
pub mod xml;

/// Format count with noun, handling pluralization (`1 file`, `3 files`).
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
