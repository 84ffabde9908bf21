//! Name canonicalization and hashing (spec §4.C).

use crate::error::CoreError;

/// Canonical names are capped at this many bytes.
pub const MAX_NAME_LEN: usize = 96;

/// Subject-IDs below this value are "pinned": a canonical name that is
/// exactly a decimal integer in `[1, PINNED_LIMIT)` maps to that integer
/// directly, bypassing the dynamic allocator.
pub const PINNED_LIMIT: u32 = 8192;

/// Canonicalize `raw_name` against `namespace` and `user_display_name`,
/// per spec §4.C steps 1-5.
pub fn canonicalize(namespace: &str, user_display_name: &str, raw_name: &str) -> Result<String, CoreError> {
    if raw_name.is_empty() {
        return Err(CoreError::Argument("name must not be empty".into()));
    }

    let combined = if raw_name.starts_with('/') {
        raw_name.to_string()
    } else if raw_name.starts_with('~') || namespace.starts_with('~') {
        let stripped = raw_name.strip_prefix('~').unwrap_or(raw_name);
        format!("{user_display_name}/{stripped}")
    } else {
        format!("{namespace}/{raw_name}")
    };

    let collapsed = collapse_slashes(&combined);
    let mut canonical = if collapsed.starts_with('/') {
        collapsed
    } else {
        format!("/{collapsed}")
    };
    if canonical.len() > 1 {
        while canonical.ends_with('/') {
            canonical.pop();
        }
    }

    if canonical.len() > MAX_NAME_LEN {
        return Err(CoreError::Name(format!(
            "canonical name is {} bytes, exceeds the {MAX_NAME_LEN}-byte limit",
            canonical.len()
        )));
    }

    Ok(canonical)
}

fn collapse_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_slash = false;
    for c in s.chars() {
        if c == '/' {
            if last_was_slash {
                continue;
            }
            last_was_slash = true;
        } else {
            last_was_slash = false;
        }
        out.push(c);
    }
    out
}

/// If `canonical` (with its single leading `/` stripped) is a decimal
/// integer in `[1, PINNED_LIMIT)` with no leading zero, return that
/// integer. Leading zeros disqualify a name so the integer-string mapping
/// stays one-to-one.
pub fn pinned_value(canonical: &str) -> Option<u32> {
    let digits = canonical.strip_prefix('/')?;
    let mut chars = digits.chars();
    let first = chars.next()?;
    if !('1'..='9').contains(&first) {
        return None;
    }
    if !chars.clone().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: u32 = digits.parse().ok()?;
    if value < PINNED_LIMIT {
        Some(value)
    } else {
        None
    }
}

/// Compute the 64-bit name hash: the pinned integer itself for pinned
/// names, else `rapidhash(name_bytes)`. The probability a non-pinned hash
/// lands in `[1, PINNED_LIMIT)` is ~4.4e-16 and treated as impossible.
pub fn hash_name(canonical: &str) -> u64 {
    match pinned_value(canonical) {
        Some(v) => v as u64,
        None => rapidhash::rapidhash(canonical.as_bytes()),
    }
}

/// Whether a bare hash value (as carried on the wire, where the name itself
/// is not always present) denotes a pinned topic. Mirrors [`hash_name`]'s
/// convention that pinned hashes *are* the pinned integer.
pub fn hash_is_pinned(hash: u64) -> bool {
    hash < PINNED_LIMIT as u64
}

/// The top 51 bits of a name hash, used by transports to cheaply detect a
/// subject-ID mismatch before comparing the full name.
pub fn discriminator(hash: u64) -> u64 {
    hash >> 13
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_name_passes_through() {
        assert_eq!(canonicalize("/ns", "me", "/a/b").unwrap(), "/a/b");
    }

    #[test]
    fn namespace_relative_name_is_prefixed() {
        assert_eq!(canonicalize("/ns", "me", "topic").unwrap(), "/ns/topic");
    }

    #[test]
    fn tilde_name_is_prefixed_with_display_name() {
        assert_eq!(canonicalize("/ns", "me", "~/topic").unwrap(), "/me/topic");
    }

    #[test]
    fn tilde_namespace_prefixes_with_display_name_even_without_tilde_name() {
        assert_eq!(canonicalize("~", "me", "topic").unwrap(), "/me/topic");
    }

    #[test]
    fn repeated_slashes_collapse() {
        assert_eq!(canonicalize("/ns//sub", "me", "//topic").unwrap(), "/ns/sub/topic");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(canonicalize("/ns", "me", "topic/").unwrap(), "/ns/topic");
    }

    #[test]
    fn oversized_name_is_rejected() {
        let long = "a".repeat(200);
        assert!(canonicalize("/ns", "me", &long).is_err());
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize("/ns", "me", "//a//b/").unwrap();
        let twice = canonicalize("", "", &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn pinned_round_trip_for_every_value_in_range() {
        for k in [1u32, 2, 42, 4242, 8000, 8191] {
            let canonical = format!("/{k}");
            assert_eq!(pinned_value(&canonical), Some(k));
            assert_eq!(hash_name(&canonical), k as u64);
        }
    }

    #[test]
    fn pinned_limit_excludes_8192_and_above() {
        assert_eq!(pinned_value("/8192"), None);
        assert_eq!(pinned_value("/9000"), None);
    }

    #[test]
    fn leading_zero_disqualifies_pinned_detection() {
        assert_eq!(pinned_value("/042"), None);
        assert_eq!(pinned_value("/0"), None);
    }

    #[test]
    fn non_numeric_name_is_not_pinned() {
        assert_eq!(pinned_value("/sensors/imu"), None);
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_name("/sensors/imu"), hash_name("/sensors/imu"));
    }

    #[test]
    fn hash_is_pinned_matches_pinned_value_range() {
        assert!(hash_is_pinned(1));
        assert!(hash_is_pinned(8191));
        assert!(!hash_is_pinned(8192));
        assert!(!hash_is_pinned(rapidhash::rapidhash(b"/sensors/imu")));
    }
}
