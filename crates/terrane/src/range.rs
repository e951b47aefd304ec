//! Byte-window resolution for range reads and cursor walks.
//!
//! Typed bounds are packed into key bytes before they reach this module;
//! everything here reasons purely in packed-byte space, where the engine's
//! ordering and the schema's tuple ordering coincide.

use std::ops::Bound;

use terrane_storage::{Direction, ScanBounds};

/// One packed slice bound: the encoded bytes plus whether the caller supplied
/// a prefix of the key fields rather than a full key.
#[derive(Debug, Clone)]
pub(crate) struct PackedBound {
    pub(crate) bytes: Vec<u8>,
    pub(crate) partial: bool,
}

/// The smallest byte string strictly greater than every string starting with
/// `prefix`, or `None` when no such string exists (all-0xFF prefixes).
pub(crate) fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut out = prefix.to_vec();
    while let Some(last) = out.pop() {
        if last < 0xFF {
            out.push(last + 1);
            return Some(out);
        }
    }
    None
}

fn as_lower(bound: &PackedBound) -> Bound<Vec<u8>> {
    Bound::Included(bound.bytes.clone())
}

/// A partial bound used as an upper end covers every key extending it.
fn as_upper(bound: &PackedBound) -> Bound<Vec<u8>> {
    if bound.partial {
        prefix_successor(&bound.bytes).map_or(Bound::Unbounded, Bound::Excluded)
    } else {
        Bound::Included(bound.bytes.clone())
    }
}

/// Resolves a start/stop/reverse range request into an engine window.
///
/// When both ends are given, the smaller byte string is always the lower end
/// of the window; supplying them in descending order flips the traversal to
/// descending, exactly as `reverse` does. With a single end, `reverse` flips
/// the direction but the end keeps its start/stop role.
pub(crate) fn resolve_range(
    start: Option<&PackedBound>,
    stop: Option<&PackedBound>,
    reverse: bool,
) -> ScanBounds {
    let direction = if reverse { Direction::Reverse } else { Direction::Forward };
    match (start, stop) {
        (None, None) => ScanBounds::all(direction),
        (Some(s), None) => ScanBounds::new(as_lower(s), Bound::Unbounded, direction),
        (None, Some(e)) => ScanBounds::new(Bound::Unbounded, as_upper(e), direction),
        (Some(s), Some(e)) => {
            if s.bytes <= e.bytes {
                ScanBounds::new(as_lower(s), as_upper(e), direction)
            } else {
                ScanBounds::new(as_lower(e), as_upper(s), Direction::Reverse)
            }
        }
    }
}

/// Resolves a cursor request into an engine window, or `None` for the one
/// combination that cannot produce rows: a descending walk constrained to a
/// prefix but given no seek key has nowhere to position itself, so it yields
/// nothing.
pub(crate) fn resolve_cursor(
    forward: bool,
    inclusive: bool,
    key: Option<Vec<u8>>,
    prefix: Option<Vec<u8>>,
) -> Option<ScanBounds> {
    let (prefix_lower, prefix_upper) = match &prefix {
        Some(p) => (
            Bound::Included(p.clone()),
            prefix_successor(p).map_or(Bound::Unbounded, Bound::Excluded),
        ),
        None => (Bound::Unbounded, Bound::Unbounded),
    };
    if forward {
        let seek = key.map_or(Bound::Unbounded, |k| {
            if inclusive {
                Bound::Included(k)
            } else {
                Bound::Excluded(k)
            }
        });
        Some(ScanBounds::new(max_lower(prefix_lower, seek), prefix_upper, Direction::Forward))
    } else {
        if prefix.is_some() && key.is_none() {
            return None;
        }
        let seek = key.map_or(Bound::Unbounded, |k| {
            if inclusive {
                Bound::Included(k)
            } else {
                Bound::Excluded(k)
            }
        });
        Some(ScanBounds::new(prefix_lower, min_upper(prefix_upper, seek), Direction::Reverse))
    }
}

/// The tighter of two lower bounds. At equal bytes, exclusion wins.
fn max_lower(a: Bound<Vec<u8>>, b: Bound<Vec<u8>>) -> Bound<Vec<u8>> {
    use Bound::{Excluded, Included, Unbounded};
    match (a, b) {
        (Unbounded, other) | (other, Unbounded) => other,
        (Included(x), Included(y)) => Included(x.max(y)),
        (Excluded(x), Excluded(y)) => Excluded(x.max(y)),
        (Included(inc), Excluded(exc)) | (Excluded(exc), Included(inc)) => {
            if inc > exc {
                Included(inc)
            } else {
                Excluded(exc)
            }
        }
    }
}

/// The tighter of two upper bounds. At equal bytes, exclusion wins.
fn min_upper(a: Bound<Vec<u8>>, b: Bound<Vec<u8>>) -> Bound<Vec<u8>> {
    use Bound::{Excluded, Included, Unbounded};
    match (a, b) {
        (Unbounded, other) | (other, Unbounded) => other,
        (Included(x), Included(y)) => Included(x.min(y)),
        (Excluded(x), Excluded(y)) => Excluded(x.min(y)),
        (Included(inc), Excluded(exc)) | (Excluded(exc), Included(inc)) => {
            if inc < exc {
                Included(inc)
            } else {
                Excluded(exc)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(bytes: &[u8]) -> PackedBound {
        PackedBound { bytes: bytes.to_vec(), partial: false }
    }

    fn partial(bytes: &[u8]) -> PackedBound {
        PackedBound { bytes: bytes.to_vec(), partial: true }
    }

    // ========================================================================
    // Prefix successor
    // ========================================================================

    #[test]
    fn successor_increments_last_byte() {
        assert_eq!(prefix_successor(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(prefix_successor(&[0x00]), Some(vec![0x01]));
    }

    #[test]
    fn successor_carries_past_trailing_ff() {
        assert_eq!(prefix_successor(&[0x61, 0xFF, 0xFF]), Some(vec![0x62]));
    }

    #[test]
    fn successor_of_all_ff_is_none() {
        assert_eq!(prefix_successor(&[0xFF, 0xFF]), None);
        assert_eq!(prefix_successor(&[]), None);
    }

    // ========================================================================
    // Range resolution
    // ========================================================================

    #[test]
    fn unbounded_range_honors_reverse() {
        let bounds = resolve_range(None, None, true);
        assert_eq!(bounds.direction, Direction::Reverse);
        assert!(matches!(bounds.lower, Bound::Unbounded));
        assert!(matches!(bounds.upper, Bound::Unbounded));
    }

    #[test]
    fn ordered_ends_keep_roles() {
        let bounds = resolve_range(Some(&full(b"a")), Some(&full(b"m")), false);
        assert_eq!(bounds.direction, Direction::Forward);
        assert_eq!(bounds.lower, Bound::Included(b"a".to_vec()));
        assert_eq!(bounds.upper, Bound::Included(b"m".to_vec()));
    }

    #[test]
    fn inverted_ends_swap_and_descend() {
        let bounds = resolve_range(Some(&full(b"m")), Some(&full(b"a")), false);
        assert_eq!(bounds.direction, Direction::Reverse);
        assert_eq!(bounds.lower, Bound::Included(b"a".to_vec()));
        assert_eq!(bounds.upper, Bound::Included(b"m".to_vec()));
    }

    #[test]
    fn single_end_keeps_role_under_reverse() {
        let bounds = resolve_range(Some(&full(b"m")), None, true);
        assert_eq!(bounds.direction, Direction::Reverse);
        assert_eq!(bounds.lower, Bound::Included(b"m".to_vec()));
        assert!(matches!(bounds.upper, Bound::Unbounded));
    }

    #[test]
    fn partial_upper_end_covers_extensions() {
        let bounds = resolve_range(None, Some(&partial(b"ab")), false);
        assert_eq!(bounds.upper, Bound::Excluded(b"ac".to_vec()));
    }

    #[test]
    fn partial_lower_end_is_inclusive() {
        let bounds = resolve_range(Some(&partial(b"ab")), None, false);
        assert_eq!(bounds.lower, Bound::Included(b"ab".to_vec()));
    }

    // ========================================================================
    // Cursor resolution
    // ========================================================================

    #[test]
    fn forward_cursor_clamps_seek_to_prefix() {
        let bounds =
            resolve_cursor(true, true, Some(b"a".to_vec()), Some(b"log:".to_vec())).unwrap();
        assert_eq!(bounds.lower, Bound::Included(b"log:".to_vec()));
        assert_eq!(bounds.upper, Bound::Excluded(b"log;".to_vec()));
        assert_eq!(bounds.direction, Direction::Forward);
    }

    #[test]
    fn exclusive_seek_beats_equal_prefix_start() {
        let bounds =
            resolve_cursor(true, false, Some(b"log:".to_vec()), Some(b"log:".to_vec())).unwrap();
        assert_eq!(bounds.lower, Bound::Excluded(b"log:".to_vec()));
    }

    #[test]
    fn descending_cursor_caps_at_seek() {
        let bounds =
            resolve_cursor(false, true, Some(b"m".to_vec()), Some(b"log:".to_vec())).unwrap();
        assert_eq!(bounds.lower, Bound::Included(b"log:".to_vec()));
        assert_eq!(bounds.upper, Bound::Excluded(b"log;".to_vec()));
        assert_eq!(bounds.direction, Direction::Reverse);
    }

    #[test]
    fn descending_prefix_without_seek_is_empty() {
        assert!(resolve_cursor(false, true, None, Some(b"log:".to_vec())).is_none());
    }

    #[test]
    fn descending_without_prefix_needs_no_seek() {
        let bounds = resolve_cursor(false, true, None, None).unwrap();
        assert_eq!(bounds.direction, Direction::Reverse);
        assert!(matches!(bounds.upper, Bound::Unbounded));
    }
}
