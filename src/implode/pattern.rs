//! Repetition search for the compressor
//!
//! Candidates come from the [`HashIndex`] bucket of the byte pair at the
//! current position and are tried nearest first.

use super::hash::HashIndex;
use super::{byte_pair_hash, GOOD_MATCH_LENGTH, LAZY_MATCH_LIMIT, SHORT_DISTANCE};
use crate::MAX_REP_LENGTH;

/// Length-2 repetitions at or beyond this distance cost more than literals
const MAX_SHORT_REP_DISTANCE: usize = 0x100;

/// A repetition that can replace the bytes at the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    /// Number of bytes repeated (2..=516)
    pub length: usize,
    /// How far back the repeated bytes start (1..=dictionary size)
    pub distance: usize,
}

/// Find the best repetition for `work[pos..]`
///
/// Only bytes before `pos` and at most `dict_bytes` back are considered.
/// A match never runs past its own start, so `length <= distance` always
/// holds. Returns `None` when nothing of length 2 or more is found, or
/// when the only find is a 2-byte match too far back to pay off.
pub fn find_repetition(
    work: &[u8],
    index: &HashIndex,
    pos: usize,
    dict_bytes: usize,
) -> Option<MatchCandidate> {
    if pos + 1 >= work.len() {
        return None;
    }

    let bucket = index.candidates(byte_pair_hash(work[pos], work[pos + 1]));
    let earlier = bucket.partition_point(|&p| (p as usize) < pos);
    let max_length = MAX_REP_LENGTH.min(work.len() - pos);

    let mut best: Option<MatchCandidate> = None;

    for &candidate in bucket[..earlier].iter().rev() {
        let distance = pos - candidate as usize;
        if distance > dict_bytes {
            break;
        }

        let limit = max_length.min(distance);
        let source = &work[candidate as usize..candidate as usize + limit];
        let length = source
            .iter()
            .zip(&work[pos..pos + limit])
            .take_while(|(a, b)| a == b)
            .count();

        if length >= 2 && best.is_none_or(|b| length > b.length) {
            best = Some(MatchCandidate { length, distance });
            if length > GOOD_MATCH_LENGTH {
                break;
            }
        }
    }

    best.filter(|m| m.length > 2 || m.distance < MAX_SHORT_REP_DISTANCE)
}

/// Decide whether to emit a literal now and take the match one byte later
///
/// Only short current matches are worth deferring. The later match has to
/// be longer, and either longer by two or more bytes or the current match
/// has to be far back.
pub fn should_defer(current: MatchCandidate, next: Option<MatchCandidate>) -> bool {
    let Some(next) = next else {
        return false;
    };
    current.length < LAZY_MATCH_LIMIT
        && next.length > current.length
        && (next.length > current.length + 1 || current.distance > SHORT_DISTANCE)
}
