// Match selection.
//
// Given the current position and its freshly computed checksum, scan the
// whole bucket the checksum projects to and pick the candidate with the
// longest combined forward + backward extension. Greedy: one candidate set
// per position, no lazy matching, no second chances.

use super::rolling;
use super::table::MatchTable;

/// A candidate accepted by the searcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMatch {
    /// Start of the referenced copy at the probe alignment (before backward
    /// extension is applied).
    pub candidate: usize,
    /// Bytes matching forward from the probe position.
    pub forward: usize,
    /// Bytes matching backward from the probe position, bounded by the
    /// anchor on the read side and the input base on the candidate side.
    pub backward: usize,
}

/// Scan the bucket for `sum` and return the best candidate for a match at
/// `pos`, or `None`.
///
/// Entries are filtered on checksum equality and on the window bound, then
/// scored by forward + backward length; a forward length below `min_match`
/// rejects the entry outright. Ties go to the later bucket slot.
pub fn find_best_entry(
    table: &MatchTable,
    input: &[u8],
    pos: usize,
    anchor: usize,
    sum: u32,
    window_size: u64,
    min_match: usize,
) -> Option<BestMatch> {
    let hash = table.bucket_index(sum);
    let mut best: Option<BestMatch> = None;
    let mut best_score = 0usize;

    for entry in table.bucket(hash) {
        if entry.is_empty() || entry.checksum != sum {
            continue;
        }
        let candidate = entry.offset as usize;
        // Entries always index positions behind the cursor; anything else
        // is stale and skipped rather than trusted.
        if candidate >= pos {
            continue;
        }
        if (pos - candidate) as u64 > window_size {
            continue;
        }

        let forward = rolling::forward_match(&input[pos..], &input[candidate..], input.len() - pos);
        if forward < min_match {
            continue;
        }

        let bound = (pos - anchor).min(candidate);
        let backward = rolling::backward_match(
            &input[pos - bound..pos],
            &input[candidate - bound..candidate],
            bound,
        );

        let score = forward + backward;
        if score >= best_score {
            best_score = score;
            best = Some(BestMatch {
                candidate,
                forward,
                backward,
            });
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
