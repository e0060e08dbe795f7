//! Whole-word candidates from sub-piece suggestions.

use super::dedup_ordered;
use crate::oracle::Suggestion;

/// Word-boundary markers of byte-level BPE and sentencepiece vocabularies
const BOUNDARY_MARKERS: [char; 2] = ['Ġ', '▁'];

/// Continuation prefix of wordpiece vocabularies
const CONTINUATION_PREFIX: &str = "##";

/// Remove tokenizer markers from a suggested token.
///
/// ```
/// use codeflip::candidates::strip_subword_markers;
///
/// assert_eq!(strip_subword_markers("Ġcount"), "count");
/// assert_eq!(strip_subword_markers("▁len"), "len");
/// assert_eq!(strip_subword_markers("##er"), "er");
/// ```
#[must_use]
pub fn strip_subword_markers(token: &str) -> String {
    let token = token.strip_prefix(CONTINUATION_PREFIX).unwrap_or(token);
    token
        .chars()
        .filter(|c| !BOUNDARY_MARKERS.contains(c))
        .collect()
}

/// Concatenate sub-piece suggestions into whole words.
///
/// Considers the top `per_piece` suggestions of every sub-piece and returns
/// the `keep` best concatenations by summed score, best first. Scores are
/// additive, so pruning the partial words to the `keep` best after every
/// sub-piece yields exactly the best `keep` words of the full product.
/// Ties keep rank order.
#[must_use]
pub fn merge_pieces(pieces: &[Vec<Suggestion>], per_piece: usize, keep: usize) -> Vec<String> {
    if pieces.is_empty() || per_piece == 0 || keep == 0 {
        return Vec::new();
    }

    let mut beam: Vec<(String, f32)> = vec![(String::new(), 0.0)];
    for ranked in pieces {
        let top = &ranked[..ranked.len().min(per_piece)];
        if top.is_empty() {
            return Vec::new();
        }
        let mut next = Vec::with_capacity(beam.len() * top.len());
        for (prefix, score) in &beam {
            for piece in top {
                let mut word = prefix.clone();
                word.push_str(&strip_subword_markers(&piece.token));
                next.push((word, score + piece.score));
            }
        }
        next.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        next.truncate(keep);
        beam = next;
    }

    dedup_ordered(beam.into_iter().map(|(word, _)| word))
}
