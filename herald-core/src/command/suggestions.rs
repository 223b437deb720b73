//! "Did you mean" ranking for unmatched command names.
//!
//! Two-stage: a coarse pass keeps candidates sharing at least 90% of the
//! input's characters (order-insensitive, so a transposed typo still scores
//! 100), then survivors are re-ranked by full-string edit-distance
//! similarity and the top five at 42 or above are returned. Callers filter
//! the candidate set by usability first; this module only ranks.

const PARTIAL_THRESHOLD: u32 = 90;
const FULL_THRESHOLD: u32 = 42;
const MAX_SUGGESTIONS: usize = 5;

/// Ranks `candidates` against `input`. Returns at most five names, best
/// first, deterministically ordered (score, then name). Never fails; an
/// empty candidate set yields an empty list.
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let input = input.to_lowercase();

    let mut ranked: Vec<(u32, &str)> = candidates
        .into_iter()
        .filter(|candidate| partial_ratio(&input, &candidate.to_lowercase()) >= PARTIAL_THRESHOLD)
        .map(|candidate| (ratio(&input, &candidate.to_lowercase()), candidate))
        .filter(|(score, _)| *score >= FULL_THRESHOLD)
        .collect();

    ranked.sort_by(|(score_a, name_a), (score_b, name_b)| {
        score_b.cmp(score_a).then_with(|| name_a.cmp(name_b))
    });

    ranked
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_owned())
        .collect()
}

/// Order-insensitive similarity out of 100: how much of the shorter
/// string's character bag appears in the longer one.
pub(crate) fn partial_ratio(a: &str, b: &str) -> u32 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let shorter = len_a.min(len_b);
    if shorter == 0 {
        return 0;
    }

    let mut pool: Vec<char> = b.chars().collect();
    let mut common = 0usize;
    for ch in a.chars() {
        if let Some(position) = pool.iter().position(|&other| other == ch) {
            pool.swap_remove(position);
            common += 1;
        }
    }

    (common * 100 / shorter) as u32
}

/// Full-string similarity out of 100, from the Levenshtein distance:
/// `(len_a + len_b - distance) * 100 / (len_a + len_b)`.
pub(crate) fn ratio(a: &str, b: &str) -> u32 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let total = len_a + len_b;
    if total == 0 {
        return 100;
    }

    ((total - levenshtein(a, b)) * 100 / total) as u32
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ch_a) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &ch_b) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ch_a != ch_b);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transposed_typo_is_suggested() {
        let suggestions = suggest("bna", ["ban", "help", "avatar"]);
        assert_eq!(suggestions, vec!["ban".to_owned()]);
    }

    #[test]
    fn unrelated_input_yields_nothing() {
        let suggestions = suggest("zzzzzz", ["ban", "help", "avatar"]);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn at_most_five_results() {
        let candidates = [
            "tag", "tags", "taga", "tagb", "tagc", "tagd", "tage", "tagf",
        ];
        let suggestions = suggest("tag", candidates);
        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions[0], "tag");
    }

    #[test]
    fn ordering_is_deterministic() {
        let first = suggest("remnid", ["remind", "rewind"]);
        let second = suggest("remnid", ["rewind", "remind"]);
        assert_eq!(first, second);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(suggest("BNA", ["ban"]), vec!["ban".to_owned()]);
    }

    #[test]
    fn partial_ratio_counts_shared_characters() {
        assert_eq!(partial_ratio("bna", "ban"), 100);
        assert_eq!(partial_ratio("bann", "ban"), 100);
        assert_eq!(partial_ratio("xyz", "ban"), 0);
        assert_eq!(partial_ratio("", "ban"), 0);
    }

    #[test]
    fn ratio_reflects_edit_distance() {
        assert_eq!(ratio("ban", "ban"), 100);
        // two single-character edits across six total characters
        assert_eq!(ratio("bna", "ban"), 66);
        assert_eq!(ratio("", ""), 100);
    }
}
