//! "Did you mean" candidates for misspelled option and component names.

/// Minimum normalized similarity for a candidate to be offered.
pub const SIMILARITY_CUTOFF: f64 = 0.6;

/// Maximum number of candidates offered per name.
pub const MAX_SUGGESTIONS: usize = 3;

/// Up to `n` candidates closest to `input`, best first.
///
/// Ties are broken alphabetically so the result is deterministic.
pub fn fuzzy_match<'a, I>(input: &str, candidates: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|candidate| {
            (
                strsim::normalized_damerau_levenshtein(input, candidate),
                candidate,
            )
        })
        .filter(|(score, _)| *score >= SIMILARITY_CUTOFF)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(n)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_names_are_suggested_best_first() {
        let found = fuzzy_match("spead", ["speed", "spread", "seed", "output"], 3);
        assert_eq!(found[..2], ["spread", "speed"]);
        assert!(!found.contains(&"output".to_string()));
    }

    #[test]
    fn at_most_n_suggestions() {
        let found = fuzzy_match("abcd", ["abce", "abcf", "abcg", "abch", "abci"], 3);
        assert_eq!(found, vec!["abce", "abcf", "abcg"]);
    }

    #[test]
    fn nothing_close_yields_nothing() {
        assert!(fuzzy_match("zzzzzz", ["speed", "output"], 3).is_empty());
    }
}
