//! Title similarity matching for cover lookups.
//!
//! Scores candidate titles against a free-text search term using a fixed
//! rule ladder (exact, prefix, substring, word subset) with a Dice bigram
//! similarity fallback. Also derives the two-character bucket key used to
//! partition the remote title index.

use std::collections::HashSet;

/// Result of comparing a candidate title against a search term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleMatch {
    /// Whether the candidate is considered a match at all.
    pub matched: bool,
    /// Match strength in `[0, 1]`, higher is stronger.
    pub score: f32,
}

impl TitleMatch {
    const MISS: TitleMatch = TitleMatch {
        matched: false,
        score: 0.0,
    };

    fn hit(score: f32) -> Self {
        Self {
            matched: true,
            score,
        }
    }
}

/// Punctuation that titles use interchangeably with spaces.
const SEPARATORS: &[char] = &[':', '-', '_', '\'', '\u{2018}', '\u{2019}', '"', '\u{201c}', '\u{201d}'];

/// Normalize a title for comparison: lowercase, separators to spaces,
/// whitespace collapsed and trimmed.
pub fn normalize(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() || SEPARATORS.contains(&c) {
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }
    out
}

/// Adjacent two-character substrings of `s` (char-based).
fn bigrams(s: &str) -> HashSet<(char, char)> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Dice coefficient over character bigrams of the normalized strings.
///
/// Strings shorter than two characters after normalization never overlap,
/// so they yield 0 unless exactly equal.
pub fn dice_similarity(a: &str, b: &str) -> f32 {
    let s1 = normalize(a);
    let s2 = normalize(b);

    if s1 == s2 {
        return 1.0;
    }
    if s1.chars().count() < 2 || s2.chars().count() < 2 {
        return 0.0;
    }

    let b1 = bigrams(&s1);
    let b2 = bigrams(&s2);
    let intersection = b1.intersection(&b2).count();

    (2 * intersection) as f32 / (b1.len() + b2.len()) as f32
}

/// Compare a candidate title against a search term.
///
/// Rules fire in priority order; the first hit wins:
/// exact (1.0), prefix (0.95), substring (0.85), word subset (0.8),
/// then Dice bigram similarity scaled by 0.7 when above 0.5.
pub fn matches(candidate: &str, search_term: &str) -> TitleMatch {
    let game = normalize(candidate);
    let search = normalize(search_term);

    if game == search {
        return TitleMatch::hit(1.0);
    }

    if game.starts_with(&search) {
        return TitleMatch::hit(0.95);
    }

    if game.contains(&search) {
        return TitleMatch::hit(0.85);
    }

    // Every multi-char search word appears in some candidate word.
    let search_words: Vec<&str> = search
        .split(' ')
        .filter(|w| w.chars().count() > 1)
        .collect();
    if !search_words.is_empty() {
        let game_words: Vec<&str> = game.split(' ').collect();
        let all_words_match = search_words.iter().all(|sw| {
            game_words
                .iter()
                .any(|gw| gw.starts_with(sw) || gw.contains(sw))
        });
        if all_words_match {
            return TitleMatch::hit(0.8);
        }
    }

    let similarity = dice_similarity(candidate, search_term);
    if similarity > 0.5 {
        return TitleMatch::hit(similarity * 0.7);
    }

    TitleMatch::MISS
}

/// Bucket key for the remote title index: first two characters, lowercased,
/// reduced to ASCII alphanumerics. `"@"` when nothing usable remains.
pub fn search_bucket(name: &str) -> String {
    let bucket: String = name
        .chars()
        .take(2)
        .flat_map(|c| c.to_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();

    if bucket.is_empty() {
        "@".to_string()
    } else {
        bucket
    }
}

/// Whether the name carries at least one ASCII letter or digit.
///
/// The bucket partitioning scheme cannot address anything else; callers
/// must treat a `false` here as an empty result set, not an error.
pub fn has_search_token(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_alphanumeric())
}
