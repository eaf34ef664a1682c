//! Lexeme ranking and trigram similarity used by the category text store.
//!
//! These mirror the semantics of a full-text engine closely enough for
//! category lookup: plain matching requires every query lexeme, prefix
//! matching requires every prefix term, and trigram similarity is the
//! Jaccard index over padded word trigrams. Spanish stopwords are not
//! lexemes, so "plomero de fugas" searches for `plomero` and `fugas`.

use std::collections::HashSet;

/// Minimum trigram similarity for a row to count as a fuzzy match.
pub const TRIGRAM_MATCH_THRESHOLD: f64 = 0.3;

/// Characters with operator meaning inside a lexeme query.
const LEXEME_OPERATOR_CHARS: &[char] = &['&', '|', '!', '(', ')', ':', '*', '<', '>', '\'', '"', '\\'];

const RANK_UNIT: f64 = 0.1;

/// Function words dropped before lexeme matching (accent-folded).
const STOPWORDS: &[&str] = &[
    "a", "al", "con", "de", "del", "e", "el", "en", "la", "las", "lo", "los", "o", "para",
    "por", "sin", "su", "un", "una", "unas", "unos", "y",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.iter().any(|stopword| *stopword == word)
}

/// Build a prefix query expression from free text.
///
/// `"plomero de fu"` becomes `"plomero:* & fu:*"`. Returns `None` when no
/// token survives operator and stopword stripping.
pub fn build_prefix_expression(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| !LEXEME_OPERATOR_CHARS.contains(c))
                .collect::<String>()
        })
        .filter(|token| !token.is_empty() && !is_stopword(&normalize(token)))
        .map(|token| format!("{}:*", token))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" & "))
    }
}

/// Split text into normalized lexemes (lowercase, accents folded,
/// stopwords removed).
pub fn lexemes(text: &str) -> Vec<String> {
    words(text).filter(|w| !is_stopword(w)).collect()
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(normalize)
}

fn normalize(word: &str) -> String {
    word.chars().flat_map(char::to_lowercase).map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        other => other,
    }
}

fn normalized_rank(hits: usize, document_len: usize) -> f64 {
    if hits == 0 || document_len == 0 {
        return 0.0;
    }
    RANK_UNIT * hits as f64 / (1.0 + (document_len as f64).ln())
}

/// Plain full-text rank of `query` against `document`.
///
/// Zero unless every query lexeme occurs in the document; otherwise grows
/// with occurrence count and shrinks with document length.
pub fn fts_rank(document: &str, query: &str) -> f64 {
    let doc = lexemes(document);
    let terms: HashSet<String> = lexemes(query).into_iter().collect();
    if terms.is_empty() {
        return 0.0;
    }

    if !terms.iter().all(|t| doc.contains(t)) {
        return 0.0;
    }

    let hits = doc.iter().filter(|l| terms.contains(*l)).count();
    normalized_rank(hits, doc.len())
}

/// Prefix rank of a `term:* & term:*` expression against `document`.
pub fn fts_prefix_rank(document: &str, expression: &str) -> f64 {
    let prefixes: Vec<String> = expression
        .split('&')
        .map(|term| term.trim().trim_end_matches(":*"))
        .flat_map(lexemes)
        .collect();
    if prefixes.is_empty() {
        return 0.0;
    }

    let doc = lexemes(document);
    if !prefixes
        .iter()
        .all(|p| doc.iter().any(|l| l.starts_with(p.as_str())))
    {
        return 0.0;
    }

    let hits = doc
        .iter()
        .filter(|l| prefixes.iter().any(|p| l.starts_with(p.as_str())))
        .count();
    normalized_rank(hits, doc.len())
}

/// Padded word trigrams: `"fuga"` yields `"  f"`, `" fu"`, `"fug"`, `"uga"`, `"ga "`.
fn trigrams(text: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    for word in words(text) {
        let padded: Vec<char> = "  ".chars().chain(word.chars()).chain(" ".chars()).collect();
        for window in padded.windows(3) {
            set.insert(window.iter().collect());
        }
    }
    set
}

/// Trigram similarity in `[0, 1]`: shared trigrams over the union.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    shared as f64 / union as f64
}

/// Combined ranking score: plain and prefix ranks weigh twice the similarity.
pub fn combined_score(plain_rank: f64, prefix_rank: f64, similarity: f64) -> f64 {
    2.0 * plain_rank + 2.0 * prefix_rank + similarity
}

/// Whether a row satisfies the match predicate.
pub fn is_match(plain_rank: f64, prefix_rank: f64, similarity: f64) -> bool {
    plain_rank > 0.0 || prefix_rank > 0.0 || similarity >= TRIGRAM_MATCH_THRESHOLD
}
