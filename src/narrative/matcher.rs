//! Keyword detection over revealed tokens.
//!
//! Rules per configured key:
//! - multi-word keys match a consecutive run of revealed tokens whose
//!   normalized texts equal the key's words, or a single revealed token equal
//!   to the words concatenated (phrase tokens);
//! - numeric keys match exactly or at a hyphen boundary (`50-strands`), never
//!   inside a longer number (`150`);
//! - other single-word keys match exactly or as a substring of the normalized
//!   token.
//!
//! When several entries match, the last one in configuration order wins.

use std::collections::HashSet;
use std::ops::Range;

use log::info;

use super::tokenizer::Token;
use crate::config::KeywordEntry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub key: String,
    /// Token indices covered by the match; never empty.
    pub span: Range<usize>,
}

impl MatchResult {
    pub fn start_index(&self) -> usize {
        self.span.start
    }

    pub fn span_tokens<'a>(&self, tokens: &'a [Token]) -> &'a [Token] {
        &tokens[self.span.clone()]
    }
}

/// Outcome of evaluating every entry against the current reveal state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub active: Option<MatchResult>,
    /// Keys that matched this tick, in configuration order.
    pub matched: Vec<String>,
}

impl Evaluation {
    pub fn is_matched(&self, key: &str) -> bool {
        self.matched.iter().any(|k| k == key)
    }
}

/// Lowercase and keep only ASCII letters and digits.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum KeyPattern {
    Phrase { words: Vec<String>, joined: String },
    Numeric(String),
    Word(String),
    /// Normalizes to nothing; can never match.
    Empty,
}

impl KeyPattern {
    fn compile(key: &str) -> Self {
        let words: Vec<&str> = key.split_whitespace().collect();
        if words.len() > 1 {
            let words: Vec<String> = words.iter().map(|w| normalize(w)).collect();
            let joined = words.concat();
            return KeyPattern::Phrase { words, joined };
        }
        let key = key.trim();
        if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
            return KeyPattern::Numeric(key.to_owned());
        }
        match normalize(key) {
            n if n.is_empty() => KeyPattern::Empty,
            n => KeyPattern::Word(n),
        }
    }

    fn find(&self, tokens: &[Token], normalized: &[String]) -> Option<Range<usize>> {
        match self {
            KeyPattern::Phrase { words, joined } => {
                let k = words.len();
                if tokens.len() >= k {
                    for i in 0..=tokens.len() - k {
                        let run = (0..k).all(|j| tokens[i + j].revealed && normalized[i + j] == words[j]);
                        if run {
                            return Some(i..i + k);
                        }
                    }
                }
                (0..tokens.len())
                    .find(|&i| tokens[i].revealed && normalized[i] == *joined)
                    .map(|i| i..i + 1)
            }
            KeyPattern::Numeric(key) => (0..tokens.len())
                .find(|&i| {
                    tokens[i].revealed
                        && (normalized[i] == *key || numeric_boundary(&tokens[i].text.to_lowercase(), key))
                })
                .map(|i| i..i + 1),
            KeyPattern::Word(key) => (0..tokens.len())
                .find(|&i| tokens[i].revealed && normalized[i].contains(key.as_str()))
                .map(|i| i..i + 1),
            KeyPattern::Empty => None,
        }
    }
}

/// `key` at the start or end of `word`, bounded by a hyphen or the word edge.
fn numeric_boundary(word: &str, key: &str) -> bool {
    let starts = word
        .strip_prefix(key)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'));
    let ends = word
        .strip_suffix(key)
        .is_some_and(|head| head.is_empty() || head.ends_with('-'));
    starts || ends
}

/// Non-memoized single-entry match used when no matcher is at hand.
pub fn find_keyword_match(entry: &KeywordEntry, tokens: &[Token]) -> Option<MatchResult> {
    let normalized: Vec<String> = tokens.iter().map(|t| normalize(&t.text)).collect();
    KeyPattern::compile(&entry.key)
        .find(tokens, &normalized)
        .map(|span| MatchResult { key: entry.key.clone(), span })
}

/// Last matching entry in configuration order.
pub fn find_active_match(entries: &[KeywordEntry], tokens: &[Token]) -> Option<MatchResult> {
    entries.iter().filter_map(|e| find_keyword_match(e, tokens)).last()
}

/// Compiled keyword table bound to one token sequence. Token text never
/// changes after tokenization, so normalized forms are computed once.
pub struct KeywordMatcher {
    keys: Vec<(String, KeyPattern)>,
    normalized: Vec<String>,
    triggered: HashSet<String>,
}

impl KeywordMatcher {
    pub fn new(entries: &[KeywordEntry], tokens: &[Token]) -> Self {
        Self {
            keys: entries
                .iter()
                .map(|e| (e.key.clone(), KeyPattern::compile(&e.key)))
                .collect(),
            normalized: tokens.iter().map(|t| normalize(&t.text)).collect(),
            triggered: HashSet::new(),
        }
    }

    pub fn evaluate(&self, tokens: &[Token]) -> Evaluation {
        debug_assert_eq!(tokens.len(), self.normalized.len());
        let mut eval = Evaluation::default();
        for (key, pattern) in &self.keys {
            if let Some(span) = pattern.find(tokens, &self.normalized) {
                eval.matched.push(key.clone());
                eval.active = Some(MatchResult { key: key.clone(), span });
            }
        }
        eval
    }

    /// Add this tick's matches to the page-lifetime triggered set, returning
    /// the keys seen for the first time.
    pub fn record_triggers(&mut self, eval: &Evaluation) -> Vec<String> {
        let mut fresh = Vec::new();
        for key in &eval.matched {
            if self.triggered.insert(key.clone()) {
                info!("keyword triggered: {key}");
                fresh.push(key.clone());
            }
        }
        fresh
    }

    pub fn has_triggered(&self, key: &str) -> bool {
        self.triggered.contains(key)
    }
}
