//! Splits narrative lines into addressable tokens.
//!
//! Word lines become one token per whitespace-separated word with the
//! whitespace kept as non-addressable gaps; lines containing a configured
//! phrase become a single phrase token so they reveal atomically.

/// One addressable unit of narrative text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub index: usize,
    pub text: String,
    pub is_phrase: bool,
    pub revealed: bool,
}

/// Piece of a rebuilt line: either a token (by global index) or raw whitespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Token(usize),
    Gap(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenizedText {
    pub tokens: Vec<Token>,
    /// Per input line, the segments in display order.
    pub lines: Vec<Vec<Segment>>,
}

pub struct Tokenizer {
    phrases: Vec<String>,
}

impl Tokenizer {
    pub fn new<S: AsRef<str>>(phrase_lines: &[S]) -> Self {
        Self {
            phrases: phrase_lines
                .iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_phrase_line(&self, line: &str) -> bool {
        let lowered = line.trim().to_lowercase();
        self.phrases.iter().any(|p| lowered.contains(p.as_str()))
    }

    pub fn tokenize<S: AsRef<str>>(&self, lines: &[S]) -> TokenizedText {
        let mut out = TokenizedText::default();
        for line in lines {
            let line = line.as_ref();
            let mut segments = Vec::new();
            if self.is_phrase_line(line) {
                let text = line.trim();
                if !text.is_empty() {
                    segments.push(Segment::Token(push_token(&mut out.tokens, text, true)));
                }
            } else {
                for (is_gap, piece) in split_keep_whitespace(line) {
                    if is_gap {
                        segments.push(Segment::Gap(piece.to_owned()));
                    } else {
                        segments.push(Segment::Token(push_token(&mut out.tokens, piece, false)));
                    }
                }
            }
            out.lines.push(segments);
        }
        out
    }
}

fn push_token(tokens: &mut Vec<Token>, text: &str, is_phrase: bool) -> usize {
    let index = tokens.len();
    tokens.push(Token { index, text: text.to_owned(), is_phrase, revealed: false });
    index
}

/// Alternating runs of non-whitespace and whitespace, flagged `true` for
/// whitespace. Never yields empty pieces.
fn split_keep_whitespace(line: &str) -> Vec<(bool, &str)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (i, c) in line.char_indices() {
        let ws = c.is_whitespace();
        match current {
            Some(kind) if kind == ws => {}
            Some(kind) => {
                pieces.push((kind, &line[start..i]));
                start = i;
                current = Some(ws);
            }
            None => current = Some(ws),
        }
    }
    if let Some(kind) = current {
        pieces.push((kind, &line[start..]));
    }
    pieces
}
