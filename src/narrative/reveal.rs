//! Token reveal state. Always recomputed from the count, never patched, since
//! scroll direction can reverse between ticks.

use super::tokenizer::Token;

/// Reveal tokens with `index < count`, hide the rest. Returns how many tokens
/// changed state.
pub fn apply_reveal_count(tokens: &mut [Token], count: usize) -> usize {
    let mut changed = 0;
    for token in tokens.iter_mut() {
        let revealed = token.index < count;
        if token.revealed != revealed {
            token.revealed = revealed;
            changed += 1;
        }
    }
    changed
}

pub fn revealed_count(tokens: &[Token]) -> usize {
    tokens.iter().filter(|t| t.revealed).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::tokenizer::Tokenizer;

    #[test]
    fn reveal_is_a_prefix_and_reversible() {
        let mut tokens = Tokenizer::new::<&str>(&[]).tokenize(&["a b c d e"]).tokens;
        assert_eq!(apply_reveal_count(&mut tokens, 3), 3);
        assert_eq!(
            tokens.iter().map(|t| t.revealed).collect::<Vec<_>>(),
            [true, true, true, false, false]
        );
        assert_eq!(apply_reveal_count(&mut tokens, 1), 2);
        assert_eq!(revealed_count(&tokens), 1);
        assert_eq!(apply_reveal_count(&mut tokens, 1), 0);
        apply_reveal_count(&mut tokens, 99);
        assert_eq!(revealed_count(&tokens), 5);
    }
}
