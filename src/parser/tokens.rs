use std::sync::LazyLock;

use regex::Regex;

// Order matters: clitics before words so "Acme's" splits into "Acme" + "'s".
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \d+(?:[.,]\d+)*%?                   # numbers, 1,200.5 and 40%
        | [\p{L}\p{N}]+(?:[-&.][\p{L}\p{N}]+)* # words, hyphenated, dotted (U.S)
        | '[\p{L}]+                         # clitics 's 're 'll
        | \S                                # any other single symbol
        ",
    )
    .unwrap()
});

/// Split plaintext into word and punctuation tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_trailing_period() {
        assert_eq!(tokenize("Acme Robotics is hiring."), vec!["Acme", "Robotics", "is", "hiring", "."]);
    }

    #[test]
    fn possessive_clitic() {
        assert_eq!(tokenize("Acme's model"), vec!["Acme", "'s", "model"]);
    }

    #[test]
    fn keeps_compound_words() {
        assert_eq!(tokenize("AT&T and Hoffmann-La Roche"), vec!["AT&T", "and", "Hoffmann-La", "Roche"]);
    }

    #[test]
    fn numbers_and_currency() {
        assert_eq!(tokenize("raised $1,200.5m (40%)"), vec!["raised", "$", "1,200.5", "m", "(", "40%", ")"]);
    }

    #[test]
    fn empty_and_blank() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n\t ").is_empty());
    }
}
