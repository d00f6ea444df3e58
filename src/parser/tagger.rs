//! Part-of-speech tagging for entity chunking.
//!
//! A lexicon covers the closed word classes and the common sentence openers;
//! everything else is decided by capitalisation and suffix. Only the
//! proper-noun decision matters downstream, the remaining tags keep chunk
//! boundaries honest.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    ProperNoun,
    Noun,
    PluralNoun,
    Verb,
    Gerund,
    PastVerb,
    Modal,
    Determiner,
    Preposition,
    To,
    Conjunction,
    Pronoun,
    Adjective,
    Adverb,
    Number,
    Possessive,
    Symbol,
    Punctuation,
}

impl Tag {
    /// Penn Treebank label.
    pub fn as_penn(self) -> &'static str {
        match self {
            Tag::ProperNoun => "NNP",
            Tag::Noun => "NN",
            Tag::PluralNoun => "NNS",
            Tag::Verb => "VBZ",
            Tag::Gerund => "VBG",
            Tag::PastVerb => "VBD",
            Tag::Modal => "MD",
            Tag::Determiner => "DT",
            Tag::Preposition => "IN",
            Tag::To => "TO",
            Tag::Conjunction => "CC",
            Tag::Pronoun => "PRP",
            Tag::Adjective => "JJ",
            Tag::Adverb => "RB",
            Tag::Number => "CD",
            Tag::Possessive => "POS",
            Tag::Symbol => "SYM",
            Tag::Punctuation => ".",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_penn())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged {
    pub text: String,
    pub tag: Tag,
}

pub fn tag(tokens: &[&str]) -> Vec<Tagged> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut sentence_start = true;

    for &token in tokens {
        let t = tag_one(token, sentence_start);
        sentence_start = match t {
            Tag::Punctuation => matches!(token, "." | "!" | "?") || sentence_start,
            _ => false,
        };
        out.push(Tagged {
            text: token.to_string(),
            tag: t,
        });
    }
    out
}

fn tag_one(token: &str, sentence_start: bool) -> Tag {
    let Some(first) = token.chars().next() else {
        return Tag::Symbol;
    };

    if token.chars().count() == 1 && !first.is_alphanumeric() {
        return match first {
            '$' | '£' | '€' | '%' | '#' | '@' => Tag::Symbol,
            _ => Tag::Punctuation,
        };
    }
    if first.is_ascii_digit() {
        return Tag::Number;
    }
    if first == '\'' {
        return if token.eq_ignore_ascii_case("'s") {
            Tag::Possessive
        } else {
            Tag::Verb
        };
    }

    let lower = token.to_lowercase();
    if let Some(t) = closed_class(&lower) {
        return t;
    }

    let has_upper = token.chars().any(char::is_uppercase);
    if has_upper {
        if sentence_start {
            if let Some(t) = common_opener(&lower) {
                return t;
            }
        }
        return Tag::ProperNoun;
    }

    by_suffix(&lower)
}

fn closed_class(word: &str) -> Option<Tag> {
    let t = match word {
        "the" | "a" | "an" | "this" | "that" | "these" | "those" | "some" | "any" | "each"
        | "every" | "no" | "all" | "both" | "another" | "either" | "neither" => Tag::Determiner,
        "in" | "on" | "at" | "of" | "for" | "with" | "by" | "from" | "into" | "over"
        | "under" | "about" | "after" | "before" | "between" | "through" | "during"
        | "across" | "against" | "among" | "within" | "without" | "via" | "per" | "than"
        | "as" | "like" | "since" | "until" | "upon" | "while" | "if" | "because"
        | "although" | "though" | "whether" | "despite" | "amid" | "towards" => Tag::Preposition,
        "to" => Tag::To,
        "and" | "or" | "but" | "nor" | "yet" | "so" | "plus" => Tag::Conjunction,
        "i" | "you" | "he" | "she" | "it" | "we" | "they" | "me" | "him" | "her" | "us"
        | "them" | "its" | "our" | "their" | "his" | "my" | "your" | "who" | "which"
        | "what" | "whom" | "whose" | "itself" | "themselves" => Tag::Pronoun,
        "can" | "could" | "will" | "would" | "shall" | "should" | "may" | "might" | "must" => {
            Tag::Modal
        }
        "is" | "are" | "am" | "be" | "been" | "has" | "have" | "do" | "does" | "says" | "said"
        | "was" | "were" | "had" | "did" => Tag::Verb,
        "not" | "also" | "however" | "now" | "then" | "there" | "here" | "already" | "still"
        | "just" | "very" | "more" | "most" | "only" | "even" | "when" | "where" | "how"
        | "why" | "meanwhile" | "instead" | "currently" | "recently" => Tag::Adverb,
        _ => return None,
    };
    Some(t)
}

/// Ordinary words that are capitalised only because they open a sentence.
fn common_opener(word: &str) -> Option<Tag> {
    let t = match word {
        "today" | "yesterday" | "last" | "next" | "earlier" | "later" | "once" | "overall"
        | "according" => Tag::Adverb,
        "new" | "first" | "many" | "other" | "such" | "several" | "few" | "big" | "early"
        | "european" | "british" | "german" | "french" => Tag::Adjective,
        "founded" | "based" | "backed" | "led" | "launched" => Tag::PastVerb,
        "startups" | "investors" | "companies" | "researchers" | "founders" => Tag::PluralNoun,
        "investor" | "company" | "startup" | "funding" | "healthcare" | "research" => Tag::Noun,
        _ => return None,
    };
    Some(t)
}

fn by_suffix(word: &str) -> Tag {
    if word.ends_with("ing") && word.len() > 4 {
        Tag::Gerund
    } else if word.ends_with("ed") && word.len() > 3 {
        Tag::PastVerb
    } else if word.ends_with("ly") && word.len() > 3 {
        Tag::Adverb
    } else if word.ends_with("ous") || word.ends_with("ive") || word.ends_with("al") || word.ends_with("ic") {
        Tag::Adjective
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 3 {
        Tag::PluralNoun
    } else {
        Tag::Noun
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokens::tokenize;

    fn tags(text: &str) -> Vec<&'static str> {
        tag(&tokenize(text)).into_iter().map(|t| t.tag.as_penn()).collect()
    }

    #[test]
    fn simple_sentence() {
        assert_eq!(tags("Acme Robotics is hiring."), vec!["NNP", "NNP", "VBZ", "VBG", "."]);
    }

    #[test]
    fn capitalised_opener_is_not_proper() {
        assert_eq!(tags("The startup raised funds."), vec!["DT", "NN", "VBD", "NNS", "."]);
        assert_eq!(tags("Today Acme launched."), vec!["RB", "NNP", "VBD", "."]);
    }

    #[test]
    fn sentence_start_resets_after_period() {
        let tagged = tag(&tokenize("It grew. Founded in 2019, Acme expanded."));
        let founded = tagged.iter().find(|t| t.text == "Founded").unwrap();
        assert_eq!(founded.tag, Tag::PastVerb);
        let acme = tagged.iter().find(|t| t.text == "Acme").unwrap();
        assert_eq!(acme.tag, Tag::ProperNoun);
    }

    #[test]
    fn mid_sentence_opener_word_stays_proper() {
        let tagged = tag(&tokenize("backed by New Ventures"));
        assert_eq!(tagged[2].tag, Tag::ProperNoun);
        assert_eq!(tagged[3].tag, Tag::ProperNoun);
    }

    #[test]
    fn mixed_case_brand() {
        assert_eq!(tags("using eBay"), vec!["VBG", "NNP"]);
    }

    #[test]
    fn symbols_and_numbers() {
        assert_eq!(tags("$ 40% 's"), vec!["SYM", "CD", "POS"]);
    }
}
