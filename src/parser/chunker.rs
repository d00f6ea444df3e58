use super::tagger::{Tag, Tagged};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Entity,
    Outside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub label: Label,
    pub tokens: Vec<String>,
}

impl Chunk {
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Groups tagged tokens into named-entity / not-entity spans.
pub trait Chunker {
    fn chunk(&self, tagged: &[Tagged]) -> Vec<Chunk>;
}

/// Binary chunker over proper-noun runs.
///
/// A run of proper nouns forms one entity; a lone `&` between two proper
/// nouns is kept inside it ("Johnson & Johnson"). Runs made only of calendar
/// words are not entities.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProperNounChunker;

impl Chunker for ProperNounChunker {
    fn chunk(&self, tagged: &[Tagged]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut i = 0;

        while i < tagged.len() {
            if tagged[i].tag != Tag::ProperNoun {
                chunks.push(Chunk {
                    label: Label::Outside,
                    tokens: vec![tagged[i].text.clone()],
                });
                i += 1;
                continue;
            }

            let mut run = vec![tagged[i].text.clone()];
            let mut j = i + 1;
            while j < tagged.len() {
                if tagged[j].tag == Tag::ProperNoun {
                    run.push(tagged[j].text.clone());
                    j += 1;
                } else if tagged[j].text == "&"
                    && tagged.get(j + 1).is_some_and(|t| t.tag == Tag::ProperNoun)
                {
                    run.push(tagged[j].text.clone());
                    run.push(tagged[j + 1].text.clone());
                    j += 2;
                } else {
                    break;
                }
            }

            let label = if run.iter().all(|t| is_calendar_word(t)) {
                Label::Outside
            } else {
                Label::Entity
            };
            chunks.push(Chunk { label, tokens: run });
            i = j;
        }

        chunks
    }
}

fn is_calendar_word(word: &str) -> bool {
    const WORDS: &[&str] = &[
        "january", "february", "march", "april", "may", "june", "july", "august",
        "september", "october", "november", "december", "jan", "feb", "mar", "apr",
        "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "monday", "tuesday",
        "wednesday", "thursday", "friday", "saturday", "sunday",
    ];
    WORDS.contains(&word.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tagger::tag;
    use crate::parser::tokens::tokenize;

    fn entities(text: &str) -> Vec<String> {
        ProperNounChunker
            .chunk(&tag(&tokenize(text)))
            .into_iter()
            .filter(|c| c.label == Label::Entity)
            .map(|c| c.text())
            .collect()
    }

    #[test]
    fn contiguous_proper_nouns_form_one_entity() {
        assert_eq!(entities("Acme Robotics is hiring."), vec!["Acme Robotics"]);
    }

    #[test]
    fn ampersand_inside_entity() {
        assert_eq!(entities("a deal with Johnson & Johnson today"), vec!["Johnson & Johnson"]);
    }

    #[test]
    fn trailing_ampersand_is_not_swallowed() {
        assert_eq!(entities("with Acme & the others"), vec!["Acme"]);
    }

    #[test]
    fn calendar_words_are_outside() {
        assert!(entities("it closed in March").is_empty());
        assert_eq!(entities("on Monday Benevolent Labs said"), vec!["Monday Benevolent Labs"]);
    }

    #[test]
    fn every_token_is_covered() {
        let tagged = tag(&tokenize("Acme Robotics is hiring."));
        let chunks = ProperNounChunker.chunk(&tagged);
        let covered: usize = chunks.iter().map(|c| c.tokens.len()).sum();
        assert_eq!(covered, tagged.len());
    }
}
