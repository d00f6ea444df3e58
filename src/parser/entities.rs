use std::collections::BTreeSet;

use super::chunker::{Chunker, Label};
use super::tagger;
use super::tokens;

/// Named-entity strings found in plaintext.
///
/// Noisy by nature: people, places and capitalised phrases come out alongside
/// company names. The classifier downstream is the filter.
pub fn extract(text: &str, chunker: &dyn Chunker) -> BTreeSet<String> {
    let words = tokens::tokenize(text);
    if words.is_empty() {
        return BTreeSet::new();
    }
    let tagged = tagger::tag(&words);
    chunker
        .chunk(&tagged)
        .into_iter()
        .filter(|c| c.label == Label::Entity)
        .map(|c| c.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::chunker::ProperNounChunker;

    #[test]
    fn single_company() {
        let found = extract("Acme Robotics is hiring.", &ProperNounChunker);
        assert_eq!(found, BTreeSet::from(["Acme Robotics".to_string()]));
    }

    #[test]
    fn duplicates_collapse() {
        let found = extract("Acme hired. Acme grew. Then Acme sold.", &ProperNounChunker);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn empty_text() {
        assert!(extract("", &ProperNounChunker).is_empty());
        assert!(extract("   ", &ProperNounChunker).is_empty());
    }

    #[test]
    fn lowercase_text_has_no_entities() {
        assert!(extract("nothing capitalised in here at all.", &ProperNounChunker).is_empty());
    }

    #[test]
    fn same_input_same_output() {
        let text = "Benevolent Labs and Acme Robotics partnered with Oxford University.";
        assert_eq!(extract(text, &ProperNounChunker), extract(text, &ProperNounChunker));
    }
}
