use std::collections::HashMap;
use std::path::Path;

use super::{ClassifierError, UnknownPolicy};

/// Key under which a vocabulary file may declare its own unknown index.
pub const UNKNOWN_KEY: &str = "<unk>";

/// Character → embedding-row mapping.
///
/// Characters absent from training map to a reserved unknown row: the
/// file's `<unk>` entry when it has one, otherwise the row right after the
/// highest trained index.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    index: HashMap<char, usize>,
    unknown: usize,
}

impl Vocabulary {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: HashMap<String, usize> =
            serde_json::from_str(&raw).map_err(|source| ClassifierError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: HashMap<String, usize>) -> Result<Self, ClassifierError> {
        let mut index = HashMap::with_capacity(entries.len());
        let mut unknown = None;

        for (key, idx) in entries {
            if key == UNKNOWN_KEY {
                unknown = Some(idx);
                continue;
            }
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    index.insert(c, idx);
                }
                _ => {
                    return Err(ClassifierError::Shape(format!(
                        "vocabulary key {key:?} is not a single character"
                    )))
                }
            }
        }

        if index.is_empty() {
            return Err(ClassifierError::EmptyVocabulary);
        }
        let unknown = unknown.unwrap_or_else(|| index.values().max().map_or(0, |m| m + 1));
        Ok(Self { index, unknown })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn unknown_index(&self) -> usize {
        self.unknown
    }

    /// Largest row index this vocabulary can emit.
    pub fn max_index(&self) -> usize {
        self.index.values().copied().max().unwrap_or(0).max(self.unknown)
    }

    pub fn encode(&self, name: &str, policy: UnknownPolicy) -> Result<Vec<usize>, ClassifierError> {
        name.chars()
            .map(|c| match (self.index.get(&c), policy) {
                (Some(&i), _) => Ok(i),
                (None, UnknownPolicy::Substitute) => Ok(self.unknown),
                (None, UnknownPolicy::Reject) => Err(ClassifierError::UnknownSymbol {
                    symbol: c,
                    name: name.to_string(),
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(chars: &str) -> Vocabulary {
        Vocabulary::from_entries(chars.chars().enumerate().map(|(i, c)| (c.to_string(), i)).collect())
            .unwrap()
    }

    #[test]
    fn implicit_unknown_follows_last_index() {
        let v = vocab("abc");
        assert_eq!(v.unknown_index(), 3);
        assert_eq!(v.max_index(), 3);
        assert_eq!(v.encode("cab", UnknownPolicy::Substitute).unwrap(), vec![2, 0, 1]);
    }

    #[test]
    fn substitute_maps_unseen_to_unknown() {
        let v = vocab("ab");
        assert_eq!(v.encode("a?b", UnknownPolicy::Substitute).unwrap(), vec![0, 2, 1]);
    }

    #[test]
    fn reject_reports_the_symbol() {
        let v = vocab("ab");
        let err = v.encode("a?b", UnknownPolicy::Reject).unwrap_err();
        assert!(matches!(err, ClassifierError::UnknownSymbol { symbol: '?', .. }));
    }

    #[test]
    fn explicit_unknown_entry() {
        let entries = HashMap::from([
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            (UNKNOWN_KEY.to_string(), 0),
        ]);
        let v = Vocabulary::from_entries(entries).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v.encode("z", UnknownPolicy::Substitute).unwrap(), vec![0]);
    }

    #[test]
    fn multi_char_key_is_rejected() {
        let entries = HashMap::from([("ab".to_string(), 0)]);
        assert!(matches!(Vocabulary::from_entries(entries), Err(ClassifierError::Shape(_))));
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        assert!(matches!(
            Vocabulary::from_entries(HashMap::new()),
            Err(ClassifierError::EmptyVocabulary)
        ));
    }

    #[test]
    fn loads_fixture() {
        let v = Vocabulary::load(Path::new("tests/fixtures/vocab.json")).unwrap();
        assert!(v.len() >= 27);
        assert!(v.encode("acme_robotics", UnknownPolicy::Reject).is_ok());
    }

    #[test]
    fn missing_file() {
        let err = Vocabulary::load(Path::new("tests/fixtures/nope.json")).unwrap_err();
        assert!(matches!(err, ClassifierError::Io { .. }));
    }
}
