use crate::extract::CharacterName;
use itertools::Itertools;
use std::{collections::BTreeSet, fmt};

/// Every distinct word one character speaks across the whole corpus.
///
/// Words are kept sorted, so iteration and the `[w1, w2, ...]` rendering are
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterWordSet {
    character: CharacterName,
    words: BTreeSet<String>,
}

impl CharacterWordSet {
    pub fn character(&self) -> &CharacterName {
        &self.character
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for CharacterWordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.words.iter().join(", "))
    }
}

/// Unions every word emitted for `character`; repeats from different lines
/// collapse.
pub fn aggregate<I>(character: CharacterName, words: I) -> CharacterWordSet
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    CharacterWordSet {
        character,
        words: words.into_iter().map(Into::into).collect(),
    }
}
