//! Line extraction: one script line in, the distinct words its speaker says
//! on that line out.

use common::KeyValue;
use itertools::Itertools;
use std::fmt;
use tracing::trace;

/// Separates the speaker from the dialogue. Only the first one counts.
pub const DELIMITER: char = ':';

/// Speaker of a line, trimmed but otherwise verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharacterName(String);

impl CharacterName {
    pub fn new(raw: &str) -> Self {
        Self(trim(raw).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CharacterName> for String {
    fn from(name: CharacterName) -> Self {
        name.0
    }
}

/// A lowercased, `a`..`z` only, non-empty token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word(String);

impl Word {
    /// Lowercases `token` and drops every character outside `a`..`z`.
    /// `None` when nothing is left.
    pub fn clean(token: &str) -> Option<Self> {
        let cleaned: String = token
            .chars()
            .flat_map(char::to_lowercase)
            .filter(char::is_ascii_lowercase)
            .collect();
        (!cleaned.is_empty()).then_some(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DialoguePair {
    pub character: CharacterName,
    pub word: Word,
}

impl From<DialoguePair> for KeyValue {
    fn from(pair: DialoguePair) -> Self {
        KeyValue {
            key: pair.character.into(),
            value: pair.word.into(),
        }
    }
}

/// Strips spaces and control characters (anything up to `' '`) from both
/// ends. Unicode whitespace is kept.
fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c <= ' ')
}

/// Splits a line into speaker and raw dialogue at the first [`DELIMITER`].
/// Blank lines and lines without one are not dialogue.
pub fn split_line(line: &str) -> Option<(CharacterName, &str)> {
    let line = trim(line);
    if line.is_empty() {
        return None;
    }
    let (character, dialogue) = line.split_once(DELIMITER)?;
    Some((CharacterName::new(character), dialogue))
}

/// Tokens of `dialogue` separated by runs of space, `\t`, `\n`, `\r` or form
/// feed, cleaned; tokens with no letters vanish.
pub fn tokenize(dialogue: &str) -> impl Iterator<Item = Word> + '_ {
    dialogue.split_ascii_whitespace().filter_map(Word::clean)
}

/// Every distinct word of one line, paired with its speaker, in order of
/// first appearance. Non-dialogue lines yield nothing.
pub fn extract(line: &str) -> impl Iterator<Item = DialoguePair> + '_ {
    let parsed = split_line(line);
    if parsed.is_none() {
        trace!(line, "skipping non-dialogue line");
    }
    parsed.into_iter().flat_map(|(character, dialogue)| {
        tokenize(dialogue).unique().map(move |word| DialoguePair {
            character: character.clone(),
            word,
        })
    })
}
