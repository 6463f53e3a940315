//! Distinct words per speaking character of a movie script.
//!
//! Each input line looks like `CHARACTER: dialogue`. `map` turns a partition
//! of lines into `(character, word)` pairs, one per distinct word per line;
//! `reduce` unions a character's words across the whole corpus and renders
//! them as `[w1, w2, ...]`.

use common::{Application, KeyValue};

mod aggregate;
mod extract;

pub use aggregate::{aggregate, CharacterWordSet};
pub use extract::{extract, split_line, tokenize, CharacterName, DialoguePair, Word, DELIMITER};

pub const NAME: &str = "unique_words";

#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueWords;

impl Application for UniqueWords {
    fn name(&self) -> &str {
        NAME
    }

    fn map(&self, _filename: &str, contents: &str) -> Vec<KeyValue> {
        contents
            .lines()
            .flat_map(|line| extract(line))
            .map(KeyValue::from)
            .collect()
    }

    /// The same word from the same character on different lines of one
    /// partition only needs to reach the reducer once.
    fn combine(&self, mut kvs: Vec<KeyValue>) -> Vec<KeyValue> {
        kvs.sort_unstable();
        kvs.dedup();
        kvs
    }

    fn reduce(&self, key: &str, values: Vec<String>) -> String {
        aggregate(CharacterName::new(key), values).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::group;

    const SCRIPT: &str = "Alice: Hello there! How are you?\n\
                          Bob: I am fine, thanks Alice.\n\
                          Alice: how ARE things today\n";

    fn run(contents: &str) -> Vec<(String, String)> {
        let app = UniqueWords;
        group(app.map("script", contents))
            .into_iter()
            .map(|(key, values)| {
                let output = app.reduce(&key, values);
                (key, output)
            })
            .collect()
    }

    #[test]
    fn test_end_to_end() {
        assert_eq!(
            run(SCRIPT),
            vec![
                (
                    "Alice".to_string(),
                    "[are, hello, how, there, things, today, you]".to_string()
                ),
                ("Bob".to_string(), "[alice, am, fine, i, thanks]".to_string()),
            ]
        );
    }

    #[test]
    fn test_map_dedups_per_line_only() {
        let kvs = UniqueWords.map("s", "Alice: hi hi\nAlice: hi\n");
        assert_eq!(
            kvs,
            vec![KeyValue::new("Alice", "hi"), KeyValue::new("Alice", "hi")]
        );
    }

    #[test]
    fn test_map_skips_noise() {
        let kvs = UniqueWords.map("s", "INT. KITCHEN - NIGHT\n\n   \nBob:\nBob: ok\r\n");
        assert_eq!(kvs, vec![KeyValue::new("Bob", "ok")]);
    }

    #[test]
    fn test_combine_keeps_reduce_output() {
        let kvs = UniqueWords.map("s", SCRIPT);
        let combined = UniqueWords.combine(kvs.clone());
        assert!(combined.len() < kvs.len());
        let alice = |kvs: Vec<KeyValue>| {
            let values = kvs
                .into_iter()
                .filter(|kv| kv.key == "Alice")
                .map(|kv| kv.value)
                .collect();
            UniqueWords.reduce("Alice", values)
        };
        assert_eq!(alice(combined), alice(kvs));
    }

    #[test]
    fn test_character_keys_are_case_sensitive() {
        let out = run("Bob: hi\nBOB: yo\n");
        assert_eq!(
            out,
            vec![
                ("BOB".to_string(), "[yo]".to_string()),
                ("Bob".to_string(), "[hi]".to_string()),
            ]
        );
    }
}
