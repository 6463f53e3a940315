use anyhow::Context;
use itertools::Itertools;
use std::{fs::read_to_string, io, path::Path};

/// Path that stands for standard input.
pub const STDIN: &str = "-";

/// One input partition handed to a single `map` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub name: String,
    pub contents: String,
}

impl Input {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let name = path.to_string_lossy().into_owned();
        let contents = if name == STDIN {
            io::read_to_string(io::stdin()).context("failed to read stdin")?
        } else {
            read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
        };
        Ok(Self { name, contents })
    }

    /// Splits into partitions of at most `lines` lines each, never cutting a
    /// line in two. `0` keeps the input whole.
    pub fn split(self, lines: usize) -> Vec<Input> {
        if lines == 0 {
            return vec![self];
        }
        let chunks = self.contents.split_inclusive('\n').chunks(lines);
        let partitions = chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| Input::new(format!("{}#{}", self.name, i), chunk.collect::<String>()))
            .collect_vec();
        partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_keeps_lines_whole() {
        let input = Input::new("script", "A: one\nB: two\nA: three\n");
        let parts = input.split(2);
        assert_eq!(
            parts,
            vec![
                Input::new("script#0", "A: one\nB: two\n"),
                Input::new("script#1", "A: three\n"),
            ]
        );
    }

    #[test]
    fn test_split_without_trailing_newline() {
        let parts = Input::new("s", "a\nb").split(1);
        assert_eq!(parts, vec![Input::new("s#0", "a\n"), Input::new("s#1", "b")]);
    }

    #[test]
    fn test_split_zero_is_whole() {
        let input = Input::new("s", "a\nb\n");
        assert_eq!(input.clone().split(0), vec![input]);
    }

    #[test]
    fn test_split_empty_has_no_partitions() {
        assert!(Input::new("s", "").split(3).is_empty());
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Alice: hi").unwrap();
        let input = Input::read(file.path()).unwrap();
        assert_eq!(input.contents, "Alice: hi\n");
        assert_eq!(input.name, file.path().to_string_lossy());
    }

    #[test]
    fn test_read_missing_file() {
        let err = Input::read(Path::new("/no/such/script.txt")).unwrap_err();
        assert!(err.to_string().contains("/no/such/script.txt"));
    }
}
