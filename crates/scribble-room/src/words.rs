//! Word lists: the built-in list and newline-separated word files.

use std::io;
use std::path::Path;

/// Words used when no word file is configured.
const DEFAULT_WORDS: &[&str] = &[
    "apple", "banana", "bicycle", "bridge", "butterfly", "camera", "candle", "castle",
    "cloud", "compass", "dragon", "drum", "elephant", "feather", "fence", "giraffe",
    "guitar", "hammer", "helicopter", "house", "island", "jellyfish", "kangaroo", "kite",
    "ladder", "lamp", "lighthouse", "mountain", "mushroom", "octopus", "owl", "penguin",
    "piano", "pizza", "pyramid", "rainbow", "robot", "rocket", "sailboat", "scissors",
    "snowman", "spider", "sun", "sunflower", "telescope", "tent", "tornado", "train",
    "tree", "turtle", "umbrella", "volcano", "waterfall", "whale", "windmill", "zebra",
];

/// Returns an owned copy of the built-in word list.
pub fn default_words() -> Vec<String> {
    DEFAULT_WORDS.iter().map(|w| (*w).to_owned()).collect()
}

/// Parses a word list: one word per line, blank lines and `#` comments skipped.
pub fn parse_words(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

/// Reads and parses a word file.
///
/// # Errors
/// Returns the underlying I/O error if the file cannot be read.
pub fn load_words(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_words(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_words_are_distinct_and_plenty() {
        let words = default_words();
        let mut sorted = words.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), words.len());
        assert!(words.len() >= 3);
    }

    #[test]
    fn test_parse_words_skips_blanks_and_comments() {
        let words = parse_words("# animals\ncat\n\n  dog  \n#bird\nfish\n");
        assert_eq!(words, vec!["cat", "dog", "fish"]);
    }

    #[test]
    fn test_load_words_missing_file_is_error() {
        assert!(load_words("/definitely/not/a/word/file.txt").is_err());
    }
}
