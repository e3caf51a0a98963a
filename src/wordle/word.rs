use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use super::{constraints::ConstraintErr, prelude::*};

///
/// A five letter, lowercase ASCII word. Stored as a fixed size byte array so it is Copy and can be
/// indexed by position without any UTF-8 concerns.
///
/// The only way to build one from text is through parsing (FromStr / TryFrom), which normalizes
/// and validates, so a Word in hand is always a valid wordle_str.
///
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word([u8; WORD_SIZE]);

impl Word {
    /// Builds a Word from raw bytes, if they form a wordle_str
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if !is_wordle_str_bytes(bytes) {
            return None;
        }

        let mut out = [0u8; WORD_SIZE];
        out.copy_from_slice(bytes);
        Some(Self(out))
    }

    pub fn bytes(&self) -> &[u8; WORD_SIZE] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // every byte was checked to be lowercase ascii on the way in
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// The letter at the given position
    pub fn at(&self, position: usize) -> u8 {
        self.0[position]
    }

    pub fn contains(&self, letter: u8) -> bool {
        self.0.contains(&letter)
    }

    pub fn letter_counts(&self) -> [usize; ALPHABET_SIZE] {
        count_letters_bytes(&self.0)
    }

    pub fn unique_letters(&self) -> [bool; ALPHABET_SIZE] {
        unique_letters_bytes(&self.0)
    }
}

impl FromStr for Word {
    type Err = ConstraintErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_wordle_word(s);
        Self::from_bytes(normalized.as_bytes()).ok_or(ConstraintErr::InvalidWord(normalized))
    }
}

impl TryFrom<String> for Word {
    type Error = ConstraintErr;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.as_str().to_string()
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Word({})", self.as_str())
    }
}

///
/// The corpus of valid words. Keeps the order words were loaded in (the bundled list is ordered
/// from most to least common, and the pool builder relies on that), and never holds a duplicate.
///
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    words: Vec<Word>,
    index: HashSet<Word>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a word, returning false if it was already present
    pub fn insert(&mut self, word: Word) -> bool {
        if self.index.insert(word) {
            self.words.push(word);
            true
        } else {
            false
        }
    }

    /// Parses every entry, silently skipping anything that isn't a wordle word. Use
    /// DictionaryLoader when you want to know how many entries were dropped.
    pub fn from_strs<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        words.into_iter()
            .filter_map(|w| w.parse().ok())
            .collect()
    }

    pub fn contains(&self, word: &Word) -> bool {
        self.index.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> + '_ {
        self.words.iter()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// The first n words in load order (all of them when n exceeds the length)
    pub fn first_n(&self, n: usize) -> &[Word] {
        &self.words[..n.min(self.words.len())]
    }
}

impl FromIterator<Word> for Dictionary {
    fn from_iter<T: IntoIterator<Item = Word>>(iter: T) -> Self {
        let mut out = Self::new();
        for word in iter {
            out.insert(word);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("crane", true)]
    #[test_case("  Crane ", true ; "normalizes case and spacing")]
    #[test_case("cran", false)]
    #[test_case("cranes", false)]
    #[test_case("cr4ne", false)]
    #[test_case("crané", false)]
    fn test_parse_word(input: &str, valid: bool) {
        assert_eq!(input.parse::<Word>().is_ok(), valid, "input={:?}", input);
    }

    #[test]
    fn test_word_display_round_trip() {
        let word: Word = "slate".parse().unwrap();
        assert_eq!(word.to_string(), "slate");
        assert_eq!(word.at(0), b's');
        assert!(word.contains(b't'));
        assert!(!word.contains(b'z'));
    }

    #[test]
    fn test_word_serializes_as_string() {
        let word: Word = "pride".parse().unwrap();
        let json = serde_json::to_string(&word).unwrap();
        assert_eq!(json, "\"pride\"");
        let back: Word = serde_json::from_str(&json).unwrap();
        assert_eq!(back, word);
        assert!(serde_json::from_str::<Word>("\"pri\"").is_err());
    }

    #[test]
    fn test_dictionary_dedupes_and_keeps_order() {
        let dict = Dictionary::from_strs(["crane", "slate", "crane", "bad", "trace"]);
        let words: Vec<String> = dict.iter().map(|w| w.to_string()).collect();
        assert_eq!(words, vec!["crane", "slate", "trace"]);
        assert_eq!(dict.first_n(2).len(), 2);
        assert_eq!(dict.first_n(200).len(), 3);
    }
}
