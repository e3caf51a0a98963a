/*
 * MIT License
 *
 * Copyright (c) 2022 Joseph Sacchini
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::Utf8Error;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use lazy_static::lazy_static;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::wordle::{prelude::*, word::{Dictionary, Word}};

// Stores the data which is embedded into the binary (and read from disk as a fallback)
pub const EMBED_DATA_DIRECTORY: &str = "txt_data/";
pub const WORD_LIST_FILE_NAME: &str = "wordlist.txt";
pub const FREQUENCY_FILE_NAME: &str = "word_freq.json";

// Used when every configured word source fails. Enough to keep the engine answering.
pub const FALLBACK_WORDS: [&str; 5] = ["crane", "slate", "trace", "least", "stale"];

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(5);

lazy_static! {
    static ref FALLBACK_DICTIONARY: Dictionary = Dictionary::from_strs(FALLBACK_WORDS);
}

#[derive(RustEmbed)]
#[folder = "txt_data/"]
struct RawData;

#[derive(Error, Debug)]
pub enum LoadDataErr {
    #[error("missing data file '{0}'")]
    MissingFile(String),
    #[error(transparent)]
    EncodingError(#[from] Utf8Error),
    #[error("malformed frequency data")]
    MalformedJson(#[from] serde_json::Error),
    #[error("failed to read '{0}'")]
    Io(String, #[source] std::io::Error),
    #[error("word source '{0}' had no valid words")]
    EmptySource(String),
    #[error("word source '{0}' did not finish loading within {1:?}")]
    Timeout(String, Duration),
    #[error("word source '{0}' stopped without a result")]
    Disconnected(String),
    #[error("no word sources are configured")]
    NoSources,
}

///
/// Somewhere a list of words can be read from. The loader handles validation, so a source just
/// hands back raw lines.
///
pub trait WordSource: Send + Sync {
    /// Used in logs and errors
    fn name(&self) -> String;

    fn load(&self) -> Result<Vec<String>, LoadDataErr>;
}

/// The word list compiled into the binary
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedWordList;

impl WordSource for EmbeddedWordList {
    fn name(&self) -> String {
        format!("embedded:{}", WORD_LIST_FILE_NAME)
    }

    fn load(&self) -> Result<Vec<String>, LoadDataErr> {
        Ok(retrieve_file_as_str(WORD_LIST_FILE_NAME)?
            .ok_or_else(|| LoadDataErr::MissingFile(WORD_LIST_FILE_NAME.to_string()))?
            .lines()
            .map(|l| l.to_string())
            .collect())
    }
}

/// A line delimited word list on disk
#[derive(Clone, Debug)]
pub struct FileWordList(pub PathBuf);

impl WordSource for FileWordList {
    fn name(&self) -> String {
        format!("file:{}", self.0.display())
    }

    fn load(&self) -> Result<Vec<String>, LoadDataErr> {
        let raw = std::fs::read_to_string(&self.0)
            .map_err(|err| LoadDataErr::Io(self.0.display().to_string(), err))?;
        Ok(raw.lines().map(|l| l.to_string()).collect())
    }
}

/// Words given directly, mostly for tests and small custom games
#[derive(Clone, Debug)]
pub struct InlineWordList(pub Vec<String>);

impl InlineWordList {
    pub fn new<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self(words.into_iter().map(|w| w.to_string()).collect())
    }
}

impl WordSource for InlineWordList {
    fn name(&self) -> String {
        format!("inline:{} words", self.0.len())
    }

    fn load(&self) -> Result<Vec<String>, LoadDataErr> {
        Ok(self.0.clone())
    }
}

/// Serializable description of a word source, for config files
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WordSourceConfig {
    Embedded,
    File { path: PathBuf },
    Inline { words: Vec<String> },
}

impl WordSourceConfig {
    pub fn build(&self) -> Arc<dyn WordSource> {
        match self {
            WordSourceConfig::Embedded => Arc::new(EmbeddedWordList),
            WordSourceConfig::File { path } => Arc::new(FileWordList(path.clone())),
            WordSourceConfig::Inline { words } => Arc::new(InlineWordList(words.clone())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// tried in order until one of them yields at least one valid word
    pub sources: Vec<WordSourceConfig>,
    /// how long a single source may take
    pub timeout_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            sources: vec![WordSourceConfig::Embedded],
            timeout_ms: DEFAULT_LOAD_TIMEOUT.as_millis() as u64,
        }
    }
}

///
/// Turns word sources into a Dictionary.
///
/// Every source is read on its own thread and abandoned if it takes longer than the timeout, so
/// a slow disk or hung source never blocks a caller for longer than that. Lines that aren't
/// wordle words are dropped, as are duplicates.
///
#[derive(Clone)]
pub struct DictionaryLoader {
    sources: Vec<Arc<dyn WordSource>>,
    timeout: Duration,
}

impl Default for DictionaryLoader {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

impl DictionaryLoader {
    pub fn new(sources: Vec<Arc<dyn WordSource>>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(
            config.sources.iter().map(WordSourceConfig::build).collect(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Loads from a single source
    pub fn single<S: WordSource + 'static>(source: S) -> Self {
        Self::new(vec![Arc::new(source)], DEFAULT_LOAD_TIMEOUT)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    ///
    /// Tries each source in order and returns the first non-empty dictionary. When they all fail,
    /// the error from the last one is returned.
    ///
    pub fn try_load(&self) -> Result<Dictionary, LoadDataErr> {
        let mut last_err = LoadDataErr::NoSources;
        for source in &self.sources {
            let name = source.name();
            match self.load_source(source.clone()) {
                Ok(dictionary) => {
                    log::debug!("got {} words from {}", dictionary.len(), name);
                    return Ok(dictionary);
                }
                Err(err) => {
                    log::debug!("word source {} failed: {}", name, err);
                    last_err = err;
                }
            }
        }

        Err(last_err)
    }

    /// Like try_load, but never fails: falls back to a tiny built in word list
    pub fn load(&self) -> Dictionary {
        match self.try_load() {
            Ok(dictionary) => dictionary,
            Err(err) => {
                log::warn!(
                    "failed to load a word list ({}), using the {} built in fallback words",
                    err,
                    FALLBACK_WORDS.len()
                );
                fallback_dictionary()
            }
        }
    }

    fn load_source(&self, source: Arc<dyn WordSource>) -> Result<Dictionary, LoadDataErr> {
        let name = source.name();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // the receiver is gone if we already timed out, nothing to do then
            let _ = tx.send(source.load());
        });

        let lines = match rx.recv_timeout(self.timeout) {
            Ok(result) => result?,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                return Err(LoadDataErr::Timeout(name, self.timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(LoadDataErr::Disconnected(name))
            }
        };

        let (dictionary, dropped) = parse_word_list(lines.iter().map(|l| l.as_str()));
        if dropped > 0 {
            log::debug!("dropped {} invalid or duplicate entries from {}", dropped, name);
        }

        if dictionary.is_empty() {
            Err(LoadDataErr::EmptySource(name))
        } else {
            Ok(dictionary)
        }
    }
}

/// Builds a dictionary out of raw lines, returning how many lines were skipped. Blank lines don't
/// count as skipped.
pub fn parse_word_list<'a, I>(lines: I) -> (Dictionary, usize)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Dictionary::new();
    let mut dropped = 0;
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let inserted = match line.parse::<Word>() {
            Ok(word) => out.insert(word),
            Err(_) => false,
        };

        if !inserted {
            dropped += 1;
        }
    }

    (out, dropped)
}

pub fn fallback_dictionary() -> Dictionary {
    FALLBACK_DICTIONARY.clone()
}

///
/// Real world usage of words, used only to break ties between equally informative guesses.
///
pub trait FrequencySource: Send + Sync {
    /// Higher is more common. 0 when the word is unknown.
    fn lookup(&self, word: &Word) -> u64;

    /// false when every lookup would be 0
    fn has_data(&self) -> bool {
        true
    }
}

/// Word -> count map, read from JSON like {"about": 1000, "other": 900}
#[derive(Clone, Debug, Default)]
pub struct WordFrequencies {
    counts: HashMap<Word, u64>,
}

impl WordFrequencies {
    pub fn from_json(raw: &str) -> Result<Self, LoadDataErr> {
        let parsed: HashMap<String, u64> = serde_json::from_str(raw)?;
        let mut counts = HashMap::with_capacity(parsed.len());
        let mut dropped = 0;
        for (word, count) in parsed {
            match word.parse::<Word>() {
                Ok(word) => {
                    counts.insert(word, count);
                }
                Err(_) => dropped += 1,
            }
        }

        if dropped > 0 {
            log::debug!("ignored {} frequency entries that aren't wordle words", dropped);
        }

        Ok(Self { counts })
    }

    /// The frequency map compiled into the binary
    pub fn embedded() -> Result<Self, LoadDataErr> {
        let raw = retrieve_file_as_str(FREQUENCY_FILE_NAME)?
            .ok_or_else(|| LoadDataErr::MissingFile(FREQUENCY_FILE_NAME.to_string()))?;
        let out = Self::from_json(&raw)?;
        log::debug!("got {} word frequencies from data file", out.len());
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.values().copied()
    }
}

impl FrequencySource for WordFrequencies {
    fn lookup(&self, word: &Word) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    fn has_data(&self) -> bool {
        !self.is_empty()
    }
}

///
/// Scores a word by how common its letters are across a corpus: the sum, over each letter of the
/// word (repeats included), of how many times that letter occurs in the whole corpus.
///
#[derive(Clone, Debug)]
pub struct LetterFrequencies {
    counts: [u64; ALPHABET_SIZE],
}

impl LetterFrequencies {
    pub fn of(corpus: &[Word]) -> Self {
        let mut counts = [0u64; ALPHABET_SIZE];
        for word in corpus {
            for &letter in word.bytes() {
                counts[letter_idx(letter)] += 1;
            }
        }

        Self { counts }
    }
}

impl FrequencySource for LetterFrequencies {
    fn lookup(&self, word: &Word) -> u64 {
        word.bytes()
            .iter()
            .map(|letter| self.counts[letter_idx(*letter)])
            .sum()
    }
}

/// Every word is equally common, leaving ties to the positional and alphabetical tie-breakers
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFrequencies;

impl FrequencySource for NoFrequencies {
    fn lookup(&self, _word: &Word) -> u64 {
        0
    }

    fn has_data(&self) -> bool {
        false
    }
}

fn retrieve_file_as_str(name: &str) -> Result<Option<String>, LoadDataErr> {
    let f: rust_embed::EmbeddedFile = if let Some(data) = RawData::get(name) {
        data
    } else {
        let path = format!("{}{}", EMBED_DATA_DIRECTORY, name);
        return match std::fs::read_to_string(&path) {
            Ok(out) => Ok(Some(out)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(LoadDataErr::Io(path, err)),
        };
    };

    Ok(Some(
        std::str::from_utf8(&f.data)
            .map_err(LoadDataErr::EncodingError)?
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowSource(Duration);

    impl WordSource for SlowSource {
        fn name(&self) -> String {
            "slow".to_string()
        }

        fn load(&self) -> Result<Vec<String>, LoadDataErr> {
            thread::sleep(self.0);
            Ok(vec!["crane".to_string()])
        }
    }

    struct BrokenSource;

    impl WordSource for BrokenSource {
        fn name(&self) -> String {
            "broken".to_string()
        }

        fn load(&self) -> Result<Vec<String>, LoadDataErr> {
            Err(LoadDataErr::MissingFile("nowhere.txt".to_string()))
        }
    }

    fn word(s: &str) -> Word {
        s.parse().unwrap()
    }

    #[test]
    fn test_embedded_word_list_loads() {
        let dictionary = DictionaryLoader::default().try_load().unwrap();
        assert!(dictionary.len() > 1000);
        assert!(dictionary.contains(&word("sense")));
        assert!(dictionary.contains(&word("hinge")));
    }

    #[test]
    fn test_parse_drops_invalid_and_duplicates() {
        let (dictionary, dropped) = parse_word_list([
            "crane", "CRANE", "", "cran", "cr4ne", " slate ", "slate", "tracer",
        ]);
        assert_eq!(dictionary.words(), &[word("crane"), word("slate")]);
        assert_eq!(dropped, 5);
    }

    #[test]
    fn test_falls_through_to_next_source() {
        let loader = DictionaryLoader::new(
            vec![
                Arc::new(BrokenSource),
                Arc::new(InlineWordList::new(["bad", "w0rds", "toolong"])),
                Arc::new(InlineWordList::new(["hinge", "binge"])),
            ],
            Duration::from_secs(1),
        );
        let dictionary = loader.try_load().unwrap();
        assert_eq!(dictionary.words(), &[word("hinge"), word("binge")]);

        let only_invalid = DictionaryLoader::single(InlineWordList::new(["bad", "w0rds", "toolong"]));
        assert!(matches!(only_invalid.try_load(), Err(LoadDataErr::EmptySource(_))));
    }

    #[test]
    fn test_timeout_uses_fallback() {
        let loader = DictionaryLoader::new(
            vec![Arc::new(SlowSource(Duration::from_millis(500)))],
            Duration::from_millis(20),
        );
        assert!(matches!(loader.try_load(), Err(LoadDataErr::Timeout(_, _))));

        let dictionary = loader.load();
        assert_eq!(dictionary.len(), FALLBACK_WORDS.len());
        assert!(dictionary.contains(&word("stale")));
    }

    #[test]
    fn test_no_sources() {
        let loader = DictionaryLoader::new(Vec::new(), Duration::from_secs(1));
        assert!(matches!(loader.try_load(), Err(LoadDataErr::NoSources)));
        assert_eq!(loader.load().words(), fallback_dictionary().words());
    }

    #[test]
    fn test_missing_file_source() {
        let loader = DictionaryLoader::single(FileWordList(PathBuf::from("does/not/exist.txt")));
        assert!(matches!(loader.try_load(), Err(LoadDataErr::Io(_, _))));
    }

    #[test]
    fn test_loader_config_from_json() {
        let config: LoaderConfig = serde_json::from_str(
            r#"{"sources": [{"kind": "inline", "words": ["pride", "prime"]}], "timeout_ms": 250}"#,
        ).unwrap();
        let loader = DictionaryLoader::from_config(&config);
        assert_eq!(loader.timeout(), Duration::from_millis(250));
        assert_eq!(loader.load().len(), 2);

        let defaults: LoaderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, LoaderConfig::default());
    }

    #[test]
    fn test_word_frequencies() {
        let freq = WordFrequencies::from_json(r#"{"sense": 90, "Dense": 10, "toolong": 5}"#).unwrap();
        assert_eq!(freq.len(), 2);
        assert_eq!(freq.lookup(&word("sense")), 90);
        assert_eq!(freq.lookup(&word("dense")), 10);
        assert_eq!(freq.lookup(&word("tense")), 0);
        assert!(WordFrequencies::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_embedded_frequencies_prefer_common_words() {
        let freq = WordFrequencies::embedded().unwrap();
        assert!(freq.lookup(&word("sense")) > freq.lookup(&word("dense")));
    }

    #[test]
    fn test_letter_frequencies() {
        let corpus = [word("aabbc"), word("abcde")];
        let freq = LetterFrequencies::of(&corpus);
        // a=3 b=3 c=2 d=1 e=1
        assert_eq!(freq.lookup(&word("aaaaa")), 15);
        assert_eq!(freq.lookup(&word("edcba")), 10);
        assert_eq!(freq.lookup(&word("zzzzz")), 0);
        assert_eq!(NoFrequencies.lookup(&word("aaaaa")), 0);
    }
}
