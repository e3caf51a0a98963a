// Constants that define the shape of the game and a few letter helpers shared by every module.
//
// WORD_SIZE is fixed at 5 for the bundled corpus. Most of the engine is written against the
// constant, so a different word size mostly means swapping the data files.


// how many characters are in a wordle answer?
pub const WORD_SIZE: usize = 5;
// how many turns a standard game allows (used to derive attempts left from guesses made)
pub const NUM_TURNS: usize = 6;
// how many letters are in the english alphabet? (don't change this lol)
pub const ALPHABET_SIZE: usize = (('z' as usize) - ('a' as usize)) + 1;
// how many suggestions are returned when the caller doesn't ask for a specific amount
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

// This type allows you to switch between using f64 for all calculations and f32 if you so desire.
pub type WordleFloat = f64;

// tolerance used whenever two floating point scores are compared for ordering
pub const SCORE_EPSILON: WordleFloat = 1e-9;

pub use crate::util::*;

/// Returns the number of times each letter of the alphabet occurs in the argument. The bytes should
/// represent only lowercase ASCII data. The output is indexed by the position of the letter in the
/// alphabet... like 'a' = 0, 'b' = 1, etc...
pub fn count_letters_bytes(word: &[u8]) -> [usize; ALPHABET_SIZE] {
    debug_assert!(is_wordle_str_bytes(word));
    let mut out = [0; ALPHABET_SIZE];
    for &letter in word.iter().take(WORD_SIZE) {
        out[letter_idx(letter)] += 1;
    }

    out
}

/// Flags each letter of the alphabet that occurs at least once in the word (counted once per
/// unique letter, not per occurrence).
pub fn unique_letters_bytes(word: &[u8]) -> [bool; ALPHABET_SIZE] {
    let mut out = [false; ALPHABET_SIZE];
    for &letter in word.iter().take(WORD_SIZE) {
        out[letter_idx(letter)] = true;
    }

    out
}

/// Returns the index of the given letter within the alphabet (like 'a' = 0, 'b' = 1, etc...)
pub fn letter_idx(letter: u8) -> usize {
    ((letter as isize) - ('a' as isize)) as usize
}

/// Inverse of letter_idx
pub fn idx_letter(idx: usize) -> u8 {
    debug_assert!(idx < ALPHABET_SIZE);
    b'a' + idx as u8
}

/// Checks whether or not the passed string meets the constraints of a "wordle_str"
/// must be (5 letters, all lowercase)
pub fn is_wordle_str(v: &str) -> bool {
    is_wordle_str_bytes(v.as_bytes())
}

/// Checks whether or not the passed bytes represent an ASCII sequence which is also a "wordle_str"
pub fn is_wordle_str_bytes(v: &[u8]) -> bool {
    v.len() == WORD_SIZE && v.iter().all(is_normal_wordle_char)
}

/// Given some input &str, try to clean it up such that it might be a wordle_str.
///
/// This function does not trim the length of a word or remove non alpha characters. It simply
/// cleans up words that are already valid wordle words by removing any spacing and converting
/// to all lowercase.
///
/// You should always verify that the output of this function passes is_wordle_str.
pub fn normalize_wordle_word(str: &str) -> String {
    str.trim().to_lowercase()
}

/// Verifies that a byte represents a lowercase alphabetic character (a valid wordle_str char)
pub fn is_normal_wordle_char(v: &u8) -> bool {
    v.is_ascii_lowercase()
}
