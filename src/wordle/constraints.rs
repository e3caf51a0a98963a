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

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display, Formatter};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use super::{pattern::*, prelude::*, word::Word};

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintErr {
    #[error("position {0} is outside of the word (expected 0..=4)")]
    PositionOutOfRange(i64),
    #[error("'{0}' is not a single letter a-z")]
    InvalidLetter(String),
    #[error("the word '{0}' is not a valid wordle word")]
    InvalidWord(String),
}

/// A single lowercase letter a-z
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(u8);

impl Letter {
    pub fn from_byte(b: u8) -> Option<Self> {
        let lower = b.to_ascii_lowercase();
        if is_normal_wordle_char(&lower) {
            Some(Self(lower))
        } else {
            None
        }
    }

    pub fn from_char(c: char) -> Result<Self, ConstraintErr> {
        if c.is_ascii() {
            if let Some(letter) = Self::from_byte(c as u8) {
                return Ok(letter);
            }
        }

        Err(ConstraintErr::InvalidLetter(c.to_string()))
    }

    /// Parses a string which must hold exactly one letter (surrounding spaces are ignored)
    pub fn parse(s: &str) -> Result<Self, ConstraintErr> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c)
                .map_err(|_| ConstraintErr::InvalidLetter(s.to_string())),
            _ => Err(ConstraintErr::InvalidLetter(s.to_string())),
        }
    }

    pub fn byte(&self) -> u8 {
        self.0
    }

    pub fn as_char(&self) -> char {
        self.0 as char
    }
}

impl Display for Letter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Debug for Letter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'", self.as_char())
    }
}

fn check_position(position: usize) -> Result<usize, ConstraintErr> {
    if position < WORD_SIZE {
        Ok(position)
    } else {
        Err(ConstraintErr::PositionOutOfRange(position as i64))
    }
}

///
/// Everything learned from the guesses made so far.
///
/// * correct = the letter confirmed at each position (if any)
/// * present = letters known to be in the solution, each with the positions it is known NOT to be
///             at (the positions where it was marked present)
/// * absent = letters marked absent at least once
///
/// "absent" must be read as "no more of this letter than already accounted for". A letter that is
/// both absent and present/correct (the guess had a repeated letter) is never excluded outright by
/// the absent marker; the present/correct entries bound where it can go.
///
/// The caller owns this and adds to it turn after turn. The engine only reads it.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Constraints {
    correct: [Option<Letter>; WORD_SIZE],
    present: BTreeMap<Letter, BTreeSet<usize>>,
    absent: BTreeSet<Letter>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_correct(&mut self, position: usize, letter: char) -> Result<&mut Self, ConstraintErr> {
        let position = check_position(position)?;
        self.correct[position] = Some(Letter::from_char(letter)?);
        Ok(self)
    }

    /// Records that `letter` is in the solution but not at `position`
    pub fn add_present(&mut self, letter: char, position: usize) -> Result<&mut Self, ConstraintErr> {
        let position = check_position(position)?;
        let letter = Letter::from_char(letter)?;
        self.present.entry(letter).or_default().insert(position);
        Ok(self)
    }

    /// Records that `letter` is in the solution without ruling out any position
    pub fn require_letter(&mut self, letter: char) -> Result<&mut Self, ConstraintErr> {
        let letter = Letter::from_char(letter)?;
        self.present.entry(letter).or_default();
        Ok(self)
    }

    pub fn add_absent(&mut self, letter: char) -> Result<&mut Self, ConstraintErr> {
        self.absent.insert(Letter::from_char(letter)?);
        Ok(self)
    }

    ///
    /// Folds the feedback of one guess into the constraints: Correct squares pin their letter,
    /// Present squares require the letter and forbid it at that square, Absent squares mark the
    /// letter absent.
    ///
    pub fn record(&mut self, guess: &Word, pattern: &Pattern) -> &mut Self {
        for i in 0..WORD_SIZE {
            // a Word only ever holds a-z so this never fails
            let letter = match Letter::from_byte(guess.at(i)) {
                Some(l) => l,
                None => continue,
            };

            match pattern[i] {
                Mark::Correct => self.correct[i] = Some(letter),
                Mark::Present => {
                    self.present.entry(letter).or_default().insert(i);
                }
                Mark::Absent => {
                    self.absent.insert(letter);
                }
            }
        }

        self
    }

    pub fn correct_at(&self, position: usize) -> Option<Letter> {
        self.correct.get(position).copied().flatten()
    }

    pub fn correct(&self) -> impl Iterator<Item = (usize, Letter)> + '_ {
        self.correct
            .iter()
            .enumerate()
            .filter_map(|(pos, letter)| letter.map(|l| (pos, l)))
    }

    pub fn present(&self) -> &BTreeMap<Letter, BTreeSet<usize>> {
        &self.present
    }

    pub fn absent(&self) -> &BTreeSet<Letter> {
        &self.absent
    }

    /// How many positions have a confirmed letter
    pub fn num_correct(&self) -> usize {
        self.correct.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.num_correct() == 0 && self.present.is_empty() && self.absent.is_empty()
    }

    /// True when the letter is also known to be present or correct somewhere, in which case an
    /// absent marker for it cannot exclude words on its own.
    pub fn is_accounted_for(&self, letter: Letter) -> bool {
        self.present.contains_key(&letter) || self.correct.contains(&Some(letter))
    }

    fn matches_correct(&self, word: &Word) -> bool {
        self.correct().all(|(pos, letter)| word.at(pos) == letter.byte())
    }

    fn avoids_forbidden_positions(&self, word: &Word) -> bool {
        self.present.iter().all(|(letter, forbidden)| {
            forbidden.iter().all(|pos| word.at(*pos) != letter.byte())
        })
    }

    fn avoids_absent(&self, word: &Word) -> bool {
        self.absent
            .iter()
            .filter(|letter| !self.is_accounted_for(**letter))
            .all(|letter| !word.contains(letter.byte()))
    }

    ///
    /// The hard filter: can `word` still be the solution?
    ///
    /// * every confirmed letter sits at its position
    /// * every present letter occurs somewhere, and not at any of its forbidden positions
    /// * absent letters that aren't also present/correct do not occur at all
    ///
    pub fn is_possible(&self, word: &Word) -> bool {
        self.matches_correct(word)
            && self.present.keys().all(|letter| word.contains(letter.byte()))
            && self.avoids_forbidden_positions(word)
            && self.avoids_absent(word)
    }

    ///
    /// The soft filter, used only to pick which words are worth scoring as the next guess. Same as
    /// the hard filter except it does not require present letters to occur.
    ///
    pub fn satisfies_soft(&self, word: &Word) -> bool {
        self.matches_correct(word)
            && self.avoids_forbidden_positions(word)
            && self.avoids_absent(word)
    }

    /// Filters `words` down to the ones that could be the solution, keeping their order
    pub fn possible_words<'a, I>(&self, words: I) -> Vec<Word>
    where
        I: IntoIterator<Item = &'a Word>,
    {
        words.into_iter()
            .filter(|w| self.is_possible(w))
            .copied()
            .collect()
    }
}

///
/// The one serialized shape of Constraints that crosses any boundary (JSON from a UI, agent
/// requests, the CLI). Sets are plain arrays, positions are plain integers, letters are strings.
///
/// Converting into Constraints validates everything, so a malformed request is rejected as a
/// whole instead of being partially applied.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintsDto {
    pub correct: BTreeMap<i64, String>,
    pub present: BTreeMap<String, Vec<i64>>,
    pub absent: Vec<String>,
}

fn dto_position(raw: i64) -> Result<usize, ConstraintErr> {
    if raw < 0 || raw >= WORD_SIZE as i64 {
        Err(ConstraintErr::PositionOutOfRange(raw))
    } else {
        Ok(raw as usize)
    }
}

impl TryFrom<ConstraintsDto> for Constraints {
    type Error = ConstraintErr;

    fn try_from(dto: ConstraintsDto) -> Result<Self, Self::Error> {
        let mut out = Constraints::new();

        for (pos, letter) in &dto.correct {
            out.correct[dto_position(*pos)?] = Some(Letter::parse(letter)?);
        }

        for (letter, positions) in &dto.present {
            let letter = Letter::parse(letter)?;
            let forbidden = out.present.entry(letter).or_default();
            for pos in positions {
                forbidden.insert(dto_position(*pos)?);
            }
        }

        for letter in &dto.absent {
            out.absent.insert(Letter::parse(letter)?);
        }

        Ok(out)
    }
}

impl From<&Constraints> for ConstraintsDto {
    fn from(c: &Constraints) -> Self {
        Self {
            correct: c.correct()
                .map(|(pos, letter)| (pos as i64, letter.to_string()))
                .collect(),
            present: c.present
                .iter()
                .map(|(letter, positions)| {
                    (letter.to_string(), positions.iter().map(|p| *p as i64).collect())
                })
                .collect(),
            absent: c.absent.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordle::Dictionary;
    use test_case::test_case;

    fn word(s: &str) -> Word {
        s.parse().unwrap()
    }

    fn words(list: &[&str]) -> Vec<Word> {
        list.iter().map(|s| word(s)).collect()
    }

    fn dto(json: &str) -> ConstraintsDto {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_absent_letter_excludes_unless_accounted_for() {
        let dict = words(&["hinge", "binge", "tinge", "singe", "crane", "pride"]);
        let mut c = Constraints::new();
        c.set_correct(1, 'i').unwrap()
            .set_correct(2, 'n').unwrap()
            .set_correct(3, 'g').unwrap()
            .set_correct(4, 'e').unwrap()
            .add_absent('s').unwrap();

        assert_eq!(c.possible_words(&dict), words(&["hinge", "binge", "tinge"]));
    }

    #[test]
    fn test_present_letter_required_and_forbidden_at_position() {
        let mut c = Constraints::new();
        c.add_present('a', 0).unwrap();

        assert!(c.is_possible(&word("crane")));
        assert!(!c.is_possible(&word("about")), "a is forbidden at 0");
        assert!(!c.is_possible(&word("pride")), "a must occur somewhere");
    }

    #[test]
    fn test_absent_marker_overridden_by_correct() {
        // both e's confirmed, plus an absent marker for e as a UI records a grey duplicate
        let mut c = Constraints::new();
        c.set_correct(2, 'e').unwrap()
            .set_correct(3, 'e').unwrap()
            .add_absent('e').unwrap()
            .add_absent('s').unwrap();

        assert!(c.is_possible(&word("creep")));
        assert!(c.is_possible(&word("green")));
        assert!(!c.is_possible(&word("sheep")), "s is absent and not accounted for");
    }

    #[test]
    fn test_absent_marker_overridden_by_present() {
        let mut c = Constraints::new();
        c.add_present('l', 0).unwrap().add_absent('l').unwrap();

        assert!(c.is_possible(&word("hello")));
        assert!(!c.is_possible(&word("llama")), "l still forbidden at position 0");
    }

    #[test_case("speed", "creep")]
    #[test_case("geese", "creep")]
    #[test_case("raise", "rains")]
    #[test_case("eerie", "there")]
    #[test_case("crane", "about")]
    #[test_case("llama", "label")]
    fn test_recorded_feedback_keeps_solution_possible(guess: &str, solution: &str) {
        let (g, s) = (word(guess), word(solution));
        let mut c = Constraints::new();
        c.record(&g, &Pattern::of(&g, &s));
        assert!(c.is_possible(&s), "{:?} should allow {}", c, solution);
        assert!(c.satisfies_soft(&s));
    }

    #[test]
    fn test_possible_words_idempotent() {
        let dict = Dictionary::from_strs(["crane", "slate", "trace", "crate", "react", "cater", "later"]);
        let mut c = Constraints::new();
        c.add_present('r', 0).unwrap().add_absent('s').unwrap().set_correct(4, 'e').unwrap();

        let once = c.possible_words(dict.iter());
        let twice = c.possible_words(&once);
        assert_eq!(once, twice);
        assert_eq!(once, words(&["crane", "trace", "crate"]));
    }

    #[test]
    fn test_soft_enforces_confirmed_positions() {
        let mut c = Constraints::new();
        c.set_correct(0, 'a').unwrap().set_correct(1, 'b').unwrap();
        assert!(c.satisfies_soft(&word("about")));
        assert!(!c.satisfies_soft(&word("crane")));
    }

    #[test]
    fn test_soft_enforces_forbidden_positions_only() {
        let mut c = Constraints::new();
        c.add_present('a', 0).unwrap();
        assert!(!c.satisfies_soft(&word("about")));
        assert!(c.satisfies_soft(&word("pride")), "soft filter does not require the letter");
    }

    #[test]
    fn test_soft_filters_unaccounted_absent_letters() {
        let mut c = Constraints::new();
        c.add_absent('x').unwrap().add_absent('z').unwrap();
        assert!(c.satisfies_soft(&word("crane")));
        assert!(!c.satisfies_soft(&word("pizza")));
    }

    #[test]
    fn test_dto_round_trip_preserves_filtering() {
        let raw = dto(r#"{"correct": {"2": "a"}, "present": {"r": [0, 3], "e": []}, "absent": ["s", "t"]}"#);
        let c = Constraints::try_from(raw.clone()).unwrap();
        let back = ConstraintsDto::from(&c);
        assert_eq!(back, raw);

        let again = Constraints::try_from(serde_json::from_str::<ConstraintsDto>(
            &serde_json::to_string(&back).unwrap()).unwrap()).unwrap();
        assert_eq!(again, c);

        let dict = Dictionary::from_strs(["crane", "grace", "brace", "trace", "react", "lower"]);
        assert_eq!(c.possible_words(dict.iter()), again.possible_words(dict.iter()));
        assert_eq!(c.possible_words(dict.iter()), words(&["crane", "grace", "brace"]));
    }

    #[test_case(r#"{"correct": {"-1": "a"}}"#, ConstraintErr::PositionOutOfRange(-1))]
    #[test_case(r#"{"correct": {"5": "a"}}"#, ConstraintErr::PositionOutOfRange(5))]
    #[test_case(r#"{"present": {"a": [7]}}"#, ConstraintErr::PositionOutOfRange(7))]
    #[test_case(r#"{"correct": {"0": "ab"}}"#, ConstraintErr::InvalidLetter("ab".to_string()))]
    #[test_case(r#"{"absent": [""]}"#, ConstraintErr::InvalidLetter("".to_string()))]
    #[test_case(r#"{"present": {"7": [1]}}"#, ConstraintErr::InvalidLetter("7".to_string()))]
    fn test_invalid_dto_rejected(json: &str, expected: ConstraintErr) {
        assert_eq!(Constraints::try_from(dto(json)), Err(expected));
    }

    #[test]
    fn test_uppercase_letters_accepted() {
        let c = Constraints::try_from(dto(r#"{"correct": {"0": "S"}, "absent": [" T "]}"#)).unwrap();
        assert_eq!(c.correct_at(0).map(|l| l.as_char()), Some('s'));
        assert!(c.absent().contains(&Letter::from_char('t').unwrap()));
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        let mut c = Constraints::new();
        assert_eq!(c.set_correct(5, 'a').err(), Some(ConstraintErr::PositionOutOfRange(5)));
        assert_eq!(c.add_absent('1').err(), Some(ConstraintErr::InvalidLetter("1".to_string())));
        assert!(c.is_empty());
    }
}
