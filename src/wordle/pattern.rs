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

use std::fmt::{Debug, Display, Formatter};
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use self::Mark::*;
use super::{prelude::*, word::Word};

///
/// Any pattern can be converted to a "code" which uniquely identifies it. This type is the number
/// we use to store that code (u8 is enough because the range is 0 -> 3^5=243).
///
pub type PatternCode = u8;

///
/// The three tags a single square of feedback can carry...
///   * Absent = the letter is not in the solution (also indicates no further instances of a letter
///              when another square with the same letter is marked present/correct)
///   * Present = the letter is in the solution, but not at this position
///   * Correct = the letter is in the solution at this position
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Absent,
    Present,
    Correct,
}

impl Mark {
    pub const ALL: [Mark; 3] = [Absent, Present, Correct];
    pub const NUM: usize = Self::ALL.len();

    /// Converts the mark to a number (0, 1, or 2)
    pub fn ordinal(&self) -> PatternCode {
        match self {
            Absent => 0,
            Present => 1,
            Correct => 2,
        }
    }

    pub fn from_ordinal(code: PatternCode) -> Option<Self> {
        Some(match code {
            0 => Absent,
            1 => Present,
            2 => Correct,
            _ => return None,
        })
    }

    /// Parse from a feedback character (g=green, y=yellow, b/x=black, or the ordinal digit)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'g' | '2' => Some(Correct),
            'y' | '1' => Some(Present),
            'b' | 'x' | '0' => Some(Absent),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Absent => "⬛",
            Present => "🟨",
            Correct => "🟩",
        }
    }
}

pub type MarksArray = [Mark; WORD_SIZE];

/// The feedback for one guess against one solution: one Mark per position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Pattern(pub MarksArray);

impl From<MarksArray> for Pattern {
    fn from(arr: MarksArray) -> Self {
        Self(arr)
    }
}

impl Index<usize> for Pattern {
    type Output = Mark;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Pattern {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Pattern {
    /// 3^5 = 243 distinct patterns for a five letter word
    pub const NUM_STATES: usize = Mark::NUM.pow(WORD_SIZE as u32);

    pub const ALL_CORRECT: Pattern = Pattern([Correct; WORD_SIZE]);

    ///
    /// Compute the feedback a guess would get if `solution` were the answer, following the
    /// official duplicate letter rules. For example the guess "raise" against "rains" is
    /// [Correct, Correct, Correct, Present, Absent].
    ///
    /// * every position starts out Absent
    /// * the CORRECT pass marks exact matches and counts them as consumed for their letter
    /// * the PRESENT pass walks left to right over the rest, marking a letter Present only while
    ///   the solution still holds more of that letter than has been consumed so far
    ///
    /// A letter guessed twice against a solution holding it once therefore gets exactly one
    /// non-absent mark, and an exact match always wins over an earlier misplaced copy.
    ///
    pub fn of(guess: &Word, solution: &Word) -> Self {
        let mut out = Self::default();
        let solution_counts = solution.letter_counts();
        let mut consumed = [0usize; ALPHABET_SIZE];

        // CORRECT pass
        for i in 0..WORD_SIZE {
            let letter = guess.at(i);
            if letter == solution.at(i) {
                out[i] = Correct;
                consumed[letter_idx(letter)] += 1;
            }
        }

        // PRESENT pass
        for i in 0..WORD_SIZE {
            if out[i] == Correct {
                continue;
            }

            let idx = letter_idx(guess.at(i));
            if solution_counts[idx] > consumed[idx] {
                out[i] = Present;
                consumed[idx] += 1;
            }
        }

        out
    }

    ///
    /// Computes a code that uniquely identifies this pattern, in [0, 243). The marks are treated
    /// as the digits of a base-3 number, left-most mark being digit 0.
    ///
    /// The entropy scorer uses this to bucket solutions in a fixed size array instead of hashing.
    ///
    pub fn to_code(&self) -> PatternCode {
        let mut out = 0;
        let mut multiplier = 1;
        for i in 0..WORD_SIZE {
            out += self[i].ordinal() * multiplier;
            multiplier *= Mark::NUM as u8;
        }
        out
    }

    pub fn from_code(mut code: PatternCode) -> Option<Self> {
        if code as usize >= Self::NUM_STATES {
            return None;
        }

        let mut out = Self::default();
        for i in 0..WORD_SIZE {
            out[i] = Mark::from_ordinal(code % (Mark::NUM as u8))?;
            code /= Mark::NUM as u8;
        }

        Some(out)
    }

    pub fn is_win(&self) -> bool {
        *self == Self::ALL_CORRECT
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.0.iter().filter(|m| **m == mark).count()
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self([Absent; WORD_SIZE])
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for i in 0..WORD_SIZE {
            f.write_str(self[i].emoji())?;
        }

        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternErr {
    #[error("invalid mark '{1}' in pattern '{0}', use g/y/b (or 2/1/0) per letter")]
    InvalidMark(String, char),
    #[error("pattern '{0}' must have exactly {} marks, got {1}", WORD_SIZE)]
    WrongLength(String, usize),
}

/// Parses a pattern written like "gybbb" or "21000"
impl FromStr for Pattern {
    type Err = PatternErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let marks = s.trim()
            .chars()
            .map(|c| Mark::from_char(c).ok_or_else(|| PatternErr::InvalidMark(s.to_string(), c)))
            .collect::<Result<Vec<Mark>, _>>()?;

        let len = marks.len();
        let arr: MarksArray = marks.try_into()
            .map_err(|_| PatternErr::WrongLength(s.to_string(), len))?;

        Ok(Self(arr))
    }
}
