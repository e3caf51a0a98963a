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

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use super::{entropy::PatternDistribution, prelude::*, word::Word};

/// With this many attempts left or fewer, ranking switches to the end-game ordering
pub const END_GAME_ATTEMPTS: u32 = 2;

///
/// One word that was entropy scored as a possible next guess, with everything the tie-breakers
/// need to order it against the others.
///
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub word: Word,
    /// expected bits of information from guessing this word
    pub entropy: WordleFloat,
    /// real world usage of the word, higher is more common (0 when unknown)
    pub frequency_score: u64,
    /// how many (position, letter) pairs of this word are shared with the possible solutions
    pub position_score: u32,
    /// chance this guess is the solution, 1 / |possible| when the word is possible, else 0
    pub win_probability: WordleFloat,
    /// expected number of possible solutions left after this guess
    pub expected_remaining: WordleFloat,
}

impl ScoredCandidate {
    pub fn new(
        word: Word,
        distribution: &PatternDistribution,
        is_possible: bool,
        frequency_score: u64,
        position_score: u32,
    ) -> Self {
        let total = distribution.total();
        let win_probability = if is_possible && total > 0 {
            1.0 / total as WordleFloat
        } else {
            0.0
        };

        Self {
            word,
            entropy: distribution.entropy(),
            frequency_score,
            position_score,
            win_probability,
            expected_remaining: distribution.expected_remaining(),
        }
    }

    /// Roughly how many times smaller the possible set gets with this guess, 2^entropy
    pub fn expected_reduction(&self) -> u64 {
        (2.0 as WordleFloat).powf(self.entropy).round().max(1.0) as u64
    }

    /// Short text for showing next to the suggestion
    pub fn explanation(&self, num_possible: usize) -> String {
        let tail = if self.win_probability > 0.0 {
            format!("One of {} remaining possibilities.", num_possible)
        } else {
            format!("Narrows {} remaining possibilities.", num_possible)
        };

        format!(
            "Entropy: {:.2} bits, expected reduction ≈ {}×. {}",
            self.entropy,
            self.expected_reduction(),
            tail
        )
    }
}

///
/// How often each letter shows up at each position among the possible solutions. A candidate's
/// position score is the sum of the counts of its own letters at their positions, so words that
/// look like the remaining possibilities score higher.
///
pub struct PositionCounts([[u32; ALPHABET_SIZE]; WORD_SIZE]);

impl PositionCounts {
    pub fn of(possible: &[Word]) -> Self {
        let mut counts = [[0u32; ALPHABET_SIZE]; WORD_SIZE];
        for word in possible {
            for (pos, row) in counts.iter_mut().enumerate() {
                row[letter_idx(word.at(pos))] += 1;
            }
        }

        Self(counts)
    }

    pub fn score(&self, word: &Word) -> u32 {
        self.0
            .iter()
            .enumerate()
            .map(|(pos, row)| row[letter_idx(word.at(pos))])
            .sum()
    }
}

/// Descending comparison of two floats, equal when within SCORE_EPSILON
fn cmp_desc(a: WordleFloat, b: WordleFloat) -> Ordering {
    if (a - b).abs() <= SCORE_EPSILON {
        Ordering::Equal
    } else {
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    }
}

///
/// The default ordering, "better" candidates sort first:
///
/// 1. entropy, higher first
/// 2. frequency score, higher first
/// 3. position score, higher first
/// 4. the word itself, alphabetically
///
pub fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    cmp_desc(a.entropy, b.entropy)
        .then_with(|| b.frequency_score.cmp(&a.frequency_score))
        .then_with(|| b.position_score.cmp(&a.position_score))
        .then_with(|| a.word.cmp(&b.word))
}

///
/// Same as [compare] until the last couple of attempts. With `attempts_left <= 2` a guess that
/// could win right now beats one that merely informs:
///
/// 1. win probability, higher first
/// 2. expected remaining solutions, lower first
/// 3. then [compare]
///
pub fn compare_with_attempts_left(
    a: &ScoredCandidate,
    b: &ScoredCandidate,
    attempts_left: Option<u32>,
) -> Ordering {
    match attempts_left {
        Some(n) if n <= END_GAME_ATTEMPTS => cmp_desc(a.win_probability, b.win_probability)
            .then_with(|| cmp_desc(b.expected_remaining, a.expected_remaining))
            .then_with(|| compare(a, b)),
        _ => compare(a, b),
    }
}

pub fn rank(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(compare);
}

pub fn rank_with_attempts_left(candidates: &mut [ScoredCandidate], attempts_left: Option<u32>) {
    candidates.sort_by(|a, b| compare_with_attempts_left(a, b, attempts_left));
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn candidate(
        word: &str,
        entropy: WordleFloat,
        expected_remaining: WordleFloat,
        win_probability: WordleFloat,
        frequency_score: u64,
        position_score: u32,
    ) -> ScoredCandidate {
        ScoredCandidate {
            word: word.parse().unwrap(),
            entropy,
            frequency_score,
            position_score,
            win_probability,
            expected_remaining,
        }
    }

    fn order(mut list: Vec<ScoredCandidate>, attempts_left: Option<u32>) -> Vec<String> {
        rank_with_attempts_left(&mut list, attempts_left);
        list.iter().map(|c| c.word.to_string()).collect()
    }

    #[test]
    fn test_entropy_first() {
        let mut list = vec![
            candidate("slate", 2.0, 3.0, 0.0, 100, 9),
            candidate("crane", 3.0, 2.0, 0.0, 1, 1),
        ];
        rank(&mut list);
        assert_eq!(list[0].word.to_string(), "crane");
    }

    #[test]
    fn test_ties_broken_by_frequency_then_position_then_word() {
        let list = vec![
            candidate("dense", 1.0, 1.0, 0.5, 10, 8),
            candidate("sense", 1.0, 1.0, 0.5, 90, 8),
            candidate("tense", 1.0, 1.0, 0.5, 10, 9),
            candidate("bense", 1.0 + 1e-12, 1.0, 0.5, 10, 8),
        ];
        assert_eq!(order(list, None), vec!["sense", "tense", "bense", "dense"]);
    }

    // alpha could win now, bravo only informs
    #[test_case(Some(1), "alpha" ; "last attempt prefers a possible win")]
    #[test_case(Some(2), "alpha" ; "two attempts prefers a possible win")]
    #[test_case(Some(3), "bravo" ; "three attempts prefers entropy")]
    #[test_case(None, "bravo" ; "no attempt budget prefers entropy")]
    fn test_win_probability_late_game(attempts_left: Option<u32>, expected: &str) {
        let list = vec![
            candidate("alpha", 2.0, 3.0, 0.2, 10, 5),
            candidate("bravo", 3.0, 2.0, 0.0, 8, 4),
        ];
        assert_eq!(order(list, attempts_left)[0], expected);
    }

    #[test]
    fn test_smaller_expected_remaining_wins_late() {
        let list = vec![
            candidate("delta", 2.5, 4.0, 0.0, 7, 3),
            candidate("charm", 2.5, 2.0, 0.0, 5, 3),
        ];
        assert_eq!(order(list.clone(), Some(2))[0], "charm");
        // early on the same pair falls through to frequency
        assert_eq!(order(list, Some(5))[0], "delta");
    }

    #[test]
    fn test_entropy_dominates_early() {
        let list = vec![
            candidate("foxes", 2.0, 2.0, 0.0, 20, 10),
            candidate("echos", 4.0, 10.0, 0.0, 1, 1),
        ];
        assert_eq!(order(list, Some(4))[0], "echos");
    }

    #[test]
    fn test_candidate_from_distribution() {
        let possible: Vec<Word> = ["hinge", "binge", "tinge", "singe"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let guess: Word = "hinge".parse().unwrap();
        let dist = PatternDistribution::of(&guess, &possible);
        let counts = PositionCounts::of(&possible);
        let scored = ScoredCandidate::new(guess, &dist, true, 3, counts.score(&guess));

        assert!((scored.win_probability - 0.25).abs() < 1e-9);
        assert!((scored.expected_remaining - 2.5).abs() < 1e-9);
        // h once at position 0, then i/n/g/e shared by all four
        assert_eq!(scored.position_score, 1 + 4 * 4);
        assert!(scored.explanation(4).starts_with("Entropy: 0.81 bits"));
        assert!(scored.explanation(4).ends_with("One of 4 remaining possibilities."));

        let burner: Word = "baths".parse().unwrap();
        let dist = PatternDistribution::of(&burner, &possible);
        let scored = ScoredCandidate::new(burner, &dist, false, 0, counts.score(&burner));
        assert_eq!(scored.win_probability, 0.0);
        assert_eq!(scored.entropy, 2.0);
        assert_eq!(scored.expected_reduction(), 4);
        assert!(scored.explanation(4).ends_with("Narrows 4 remaining possibilities."));
    }
}
