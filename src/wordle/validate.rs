use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;
use super::prelude::*;

/// Tolerance used by every check below
pub const VALIDATION_EPSILON: WordleFloat = 1e-10;

/// Bits per word expected from a word frequency table of a natural language
pub const NATURAL_LANGUAGE_ENTROPY: RangeInclusive<WordleFloat> = 6.0..=12.0;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EntropyCheckErr {
    #[error("entropy cannot be negative, got {0}")]
    Negative(WordleFloat),
    #[error("entropy {entropy} exceeds the maximum {maximum} for a vocabulary of {vocabulary}")]
    AboveMaximum {
        entropy: WordleFloat,
        maximum: WordleFloat,
        vocabulary: usize,
    },
    #[error("entropy mismatch: claimed {claimed}, calculated {calculated}")]
    Mismatch {
        claimed: WordleFloat,
        calculated: WordleFloat,
    },
    #[error("uniform distribution should have entropy log2(N) = {expected}, got {got}")]
    UniformMismatch {
        expected: WordleFloat,
        got: WordleFloat,
    },
    #[error("entropy {0} is outside the {:?} bits expected for natural language", NATURAL_LANGUAGE_ENTROPY)]
    OutsideLanguageRange(WordleFloat),
}

///
/// Shannon entropy in bits of a frequency table, -Σ p * log2(p) with p = count / total.
///
/// Empty and all-zero tables have entropy 0, zero counts are skipped.
///
pub fn frequency_entropy<I>(counts: I) -> WordleFloat
where
    I: IntoIterator<Item = u64>,
{
    let counts: Vec<u64> = counts.into_iter().filter(|c| *c > 0).collect();
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let total = total as WordleFloat;
    let entropy: WordleFloat = counts
        .iter()
        .map(|c| {
            let p = *c as WordleFloat / total;
            -p * p.log2()
        })
        .sum();

    entropy.max(0.0)
}

/// Entropy of the characters within one word
pub fn word_entropy(word: &str) -> WordleFloat {
    let mut counts: HashMap<char, u64> = HashMap::new();
    for c in word.chars() {
        *counts.entry(c).or_default() += 1;
    }

    frequency_entropy(counts.into_values())
}

/// log2(N), the entropy of N equally likely outcomes
pub fn maximum_entropy(vocabulary: usize) -> WordleFloat {
    if vocabulary == 0 {
        0.0
    } else {
        (vocabulary as WordleFloat).log2()
    }
}

/// Entropy divided by its maximum, in [0, 1]. 0 for tables of one entry or fewer.
pub fn normalized_entropy(counts: &[u64]) -> WordleFloat {
    if counts.len() <= 1 {
        return 0.0;
    }

    let maximum = maximum_entropy(counts.len());
    if maximum > 0.0 {
        frequency_entropy(counts.iter().copied()) / maximum
    } else {
        0.0
    }
}

pub fn check_bounds(entropy: WordleFloat, vocabulary: usize) -> Result<(), EntropyCheckErr> {
    let maximum = maximum_entropy(vocabulary);
    if entropy < -VALIDATION_EPSILON {
        Err(EntropyCheckErr::Negative(entropy))
    } else if entropy > maximum + VALIDATION_EPSILON {
        Err(EntropyCheckErr::AboveMaximum {
            entropy,
            maximum,
            vocabulary,
        })
    } else {
        Ok(())
    }
}

/// Recomputes the entropy of `counts` and compares it to `claimed`
pub fn check_calculation(counts: &[u64], claimed: WordleFloat) -> Result<(), EntropyCheckErr> {
    let calculated = frequency_entropy(counts.iter().copied());
    if (calculated - claimed).abs() < VALIDATION_EPSILON {
        Ok(())
    } else {
        Err(EntropyCheckErr::Mismatch { claimed, calculated })
    }
}

/// Only applies when every count is the same, then the entropy must be log2(N)
pub fn check_uniform(counts: &[u64], entropy: WordleFloat) -> Result<(), EntropyCheckErr> {
    let uniform = match counts.split_first() {
        Some((first, rest)) => rest.iter().all(|c| c == first),
        None => false,
    };
    if !uniform {
        return Ok(());
    }

    let expected = maximum_entropy(counts.len());
    if (entropy - expected).abs() < VALIDATION_EPSILON {
        Ok(())
    } else {
        Err(EntropyCheckErr::UniformMismatch { expected, got: entropy })
    }
}

pub fn check_language_range(entropy: WordleFloat) -> Result<(), EntropyCheckErr> {
    if NATURAL_LANGUAGE_ENTROPY.contains(&entropy) {
        Ok(())
    } else {
        Err(EntropyCheckErr::OutsideLanguageRange(entropy))
    }
}

///
/// Every check run against one frequency table and an entropy claimed for it. The language range
/// check only runs for tables of natural language word usage.
///
#[derive(Clone, Debug, PartialEq)]
pub struct EntropyReport {
    pub entropy: WordleFloat,
    pub vocabulary: usize,
    pub maximum: WordleFloat,
    pub normalized: WordleFloat,
    pub failures: Vec<EntropyCheckErr>,
}

impl EntropyReport {
    pub fn check(counts: &[u64], claimed: WordleFloat, natural_language: bool) -> Self {
        let mut failures = Vec::new();
        let mut results = vec![
            check_bounds(claimed, counts.len()),
            check_calculation(counts, claimed),
            check_uniform(counts, claimed),
        ];
        if natural_language {
            results.push(check_language_range(claimed));
        }

        for result in results {
            if let Err(err) = result {
                log::debug!("entropy check failed: {}", err);
                failures.push(err);
            }
        }

        Self {
            entropy: claimed,
            vocabulary: counts.len(),
            maximum: maximum_entropy(counts.len()),
            normalized: normalized_entropy(counts),
            failures,
        }
    }

    /// Computes the entropy itself and checks it
    pub fn of(counts: &[u64], natural_language: bool) -> Self {
        Self::check(counts, frequency_entropy(counts.iter().copied()), natural_language)
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for EntropyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entropy {:.4} bits over {} entries (max {:.4}, normalized {:.4})",
            self.entropy, self.vocabulary, self.maximum, self.normalized
        )?;
        if self.is_valid() {
            write!(f, ", all checks passed")
        } else {
            for failure in &self.failures {
                write!(f, "\n  failed: {}", failure)?;
            }
            Ok(())
        }
    }
}
