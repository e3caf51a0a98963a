use super::{pattern::*, prelude::*, word::Word};

///
/// How a set of possible solutions splits up by the pattern one guess would produce against each
/// of them. One bucket per possible pattern (243), indexed by Pattern::to_code, so no hashing or
/// allocation happens per solution.
///
pub struct PatternDistribution {
    buckets: [u32; Pattern::NUM_STATES],
    total: u32,
}

impl PatternDistribution {
    pub fn of<'a, I>(guess: &Word, solutions: I) -> Self
    where
        I: IntoIterator<Item = &'a Word>,
    {
        let mut buckets = [0u32; Pattern::NUM_STATES];
        let mut total = 0;
        for solution in solutions {
            buckets[Pattern::of(guess, solution).to_code() as usize] += 1;
            total += 1;
        }

        Self { buckets, total }
    }

    pub fn total(&self) -> usize {
        self.total as usize
    }

    /// Sizes of the non-empty buckets
    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.buckets.iter().filter(|c| **c > 0).map(|c| *c as u64)
    }

    /// How many distinct patterns the guess can produce over these solutions
    pub fn num_buckets(&self) -> usize {
        self.buckets.iter().filter(|c| **c > 0).count()
    }

    ///
    /// Shannon entropy of the distribution in bits, -Σ p * log2(p) with p = count / total.
    ///
    /// With the solution drawn uniformly from the set this is the expected information revealed
    /// by the guess. It is 0 for zero or one solutions and never more than log2(total).
    ///
    pub fn entropy(&self) -> WordleFloat {
        if self.total <= 1 {
            return 0.0;
        }

        let total = self.total as WordleFloat;
        let entropy: WordleFloat = self.buckets
            .iter()
            .filter(|c| **c > 0)
            .map(|c| {
                let p = *c as WordleFloat / total;
                -p * p.log2()
            })
            .sum();

        // a single bucket sums to -0.0
        entropy.max(0.0)
    }

    /// Expected size of the set left after seeing the feedback, Σ count² / total
    pub fn expected_remaining(&self) -> WordleFloat {
        if self.total == 0 {
            return 0.0;
        }

        let squares: u64 = self.buckets.iter().map(|c| (*c as u64) * (*c as u64)).sum();
        squares as WordleFloat / self.total as WordleFloat
    }
}

/// Expected bits of information from guessing `guess` when the solution is one of `possible`
pub fn expected_information(guess: &Word, possible: &[Word]) -> WordleFloat {
    if possible.len() <= 1 {
        return 0.0;
    }

    PatternDistribution::of(guess, possible).entropy()
}
