use std::collections::HashSet;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use super::{burner::best_burner_words, constraints::Constraints, word::{Dictionary, Word}};

///
/// The knobs of the candidate pool builder. These were tuned empirically (see the bench_prefilter
/// binary) and are not load bearing for correctness, only for speed vs. accuracy.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// at or below this many possible solutions, only the solutions themselves are scored
    pub few_candidates: usize,
    /// with this many confirmed positions or more, only the solutions themselves are scored
    pub tight_correct_positions: usize,
    /// how many words from the front of the dictionary seed the initial pool
    pub source_cap: usize,
    /// initial pools larger than this switch to burners + random sample
    pub prefilter_threshold: usize,
    /// how many of the strategist's burner words to take. The strategist never offers more than
    /// MAX_BURNER_WORDS, so anything above that behaves the same.
    pub burner_count: usize,
    /// how many random dictionary words to add when prefiltering
    pub sample_size: usize,
    /// hard cap on the number of words scored
    pub pool_cap: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            few_candidates: 10,
            tight_correct_positions: 4,
            source_cap: 200,
            prefilter_threshold: 100,
            burner_count: 10,
            sample_size: 200,
            pool_cap: 500,
        }
    }
}

/// Why the pool looks the way it does; logged and handy in tests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolStrategy {
    /// few possibilities or tight constraints, score the possibilities only
    PossibleOnly,
    /// possibilities + the front of the dictionary, capped
    Initial,
    /// possibilities + burner words + a random sample, capped
    Prefiltered,
    /// nothing is known yet and a fixed opening word is configured
    Opening,
}

#[derive(Clone, Debug)]
pub struct ScoringPool {
    pub words: Vec<Word>,
    pub strategy: PoolStrategy,
}

/// Appends words not seen yet, keeping first-seen order
fn extend_unique<'a, I>(out: &mut Vec<Word>, seen: &mut HashSet<Word>, words: I)
where
    I: IntoIterator<Item = &'a Word>,
{
    for word in words {
        if seen.insert(*word) {
            out.push(*word);
        }
    }
}

///
/// Decides which words get entropy scored as the next guess.
///
/// * few possibilities (or most positions already known): the possibilities themselves
/// * otherwise start from possibilities ∪ the first `source_cap` dictionary words
/// * if that is bigger than `prefilter_threshold`, replace it with possibilities ∪ burner words ∪
///   `sample_size` random dictionary words that weren't in the initial pool
/// * cap at `pool_cap`, keeping possibilities first
/// * drop words that fail the soft filter, unless that would leave nothing
///
/// The randomness comes only from `rng`, so a seeded rng gives a reproducible pool.
///
pub fn build_scoring_pool<R>(
    possible: &[Word],
    dictionary: &Dictionary,
    constraints: &Constraints,
    config: &PoolConfig,
    rng: &mut R,
) -> ScoringPool
where
    R: Rng + ?Sized,
{
    if possible.len() <= config.few_candidates
        || constraints.num_correct() >= config.tight_correct_positions
    {
        log::debug!(
            "scoring only the {} possible words ({} positions confirmed)",
            possible.len(),
            constraints.num_correct()
        );
        return ScoringPool {
            words: possible.to_vec(),
            strategy: PoolStrategy::PossibleOnly,
        };
    }

    let mut initial_seen = HashSet::with_capacity(possible.len() + config.source_cap);
    let mut initial = Vec::with_capacity(possible.len() + config.source_cap);
    extend_unique(&mut initial, &mut initial_seen, possible);
    extend_unique(&mut initial, &mut initial_seen, dictionary.first_n(config.source_cap));

    let (mut pool, strategy) = if initial.len() > config.prefilter_threshold {
        let burners: Vec<Word> = best_burner_words(possible, dictionary.words())
            .into_iter()
            .take(config.burner_count)
            .collect();
        log::debug!("strategist burners: {:?}", burners);

        let outside: Vec<&Word> = dictionary
            .iter()
            .filter(|w| !initial_seen.contains(*w))
            .collect();
        let sampled = outside.choose_multiple(rng, config.sample_size).copied();

        let mut seen = HashSet::with_capacity(possible.len() + burners.len() + config.sample_size);
        let mut pool = Vec::with_capacity(seen.capacity());
        extend_unique(&mut pool, &mut seen, possible);
        extend_unique(&mut pool, &mut seen, &burners);
        extend_unique(&mut pool, &mut seen, sampled);
        (pool, PoolStrategy::Prefiltered)
    } else {
        (initial, PoolStrategy::Initial)
    };

    pool.truncate(config.pool_cap);

    let filtered: Vec<Word> = pool.iter()
        .filter(|w| constraints.satisfies_soft(w))
        .copied()
        .collect();

    let words = if filtered.is_empty() {
        log::debug!("soft constraints left no candidates, falling back to the full pool");
        pool
    } else {
        filtered
    };

    log::debug!("scoring pool of {} words ({:?})", words.len(), strategy);
    ScoringPool { words, strategy }
}
