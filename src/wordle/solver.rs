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

use std::collections::HashSet;
use std::sync::Arc;
use instant::Instant;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use super::{
    cache::DictionaryCache,
    constraints::{ConstraintErr, Constraints, ConstraintsDto},
    data::{DictionaryLoader, FrequencySource, LetterFrequencies, LoaderConfig, NoFrequencies, WordFrequencies},
    entropy::PatternDistribution,
    pool::{build_scoring_pool, PoolConfig, PoolStrategy, ScoringPool},
    prelude::*,
    rank::{rank_with_attempts_left, PositionCounts, ScoredCandidate},
    word::{Dictionary, Word},
};

///
/// Every tunable of the engine. All of it has sensible defaults, and any subset can be given as
/// JSON, e.g. {"pool_cap": 300, "sample_seed": 7}.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(flatten)]
    pub pool: PoolConfig,
    /// how many suggestions to return when the request doesn't say
    pub default_limit: usize,
    /// fixes the random sample taken by the pool builder; None draws a fresh seed per request
    pub sample_seed: Option<u64>,
    /// where the dictionary comes from
    pub loader: LoaderConfig,
    /// break ties by how common a word's letters are when the frequency source has no data at all
    pub letter_frequency_fallback: bool,
    /// suggested as the only guess when there are no constraints yet, instead of scoring a pool
    pub opening_word: Option<Word>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            default_limit: DEFAULT_SUGGESTION_LIMIT,
            sample_seed: None,
            loader: LoaderConfig::default(),
            letter_frequency_fallback: true,
            opening_word: None,
        }
    }
}

/// Per request options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestOptions {
    /// maximum number of suggestions, EngineConfig::default_limit when None
    pub limit: Option<usize>,
    /// guesses the player has left, enables the end-game ordering when 2 or fewer
    pub attempts_left: Option<u32>,
}

impl SuggestOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Derives the attempts left from how many guesses have been made in a standard game
    pub fn after_guesses(num_guesses: usize) -> Self {
        Self {
            attempts_left: Some(NUM_TURNS.saturating_sub(num_guesses) as u32),
            ..Self::default()
        }
    }
}

/// The ranked suggestions for one request, plus some context for displaying them
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestions {
    /// best first, never longer than the requested limit
    pub candidates: Vec<ScoredCandidate>,
    /// how many words are still possible solutions (0 means the constraints contradict each other)
    pub num_possible: usize,
    /// how many words were entropy scored
    pub pool_size: usize,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = Word> + '_ {
        self.candidates.iter().map(|c| c.word)
    }

    pub fn explanations(&self) -> impl Iterator<Item = String> + '_ {
        self.candidates.iter().map(|c| c.explanation(self.num_possible))
    }
}

///
/// Computes the ranked next guesses for the given constraints over a dictionary.
///
/// 1. hard filter the dictionary down to the possible solutions
/// 2. pick the pool of words worth scoring (see build_scoring_pool)
/// 3. entropy score every pool word against the possible solutions
/// 4. rank and truncate
///
/// Contradictory constraints give an empty result, not an error. The only randomness is the
/// pool builder's sample, drawn from `rng`.
///
pub fn get_suggestions<R>(
    constraints: &Constraints,
    dictionary: &Dictionary,
    frequencies: &dyn FrequencySource,
    config: &EngineConfig,
    options: &SuggestOptions,
    rng: &mut R,
) -> Suggestions
where
    R: Rng + ?Sized,
{
    let start_at = Instant::now();
    let possible = constraints.possible_words(dictionary.iter());
    if possible.is_empty() {
        log::debug!("no words in the dictionary satisfy {:?}", constraints);
        return Suggestions::default();
    }

    let pool = match config.opening_word {
        Some(opener) if constraints.is_empty() => ScoringPool {
            words: vec![opener],
            strategy: PoolStrategy::Opening,
        },
        _ => build_scoring_pool(&possible, dictionary, constraints, &config.pool, rng),
    };
    let possible_set: HashSet<Word> = possible.iter().copied().collect();
    let positions = PositionCounts::of(&possible);
    let letters;
    let frequencies = if config.letter_frequency_fallback && !frequencies.has_data() {
        letters = LetterFrequencies::of(dictionary.words());
        &letters as &dyn FrequencySource
    } else {
        frequencies
    };

    let mut scored: Vec<ScoredCandidate> = pool.words
        .iter()
        .map(|word| {
            let distribution = PatternDistribution::of(word, &possible);
            ScoredCandidate::new(
                *word,
                &distribution,
                possible_set.contains(word),
                frequencies.lookup(word),
                positions.score(word),
            )
        })
        .collect();

    rank_with_attempts_left(&mut scored, options.attempts_left);
    scored.truncate(options.limit.unwrap_or(config.default_limit));

    let dur = start_at.elapsed();
    log::debug!(
        "scored {} words against {} possibilities ({}) in {:.03}s",
        pool.words.len(),
        possible.len(),
        match pool.strategy {
            PoolStrategy::PossibleOnly => "possible only",
            PoolStrategy::Initial => "initial pool",
            PoolStrategy::Prefiltered => "prefiltered",
            PoolStrategy::Opening => "opening word",
        },
        dur.as_secs_f64()
    );

    Suggestions {
        candidates: scored,
        num_possible: possible.len(),
        pool_size: pool.words.len(),
    }
}

///
/// The engine as a long lived value: a lazily loaded dictionary, the frequency data used for tie
/// breaking, and the configuration. Nothing about a game is stored here; the caller keeps the
/// Constraints and passes them in on every request, so one Solver can serve any number of games
/// (and threads) at once.
///
pub struct Solver {
    cache: DictionaryCache,
    frequencies: Box<dyn FrequencySource>,
    config: EngineConfig,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Solver {
    /// Uses the configured word sources and the embedded frequency data
    pub fn new(config: EngineConfig) -> Self {
        let cache = DictionaryCache::new(DictionaryLoader::from_config(&config.loader));
        Self::with_parts(cache, default_frequencies(), config)
    }

    pub fn with_parts(
        cache: DictionaryCache,
        frequencies: Box<dyn FrequencySource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            cache,
            frequencies,
            config,
        }
    }

    /// A solver over a fixed dictionary, handy for tests and custom word lists
    pub fn with_dictionary(
        dictionary: Dictionary,
        frequencies: Box<dyn FrequencySource>,
        config: EngineConfig,
    ) -> Self {
        let loader = DictionaryLoader::from_config(&config.loader);
        Self::with_parts(DictionaryCache::preloaded(loader, dictionary), frequencies, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dictionary(&self) -> Arc<Dictionary> {
        self.cache.get()
    }

    pub fn reload_dictionary(&self) -> Arc<Dictionary> {
        self.cache.reload()
    }

    pub fn invalidate_dictionary(&self) {
        self.cache.invalidate()
    }

    pub fn is_dictionary_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    /// The words that can still be the solution, in dictionary order
    pub fn possible_words(&self, constraints: &Constraints) -> Vec<Word> {
        constraints.possible_words(self.dictionary().iter())
    }

    pub fn suggest(&self, constraints: &Constraints, options: &SuggestOptions) -> Vec<ScoredCandidate> {
        self.suggestions(constraints, options).candidates
    }

    /// Like suggest, but keeps the context needed to explain the result
    pub fn suggestions(&self, constraints: &Constraints, options: &SuggestOptions) -> Suggestions {
        let mut rng = match self.config.sample_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        self.suggestions_with_rng(constraints, options, &mut rng)
    }

    pub fn suggestions_with_rng<R>(
        &self,
        constraints: &Constraints,
        options: &SuggestOptions,
        rng: &mut R,
    ) -> Suggestions
    where
        R: Rng + ?Sized,
    {
        let dictionary = self.dictionary();
        get_suggestions(
            constraints,
            &dictionary,
            self.frequencies.as_ref(),
            &self.config,
            options,
            rng,
        )
    }

    /// Entry point for constraints that arrive serialized; invalid input rejects the whole request
    pub fn suggest_dto(
        &self,
        constraints: ConstraintsDto,
        options: &SuggestOptions,
    ) -> Result<Suggestions, ConstraintErr> {
        let constraints = Constraints::try_from(constraints)?;
        Ok(self.suggestions(&constraints, options))
    }
}

/// The embedded frequency data, or nothing (with a warning) if it can't be read
pub fn default_frequencies() -> Box<dyn FrequencySource> {
    match WordFrequencies::embedded() {
        Ok(freq) if freq.is_empty() => {
            log::warn!("word frequency data is empty, ties fall back to letter frequency");
            Box::new(NoFrequencies)
        }
        Ok(freq) => Box::new(freq),
        Err(err) => {
            log::warn!("failed to load word frequencies ({}), ties fall back to letter frequency", err);
            Box::new(NoFrequencies)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordle::pattern::Pattern;

    fn word(s: &str) -> Word {
        s.parse().unwrap()
    }

    fn names(candidates: &[ScoredCandidate]) -> Vec<String> {
        candidates.iter().map(|c| c.word.to_string()).collect()
    }

    fn seeded() -> EngineConfig {
        EngineConfig {
            sample_seed: Some(1234),
            ..EngineConfig::default()
        }
    }

    fn hinge_solver(frequencies: Box<dyn FrequencySource>) -> Solver {
        let dictionary = Dictionary::from_strs(["hinge", "binge", "tinge", "singe", "crane", "pride"]);
        Solver::with_dictionary(dictionary, frequencies, seeded())
    }

    fn hinge_constraints() -> Constraints {
        let mut constraints = Constraints::new();
        constraints
            .set_correct(1, 'i').unwrap()
            .set_correct(2, 'n').unwrap()
            .set_correct(3, 'g').unwrap()
            .set_correct(4, 'e').unwrap()
            .add_absent('s').unwrap();
        constraints
    }

    #[test]
    fn test_sense_wins_entropy_tie_on_frequency() {
        let solver = Solver::new(seeded());
        let constraints: Constraints = serde_json::from_str::<ConstraintsDto>(
            r#"{"correct": {"1": "e", "2": "n", "3": "s", "4": "e"}, "absent": ["t"]}"#,
        ).unwrap().try_into().unwrap();

        let possible = solver.possible_words(&constraints);
        assert!(possible.len() > 1);
        assert!(!possible.contains(&word("tense")));

        let suggestions = solver.suggest(&constraints, &SuggestOptions::default());
        assert_eq!(suggestions[0].word, word("sense"));
        assert!((suggestions[0].entropy - suggestions[1].entropy).abs() < 1e-9);
    }

    #[test]
    fn test_plant_wins_on_frequency() {
        let solver = Solver::new(seeded());
        let mut constraints = Constraints::new();
        for (pos, letter) in ['p', 'l', 'a', 'n'].into_iter().enumerate() {
            constraints.set_correct(pos, letter).unwrap();
        }
        constraints.add_absent('e').unwrap();

        let suggestions = solver.suggestions(&constraints, &SuggestOptions::default());
        assert_eq!(suggestions.num_possible, 3);
        assert_eq!(names(&suggestions.candidates), vec!["plant", "plank", "plans"]);
    }

    #[test]
    fn test_hinge_possible_words() {
        let solver = hinge_solver(Box::new(NoFrequencies));
        let constraints = hinge_constraints();
        assert_eq!(
            solver.possible_words(&constraints),
            vec![word("hinge"), word("binge"), word("tinge")]
        );

        // identical entropy, frequency and position score, so alphabetical
        let suggestions = solver.suggest(&constraints, &SuggestOptions::default());
        assert_eq!(names(&suggestions), vec!["binge", "hinge", "tinge"]);
    }

    #[test]
    fn test_hinge_with_embedded_frequencies() {
        let solver = hinge_solver(default_frequencies());
        let suggestions = solver.suggest(&hinge_constraints(), &SuggestOptions::default());
        assert_eq!(names(&suggestions), vec!["hinge", "binge", "tinge"]);
    }

    #[test]
    fn test_word_without_usage_data_scores_zero() {
        let mut dictionary = DictionaryLoader::default().load();
        dictionary.insert(word("pesty"));
        let solver = Solver::with_dictionary(dictionary, default_frequencies(), seeded());

        let mut constraints = Constraints::new();
        for (pos, letter) in [(1, 'e'), (2, 's'), (3, 't'), (4, 'y')] {
            constraints.set_correct(pos, letter).unwrap();
        }

        let suggestions = solver.suggest(&constraints, &SuggestOptions::default());
        assert_eq!(names(&suggestions), vec!["testy", "zesty", "pesty"]);
        assert_eq!(suggestions[2].frequency_score, 0);
    }

    #[test]
    fn test_letter_frequencies_replace_missing_data() {
        let dictionary = Dictionary::from_strs(["hinge", "binge", "tinge", "tithe", "crane"]);
        let solver = Solver::with_dictionary(dictionary, Box::new(NoFrequencies), seeded());
        let suggestions = solver.suggest(&hinge_constraints(), &SuggestOptions::default());

        // t occurs three times across the dictionary, h twice and b once
        assert_eq!(suggestions[0].word, word("tinge"));
        assert!(suggestions[0].frequency_score > suggestions[1].frequency_score);

        let config = EngineConfig {
            letter_frequency_fallback: false,
            ..seeded()
        };
        let dictionary = Dictionary::from_strs(["hinge", "binge", "tinge", "tithe", "crane"]);
        let solver = Solver::with_dictionary(dictionary, Box::new(NoFrequencies), config);
        let suggestions = solver.suggest(&hinge_constraints(), &SuggestOptions::default());
        assert!(suggestions.iter().all(|c| c.frequency_score == 0));
    }

    #[test]
    fn test_contradiction_gives_empty_result() {
        let solver = hinge_solver(Box::new(NoFrequencies));
        let mut constraints = Constraints::new();
        constraints.set_correct(0, 'z').unwrap();
        let suggestions = solver.suggestions(&constraints, &SuggestOptions::default());
        assert!(suggestions.is_empty());
        assert_eq!(suggestions.num_possible, 0);
    }

    #[test]
    fn test_invalid_dto_is_rejected() {
        let solver = hinge_solver(Box::new(NoFrequencies));
        let bad: ConstraintsDto = serde_json::from_str(r#"{"correct": {"-1": "a"}}"#).unwrap();
        assert_eq!(
            solver.suggest_dto(bad, &SuggestOptions::default()),
            Err(ConstraintErr::PositionOutOfRange(-1))
        );

        let bad: ConstraintsDto = serde_json::from_str(r#"{"absent": ["ab"]}"#).unwrap();
        assert!(solver.suggest_dto(bad, &SuggestOptions::default()).is_err());
    }

    #[test]
    fn test_limit_and_results_are_sorted() {
        let solver = Solver::new(seeded());
        let suggestions = solver.suggestions(&Constraints::new(), &SuggestOptions::with_limit(3));
        assert_eq!(suggestions.candidates.len(), 3);
        assert!(suggestions.pool_size <= solver.config().pool.pool_cap);
        for pair in suggestions.candidates.windows(2) {
            assert!(pair[0].entropy + 1e-9 >= pair[1].entropy);
        }

        let default_limit = solver.suggest(&Constraints::new(), &SuggestOptions::default());
        assert_eq!(default_limit.len(), DEFAULT_SUGGESTION_LIMIT);
    }

    #[test]
    fn test_seeded_requests_are_reproducible() {
        let solver = Solver::new(seeded());
        let mut constraints = Constraints::new();
        constraints.add_present('a', 1).unwrap().add_absent('o').unwrap();
        let a = solver.suggest(&constraints, &SuggestOptions::with_limit(10));
        let b = solver.suggest(&constraints, &SuggestOptions::with_limit(10));
        assert_eq!(a, b);
    }

    #[test]
    fn test_late_game_prefers_possible_words() {
        let solver = Solver::new(seeded());
        let guess = word("crane");
        let solution = word("shake");
        let mut constraints = Constraints::new();
        constraints.record(&guess, &Pattern::of(&guess, &solution));

        let late = solver.suggestions(&constraints, &SuggestOptions::after_guesses(5));
        assert!(late.num_possible > 1);
        let possible = solver.possible_words(&constraints);
        assert!(possible.contains(&late.candidates[0].word));
        assert!(late.candidates[0].win_probability > 0.0);
    }

    #[test]
    fn test_solving_a_game() {
        let solver = Solver::new(seeded());
        let solution = word("shake");
        let mut constraints = Constraints::new();
        let mut solved = false;
        for turn in 0..NUM_TURNS {
            let options = SuggestOptions::after_guesses(turn);
            let guess = solver.suggest(&constraints, &options)[0].word;
            let pattern = Pattern::of(&guess, &solution);
            if pattern.is_win() {
                solved = true;
                break;
            }
            constraints.record(&guess, &pattern);
            assert!(solver.possible_words(&constraints).contains(&solution));
        }
        assert!(solved, "should find the solution within {} guesses", NUM_TURNS);
    }

    #[test]
    fn test_opening_word_only_without_constraints() {
        let config = EngineConfig {
            opening_word: Some(word("thrum")),
            ..seeded()
        };
        let dictionary = Dictionary::from_strs(["hinge", "binge", "tinge", "singe", "crane", "pride"]);
        let solver = Solver::with_dictionary(dictionary, Box::new(NoFrequencies), config);

        let opening = solver.suggestions(&Constraints::new(), &SuggestOptions::default());
        assert_eq!(opening.words().collect::<Vec<_>>(), vec![word("thrum")]);
        assert_eq!(opening.num_possible, 6);
        assert_eq!(opening.pool_size, 1);
        assert!(opening.candidates[0].entropy > 0.0);

        let later = solver.suggest(&hinge_constraints(), &SuggestOptions::default());
        assert_eq!(names(&later), vec!["binge", "hinge", "tinge"]);
    }

    #[test]
    fn test_config_from_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"pool_cap": 300, "sample_seed": 9, "default_limit": 3, "opening_word": "Crane"}"#,
        ).unwrap();
        assert_eq!(config.opening_word, Some(word("crane")));
        assert_eq!(config.pool.pool_cap, 300);
        assert_eq!(config.pool.sample_size, PoolConfig::default().sample_size);
        assert_eq!(config.sample_seed, Some(9));
        assert_eq!(config.default_limit, 3);
        assert!(config.letter_frequency_fallback);
    }
}
