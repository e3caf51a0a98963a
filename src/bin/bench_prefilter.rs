use std::collections::BTreeMap;
use std::time::Duration;
use clap::Parser;
use instant::Instant;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use wordle_engine::wordle::*;

const CANDIDATE_SIZES: [usize; 4] = [50, 100, 200, 500];
const PREFILTER_THRESHOLDS: [usize; 3] = [50, 100, 200];
const BURNER_COUNTS: [usize; 3] = [1, MAX_BURNER_WORDS, 10];
const SAMPLE_SIZES: [usize; 2] = [100, 200];
const GROUND_TRUTH_SAMPLE: usize = 1000;
const TOP_N: usize = 3;

/// Measures how well the prefiltered scoring pool finds the same best guesses as scoring a large
/// sample of the dictionary, for each combination of pool builder settings
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Trials per candidate set size
    #[clap(short, long, default_value_t = 5)]
    trials: usize,

    /// Seed for every random choice the benchmark makes
    #[clap(short, long, default_value_t = 42)]
    seed: u64,
}

#[derive(Default)]
struct Summary {
    runs: usize,
    overlap: usize,
    top1_hits: usize,
    time: Duration,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let dictionary = DictionaryLoader::default().load();
    eprintln!("loaded word list with {} words", dictionary.len());

    let mut summaries: BTreeMap<(usize, usize, usize), Summary> = BTreeMap::new();
    let mut full_time = Duration::ZERO;
    let mut full_runs = 0;

    for size in CANDIDATE_SIZES {
        for _ in 0..args.trials {
            let candidates = sample_candidates(&dictionary, size, &mut rng);

            let scoring_sample: Vec<Word> = dictionary
                .words()
                .choose_multiple(&mut rng, GROUND_TRUTH_SAMPLE)
                .copied()
                .collect();
            let (dur, truth) = timed(|| best_guesses(&scoring_sample, &candidates));
            full_time += dur;
            full_runs += 1;

            for threshold in PREFILTER_THRESHOLDS {
                for burner_count in BURNER_COUNTS {
                    for sample_size in SAMPLE_SIZES {
                        let config = PoolConfig {
                            few_candidates: 0,
                            source_cap: 0,
                            prefilter_threshold: threshold,
                            burner_count,
                            sample_size,
                            pool_cap: usize::MAX,
                            ..PoolConfig::default()
                        };

                        let (dur, found) = timed(|| {
                            let pool = build_scoring_pool(
                                &candidates,
                                &dictionary,
                                &Constraints::new(),
                                &config,
                                &mut rng,
                            );
                            best_guesses(&pool.words, &candidates)
                        });

                        let summary = summaries
                            .entry((threshold, burner_count, sample_size))
                            .or_default();
                        summary.runs += 1;
                        summary.overlap += found.iter().filter(|w| truth.contains(w)).count();
                        summary.top1_hits += (found.first() == truth.first()) as usize;
                        summary.time += dur;
                    }
                }
            }
        }
    }

    println!(
        "full scoring of {} words: avg {:.1}ms",
        GROUND_TRUTH_SAMPLE,
        ms(full_time) / full_runs.max(1) as f64
    );
    for ((threshold, burners, sample), summary) in &summaries {
        let runs = summary.runs.max(1) as f64;
        // the strategist hands back at most MAX_BURNER_WORDS, larger counts repeat that row
        let clamped = if *burners > MAX_BURNER_WORDS {
            format!("  (same burners as B{})", MAX_BURNER_WORDS)
        } else {
            String::new()
        };
        println!(
            "T{}_B{}_S{}  avg overlap top{}={:.2}  top1 match={:.0}%  avg time={:.1}ms{}",
            threshold,
            burners,
            sample,
            TOP_N,
            summary.overlap as f64 / runs,
            100.0 * summary.top1_hits as f64 / runs,
            ms(summary.time) / runs,
            clamped
        );
    }
}

/// Picks `size` words that share at least one letter with a random seed word, topped up with
/// arbitrary words if there aren't enough
fn sample_candidates(dictionary: &Dictionary, size: usize, rng: &mut StdRng) -> Vec<Word> {
    let words = dictionary.words();
    let seed = match words.choose(rng) {
        Some(seed) => *seed,
        None => return Vec::new(),
    };
    let seed_letters = seed.unique_letters();

    let related: Vec<Word> = words
        .iter()
        .filter(|w| w.bytes().iter().any(|b| seed_letters[letter_idx(*b)]))
        .copied()
        .collect();
    let mut out: Vec<Word> = related.choose_multiple(rng, size).copied().collect();
    if out.len() < size {
        let rest: Vec<Word> = words.iter().filter(|w| !out.contains(w)).copied().collect();
        out.extend(rest.choose_multiple(rng, size - out.len()).copied());
    }

    out
}

fn best_guesses(pool: &[Word], candidates: &[Word]) -> Vec<Word> {
    pool.iter()
        .copied()
        .top_k::<_, _, TOP_N>(|w| expected_information(w, candidates))
        .collect()
}

fn timed<R, F>(f: F) -> (Duration, R)
    where F: FnOnce() -> R
{
    let start_at = Instant::now();
    let out = f();
    let dur = start_at.elapsed();

    (dur, out)
}

fn ms(dur: Duration) -> f64 {
    dur.as_secs_f64() * 1000.0
}
