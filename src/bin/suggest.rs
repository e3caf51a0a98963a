use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use clap::Parser;
use instant::Instant;
use wordle_engine::wordle::*;

/// Ranks the next guesses for a five letter word game
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Constraints as JSON, like '{"correct": {"1": "e"}, "present": {"s": [0]}, "absent": ["t"]}'.
    /// Read from stdin when omitted and no --guess is given.
    constraints: Option<String>,

    /// A guess and the feedback it got, like crane=gybbb (g=green, y=yellow, b=black). Repeatable.
    #[clap(short, long = "guess")]
    guesses: Vec<String>,

    /// JSON engine configuration (pool sizes, sample seed, word sources...)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// How many suggestions to print
    #[clap(short, long)]
    limit: Option<usize>,

    /// Guesses left in the game, enables the end-game ordering at 2 or fewer
    #[clap(short, long)]
    attempts_left: Option<u32>,

    /// Print the result as JSON
    #[clap(long)]
    json: bool,
}

fn main() {
    env_logger::init();
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config: EngineConfig = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    let mut constraints = match &args.constraints {
        Some(raw) => parse_constraints(raw)?,
        None if args.guesses.is_empty() => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            parse_constraints(&raw)?
        }
        None => Constraints::new(),
    };

    for guess in &args.guesses {
        let (word, pattern) = parse_guess(guess)?;
        constraints.record(&word, &pattern);
    }

    // attempts left falls back to what a standard game leaves after the given guesses
    let options = SuggestOptions {
        limit: args.limit,
        attempts_left: args.attempts_left.or_else(|| {
            if args.guesses.is_empty() {
                None
            } else {
                SuggestOptions::after_guesses(args.guesses.len()).attempts_left
            }
        }),
    };

    let solver = Solver::new(config);
    let start_at = Instant::now();
    let suggestions = solver.suggestions(&constraints, &options);
    let dur = start_at.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("no valid words remain for these constraints");
        return Ok(());
    }

    for (candidate, explanation) in suggestions.candidates.iter().zip(suggestions.explanations()) {
        println!("{}  {}", candidate.word, explanation);
    }
    eprintln!(
        "scored {} words against {} possibilities in {:.2}s",
        suggestions.pool_size,
        suggestions.num_possible,
        dur.as_secs_f64()
    );

    Ok(())
}

fn parse_constraints(raw: &str) -> Result<Constraints, Box<dyn Error>> {
    if raw.trim().is_empty() {
        return Ok(Constraints::new());
    }

    let dto: ConstraintsDto = serde_json::from_str(raw)?;
    Ok(Constraints::try_from(dto)?)
}

fn parse_guess(raw: &str) -> Result<(Word, Pattern), Box<dyn Error>> {
    let (word, pattern) = raw
        .split_once('=')
        .ok_or_else(|| format!("guess '{}' should look like crane=gybbb", raw))?;

    Ok((word.parse()?, pattern.parse()?))
}
