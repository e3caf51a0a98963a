use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;
use instant::Instant;
use wordle_engine::wordle::*;

/// Regenerates the embedded word frequency map for the bundled word list
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Frequency list with one "word count" pair per line. When omitted, frequencies are derived
    /// from the word list's own order (it is sorted most common first).
    #[clap(short, long)]
    source: Option<PathBuf>,

    /// Where to write the JSON map
    #[clap(short, long)]
    out: Option<PathBuf>,
}

// rank based counts follow a Zipf curve: count = TOP_COUNT / (rank + 1) ^ ZIPF_EXPONENT
const TOP_COUNT: f64 = 2e6;
const ZIPF_EXPONENT: f64 = 1.07;

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = do_all(&args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn do_all(args: &Args) -> io::Result<()> {
    let words = EmbeddedWordList
        .load()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    let (dictionary, dropped) = parse_word_list(words.iter().map(|w| w.as_str()));
    if dropped > 0 {
        eprintln!("skipped {} invalid lines in the word list", dropped);
    }

    let (dur, counts) = timed(|| match &args.source {
        Some(path) => read_frequency_source(path).map(|freq| counts_from_source(&dictionary, &freq)),
        None => Ok(counts_from_rank(&dictionary)),
    });
    let counts = counts?;

    let at = args.out.clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}{}", EMBED_DATA_DIRECTORY, FREQUENCY_FILE_NAME)));
    let mut out = io::BufWriter::new(fs::File::options()
        .truncate(true)
        .create(true)
        .write(true)
        .open(&at)?);
    serde_json::to_writer_pretty(&mut out, &counts)?;
    writeln!(out)?;

    let values: Vec<u64> = counts.values().copied().collect();
    let report = EntropyReport::of(&values, true);
    if !report.is_valid() {
        log::warn!("generated frequencies look off: {}", report);
    }

    eprintln!("done! wrote {} frequencies to {} in {:.2}s", counts.len(), at.display(), dur.as_secs_f64());
    eprintln!("{}", report);
    Ok(())
}

fn counts_from_rank(dictionary: &Dictionary) -> BTreeMap<String, u64> {
    dictionary
        .iter()
        .enumerate()
        .map(|(rank, word)| {
            let count = TOP_COUNT / ((rank + 1) as f64).powf(ZIPF_EXPONENT);
            (word.to_string(), count as u64)
        })
        .collect()
}

/// Words missing from the source get 0
fn counts_from_source(dictionary: &Dictionary, freq: &HashMap<String, u64>) -> BTreeMap<String, u64> {
    dictionary
        .iter()
        .map(|word| {
            let word = word.to_string();
            let count = freq.get(&word).copied().unwrap_or(0);
            (word, count)
        })
        .collect()
}

fn read_frequency_source(path: &PathBuf) -> io::Result<HashMap<String, u64>> {
    let f = fs::File::open(path)?;
    let mut out = HashMap::new();
    for line in io::BufReader::new(f).lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let (word, count) = match (parts.next(), parts.next()) {
            (Some(word), Some(count)) => (word, count),
            _ => continue,
        };

        if let Ok(count) = count.replace(',', "").parse::<u64>() {
            out.insert(normalize_wordle_word(word), count);
        }
    }

    Ok(out)
}

fn timed<R, F>(f: F) -> (Duration, R)
    where F: FnOnce() -> R
{
    let start_at = Instant::now();
    let out = f();
    let dur = start_at.elapsed();

    (dur, out)
}
