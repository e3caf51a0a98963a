use super::{prelude::*, word::Word};

/// How many burner words the strategist hands back at most
pub const MAX_BURNER_WORDS: usize = 3;

///
/// Picks up to three dictionary words that best split the remaining candidates, without running a
/// full entropy calculation against the whole dictionary.
///
/// A "discriminator" letter is one that appears in some but not all candidates. Each dictionary
/// word scores 1 - |0.5 - f| for every discriminator letter it contains (once per unique letter),
/// where f is the fraction of candidates holding that letter. A letter in exactly half of the
/// candidates is worth 1.0, and the weight falls off toward letters almost nobody or almost
/// everybody has.
///
/// Returns nothing when there are two candidates or fewer, since just guessing one of them is as
/// good as any burner. Ties keep dictionary order.
///
pub fn best_burner_words(candidates: &[Word], dictionary: &[Word]) -> Vec<Word> {
    if candidates.len() <= 2 {
        return Vec::new();
    }

    let mut letter_counts = [0usize; ALPHABET_SIZE];
    for candidate in candidates {
        for (idx, seen) in candidate.unique_letters().iter().enumerate() {
            if *seen {
                letter_counts[idx] += 1;
            }
        }
    }

    let n = candidates.len() as WordleFloat;
    let mut weights = [0.0 as WordleFloat; ALPHABET_SIZE];
    for (idx, count) in letter_counts.iter().enumerate() {
        if *count > 0 && *count < candidates.len() {
            let frequency = *count as WordleFloat / n;
            weights[idx] = 1.0 - (0.5 - frequency).abs();
        }
    }

    log::debug!(
        "burner discriminators: {}",
        weights.iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.0)
            .map(|(idx, _)| idx_letter(idx) as char)
            .collect::<String>()
    );

    dictionary
        .iter()
        .copied()
        .top_k::<_, _, MAX_BURNER_WORDS>(|word| burner_score(word, &weights))
        .collect()
}

fn burner_score(word: &Word, weights: &[WordleFloat; ALPHABET_SIZE]) -> WordleFloat {
    word.unique_letters()
        .iter()
        .zip(weights.iter())
        .filter(|(present, _)| **present)
        .map(|(_, weight)| *weight)
        .sum()
}
