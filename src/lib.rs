//! Word-guessing decision engine: given the feedback gathered so far in a five letter word game,
//! rank the next guesses by expected information gain.

pub mod wordle;
pub mod util;
pub mod agent;
