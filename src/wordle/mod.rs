mod prelude;
mod word;
mod pattern;
mod constraints;
mod entropy;
mod burner;
mod pool;
mod rank;
mod data;
mod cache;
mod solver;
mod validate;

pub use prelude::*;
pub use word::*;
pub use pattern::*;
pub use constraints::*;
pub use entropy::*;
pub use burner::*;
pub use pool::*;
pub use rank::*;
pub use data::*;
pub use cache::*;
pub use solver::*;
pub use validate::*;
