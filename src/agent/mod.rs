mod solver_agent;

pub use solver_agent::*;
