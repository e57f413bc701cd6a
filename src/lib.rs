pub mod cli;
pub mod io;
pub mod plan;
pub mod problem;
pub mod solution;
pub mod solver;
pub mod utils;
