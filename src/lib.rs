pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod git;
pub mod model;
pub mod output;
pub mod plot;
pub mod table;
pub mod util;
