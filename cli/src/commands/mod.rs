pub mod check;
pub mod clean;
pub mod cli;
pub mod extract;
pub mod triage;
