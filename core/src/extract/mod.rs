mod acceptance;
mod block;

pub use acceptance::AcceptancePolicy;
pub use block::{extract_policy_block, Extraction};
