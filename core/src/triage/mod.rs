//! Sorting forum posts into the `repaired`, `broken` and `relaxed` corpora.

mod category;
mod heuristic;
mod index_map;
mod pass;
mod source;
mod store;

pub use category::{Category, Role};
pub use heuristic::looks_like_allow_policy;
pub use index_map::{IndexEntry, IndexMap};
pub use pass::{run_pass, run_passes, PassReport, TriageContext, TriagePass};
pub use source::{load_posts, SourcePost, ANSWER_FILE, BODY_FILE};
pub use store::{CategoryStore, Triplet};
