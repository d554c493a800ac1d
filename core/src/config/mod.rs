mod load;
mod types;

pub use load::{load, load_from_str, CONFIG_FILE_NAME};
pub use types::*;
