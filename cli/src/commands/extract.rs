use polsift_core::api::{extract_policy_block, AcceptancePolicy, AppConfig, CliError};
use serde_json::json;

use super::cli::ExtractArgs;

/// Prints `{"policy": .., "remainder": ..}` for the first accepted block.
/// Exits 1 when the file holds none.
pub fn handle_extract(args: ExtractArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let text = std::fs::read_to_string(&args.file)?;
    let acceptance = if args.loose {
        AcceptancePolicy::Loose
    } else {
        cfg.extract.acceptance
    };

    let extraction = extract_policy_block(&text, acceptance);
    match extraction.document {
        Some(policy) => {
            let out = json!({ "policy": policy, "remainder": extraction.remainder });
            println!("{out:#}");
            Ok(0)
        }
        None => {
            eprintln!("no policy block found in {}", args.file.display());
            Ok(1)
        }
    }
}
