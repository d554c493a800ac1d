use polsift_core::api::{run_passes, AppConfig, CliError, PassReport, TriageContext};
use polsift_core::triage::load_posts;

use super::cli::TriageArgs;

pub fn handle_triage(args: TriageArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let posts = load_posts(&cfg.paths.saved_root)?;
    let ctx = TriageContext::from_config(cfg);
    let reports = run_passes(&args.pass.passes(), &posts, &ctx)?;

    for report in &reports {
        println!("{}", summary_line(report));
    }
    println!("[INFO] Index map: {}", ctx.index_file.display());
    Ok(0)
}

fn summary_line(report: &PassReport) -> String {
    format!(
        "[INFO] {}: saved {} of {} candidate posts ({} skipped)",
        report.pass, report.saved, report.considered, report.skipped
    )
}
