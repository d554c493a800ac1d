use clap::CommandFactory;
use polsift_core::api::{
    sweep, AppConfig, CheckSet, CliError, Quarantine, RepairSet, SweepOptions, SweepReport,
};

use super::cli::{Args, CleanArgs};

pub fn handle_clean(args: CleanArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    if args.is_empty() {
        let mut root = Args::command();
        root.build();
        if let Some(clean) = root.find_subcommand_mut("clean") {
            clean.print_help()?;
        }
        return Ok(0);
    }

    let checks = args
        .detect
        .as_deref()
        .map(CheckSet::parse)
        .transpose()
        .map_err(|e| CliError::Usage(e.to_string()))?;
    let repairs = args
        .repair
        .as_deref()
        .map(RepairSet::parse)
        .transpose()
        .map_err(|e| CliError::Usage(e.to_string()))?;

    let root = args
        .root
        .clone()
        .unwrap_or_else(|| cfg.paths.filtered_root.clone());
    let quarantine = Quarantine::new(&root, &cfg.paths.quarantine_root);
    let opts = SweepOptions { checks, repairs };

    let report = sweep(&root, &opts, &cfg.repair_options(), &quarantine)?;
    print!("{}", render_report(&report, &opts));
    for (path, reason) in &report.failures {
        eprintln!("failed: {}: {reason}", path.display());
    }
    Ok(0)
}

fn render_report(report: &SweepReport, opts: &SweepOptions) -> String {
    let mut out = String::new();
    for flagged in &report.flagged {
        out.push_str(&format!("{}:\n", flagged.path.display()));
        for issue in &flagged.issues {
            out.push_str(&format!("  - {issue}\n"));
        }
        out.push('\n');
    }

    if opts.checks.is_some() {
        out.push_str(&format!("Total policies flagged: {}\n", report.flagged.len()));
    }
    if let Some(repairs) = &opts.repairs {
        if repairs.rewrites() {
            out.push_str(&format!("Total policies repaired: {}\n", report.repaired));
            if report.unrepairable > 0 {
                out.push_str(&format!("Total policies not repairable: {}\n", report.unrepairable));
            }
        }
        if repairs.quarantine {
            out.push_str(&format!("Total policies quarantined: {}\n", report.quarantined.len()));
        }
    }
    out
}
