use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use polsift_core::api::{
    AppConfig, CheckResult, CliError, Harness, HarnessEvent, HarnessOptions, Outcome,
    ProcessChecker,
};
use tokio::sync::mpsc;

use super::cli::CheckArgs;

pub async fn handle_check(args: CheckArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let mut opts = HarnessOptions::from_config(cfg);
    if let Some(workers) = args.workers {
        opts.workers = workers;
    }
    if let Some(secs) = args.timeout_secs {
        if secs == 0 {
            return Err(CliError::Usage("--timeout-secs must be greater than zero".into()));
        }
        opts.timeout = Duration::from_secs(secs);
    }

    let checker = ProcessChecker::from_config(&cfg.checker)?;
    let show_progress = !args.no_progress && atty::is(atty::Stream::Stderr);
    let (tx, rx) = mpsc::unbounded_channel();
    let render = tokio::spawn(render_events(rx, show_progress));

    let harness = Harness::new(opts, Arc::new(checker)).with_events(tx);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for interrupt");
            std::future::pending::<()>().await;
        }
    };
    let result = harness.run(shutdown).await;
    // Closing the event channel lets the renderer finish.
    drop(harness);
    let _ = render.await;

    let report = result?;
    if report.interrupted {
        println!("\nInterrupted. Summary so far:\n");
        print!("{}", report.stats);
        return Ok(1);
    }

    println!("\nDone. Detailed log written to {}\n", report.log_path.display());
    print!("{}", report.stats);
    Ok(0)
}

async fn render_events(mut rx: mpsc::UnboundedReceiver<HarnessEvent>, show_progress: bool) {
    let mut bar: Option<ProgressBar> = None;
    while let Some(event) = rx.recv().await {
        match event {
            HarnessEvent::Planned { total } => {
                if show_progress {
                    bar = Some(progress_bar(total as u64));
                }
            }
            HarnessEvent::Completed { result, outcome } => {
                if outcome.is_noteworthy() {
                    let line = echo_line(&result, outcome);
                    match &bar {
                        Some(b) => b.println(line),
                        None => println!("{line}"),
                    }
                }
                if let Some(b) = &bar {
                    b.inc(1);
                }
            }
        }
    }
    if let Some(b) = bar {
        b.finish_and_clear();
    }
}

fn progress_bar(total: u64) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(total).with_style(style)
}

fn echo_line(result: &CheckResult, outcome: Outcome) -> String {
    format!("{:<7} ({}): {}", outcome.label(), result.category, result.file_name())
}
