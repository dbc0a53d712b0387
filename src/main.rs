//! GulfValidate command line
//!
//! Commands:
//! - `analyze` (default): intake wizard, analysis with progress, results, share link
//! - `results`: show the last stored result
//! - `open <link>`: show a result from a share link
//! - `sample`: show the sample report
//! - `report <path>`: export the last stored result as a paginated text report

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tokio::task::block_in_place;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gulf_validate::orchestrator::cli::{render_progress_line, render_results, run_wizard};
use gulf_validate::orchestrator::FlowState;
use gulf_validate::services::report::DEFAULT_FILE_NAME;
use gulf_validate::services::{analysis_from_url, generate_shareable_url, ReportBuilder};
use gulf_validate::{
    AnalysisPipeline, AnalysisRequest, AnalysisResult, AppConfig, LocalStore, PipelineError,
    ProgressRunner,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Logs go to stderr so they do not tear the progress line
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gulf_validate=info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let interrupts = Interrupts::install();
    let config = AppConfig::from_env()?;
    let store = LocalStore::new(&config.store_path);
    info!("Using store {}", store.path().display());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("analyze") => analyze(&config, &store, &interrupts).await,
        Some("results") => {
            match store.load_result().await {
                Some(result) => show_result(&config, &result),
                None => println!("No analysis results found. Run `gulf_validate analyze` first."),
            }
            Ok(())
        }
        Some("open") => {
            let link = args.get(1).context("usage: gulf_validate open <link>")?;
            match analysis_from_url(link) {
                Some(result) => println!("\n{}", render_results(&result)),
                None => println!("This share link is invalid or corrupted."),
            }
            Ok(())
        }
        Some("sample") => {
            println!("\nSample report: B2B fintech SaaS targeting UAE & Saudi Arabia\n");
            println!("{}", render_results(&AnalysisResult::sample()));
            Ok(())
        }
        Some("report") => {
            let path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_FILE_NAME);
            let Some(result) = store.load_result().await else {
                bail!("No stored analysis to export. Run `gulf_validate analyze` first.");
            };
            export_report(&result, Path::new(path)).await
        }
        Some(other) => bail!(
            "unknown command '{}' (expected analyze, results, open, sample or report)",
            other
        ),
    }
}

/// Once a Ctrl-C listener exists the default handler is gone for good, so a
/// single listener decides: dismiss the progress view while it is open,
/// exit the process otherwise.
#[derive(Clone, Default)]
struct Interrupts {
    view_open: Arc<AtomicBool>,
    dismiss: Arc<Notify>,
}

#[derive(Debug, PartialEq)]
enum Interrupt {
    Dismiss,
    Exit,
}

impl Interrupts {
    fn install() -> Self {
        let interrupts = Self::default();
        let handle = interrupts.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if handle.route() == Interrupt::Exit {
                    std::process::exit(130);
                }
            }
        });
        interrupts
    }

    fn route(&self) -> Interrupt {
        if self.view_open.load(Ordering::SeqCst) {
            self.dismiss.notify_one();
            Interrupt::Dismiss
        } else {
            Interrupt::Exit
        }
    }

    fn open_view(&self) {
        self.view_open.store(true, Ordering::SeqCst);
    }

    fn close_view(&self) {
        self.view_open.store(false, Ordering::SeqCst);
    }
}

async fn analyze(config: &AppConfig, store: &LocalStore, interrupts: &Interrupts) -> Result<()> {
    let pipeline = AnalysisPipeline::from_config(config);
    if !pipeline.has_backend() {
        println!("No analysis backend configured. Set GULF_VALIDATE_API_KEY or GULF_VALIDATE_FALLBACK_URL.");
        return Ok(());
    }

    println!("\n{}", "═".repeat(60));
    println!("GulfValidate: startup validation for Gulf markets");
    println!("{}", "═".repeat(60));

    let mut input = io::stdin().lock();
    let mut out = io::stdout();
    // stdin reads block, keep them off the async workers
    let Some(mut request) = block_in_place(|| run_wizard(&mut input, &mut out))? else {
        println!("\nAnalysis cancelled.");
        return Ok(());
    };

    loop {
        store.save_request(&request).await?;
        println!("\nAnalyzing your business (Ctrl-C to dismiss)...\n");

        match run_with_progress(&pipeline, &request, interrupts).await {
            None => {
                println!("\nAnalysis dismissed, nothing was saved.");
                return Ok(());
            }
            Some(Ok(result)) => {
                store.save_result(&result).await?;
                show_result(config, &result);
                return offer_report(&mut input, &result).await;
            }
            Some(Err(e)) => {
                println!("\n❌ {}", e);
                print!("[r]etry, [s]tart over or [q]uit: ");
                io::stdout().flush()?;
                let answer = read_answer(&mut input)?;
                match answer.to_lowercase().as_str() {
                    "r" | "retry" => continue,
                    "s" | "start over" => {
                        store.clear().await?;
                        match block_in_place(|| run_wizard(&mut input, &mut out))? {
                            Some(next) => request = next,
                            None => return Ok(()),
                        }
                    }
                    _ => return Ok(()),
                }
            }
        }
    }
}

/// Runs the pipeline while drawing the progress bar. `None` when dismissed.
async fn run_with_progress(
    pipeline: &AnalysisPipeline,
    request: &AnalysisRequest,
    interrupts: &Interrupts,
) -> Option<Result<AnalysisResult, PipelineError>> {
    let runner = ProgressRunner::new();
    let (tx, mut rx) = watch::channel(runner.initial_snapshot());
    let dismiss = interrupts.dismiss.clone();
    interrupts.open_view();

    let view = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = rx.borrow_and_update().clone();
                    print!("\r{}", render_progress_line(&snapshot));
                    let _ = io::stdout().flush();
                    if snapshot.state != FlowState::Running {
                        break;
                    }
                }
                _ = dismiss.notified() => {
                    warn!("Progress view dismissed");
                    break;
                }
            }
        }
        println!();
    });

    let outcome = runner.run(pipeline.run(request), &tx).await;
    drop(tx);
    let _ = view.await;
    interrupts.close_view();
    outcome
}

fn show_result(config: &AppConfig, result: &AnalysisResult) {
    println!("\n{}", render_results(result));
    println!("Share: {}", generate_shareable_url(&config.share_origin, result));
}

async fn offer_report<R: BufRead>(input: &mut R, result: &AnalysisResult) -> Result<()> {
    print!("\nExport report to file (Enter to skip, '.' for {}): ", DEFAULT_FILE_NAME);
    io::stdout().flush()?;
    let answer = read_answer(input)?;
    match answer.as_str() {
        "" => Ok(()),
        "." => export_report(result, Path::new(DEFAULT_FILE_NAME)).await,
        path => export_report(result, Path::new(path)).await,
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut answer = String::new();
    block_in_place(|| input.read_line(&mut answer))?;
    Ok(answer.trim().to_string())
}

async fn export_report(result: &AnalysisResult, path: &Path) -> Result<()> {
    let document = ReportBuilder::new().build(result);
    document
        .save(path)
        .await
        .with_context(|| format!("Failed to export report to {}", path.display()))?;
    println!("📄 Report saved to {} ({} pages)", path.display(), document.page_count());
    Ok(())
}
