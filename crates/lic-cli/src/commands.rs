//! Subcommand implementations. Each returns the process exit code.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use lic_cli::settings::Settings;
use lic_cli::summary::{InspectSummary, diagnostics_table, gates_table, summary_table};
use lic_format::{LoadedDocument, ProgressStep, ReaderOptions};
use lic_persistence::{load_document_with_progress, save_document};

use crate::cli::{CheckArgs, GatesArgs, InspectArgs, UpgradeArgs};

/// Load `path`, driving a progress bar on stderr.
fn load_with_progress(path: &Path, options: &ReaderOptions) -> Result<LoadedDocument> {
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(120));

    let result = load_document_with_progress(path, options, &mut |step: &ProgressStep| {
        bar.set_length(step.total as u64);
        bar.set_position(step.index as u64);
        bar.set_message(step.label.clone());
    });
    bar.finish_and_clear();
    Ok(result?)
}

pub fn run_inspect(args: &InspectArgs, settings: &Settings) -> Result<i32> {
    let loaded = load_with_progress(&args.file, &settings.reader_options())?;
    let summary = InspectSummary::new(&loaded);
    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        println!("{json}");
    } else {
        println!("{}", summary_table(&summary));
        if let Some(table) = diagnostics_table(&summary.diagnostics) {
            println!();
            println!("Diagnostics:");
            println!("{table}");
        }
    }
    Ok(0)
}

pub fn run_check(args: &CheckArgs, settings: &Settings) -> Result<i32> {
    let options = settings.reader_options().with_strict(args.strict || settings.load.strict);
    let loaded = load_with_progress(&args.file, &options)?;
    let diagnostics = &loaded.report.diagnostics;
    match diagnostics_table(diagnostics) {
        Some(table) => {
            println!("{table}");
            println!(
                "{}: {} problem(s) at format version {}",
                args.file.display(),
                diagnostics.len(),
                loaded.report.version
            );
        }
        None => println!(
            "{}: ok (format version {})",
            args.file.display(),
            loaded.report.version
        ),
    }
    // A strict load stops at its first problem and exits through the error path.
    Ok(0)
}

pub fn run_upgrade(args: &UpgradeArgs, settings: &Settings) -> Result<i32> {
    let loaded = load_with_progress(&args.file, &settings.reader_options())?;
    for diagnostic in &loaded.report.diagnostics {
        warn!(%diagnostic, "repaired while loading");
    }

    let mut options = settings.save_options();
    if let Some(version) = args.target_version {
        options = options.with_version(version);
    }
    if args.backup {
        options = options.with_backup(true);
    }
    let from = loaded.report.version;
    if options.version < from {
        warn!(from, to = options.version, "writing an older format; newer fields are dropped");
    }

    let output = args.output.as_deref().unwrap_or(&args.file);
    save_document(&loaded.document, output, &options)?;
    println!(
        "{} (version {from}) -> {} (version {})",
        args.file.display(),
        output.display(),
        options.version
    );
    Ok(0)
}

pub fn run_gates(args: &GatesArgs) -> Result<i32> {
    println!("{}", gates_table(args.version));
    Ok(0)
}
