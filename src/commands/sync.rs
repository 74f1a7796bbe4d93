//! The sync verb: run the reconciliation engine and render its report.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::api::DdmClient;
use crate::sync::{Engine, ItemKind, ItemOutcome, SyncReport};
use crate::ui;

/// Push a directory of declarations and set files to the server.
///
/// Item-level failures are printed and counted but deliberately do not
/// change the exit code; only a scan-level failure (missing directory,
/// walk error) returns an error before any network activity.
pub fn run(client: &DdmClient, dir: &Path) -> Result<()> {
    ui::header("Syncing directory with DDM");
    ui::dim(&dir.display().to_string());

    let report = Engine::new(client).sync(dir)?;
    render(&report);
    Ok(())
}

fn render(report: &SyncReport) {
    println!();
    for item in &report.items {
        let label = match &item.kind {
            ItemKind::Declaration => item.key.clone(),
            ItemKind::SetMember { set } => format!("{set}: {}", item.key),
            ItemKind::SetFile => format!("set {}", item.key),
        };
        match &item.outcome {
            ItemOutcome::Succeeded => println!("  {} {label}", "✓".green()),
            ItemOutcome::AlreadyPresent => {
                println!("  {} {label} {}", "○".dimmed(), "(already present)".dimmed());
            }
            ItemOutcome::SkippedEmpty => {
                println!("  {} {label} {}", "⊘".yellow(), "skipped (empty)".dimmed());
            }
            ItemOutcome::Failed { detail } => println!("  {} {label}: {detail}", "✗".red()),
        }
    }

    println!();
    if report.is_clean() {
        ui::success("Sync complete");
    } else {
        ui::warn("Sync completed with errors");
    }
    println!(
        "    • {} declarations attempted",
        report.declarations_attempted
    );
    println!(
        "    • {} sets processed ({} member adds)",
        report.sets_processed, report.members_attempted
    );
    if report.sets_skipped > 0 {
        println!("    • {} sets skipped (empty)", report.sets_skipped);
    }
    if report.already_present > 0 {
        println!("    • {} already present", report.already_present);
    }
    if report.failed > 0 {
        println!("    • {} {}", report.failed, "failed".red());
    }
}
