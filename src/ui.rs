// Terminal UI utilities
// Banner and stage-summary rendering for the run command.

use colored::Colorize;

use crate::domain::StageResult;

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

/// Per-stage summary printed at the end of a run
pub fn print_stage_summary(results: &[StageResult]) {
    println!();
    println!(
        "{}",
        "════════════════════════════════════════════════════════════".bright_blue()
    );
    for result in results {
        let status = if result.skipped {
            "⏭️"
        } else if result.success {
            "✅"
        } else {
            "❌"
        };
        let note = result
            .message
            .as_deref()
            .map(|m| format!(" - {}", m))
            .unwrap_or_default();
        println!(
            "   {} {} ({:.1}s){}",
            status,
            result.stage.name(),
            result.duration.as_secs_f64(),
            note
        );
    }
    println!();
}
