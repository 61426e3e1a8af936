//! Text User Interface (TUI) utilities.
//!
//! Handles formatted output for the CLI.

use crate::registry::{AlgorithmRegistry, AlgorithmRunner};
use crate::utils::bench::format_duration;
use crate::utils::timer::{Timing, VariantResult};
use terminal_size::{terminal_size, Width};

/// Get the current terminal width, constrained to a reasonable range
fn get_term_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        (w as usize).clamp(40, 200)
    } else {
        80
    }
}

/// Print algorithm info box
pub fn print_algo_info_box(algo: &dyn AlgorithmRunner, device: &str) {
    let term_width = get_term_width();
    let max_content_width = term_width.saturating_sub(4).max(40);

    let lines = [
        format!("Algorithm: {}", algo.name()),
        format!("Category:  {}", algo.category()),
        algo.description().to_string(),
        format!("Device:    {}", device),
    ];
    let var_line = format!("Variants: {}", algo.available_variants().join(", "));

    let content_width = lines
        .iter()
        .chain(std::iter::once(&var_line))
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(60)
        .min(max_content_width);

    let border = "─".repeat(content_width + 2);

    println!("┌{}┐", border);
    for line in &lines {
        println!("│ {:<width$} │", truncate(line, content_width), width = content_width);
    }
    println!("├{}┤", border);
    println!("│ {:<width$} │", truncate(&var_line, content_width), width = content_width);
    println!("└{}┘", border);
    println!();
}

/// Truncate string with ellipsis if it exceeds width (character-wise)
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut result: String = s.chars().take(width.saturating_sub(3)).collect();
        result.push_str("...");
        result
    }
}

/// Relative deviation of `value` from `baseline`, absolute when the baseline is ~0.
fn relative_error(value: Option<f64>, baseline: Option<f64>) -> f64 {
    match (value, baseline) {
        (Some(res), Some(base)) => {
            let diff = (res - base).abs();
            if base.abs() > 1e-9 {
                diff / base.abs()
            } else {
                diff
            }
        }
        _ => 0.0,
    }
}

/// Print one `<name> (<seconds> sec)` line per strategy.
pub fn print_timings(timings: &[Timing]) {
    for timing in timings {
        println!("{}", timing);
    }
}

/// Print the statistics table of a multi-run measurement.
///
/// Speedup and relative error are computed against the first row.
pub fn print_results_table(results: &[VariantResult], size: usize, workers: usize) {
    if results.is_empty() {
        return;
    }

    let term_width = get_term_width();
    let fixed_width = 72;
    let variant_col_width = term_width.saturating_sub(fixed_width).max(15);
    let table_width = variant_col_width + 64 + 6;

    let baseline_time = results
        .first()
        .map(|r| r.avg_time.as_nanos() as f64)
        .unwrap_or(1.0);
    let baseline_result = results.first().and_then(|r| r.result_sample);
    let runs = results.first().map(|r| r.samples).unwrap_or(0);

    println!("  Size: {} ({} runs, {} workers)", size, runs, workers);
    println!("  {}", "─".repeat(table_width));
    println!(
        "  {:<v_width$} {:>12} {:>12} {:>12} {:>9} {:>9} {:>10}",
        "Variant",
        "Average",
        "Min",
        "Max",
        "Speedup",
        "CV",
        "Rel. Error",
        v_width = variant_col_width
    );
    println!("  {}", "─".repeat(table_width));

    for result in results {
        let avg_ns = result.avg_time.as_nanos() as f64;
        let speedup = if avg_ns > 0.0 { baseline_time / avg_ns } else { 0.0 };
        let cv = if avg_ns > 0.0 {
            result.std_dev.as_nanos() as f64 / avg_ns
        } else {
            0.0
        };

        println!(
            "  {:<v_width$} {:>12} {:>12} {:>12} {:>8.2}x {:>8.2}% {:>10.2e}",
            truncate(&result.name, variant_col_width),
            format_duration(result.avg_time),
            format_duration(result.min_time),
            format_duration(result.max_time),
            speedup,
            cv * 100.0,
            relative_error(result.result_sample, baseline_result),
            v_width = variant_col_width
        );
    }
    println!();
}

/// Print the application header
pub fn print_header() {
    let term_width = get_term_width().min(80);
    let title = " Reduction Benchmarks ";
    let padding = term_width.saturating_sub(title.len() + 2) / 2;
    let right_padding = term_width.saturating_sub(padding + title.len());

    let border = "═".repeat(term_width);

    println!("╔{}╗", border);
    println!("║{}{}{}║", " ".repeat(padding), title, " ".repeat(right_padding));
    println!("╚{}╝", border);
    println!();
}

/// Print the list of available algorithms
pub fn print_available_algorithms(registry: &AlgorithmRegistry) {
    println!("Available algorithms:");
    println!();
    for algo in registry.all() {
        println!("  {:<20} [{}] - {}", algo.name(), algo.category(), algo.description());
        println!("  {:<20} variants: {}", "", algo.available_variants().join(", "));
    }
}
