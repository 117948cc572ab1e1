use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, Table};

use crate::analysis::{Badge, Severity, StatusColor};
use crate::products::Tone;
use crate::report::{DashboardReport, ProductSummary};
use super::{fmt_score, trend_arrow};

pub fn report_terminal(report: &DashboardReport) {
    eprintln!();
    println!(
        "{} — {} product{}, {} report{} (default threshold {})",
        "🩺 spha-lens".cyan().bold(),
        report.meta.product_count.to_string().bright_black(),
        plural(report.meta.product_count),
        report.meta.report_count.to_string().bright_black(),
        plural(report.meta.report_count),
        fmt_score(report.meta.default_threshold).bright_black(),
    );
    println!();

    if !report.meta.skipped.is_empty() {
        println!("{}", "⚠  Skipped files:".yellow().bold());
        for s in &report.meta.skipped {
            println!("   {} {}", s.path.cyan(), format!("({})", s.reason).bright_black());
        }
        println!();
    }

    if report.products.is_empty() {
        println!("{}", "  No health reports loaded.".yellow());
        println!();
        return;
    }

    for product in &report.products {
        print_product(product);
    }
}

fn print_product(p: &ProductSummary) {
    println!("{}", "━".repeat(60).bright_black());
    println!(
        "{}  {}",
        format!("📦 {}", p.name).bold(),
        format!("v{} · {}", p.version, p.project_url).bright_black(),
    );
    println!("   {} {}", "Languages:".bright_black(), p.languages);

    // ── Health score ───────────────────────────────────────────────────────
    let score_text = match p.health_score {
        Some(s) => color_by_tone(&fmt_score(s), p.health_tone).bold().to_string(),
        None => "N/A".bright_black().to_string(),
    };
    let trend_text = match p.trend {
        Some(t) => color_by_tone(&format!("{} {:+.1}", trend_arrow(p.trend_icon), t), p.trend_tone)
            .to_string(),
        None => String::new(),
    };
    println!("   {} {}  {}", "Health score:".bright_black(), score_text, trend_text);

    let summary = match p.status_color {
        StatusColor::Success => p.summary.green(),
        StatusColor::Primary => p.summary.blue(),
        StatusColor::Warning => p.summary.yellow(),
        StatusColor::Danger  => p.summary.red(),
    };
    println!("   {summary}");
    println!();

    // ── Top-level KPIs ─────────────────────────────────────────────────────
    if !p.kpis.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["KPI", "SCORE", "THRESHOLD", "STATUS"]);
        for k in &p.kpis {
            let threshold = if k.uses_default {
                Cell::new(format!("{} (default)", fmt_score(k.effective_threshold))).fg(Color::DarkGrey)
            } else {
                Cell::new(fmt_score(k.effective_threshold))
            };
            table.add_row(vec![
                Cell::new(truncate(&k.display_name, 40)),
                score_cell(k.score, k.badge),
                threshold,
                status_cell(k.above_threshold, k.score.is_some()),
            ]);
        }
        println!("{table}");
    }

    // ── Critical / warning ─────────────────────────────────────────────────
    if p.severity.is_empty() {
        println!("{}", "  ✓ No critical or warning KPIs.".green());
    } else {
        println!();
        println!(
            "{} {} critical, {} warning",
            "🚨 Needs attention:".red().bold(),
            p.critical_count,
            p.warning_count,
        );
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["SEVERITY", "KPI", "SCORE", "LOWEST THRESHOLD"]);
        for row in &p.severity {
            table.add_row(vec![
                severity_cell(row.severity),
                Cell::new(truncate(&row.display_name, 40)),
                Cell::new(fmt_score(row.score)).add_attribute(Attribute::Bold),
                Cell::new(row.lowest_threshold.map_or_else(|| "—".to_string(), fmt_score))
                    .fg(Color::DarkGrey),
            ]);
        }
        println!("{table}");
    }

    // ── Tools ──────────────────────────────────────────────────────────────
    if !p.tools.is_empty() {
        println!();
        println!("{}", "🔧 Tools:".cyan());
        for t in &p.tools {
            println!(
                "    {} {} {}",
                "•".white(),
                t.name,
                format!("({} finding{})", t.findings, plural(t.findings)).bright_black(),
            );
        }
    }

    // ── History ────────────────────────────────────────────────────────────
    if p.chart.labels.len() > 1 {
        println!();
        println!("{}", "📈 History:".cyan());
        for (label, value) in p.chart.labels.iter().zip(&p.chart.data) {
            let value = value.map_or_else(|| "N/A".to_string(), fmt_score);
            println!("    {}  {}", label.bright_black(), value);
        }
    }

    if !p.issues.is_empty() {
        println!();
        println!("{}", format!("⚠  {} validation issue(s):", p.issues.len()).yellow());
        for issue in p.issues.iter().take(10) {
            println!("    {} {}", "•".yellow(), issue.to_string().bright_black());
        }
    }

    println!();
}

// ─── Cell builders ────────────────────────────────────────────────────────────

/// Plain text so comfy-table measures the visible width; color comes from the badge.
fn score_cell(score: Option<f64>, badge: Badge) -> Cell {
    let Some(score) = score else {
        return Cell::new("no data").fg(Color::DarkGrey);
    };
    let cell = Cell::new(fmt_score(score)).add_attribute(Attribute::Bold);
    match badge {
        Badge::Danger  => cell.fg(Color::Red),
        Badge::Warning => cell.fg(Color::Yellow),
        Badge::Success => cell.fg(Color::Green),
        Badge::NoData  => cell.fg(Color::DarkGrey),
    }
}

fn status_cell(above: bool, has_score: bool) -> Cell {
    match (has_score, above) {
        (false, _)    => Cell::new("—").fg(Color::DarkGrey),
        (true, true)  => Cell::new("✓ above").fg(Color::Green),
        (true, false) => Cell::new("✗ below").fg(Color::Red),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Critical => Cell::new("🔴 CRITICAL").fg(Color::Red),
        Severity::Warning  => Cell::new("🟠 WARNING").fg(Color::Yellow),
    }
}

// ─── Other helpers ────────────────────────────────────────────────────────────

fn color_by_tone(text: &str, tone: Tone) -> colored::ColoredString {
    match tone {
        Tone::Success => text.green(),
        Tone::Warning => text.yellow(),
        Tone::Danger  => text.red(),
        Tone::Muted   => text.bright_black(),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max { return s.to_string(); }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
