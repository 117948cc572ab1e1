use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::Severity;
use crate::error::SphaError;
use crate::report::{DashboardReport, ProductSummary};
use super::{fmt_score, trend_arrow};

pub const DEFAULT_FILE_NAME: &str = "health-report.html";

/// `~/Desktop/health-report.html`, or the current directory when there is no desktop.
pub fn default_output_path() -> PathBuf {
    dirs::desktop_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_FILE_NAME)
}

pub fn report_html(report: &DashboardReport, output_file: &Path) -> Result<(), SphaError> {
    let html = build_html(report);
    fs::write(output_file, &html).map_err(|e| {
        SphaError::Output(format!("Failed to write {}: {e}", output_file.display()))
    })?;
    eprintln!("✓ HTML report written to {}", output_file.display());
    Ok(())
}

fn build_html(report: &DashboardReport) -> String {
    let product_cards: String = report
        .products
        .iter()
        .enumerate()
        .map(|(i, p)| product_card(i, p))
        .collect();
    let chart_scripts: String = report
        .products
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.chart.labels.is_empty())
        .map(|(i, p)| chart_script(i, p))
        .collect();

    let skipped_section = if report.meta.skipped.is_empty() {
        String::new()
    } else {
        let rows: String = report.meta.skipped.iter().map(|s| format!(
            "<tr><td class=\"path\">{}</td><td class=\"dim\">{}</td></tr>",
            esc(&s.path), esc(&s.reason)
        )).collect();
        format!(
            "<div class=\"card skipped-card\"><h2>⚠️ Skipped Files</h2>\
             <table><thead><tr><th>File</th><th>Reason</th></tr></thead><tbody>{rows}</tbody></table></div>"
        )
    };

    let empty_note = if report.products.is_empty() {
        "<div class=\"card\"><p class=\"dim\">No health reports loaded.</p></div>"
    } else {
        ""
    };

    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8"><meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>spha-lens health report</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js"></script>
  <style>
    *,*::before,*::after{{box-sizing:border-box;margin:0;padding:0}}
    body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#0f172a;color:#e2e8f0;padding:2rem;font-size:14px;line-height:1.6}}
    h1{{font-size:1.75rem;font-weight:800}} h1 .icon{{color:#38bdf8}}
    h2{{font-size:1rem;font-weight:700;color:#94a3b8;text-transform:uppercase;letter-spacing:.06em;margin-bottom:1rem}}
    h3{{font-size:1.25rem;font-weight:700;margin-bottom:.25rem}}
    a{{color:#7dd3fc}}
    .meta{{color:#64748b;margin:.4rem 0 2rem;font-size:.8rem}} .meta span{{margin-right:1.5rem}}
    .stats{{display:grid;grid-template-columns:repeat(auto-fit,minmax(160px,1fr));gap:1rem;margin:1rem 0 1.5rem}}
    .stat{{background:#0f172a;border:1px solid #334155;border-radius:.625rem;padding:1rem 1.25rem}}
    .stat-label{{font-size:.7rem;text-transform:uppercase;letter-spacing:.06em;color:#64748b}}
    .stat-value{{font-size:2rem;font-weight:800;margin-top:.2rem}}
    .card{{background:#1e293b;border:1px solid #334155;border-radius:.75rem;padding:1.5rem;margin-bottom:1.5rem}}
    .skipped-card{{border-color:#f59e0b}}
    .chart-wrap{{position:relative;height:240px;margin-bottom:1.5rem}}
    table{{width:100%;border-collapse:collapse;margin-bottom:1.5rem}}
    th{{text-align:left;padding:.5rem .75rem;border-bottom:2px solid #334155;font-size:.7rem;font-weight:700;text-transform:uppercase;letter-spacing:.06em;color:#64748b}}
    td{{padding:.5rem .75rem;border-bottom:1px solid #1a2744;vertical-align:middle}}
    tr:last-child td{{border-bottom:none}} tr:hover td{{background:#162032}}
    td.path{{font-family:'JetBrains Mono','Fira Code',ui-monospace,monospace;font-size:.78rem;color:#7dd3fc;word-break:break-all}}
    td.num{{text-align:right;color:#94a3b8}}
    .dim{{color:#64748b;font-size:.85em}}
    .text-success{{color:#4ade80}} .text-primary{{color:#60a5fa}} .text-warning{{color:#fbbf24}} .text-danger{{color:#f87171}} .text-muted{{color:#64748b}}
    .badge{{display:inline-block;padding:.15rem .5rem;border-radius:999px;font-size:.7rem;font-weight:700;white-space:nowrap}}
    .bg-danger{{background:rgba(239,68,68,.15);color:#fca5a5}}
    .bg-warning{{background:rgba(234,179,8,.15);color:#fde047}}
    .bg-success{{background:rgba(34,197,94,.15);color:#86efac}}
    .bg-secondary{{background:rgba(100,116,139,.15);color:#94a3b8}}
    .footer{{text-align:center;color:#334155;font-size:.75rem;margin-top:2rem}}
  </style>
</head>
<body>
  <h1><span class="icon">🩺</span> spha-lens</h1>
  <p class="meta">
    <span>Generated: <strong>{now}</strong></span>
    <span>Products: <strong>{product_count}</strong></span>
    <span>Reports: <strong>{report_count}</strong></span>
    <span>Default threshold: <strong>{threshold}</strong></span>
  </p>
  {skipped_section}
  {empty_note}
  {product_cards}
  <p class="footer">Generated by spha-lens on {now}</p>
  <script>
{chart_scripts}
  </script>
</body>
</html>"#,
        now = now,
        product_count = report.meta.product_count,
        report_count = report.meta.report_count,
        threshold = fmt_score(report.meta.default_threshold),
        skipped_section = skipped_section,
        empty_note = empty_note,
        product_cards = product_cards,
        chart_scripts = chart_scripts,
    )
}

fn product_card(index: usize, p: &ProductSummary) -> String {
    let health = p.health_score.map_or_else(|| "N/A".to_string(), fmt_score);
    let trend = match p.trend {
        Some(t) => format!(
            "<span class=\"{}\" title=\"{}\">{} {:+.1}</span>",
            p.trend_tone.css_class(), esc(p.trend_icon), trend_arrow(p.trend_icon), t
        ),
        None => String::new(),
    };

    let kpi_rows: String = p.kpis.iter().map(|k| {
        let score = k.score.map_or_else(|| "no data".to_string(), fmt_score);
        let threshold = if k.uses_default {
            format!("{} <span class=\"dim\">(default)</span>", fmt_score(k.effective_threshold))
        } else {
            fmt_score(k.effective_threshold)
        };
        let status = match (k.score.is_some(), k.above_threshold) {
            (false, _) => "<span class=\"dim\">—</span>",
            (true, true) => "<span class=\"text-success\">✓ above</span>",
            (true, false) => "<span class=\"text-danger\">✗ below</span>",
        };
        format!(
            "<tr><td>{}</td><td class=\"num\"><span class=\"badge {}\">{}</span></td>\
             <td class=\"num\">{}</td><td>{}</td></tr>",
            esc(&k.display_name), k.badge.css_class(), score, threshold, status
        )
    }).collect();

    let severity_section = if p.severity.is_empty() {
        "<p class=\"text-success\">✓ No critical or warning KPIs.</p>".to_string()
    } else {
        let rows: String = p.severity.iter().map(|r| {
            let badge = match r.severity {
                Severity::Critical => "<span class=\"badge bg-danger\">🔴 CRITICAL</span>",
                Severity::Warning => "<span class=\"badge bg-warning\">🟠 WARNING</span>",
            };
            format!(
                "<tr><td>{badge}</td><td>{}</td><td class=\"num\"><strong>{}</strong></td><td class=\"num\">{}</td></tr>",
                esc(&r.display_name),
                fmt_score(r.score),
                r.lowest_threshold.map_or_else(|| "—".to_string(), fmt_score),
            )
        }).collect();
        format!(
            "<h2>🚨 Needs Attention ({} critical, {} warning)</h2>\
             <table><thead><tr><th>Severity</th><th>KPI</th><th style=\"text-align:right\">Score</th>\
             <th style=\"text-align:right\">Lowest Threshold</th></tr></thead><tbody>{rows}</tbody></table>",
            p.critical_count, p.warning_count
        )
    };

    let tool_section = if p.tools.is_empty() {
        String::new()
    } else {
        let rows: String = p.tools.iter().map(|t| format!(
            "<tr><td>{}</td><td class=\"dim\">{}</td><td class=\"num\">{}</td></tr>",
            esc(&t.name), esc(&t.description), t.findings
        )).collect();
        format!(
            "<h2>🔧 Tools</h2><table><thead><tr><th>Tool</th><th>Description</th>\
             <th style=\"text-align:right\">Findings</th></tr></thead><tbody>{rows}</tbody></table>"
        )
    };

    let issue_section = if p.issues.is_empty() {
        String::new()
    } else {
        let items: String = p.issues.iter()
            .map(|i| format!("<li class=\"dim\">{}</li>", esc(&i.to_string())))
            .collect();
        format!("<h2>⚠️ Validation Issues</h2><ul>{items}</ul>")
    };

    let chart = if p.chart.labels.is_empty() {
        String::new()
    } else {
        format!("<h2>Health Score History</h2><div class=\"chart-wrap\"><canvas id=\"chart-{index}\"></canvas></div>")
    };

    format!(
        r#"<div class="card">
    <h3>📦 {name}</h3>
    <p class="dim">{description}</p>
    <p class="meta">
      <span>Version: <strong>{version}</strong></span>
      <span>Languages: <strong>{languages}</strong></span>
      <span><a href="{url}">{url}</a></span>
    </p>
    <div class="stats">
      <div class="stat"><div class="stat-label">Health Score</div><div class="stat-value {health_class}">{health}</div>{trend}</div>
      <div class="stat"><div class="stat-label">KPIs Above Threshold</div><div class="stat-value {status_class}">{above}/{total}</div><div class="dim">{percentage}%</div></div>
      <div class="stat"><div class="stat-label">Critical</div><div class="stat-value text-danger">{critical}</div></div>
      <div class="stat"><div class="stat-label">Reports</div><div class="stat-value text-muted">{results}</div></div>
    </div>
    <p class="{status_class}" style="margin-bottom:1.5rem">{summary}</p>
    {chart}
    <h2>Top-level KPIs</h2>
    <table><thead><tr><th>KPI</th><th style="text-align:right">Score</th><th style="text-align:right">Threshold</th><th>Status</th></tr></thead>
    <tbody>{kpi_rows}</tbody></table>
    {severity_section}
    {tool_section}
    {issue_section}
  </div>
"#,
        name = esc(&p.name),
        description = esc(p.description.as_deref().unwrap_or("")),
        version = esc(&p.version),
        languages = esc(&p.languages),
        url = esc(&p.project_url),
        health_class = p.health_tone.css_class(),
        health = health,
        trend = trend,
        status_class = p.status_color.css_class(),
        above = p.kpis_above,
        total = p.kpis_total,
        percentage = p.percentage,
        critical = p.critical_count,
        results = p.result_count,
        summary = esc(&p.summary),
        chart = chart,
        kpi_rows = kpi_rows,
        severity_section = severity_section,
        tool_section = tool_section,
        issue_section = issue_section,
    )
}

fn chart_script(index: usize, p: &ProductSummary) -> String {
    let labels = serde_json::to_string(&p.chart.labels).unwrap_or_default();
    // Missing scores serialize as null, which Chart.js renders as a gap.
    let data = serde_json::to_string(&p.chart.data).unwrap_or_default();
    format!(
        r#"    new Chart(document.getElementById('chart-{index}'), {{
      type: 'line',
      data: {{ labels: {labels}, datasets: [{{ label: 'Health Score', data: {data}, borderColor: '#38bdf8', backgroundColor: 'rgba(56,189,248,0.15)', fill: true, tension: 0.3, spanGaps: false }}] }},
      options: {{
        responsive: true, maintainAspectRatio: false,
        plugins: {{ legend: {{ display: false }} }},
        scales: {{
          y: {{ beginAtZero: true, max: 100, ticks: {{ color: '#64748b' }}, grid: {{ color: '#1e2d47' }} }},
          x: {{ ticks: {{ color: '#64748b' }}, grid: {{ display: false }} }}
        }}
      }}
    }});
"#
    )
}

fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
