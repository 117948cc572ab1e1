use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::SphaError;
use crate::report::DashboardReport;

/// Outputs the dashboard as JSON. Writes to a file if given, otherwise stdout.
pub fn report_json(report: &DashboardReport, output_file: Option<&Path>) -> Result<(), SphaError> {
    if let Some(path) = output_file {
        let file = File::create(path).map_err(|e| {
            SphaError::Output(format!("Failed to open {} for writing: {e}", path.display()))
        })?;
        write_pretty(BufWriter::new(file), report)
            .map_err(|e| SphaError::Output(format!("Failed to write {}: {e}", path.display())))?;
        eprintln!("✓ JSON report written to {}", path.display());
    } else {
        let stdout = std::io::stdout();
        write_pretty(BufWriter::new(stdout.lock()), report)
            .map_err(|e| SphaError::Output(format!("Failed to write stdout: {e}")))?;
    }

    Ok(())
}

fn write_pretty<W: Write>(mut writer: W, report: &DashboardReport) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
