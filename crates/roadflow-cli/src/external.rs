//! Invocation of the external LP solver and graph renderer.
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use roadflow_lp::Sense;
use tracing::{debug, info};

/// Run `program` with `args`, failing on a spawn error or a nonzero exit status.
fn run(program: &str, args: &[OsString]) -> Result<()> {
    info!(program, args = ?args, "running external command");
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to spawn `{}`", program))?;

    debug!(stdout = %String::from_utf8_lossy(&output.stdout), "{} finished", program);
    if !output.status.success() {
        bail!(
            "`{}` exited with {}\n--- stderr ---\n{}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Arguments for `glpsol` reading a free MPS statement and writing a printable report.
///
/// Presolve stays off so infeasible or unbounded models still produce the full report.
pub fn solver_args(statement: &Path, report: &Path, sense: Sense) -> Vec<OsString> {
    let direction = match sense {
        Sense::Maximize => "--max",
        Sense::Minimize => "--min",
    };
    vec![
        "--freemps".into(),
        statement.into(),
        direction.into(),
        "--nopresol".into(),
        "-o".into(),
        report.into(),
    ]
}

pub fn solve(program: &str, statement: &Path, report: &Path, sense: Sense) -> Result<()> {
    run(program, &solver_args(statement, report, sense))
}

pub fn renderer_args(dot: &Path, image: &Path) -> Vec<OsString> {
    let format = image
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png");
    vec![format!("-T{}", format).into(), dot.into(), "-o".into(), image.into()]
}

pub fn render(program: &str, dot: &Path, image: &Path) -> Result<()> {
    run(program, &renderer_args(dot, image))
}
