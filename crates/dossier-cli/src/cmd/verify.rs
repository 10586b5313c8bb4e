//! Implementation of `dossier verify <file> [--snapshot-only]`.
//!
//! Cross-checks the per-document decision against the bulk predicate for
//! every user × document pair of the snapshot, then over the synthetic
//! space of every role and document fact combination. Any disagreement, or
//! any archived document either reading lets through, is a failure.
//!
//! Exit codes: 0 = consistent, 1 = inconsistent, 2 = input failure.
use std::io::Write;

use dossier_core::{EquivalenceReport, find_mismatches, synthetic_fact_space};
use serde::Serialize;

use super::Context;
use crate::error::CliError;
use crate::format::{stdout_error, verdict, write_json};
use crate::{OutputFormat, PathOrStdin};

/// Maximum number of failing pairs listed per section in human mode.
const MAX_LISTED: usize = 20;

#[derive(Serialize)]
struct VerifyReport {
    snapshot: EquivalenceReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    synthetic: Option<EquivalenceReport>,
}

impl VerifyReport {
    fn failures(&self) -> usize {
        [Some(&self.snapshot), self.synthetic.as_ref()]
            .into_iter()
            .flatten()
            .map(|r| r.mismatches.len() + r.archived_leaks.len())
            .sum()
    }
}

/// Runs the `verify` command.
pub fn run(ctx: &Context, file: &PathOrStdin, snapshot_only: bool) -> Result<(), CliError> {
    let snapshot = crate::io::load_snapshot(file, ctx.max_file_size)?;
    let report = VerifyReport {
        snapshot: find_mismatches(&ctx.policy, &snapshot.users, &snapshot.documents),
        synthetic: (!snapshot_only).then(|| {
            let (users, docs) = synthetic_fact_space();
            find_mismatches(&ctx.policy, &users, &docs)
        }),
    };
    tracing::info!(failures = report.failures(), "verification finished");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match ctx.format {
        OutputFormat::Human => print_human(&mut out, &report, ctx.colors),
        OutputFormat::Json => write_json(&mut out, &report),
    }
    .map_err(|e| stdout_error(&e))?;

    match report.failures() {
        0 => Ok(()),
        count => Err(CliError::Inconsistent { count }),
    }
}

fn print_human<W: Write>(w: &mut W, report: &VerifyReport, colors: bool) -> std::io::Result<()> {
    print_section(w, "snapshot", &report.snapshot, colors)?;
    if let Some(synthetic) = &report.synthetic {
        print_section(w, "synthetic", synthetic, colors)?;
    }
    Ok(())
}

fn print_section<W: Write>(
    w: &mut W,
    label: &str,
    report: &EquivalenceReport,
    colors: bool,
) -> std::io::Result<()> {
    let status = if report.is_consistent() {
        "consistent".to_owned()
    } else {
        format!("inconsistent ({})", verdict(false, colors))
    };
    writeln!(
        w,
        "{label}: {} pairs, {} granted, {} mismatches, {} archived leaks: {status}",
        report.pairs,
        report.granted,
        report.mismatches.len(),
        report.archived_leaks.len()
    )?;
    for m in report.mismatches.iter().take(MAX_LISTED) {
        writeln!(
            w,
            "  mismatch  user={} document={} check={} predicate={}",
            m.user, m.document, m.direct, m.predicate
        )?;
    }
    for m in report.archived_leaks.iter().take(MAX_LISTED) {
        writeln!(w, "  archived  user={} document={}", m.user, m.document)?;
    }
    Ok(())
}
