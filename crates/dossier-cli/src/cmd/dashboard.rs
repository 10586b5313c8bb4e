//! Implementation of `dossier dashboard <file> --user U [--now T]`.
//!
//! Summarises the documents the user may access: totals, own uploads,
//! recent uploads within the configured window, the newest five, and counts
//! per classification.
use std::io::Write;

use chrono::{DateTime, Duration, Utc};
use dossier_core::{Dashboard, dashboard};

use super::{Context, describe_user};
use crate::OutputFormat;
use crate::cli::SubjectArgs;
use crate::error::CliError;
use crate::format::{stdout_error, write_json};

/// Runs the `dashboard` command.
pub fn run(
    ctx: &Context,
    subject: &SubjectArgs,
    now: Option<DateTime<Utc>>,
) -> Result<(), CliError> {
    let (snapshot, user) = ctx.load_subject(subject)?;
    let now = now.unwrap_or_else(Utc::now);
    let window = Duration::days(i64::from(ctx.config.recent_window_days));
    let dash = dashboard(&ctx.policy, &user, &snapshot.documents, now, window);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match ctx.format {
        OutputFormat::Human => {
            writeln!(out, "user:      {}", describe_user(&ctx.policy, &user))
                .and_then(|()| print_human(&mut out, &dash, ctx.config.recent_window_days))
        }
        OutputFormat::Json => write_json(&mut out, &dash),
    }
    .map_err(|e| stdout_error(&e))
}

fn print_human<W: Write>(w: &mut W, dash: &Dashboard<'_>, window_days: u32) -> std::io::Result<()> {
    writeln!(w, "total:     {}", dash.total)?;
    writeln!(w, "owned:     {}", dash.owned)?;
    writeln!(w, "recent:    {} (last {window_days} days)", dash.recent)?;
    writeln!(w, "by classification:")?;
    for c in &dash.by_classification {
        writeln!(w, "  {}: {}", c.classification, c.count)?;
    }
    writeln!(w, "newest:")?;
    for doc in &dash.recent_documents {
        writeln!(
            w,
            "  {}  {}  {}",
            doc.created_at.format("%Y-%m-%d"),
            doc.id,
            doc.title
        )?;
    }
    Ok(())
}
