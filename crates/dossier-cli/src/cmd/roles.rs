//! Implementation of `dossier roles`.
//!
//! Prints the closed role set with each role's tier under the active policy
//! configuration.
use std::io::Write;

use dossier_core::{Role, RoleTiers, Tier};
use serde::Serialize;

use super::Context;
use crate::OutputFormat;
use crate::error::CliError;
use crate::format::{stdout_error, write_json};

#[derive(Serialize)]
struct RoleRow {
    role: Role,
    label: &'static str,
    tier: Tier,
}

fn rows(tiers: &RoleTiers) -> Vec<RoleRow> {
    tiers
        .iter()
        .map(|(role, tier)| RoleRow {
            role,
            label: role.label(),
            tier,
        })
        .collect()
}

/// Runs the `roles` command.
pub fn run(ctx: &Context) -> Result<(), CliError> {
    let rows = rows(ctx.policy.tiers());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match ctx.format {
        OutputFormat::Human => print_human(&mut out, &rows),
        OutputFormat::Json => write_json(&mut out, &rows),
    }
    .map_err(|e| stdout_error(&e))
}

fn print_human<W: Write>(w: &mut W, rows: &[RoleRow]) -> std::io::Result<()> {
    for row in rows {
        writeln!(
            w,
            "{:<24}  {:<28}  {}",
            row.role.as_str(),
            row.label,
            row.tier.as_str()
        )?;
    }
    Ok(())
}
