//! Implementation of `dossier predicate <file> --user U [--sql]`.
//!
//! Prints the accessible-document predicate for the user, either as a
//! readable expression or as a parameterised SQL `WHERE` fragment.
use std::io::Write;

use dossier_core::{Predicate, SqlFragment, SqlParam, SqlSchema, to_sql};

use super::Context;
use crate::OutputFormat;
use crate::cli::SubjectArgs;
use crate::error::CliError;
use crate::format::{stdout_error, write_json};

/// Runs the `predicate` command.
pub fn run(ctx: &Context, subject: &SubjectArgs, sql: bool) -> Result<(), CliError> {
    let (_, user) = ctx.load_subject(subject)?;
    let predicate = ctx.policy.accessible_predicate(&user);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let written = if sql {
        let fragment = to_sql(&predicate, &SqlSchema::default());
        match ctx.format {
            OutputFormat::Human => print_sql(&mut out, &fragment),
            OutputFormat::Json => write_json(&mut out, &fragment),
        }
    } else {
        match ctx.format {
            OutputFormat::Human => print_expression(&mut out, &predicate),
            OutputFormat::Json => write_json(&mut out, &predicate),
        }
    };
    written.map_err(|e| stdout_error(&e))
}

fn print_expression<W: Write>(w: &mut W, predicate: &Predicate) -> std::io::Result<()> {
    writeln!(w, "{predicate}")
}

fn print_sql<W: Write>(w: &mut W, fragment: &SqlFragment) -> std::io::Result<()> {
    writeln!(w, "{}", fragment.sql)?;
    for (i, param) in fragment.params.iter().enumerate() {
        let SqlParam::Text(value) = param;
        writeln!(w, "  ${} = {value:?}", i + 1)?;
    }
    Ok(())
}
