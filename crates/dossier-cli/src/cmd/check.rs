//! Implementation of `dossier check <file> --user U --document D`.
//!
//! Prints the decision and the rule that produced it. Exit codes: 0 =
//! granted, 1 = denied, 2 = input failure.
use std::io::Write;

use dossier_core::{AccessDecision, AccessPolicy, Document, DocumentId, User};
use serde::Serialize;

use super::{Context, describe_user};
use crate::OutputFormat;
use crate::cli::SubjectArgs;
use crate::error::CliError;
use crate::format::{stdout_error, verdict, write_json};

#[derive(Serialize)]
struct CheckReport<'a> {
    user: &'a User,
    document: &'a DocumentId,
    classification: dossier_core::Classification,
    archived: bool,
    tier: dossier_core::Tier,
    #[serde(flatten)]
    decision: AccessDecision,
}

/// Runs the `check` command.
pub fn run(ctx: &Context, subject: &SubjectArgs, document: &str) -> Result<(), CliError> {
    let (snapshot, user) = ctx.load_subject(subject)?;
    let id = DocumentId::try_from(document).map_err(|e| CliError::InvalidArgument {
        detail: e.to_string(),
    })?;
    let doc = snapshot
        .document(&id)
        .ok_or_else(|| CliError::UnknownDocument {
            document: document.to_owned(),
        })?;

    let decision = ctx.policy.decide(&user, doc);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match ctx.format {
        OutputFormat::Human => print_human(&mut out, &ctx.policy, &user, doc, decision, ctx.colors),
        OutputFormat::Json => write_json(
            &mut out,
            &CheckReport {
                user: &user,
                document: &doc.id,
                classification: doc.classification,
                archived: doc.is_archived,
                tier: ctx.policy.tier_of(&user),
                decision,
            },
        ),
    }
    .map_err(|e| stdout_error(&e))?;

    if decision.granted {
        Ok(())
    } else {
        Err(CliError::AccessDenied)
    }
}

fn print_human<W: Write>(
    w: &mut W,
    policy: &AccessPolicy,
    user: &User,
    doc: &Document,
    decision: AccessDecision,
    colors: bool,
) -> std::io::Result<()> {
    let archived = if doc.is_archived { ", archived" } else { "" };
    writeln!(w, "user:      {}", describe_user(policy, user))?;
    writeln!(
        w,
        "document:  {} \"{}\" ({}{archived})",
        doc.id, doc.title, doc.classification
    )?;
    writeln!(w, "decision:  {}", verdict(decision.granted, colors))?;
    match decision.rule {
        Some(rule) => writeln!(w, "rule:      {rule}"),
        None => writeln!(w, "rule:      none (default deny)"),
    }
}
