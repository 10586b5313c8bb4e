//! Implementation of `dossier list <file> --user U [filters]`.
//!
//! Lists the documents the user may access (archived ones never appear),
//! narrowed by the search filters, newest first, one page at a time.
use std::io::Write;

use chrono::NaiveDate;
use dossier_core::{Classification, FolderKey, Listing, Page, SearchFilter, list_accessible};
use serde::Serialize;

use super::Context;
use crate::OutputFormat;
use crate::cli::SubjectArgs;
use crate::error::CliError;
use crate::format::{stdout_error, write_json};

/// Parsed filter and paging flags.
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    /// `--query`.
    pub query: Option<String>,
    /// `--classification`.
    pub classification: Option<Classification>,
    /// `--category`.
    pub category: Option<String>,
    /// `--owner`.
    pub owner: Option<String>,
    /// `--section`, not yet validated.
    pub section: Option<String>,
    /// `--from`.
    pub from: Option<NaiveDate>,
    /// `--to`.
    pub to: Option<NaiveDate>,
    /// `--offset`.
    pub offset: usize,
    /// `--limit`.
    pub limit: usize,
}

impl ListArgs {
    /// Converts the flags into a core filter and page.
    pub fn into_filter(self) -> Result<(SearchFilter, Page), CliError> {
        let section = self
            .section
            .as_deref()
            .map(FolderKey::try_from)
            .transpose()
            .map_err(|e| CliError::InvalidArgument {
                detail: format!("--section: {e}"),
            })?;
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(CliError::InvalidArgument {
                    detail: format!("--from {from} is after --to {to}"),
                });
            }
        }
        let filter = SearchFilter {
            query: self.query,
            classification: self.classification,
            category: self.category,
            owner: self.owner,
            section,
            created_from: self.from,
            created_to: self.to,
        };
        let page = Page {
            offset: self.offset,
            limit: self.limit,
        };
        Ok((filter, page))
    }
}

#[derive(Serialize)]
struct ListReport<'a> {
    total: usize,
    offset: usize,
    limit: usize,
    documents: &'a [&'a dossier_core::Document],
}

/// Runs the `list` command.
pub fn run(ctx: &Context, subject: &SubjectArgs, args: ListArgs) -> Result<(), CliError> {
    let (filter, page) = args.into_filter()?;
    let (snapshot, user) = ctx.load_subject(subject)?;
    let listing = list_accessible(
        &ctx.policy,
        &user,
        &snapshot.documents,
        &snapshot.users,
        &filter,
        page,
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match ctx.format {
        OutputFormat::Human => print_human(&mut out, &listing, page),
        OutputFormat::Json => write_json(
            &mut out,
            &ListReport {
                total: listing.total,
                offset: page.offset,
                limit: page.limit,
                documents: &listing.documents,
            },
        ),
    }
    .map_err(|e| stdout_error(&e))
}

fn print_human<W: Write>(w: &mut W, listing: &Listing<'_>, page: Page) -> std::io::Result<()> {
    let shown = listing.documents.len();
    let first = if shown == 0 { 0 } else { page.offset + 1 };
    writeln!(
        w,
        "showing {first}-{} of {}",
        page.offset + shown,
        listing.total
    )?;
    for doc in &listing.documents {
        writeln!(
            w,
            "{}  {:<12}  {:<13}  {:<10}  {}",
            doc.created_at.format("%Y-%m-%d"),
            &*doc.id,
            doc.classification.as_str(),
            &*doc.section,
            doc.title
        )?;
    }
    Ok(())
}
