use clap::Parser;
use dossier_core::AccessPolicy;

mod cli;
mod cmd;
mod error;
mod format;
mod io;
mod logging;

pub use cli::{Cli, Command, OutputFormat, PathOrStdin};

use crate::cmd::Context;
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();
    let colors = format::colors_enabled(cli.no_color);
    logging::init(cli.quiet, cli.verbose, colors);

    if let Err(e) = run(&cli, colors) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli, colors: bool) -> Result<(), CliError> {
    let config = io::load_config(cli.policy_config.as_deref(), cli.max_file_size)?;
    let policy = AccessPolicy::new(config.build_role_tiers()?);
    let ctx = Context {
        policy,
        config,
        format: cli.format,
        colors,
        max_file_size: cli.max_file_size,
    };

    match &cli.command {
        Command::Check { subject, document } => cmd::check::run(&ctx, subject, document),
        Command::List {
            subject,
            query,
            classification,
            category,
            owner,
            section,
            from,
            to,
            offset,
            limit,
        } => {
            let args = cmd::list::ListArgs {
                query: query.clone(),
                classification: *classification,
                category: category.clone(),
                owner: owner.clone(),
                section: section.clone(),
                from: *from,
                to: *to,
                offset: *offset,
                limit: *limit,
            };
            cmd::list::run(&ctx, subject, args)
        }
        Command::Predicate { subject, sql } => cmd::predicate::run(&ctx, subject, *sql),
        Command::Verify {
            file,
            snapshot_only,
        } => cmd::verify::run(&ctx, file, *snapshot_only),
        Command::Roles => cmd::roles::run(&ctx),
        Command::Dashboard { subject, now } => cmd::dashboard::run(&ctx, subject, *now),
    }
}
