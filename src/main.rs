use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use feedsmith::cli::{Cli, ColorMode, Command};
use feedsmith::commands;
use feedsmith::commands::explain::ExplainCommandOptions;
use feedsmith::commands::feed::FeedCommandOptions;
use feedsmith::commands::filter::FilterCommandOptions;
use feedsmith::commands::init::{InitOptions, InitResult};
use feedsmith::commands::search::SearchCommandOptions;
use feedsmith::error::FeedSmithError;

fn main() {
    let cli = Cli::parse();

    // Configure color output
    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    // Init tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), FeedSmithError> {
    match cli.command {
        Command::Init { root, path, force } => {
            let root = resolve_root(root)?;
            let result = commands::init::run(InitOptions {
                root,
                config_path: path,
                force,
            })?;
            if !cli.quiet {
                print_init_result(&result);
            }
            Ok(())
        }
        Command::Search {
            query,
            items,
            limit,
            output,
        } => commands::search::run(SearchCommandOptions {
            query,
            items,
            limit,
            format: output.format,
            out: output.out,
            stdout: output.stdout,
            quiet: cli.quiet,
            config_path: cli.config,
        }),
        Command::Filter {
            label,
            items,
            limit,
            output,
        } => commands::filter::run(FilterCommandOptions {
            label,
            items,
            limit,
            format: output.format,
            out: output.out,
            stdout: output.stdout,
            quiet: cli.quiet,
            config_path: cli.config,
        }),
        Command::Feed {
            items,
            user,
            profile,
            limit,
            seed,
            now,
            output,
        } => commands::feed::run(FeedCommandOptions {
            items,
            user,
            profile,
            limit,
            seed,
            now,
            format: output.format,
            out: output.out,
            stdout: output.stdout,
            quiet: cli.quiet,
            config_path: cli.config,
        }),
        Command::Explain {
            query,
            items,
            top,
            all,
        } => commands::explain::run(ExplainCommandOptions {
            query,
            items,
            top,
            all,
            quiet: cli.quiet,
        }),
    }
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf, FeedSmithError> {
    match root {
        Some(p) => Ok(p),
        None => std::env::current_dir()
            .map_err(|e| FeedSmithError::io("getting current directory", e)),
    }
}

fn print_init_result(result: &InitResult) {
    let verb = if result.overwritten {
        "Overwrote"
    } else {
        "Created"
    };
    println!(
        "{} {verb} config at {}",
        "ok".green().bold(),
        result.config_path.display()
    );
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to tune feed size and appeal keywords",
        "feedsmith.toml".bold()
    );
    println!(
        "  2. Run {} to rank a catalog",
        "feedsmith search <query> --items items.json".bold()
    );
    println!(
        "  3. Run {} to compose a home feed",
        "feedsmith feed --items items.json".bold()
    );
}
