//! Summer school client entry point.

use clap::Parser;
use std::process::ExitCode;
use summer::cli::commands;
use summer::cli::commands::refresh::RefreshArgs;
use summer::cli::{Cli, Commands};
use summer::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info,hyper=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let db = cli.db.as_ref();
    let settings = cli.settings.as_ref();
    let api_url = cli.api_url.as_deref();

    match &cli.command {
        Commands::Login { code } => commands::login::execute(code, settings, api_url, json),
        Commands::Lock => commands::lock::execute(settings, api_url, json),
        Commands::Refresh {
            collection,
            week,
            images,
        } => commands::refresh::execute(
            &RefreshArgs {
                collection,
                week: *week,
                images: *images,
                db,
                settings,
                api_url,
            },
            json,
        ),
        Commands::List { collection } => commands::list::execute(collection, db, json),
        Commands::Comments { thread_id } => {
            commands::comments::execute(thread_id, db, settings, api_url, json)
        }
        Commands::Status => commands::status::execute(db, settings, api_url, json),
        Commands::Version => commands::version::execute(json),
        Commands::Completions { shell } => commands::completions::execute(*shell),
    }
}
