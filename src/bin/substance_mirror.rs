use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use substance_mirror::app::{App, SyncOptions, SyncResult};
use substance_mirror::config::{ConfigLoader, ConfigOverrides};
use substance_mirror::error::MirrorError;
use substance_mirror::output::{ConsoleOutput, JsonOutput, OutputMode};
use substance_mirror::psychonaut::PsychonautHttpClient;
use substance_mirror::store::{DocumentStore, SyncReceipt};

#[derive(Parser)]
#[command(name = "substance-mirror")]
#[command(about = "Mirror the PsychonautWiki substance catalog into a local document store")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run one fetch-transform-upsert pass")]
    Sync(SyncArgs),
}

#[derive(Args, Clone, Default)]
struct SyncArgs {
    #[arg(long)]
    store: Option<String>,

    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long)]
    limit: Option<usize>,

    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(mirror) = report.downcast_ref::<MirrorError>() {
            return ExitCode::from(map_exit_code(mirror));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

// Only configuration problems exit non-zero; fetch failures and per-record
// store failures are reported and the process exits clean (best-effort run).
fn map_exit_code(error: &MirrorError) -> u8 {
    match error {
        MirrorError::MissingStoreUrl
        | MirrorError::InvalidStoreUrl(_)
        | MirrorError::InvalidConfig(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let command = cli.command.unwrap_or(Commands::Sync(SyncArgs::default()));
    match command {
        Commands::Sync(args) => run_sync(args, output_mode),
    }
}

fn run_sync(args: SyncArgs, output_mode: OutputMode) -> miette::Result<()> {
    let overrides = ConfigOverrides {
        store_url: args.store,
        endpoint: args.endpoint,
        substance_limit: args.limit,
    };
    let config = ConfigLoader::resolve(overrides).into_diagnostic()?;
    let store = DocumentStore::open(&config.store_url).into_diagnostic()?;

    let catalog =
        match PsychonautHttpClient::new(&config.endpoint, config.substance_limit, config.timeout) {
            Ok(catalog) => catalog,
            Err(err) => return report_run_error(err),
        };

    let options = SyncOptions {
        dry_run: args.dry_run,
    };
    let app = App::new(catalog, store.clone());

    let result = match output_mode {
        OutputMode::NonInteractive => app.run(options, &JsonOutput),
        OutputMode::Interactive => app.run(options, &ConsoleOutput),
    };
    let result = match result {
        Ok(result) => result,
        Err(err) => return report_run_error(err),
    };

    if !result.dry_run {
        let receipt = SyncReceipt::new(result.found, result.upserted, result.failures.len());
        if let Err(err) = store.write_receipt(&receipt) {
            eprintln!("warning: could not write sync receipt: {err}");
        }
    }

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_sync(&result).into_diagnostic()?,
        OutputMode::Interactive => print_sync_summary(&result),
    }
    Ok(())
}

fn report_run_error(error: MirrorError) -> miette::Result<()> {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
    Ok(())
}

fn print_sync_summary(result: &SyncResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}📦 substance-mirror summary{reset}");
    if result.dry_run {
        println!("{yellow}dry run; no documents written{reset}");
    }
    println!("{green}✅ substances found: {}{reset}", result.found);
    println!("{green}✅ upserted: {}{reset}", result.upserted);
    if result.failures.is_empty() {
        println!("{green}⚠️ failures: 0{reset}");
    } else {
        println!("{yellow}⚠️ failures: {}{reset}", result.failures.len());
        for failure in &result.failures {
            let name = failure.name.as_deref().unwrap_or("<unnamed>");
            println!("{yellow}  • {name}: {}{reset}", failure.reason);
        }
    }
}
