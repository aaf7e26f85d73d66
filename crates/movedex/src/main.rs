use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use movedex_api::{LookupArgs, SuggestArgs, TuiArgs};

mod profiling;

#[derive(Parser)]
#[command(name = "movedex")]
#[command(about = "Find out which Pokémon can learn a move", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// Write a performance profile to the specified path (Chrome tracing JSON format).
    /// View with chrome://tracing or https://ui.perfetto.dev/
    #[arg(long = "profile", global = true, value_name = "PATH", hide = true)]
    profile: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive search (default)
    Tui(TuiArgs),

    /// Print move names starting with a prefix
    #[command(alias = "s")]
    Suggest(SuggestArgs),

    /// List the Pokémon that can learn a move
    #[command(alias = "l")]
    Lookup(LookupArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug (overridden by RUST_LOG)
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    // Guard must be held until end of run
    let _profile_guard = profiling::init(cli.profile);

    match cli.command {
        None => movedex_api::execute_tui(TuiArgs {
            api: Default::default(),
        }),
        Some(Commands::Tui(args)) => movedex_api::execute_tui(args),
        Some(Commands::Suggest(args)) => movedex_api::execute_suggest(args),
        Some(Commands::Lookup(args)) => {
            log::debug!("Looking up {}", args.name);
            movedex_api::execute_lookup(args)
        }
    }
}
