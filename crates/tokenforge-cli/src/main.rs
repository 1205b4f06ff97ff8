mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{
    Project, Resource, Section, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_MANIFEST_ERROR,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "tokenforge",
    version,
    about = "Design-token resolution engine and stylesheet generator"
)]
struct Cli {
    /// Project file; `tokenforge.toml` in the current directory when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Token source directory (overrides `tokens_dir` from the project file).
    #[arg(long, global = true)]
    tokens: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every module configured in the project file.
    Generate {
        /// List the files that would be written without writing them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Show the manifest and the resolved variable and style trees.
    Inspect {
        /// Print only one section as JSON.
        #[arg(long, value_enum)]
        section: Option<Section>,
    },
    /// Print one variable by dotted path, e.g. `colors.primary`.
    Token {
        path: String,
        /// Resolve the value for this mode only.
        #[arg(long)]
        mode: Option<String>,
    },
    /// Fetch raw data from the design API configured under `[api]`.
    Fetch {
        #[arg(value_enum)]
        resource: Resource,
        /// Node ids, for `nodes`.
        ids: Vec<String>,
        /// Write the response to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("TOKENFORGE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;
    let project = || Project::open(cli.config.as_deref(), cli.tokens.as_deref());

    let result = match cli.command {
        Commands::Generate { dry_run } => {
            project().and_then(|p| commands::generate::run(&p, dry_run, json_output))
        }
        Commands::Inspect { section } => {
            project().and_then(|p| commands::inspect::run(&p, section, json_output))
        }
        Commands::Token { path, mode } => project()
            .and_then(|p| commands::token::run(&p, &path, mode.as_deref(), json_output)),
        Commands::Fetch {
            resource,
            ids,
            output,
        } => project().and_then(|p| {
            commands::fetch::run(&p, resource, &ids, output.as_deref(), json_output)
        }),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("manifest error") {
                EXIT_MANIFEST_ERROR
            } else if msg.starts_with("config error") {
                EXIT_CONFIG_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
