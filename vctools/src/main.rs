mod commands;
mod formatting;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

const USAGE_EXAMPLES: &str = "\
Usage:

  $ vc-tools run lint       lint source within lib
  $ vc-tools run pub        publish component
  $ vc-tools run server     start server
  $ vc-tools run prettier   prettier all code
  $ vc-tools run watch      recompile on change
  $ vc-tools list           show every task";

#[derive(Parser)]
#[command(name = "vc-tools")]
#[command(about = "Build, lint, serve and publish component libraries")]
#[command(after_help = USAGE_EXAMPLES)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory containing package.json
    #[arg(long, default_value = ".")]
    cwd: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task and its dependencies (`server` starts the dev server)
    Run(RunArgs),
    /// List registered tasks
    List {
        #[arg(long, action)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Task to run
    task: Option<String>,

    /// Source directory
    #[arg(long, default_value = "src")]
    src: String,

    /// Let eslint fix what it can
    #[arg(long, action)]
    fix: bool,

    #[arg(long = "no-js-lint", action)]
    no_js_lint: bool,

    #[arg(long = "no-check-deps", action)]
    no_check_deps: bool,

    /// Minify compiled output
    #[arg(long, action)]
    compress: bool,

    /// Publish with tnpm instead of npm
    #[arg(long, action)]
    tnpm: bool,

    /// Dist-tag for stable releases
    #[arg(long)]
    tag: Option<String>,

    /// Copy compile output here after each watch rebuild
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, action)]
    babel_runtime: bool,

    /// Dev server port
    #[arg(long)]
    port: Option<u16>,

    /// Dev server page template
    #[arg(long)]
    template: Option<PathBuf>,

    /// Print task events as JSON lines
    #[arg(long, action)]
    json: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Run(args) => match args.task.as_deref() {
            None => {
                Cli::command().print_help()?;
                std::process::exit(1);
            }
            Some("server") => commands::cmd_server(&cli.cwd, &args).await?,
            Some(task) => {
                if !commands::cmd_run(&cli.cwd, task, &args).await? {
                    std::process::exit(1);
                }
            }
        },
        Commands::List { json } => commands::cmd_list(&cli.cwd, json)?,
    }

    Ok(())
}
