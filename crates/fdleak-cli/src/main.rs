//! fdleak CLI - Snapshot this process's descriptors and look for leaks

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use fdleak::{DetailTool, Snapshot, Snapshotter};
use fdleak_runner::{DEFAULT_SHELL, Runner};

#[derive(Parser)]
#[command(name = "fdleak")]
#[command(author, version, about = "File descriptor leak checker")]
struct Cli {
    /// Tool producing the detailed listing
    #[arg(long, value_enum, default_value_t = Detail::default(), global = true)]
    detail: Detail,

    /// Shell commands are run through
    #[arg(long, default_value = DEFAULT_SHELL, global = true)]
    shell: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print this process's open descriptors and detailed listing
    Snapshot,

    /// Take two snapshots around an operation and report whether they differ
    Check {
        /// Open this file between the snapshots and keep it open
        #[arg(long)]
        leak: Option<PathBuf>,
    },

    /// Run a command through the constrained runner and print its output
    Run {
        /// Shell command line
        command: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Detail {
    Pfiles,
    Lsof,
    ProcLinks,
}

impl Default for Detail {
    fn default() -> Self {
        match DetailTool::default() {
            DetailTool::Pfiles => Detail::Pfiles,
            DetailTool::Lsof => Detail::Lsof,
            DetailTool::ProcLinks => Detail::ProcLinks,
        }
    }
}

impl From<Detail> for DetailTool {
    fn from(detail: Detail) -> Self {
        match detail {
            Detail::Pfiles => DetailTool::Pfiles,
            Detail::Lsof => DetailTool::Lsof,
            Detail::ProcLinks => DetailTool::ProcLinks,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fdleak=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let snapshotter = Snapshotter::new()
        .detail_tool(cli.detail.into())
        .shell(cli.shell.clone());

    match cli.command {
        Commands::Snapshot => {
            let snapshot = snapshotter.take_async().await?;
            print_snapshot("open fds", &snapshot);
        }

        Commands::Check { leak } => {
            let before = snapshotter.take_async().await?;

            let kept = match leak {
                Some(path) => {
                    tracing::info!(path = %path.display(), "opening file and keeping it open");
                    Some(File::open(&path)?)
                }
                None => None,
            };

            let after = snapshotter.take_async().await?;
            drop(kept);

            if before.differs(&after) {
                println!("leaks found!");
                print_snapshot("fds open before", &before);
                print_snapshot("fds open after", &after);
                return Ok(ExitCode::from(1));
            }
            println!("no leaks found");
        }

        Commands::Run { command } => {
            let runner = Runner::current().shell(cli.shell);
            let output = tokio::task::spawn_blocking(move || runner.run(&command)).await??;
            print!("{output}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_snapshot(title: &str, snapshot: &Snapshot) {
    let fds: Vec<String> = snapshot.fds().iter().map(u32::to_string).collect();
    println!("{title} ({}): {}", fds.len(), fds.join(","));
    print!("{}", snapshot.describe());
}
