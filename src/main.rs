use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{error::ErrorKind, Parser, ValueEnum};
use tracing::{debug, error, trace};

use wordcount::config::{JobConfig, DEFAULT_JOB_NAME};
use wordcount::job::Job;
use wordcount::tokenizer::{CaseNormalization, DelimiterPolicy};

/// Count word occurrences across local text files
#[derive(Parser, Debug)]
#[command(name = "wordcount", version)]
struct Cli {
    /// Input file, or a directory whose files are all counted
    input: PathBuf,

    /// Output file; must not exist yet
    output: PathBuf,

    /// Number of shards to split the input into (default: worker count)
    #[arg(short, long)]
    shards: Option<usize>,

    /// Number of worker threads (default: available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// How words are separated
    #[arg(short, long, value_enum, default_value_t = Delimiter::Whitespace)]
    delimiter: Delimiter,

    /// Delimiter regex, used with `--delimiter pattern`
    #[arg(long, required_if_eq("delimiter", "pattern"))]
    pattern: Option<String>,

    /// Lowercase every word before counting
    #[arg(short, long)]
    lowercase: bool,

    /// Name shown in log output
    #[arg(long, default_value = DEFAULT_JOB_NAME)]
    job_name: String,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Delimiter {
    Whitespace,
    NonAlphanumeric,
    Pattern,
}

impl Cli {
    fn job_config(&self) -> anyhow::Result<JobConfig> {
        let delimiter = match self.delimiter {
            Delimiter::Whitespace => DelimiterPolicy::Whitespace,
            Delimiter::NonAlphanumeric => DelimiterPolicy::NonAlphanumeric,
            Delimiter::Pattern => {
                let pattern = self
                    .pattern
                    .as_deref()
                    .context("--pattern is required with --delimiter pattern")?;
                DelimiterPolicy::pattern(pattern)?
            }
        };
        let case = if self.lowercase {
            CaseNormalization::Lower
        } else {
            CaseNormalization::None
        };

        let mut config = JobConfig::default()
            .with_job_name(&self.job_name)
            .with_delimiter(delimiter)
            .with_case(case);
        if let Some(workers) = self.workers {
            config = config.with_workers(workers).with_shard_count(workers);
        }
        if let Some(shards) = self.shards {
            config = config.with_shard_count(shards);
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 2)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.job_config()?;
    let job = Job::new(config)?;
    debug!(job = %job.id(), config = ?job.config(), "configured");

    job.execute(&cli.input, &cli.output)
        .await
        .with_context(|| format!("job '{}' failed", cli.job_name))?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // usage errors are job failures too
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };
    init_logging(cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
