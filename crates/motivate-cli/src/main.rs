use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::Result;
use motivate_core::models::decision::EndDecision;
use motivate_core::models::rubric::RubricVersion;
use motivate_core::models::score::ScoreBreakdown;

use motivate_cli::commands::{self, ReportFormat};
use motivate_cli::config::{self, MotivateConfig};

#[derive(Parser)]
#[command(name = "motivate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MI practice session gate and feedback scoring", long_about = None)]
struct Cli {
    /// Config file (default: per-user config dir, then built-in defaults)
    #[arg(long, global = true, env = "MOTIVATE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a transcript (JSON array of turns) through the end gate,
    /// printing one JSON line per turn
    Gate {
        transcript: PathBuf,

        /// Print the accumulated gate trace after the last turn
        #[arg(long)]
        trace: bool,
    },

    /// Parse evaluator feedback and print the score breakdown as JSON
    Score {
        /// Feedback text file, or `-` for stdin
        feedback: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Render a session report from evaluator feedback
    Report {
        /// Feedback text file, or `-` for stdin
        feedback: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,

        /// Tera template to render instead of the built-in layout
        #[arg(long)]
        template: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct ScoringArgs {
    /// Rubric version (binary or graduated); defaults to the configured one
    #[arg(long)]
    rubric: Option<RubricVersion>,

    /// Transcript used to derive engagement and timing modifiers
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Mean student response latency in seconds; overrides timestamps
    #[arg(long)]
    mean_latency: Option<f64>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.json);

    run(cli.command, cli.config.as_deref())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(command: Command, explicit: Option<&Path>) -> Result<()> {
    match command {
        Command::Gate { transcript, trace } => {
            let config = &config::load_config(explicit)?;
            let turns = commands::parse_transcript(&read_input(&transcript)?)?;
            let replay = commands::gate(config, &turns)?;
            for step in &replay.steps {
                println!("{}", serde_json::to_string(step)?);
            }
            if trace && let Some(decision) = &replay.final_decision {
                for entry in &decision.trace {
                    println!("{entry}");
                }
            }
        }
        Command::Score { feedback, scoring } => {
            let config = &config::load_config(explicit)?;
            let (breakdown, _) = score(config, &feedback, &scoring)?;
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        }
        Command::Report {
            feedback,
            scoring,
            template,
            format,
        } => {
            let config = &config::load_config(explicit)?;
            let (breakdown, decision) = score(config, &feedback, &scoring)?;
            let template = template
                .map(|path| std::fs::read_to_string(&path))
                .transpose()?;
            let rendered =
                commands::report(&breakdown, decision.as_ref(), format, template.as_deref())?;
            println!("{rendered}");
        }
        Command::Config { action } => run_config(action, explicit)?,
    }
    Ok(())
}

/// Score feedback and, when a transcript is supplied, replay it through
/// the gate so reports can show the final end decision.
fn score(
    config: &MotivateConfig,
    feedback: &Path,
    args: &ScoringArgs,
) -> Result<(ScoreBreakdown, Option<EndDecision>)> {
    let feedback = read_input(feedback)?;
    let turns = args
        .transcript
        .as_deref()
        .map(|path| read_input(path).and_then(|s| commands::parse_transcript(&s)))
        .transpose()?;

    let modifiers = commands::modifiers(turns.as_deref(), args.mean_latency);
    let breakdown = commands::score(config, &feedback, args.rubric, modifiers.as_ref())?;
    let decision = match &turns {
        Some(turns) => commands::gate(config, turns)?.final_decision,
        None => None,
    };
    Ok((breakdown, decision))
}

fn run_config(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config::default_config_path()?,
    };
    match action {
        ConfigAction::Show => {
            let config = config::load_config(explicit)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init { force } => {
            config::init_config(&path, force)?;
            println!("{}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))
}
