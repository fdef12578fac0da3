//! persona-bridge CLI - course recommendations from the command line
//!
//! Orchestrates the full pipeline:
//!
//! 1. Config: persona-bridge.toml (searched upward) plus flag overrides
//! 2. Data: ontology CSVs (optional) and the course corpus (JSON)
//! 3. Profile: seeds expanded through the ontology
//! 4. Scoring: CT/WP lexical score + collaborator judgment per course
//! 5. Ranking: normalize, sort, cut to the top N
//! 6. Rendering: colored report or JSON
//!
//! Missing data never aborts a run: no ontology means unexpanded seeds, no
//! corpus means an empty shortlist. Only an explicit `--config` that cannot be
//! read, or an unreadable mock fixture, is fatal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use persona_bridge::rendering::ReportRenderer;
use persona_bridge::{
    split_history, CollaboratorKind, ConceptGraph, Config, Corpus, ExpansionCache,
    RankingAggregator, StudentInput, NONE_SENTINEL,
};

/// Course recommendations for credit-exchange students
///
/// Builds a keyword profile from the student's major, double major and
/// course history, expands it through a concept ontology, and ranks partner
/// courses by keyword overlap plus an LLM relevance judgment.
///
/// Examples:
///   persona-bridge --major "Business Administration"
///   persona-bridge --major Economics --history "Statistics, Accounting" --interest fintech
///   persona-bridge --major Economics --agent mock --fixture data/fixture.json --json
#[derive(Parser, Debug)]
#[command(name = "persona-bridge")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Primary major
    #[arg(long)]
    pub major: String,

    /// Double major, or "none"
    #[arg(long, default_value = NONE_SENTINEL)]
    pub double_major: String,

    /// Courses already taken, comma-separated
    ///
    ///   --history "Principles of Accounting, Statistics"
    #[arg(long, default_value = "")]
    pub history: String,

    /// Field of interest
    ///
    /// Goes into the profile at full weight and is shown to the
    /// collaborator alongside the profile summary.
    #[arg(long)]
    pub interest: Option<String>,

    /// Config file (default: search persona-bridge.toml upward from cwd)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Course corpus JSON (overrides config)
    #[arg(long, value_name = "FILE")]
    pub courses: Option<PathBuf>,

    /// Ontology nodes CSV (overrides config)
    #[arg(long, value_name = "FILE")]
    pub nodes: Option<PathBuf>,

    /// Ontology edges CSV (overrides config)
    #[arg(long, value_name = "FILE")]
    pub edges: Option<PathBuf>,

    /// Relevance collaborator: gemini, claude, mock, or none
    ///
    /// "none" disables term expansion and relevance judgments; scores are
    /// then purely lexical.
    #[arg(long)]
    pub agent: Option<CollaboratorKind>,

    /// Model name passed to the agent CLI
    #[arg(long)]
    pub model: Option<String>,

    /// Canned collaborator answers (JSON); implies --agent mock
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Number of courses to show
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Emit JSON instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Enable colored output
    #[arg(long, default_value = "true")]
    pub color: bool,

    /// Disable colored output
    ///
    /// Equivalent to --color=false. Useful for piping to files.
    #[arg(long)]
    pub no_color: bool,

    /// Also print the weighted keyword profile
    #[arg(long)]
    pub show_profile: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let output = run(&cli)?;

    // Print to stdout (can be piped or redirected)
    println!("{}", output);

    Ok(())
}

/// Resolve config: explicit file, else discovered, then flag overrides.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
            Config::load(&cwd)
        }
    };

    if let Some(ref path) = cli.courses {
        config.data.courses = path.clone();
    }
    if let Some(ref path) = cli.nodes {
        config.data.nodes = path.clone();
    }
    if let Some(ref path) = cli.edges {
        config.data.edges = path.clone();
    }
    if let Some(ref fixture) = cli.fixture {
        config.agent.fixture = Some(fixture.clone());
        config.agent.kind = CollaboratorKind::Mock;
    }
    if let Some(kind) = cli.agent {
        config.agent.kind = kind;
    }
    if let Some(ref model) = cli.model {
        config.agent.model = Some(model.clone());
    }
    if let Some(top) = cli.top {
        config.scoring.top_n = Some(top);
    }

    Ok(config)
}

/// Execute the full recommendation pipeline and return the rendered output.
fn run(cli: &Cli) -> Result<String> {
    let use_color = cli.color && !cli.no_color;
    let config = resolve_config(cli)?;

    if cli.verbose > 0 {
        eprintln!("{}", config.display_summary());
    }

    let graph = ConceptGraph::load_or_absent(&config.data.nodes, &config.data.edges).map(Arc::new);
    let corpus = Corpus::load_or_empty(&config.data.courses);
    let collaborator = config
        .build_collaborator()
        .context("Failed to set up relevance collaborator")?;

    let aggregator = RankingAggregator::new(
        config.scoring_config(),
        graph,
        Arc::new(config.stopwords()),
        collaborator,
        Arc::new(ExpansionCache::new()),
    );

    let mut input = StudentInput::new(cli.major.as_str())
        .with_double_major(cli.double_major.as_str())
        .with_history(split_history(&cli.history));
    if let Some(ref interest) = cli.interest {
        input = input.with_interest(interest.as_str());
    }

    info!(
        seeds = input.seeds().len(),
        courses = corpus.len(),
        ontology = aggregator.has_ontology(),
        agent = %config.agent.kind,
        "running recommendation"
    );
    let outcome = aggregator.recommend(&input, &corpus);

    let renderer = ReportRenderer::new(use_color).with_profile(cli.show_profile);
    if cli.json {
        renderer
            .render_json(&outcome)
            .context("Failed to serialize recommendations")
    } else {
        Ok(renderer.render(&input, &outcome))
    }
}
