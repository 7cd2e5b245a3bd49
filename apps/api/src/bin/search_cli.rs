//! Runs one search against a JobPulse service and prints every state transition.
//!
//! Usage: jobpulse-search <query>... [--filters <json>] [--skills <a,b,c>] [--api-url <url>]
//!        [--poll-interval-ms <ms>] [--taxonomy <path>]

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobpulse::insights::aggregate;
use jobpulse::search::{HttpSearchBackend, SearchCoordinator, SearchPhase, SearchState};
use jobpulse::skills::{compare, job_skills, SkillTaxonomy, SkillVocabulary};

#[derive(Debug, Parser)]
#[command(
    name = "jobpulse-search",
    about = "Run one job search against a JobPulse service and follow it to completion"
)]
struct Cli {
    /// Search query; multiple words are joined with spaces
    #[arg(required = true)]
    query: Vec<String>,

    /// Search filters as a JSON value, forwarded unchanged
    #[arg(long, value_parser = parse_filters)]
    filters: Option<Value>,

    /// Candidate skills for the comparison and demand report (comma-separated)
    #[arg(long, value_delimiter = ',')]
    skills: Vec<String>,

    /// Base URL of the JobPulse service
    #[arg(long, env = "JOBPULSE_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Delay between status polls in milliseconds
    #[arg(
        long,
        env = "POLL_INTERVAL_MS",
        default_value_t = 3000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval_ms: u64,

    /// JSON file overriding the built-in skill taxonomy
    #[arg(long, env = "SKILL_TAXONOMY_PATH")]
    taxonomy: Option<PathBuf>,
}

impl Cli {
    fn query(&self) -> String {
        self.query.join(" ")
    }

    fn candidate_skills(&self) -> Vec<String> {
        self.skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_filters(raw: &str) -> serde_json::Result<Value> {
    serde_json::from_str(raw)
}

fn print_state(state: &SearchState) {
    let id = state.search_id.as_deref().unwrap_or("-");
    match state.status {
        SearchPhase::Failed => println!(
            "[{}] search={id} error={}",
            state.status.as_str(),
            state.error.as_deref().unwrap_or("unknown")
        ),
        _ => println!(
            "[{}] search={id} matches={}",
            state.status.as_str(),
            state.matches.len()
        ),
    }
}

fn print_report(state: &SearchState, skills: &[String], taxonomy: Option<&Path>) -> Result<()> {
    let taxonomy = SkillTaxonomy::from_config(taxonomy)?;
    let vocabulary = SkillVocabulary::new(&taxonomy);

    if let Some(top) = state.matches.first() {
        let comparison = compare(skills, &job_skills(top, &vocabulary));
        println!(
            "\nTop match: {} at {} ({}% skill match)",
            top.title, top.company, comparison.match_percentage
        );
        println!("  matched: {}", comparison.matched.join(", "));
        println!("  partial: {}", comparison.partial.join(", "));
        println!("  missing: {}", comparison.missing.join(", "));
    }

    let report = aggregate(&state.matches, skills, &taxonomy, |job| {
        job_skills(job, &vocabulary)
    });
    println!(
        "\nDemand across {} match(es): coverage {}% ({} matched, {} partial, {} missing)",
        state.matches.len(),
        report.summary.coverage,
        report.summary.matched,
        report.summary.partial,
        report.summary.missing
    );
    for group in &report.by_category {
        println!("  {} ({})", group.category, group.demand_count);
        for stat in &group.skills {
            println!(
                "    {:<24} {:>3}%  {:?}",
                stat.canonical_name, stat.demand_percent, stat.status
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobpulse=warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let skills = cli.candidate_skills();

    let backend = HttpSearchBackend::new(cli.api_url.clone())?;
    let coordinator = SearchCoordinator::with_interval(backend, cli.poll_interval());

    let mut updates = coordinator.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            print_state(&state);
            if state.status.is_terminal() {
                return state;
            }
        }
        updates.borrow().clone()
    });

    coordinator.submit(&cli.query(), cli.filters.clone()).await?;

    let state = tokio::select! {
        state = printer => state?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; abandoning search");
            coordinator.reset();
            return Ok(());
        }
    };

    if state.status == SearchPhase::Completed {
        for (i, m) in state.matches.iter().enumerate() {
            println!(
                "  {:>2}. [{:>3}] {} at {} {}",
                i + 1,
                m.composite_score,
                m.title,
                m.company,
                m.location
            );
        }
        if !skills.is_empty() {
            print_report(&state, &skills, cli.taxonomy.as_deref())?;
        }
    }

    if state.status == SearchPhase::Failed {
        std::process::exit(1);
    }
    Ok(())
}
