//! BiasLens CLI
//!
//! Usage:
//!   biaslens --text "your text here"          # Single analysis
//!   biaslens --interactive                    # Line-by-line session (history accumulates)
//!   biaslens --batch requests.jsonl           # JSONL batch, analyzed concurrently
//!   biaslens --text "text" --json             # JSON output

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use biaslens::core::BiasAnalyzer;
use biaslens::types::{AnalysisOptions, AnalysisRequest, AnalysisResult, Language, RiskLevel};
use biaslens::{AnalyzerConfig, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "biaslens",
    version = VERSION,
    about = "BiasLens - Score text for bias with statistical validation and howlround protection",
    long_about = "BiasLens scores free-form text for demographic, institutional and\n\
                  contextual bias, validates the score statistically, corrects for the\n\
                  tool's own measured bias, and damps self-reinforcing score drift.\n\n\
                  Modes:\n  \
                  --text         Single analysis\n  \
                  --interactive  One analysis per line, sharing history\n  \
                  --batch FILE   JSONL requests: {\"text\": ..., \"language\": ...}\n\n\
                  Risk levels:\n  \
                  MINIMAL  < 20\n  \
                  LOW      < 40\n  \
                  MODERATE < 60\n  \
                  HIGH     < 80\n  \
                  SEVERE   >= 80"
)]
struct Args {
    /// Text to analyze (single mode)
    #[arg(short, long)]
    text: Option<String>,

    /// Interactive mode - read lines from stdin
    #[arg(short, long)]
    interactive: bool,

    /// JSONL file of analysis requests
    #[arg(short, long, value_name = "FILE")]
    batch: Option<PathBuf>,

    /// Analyzer configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Language hint (en, es, fr); skips detection
    #[arg(short, long)]
    language: Option<Language>,

    /// Skip baseline calibration
    #[arg(long)]
    no_calibration: bool,

    /// Skip howlround history and attenuation
    #[arg(long)]
    no_history: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show category, statistics and guard breakdown
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            language: self.language,
            skip_calibration: self.no_calibration,
            skip_history: self.no_history,
            skip_counterfactual: false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AnalyzerConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    let analyzer = Arc::new(BiasAnalyzer::new(config).context("building analyzer")?);

    if let Some(path) = &args.batch {
        run_batch(&analyzer, path, &args).await
    } else if args.interactive {
        run_interactive(&analyzer, &args)
    } else if let Some(text) = &args.text {
        run_single(&analyzer, text, &args)
    } else {
        // Default to interactive if no mode specified
        run_interactive(&analyzer, &args)
    }
}

/// Run single text analysis
fn run_single(analyzer: &BiasAnalyzer, text: &str, args: &Args) -> Result<()> {
    let result = analyzer.analyze(text, &args.options())?;
    print_result(&result, args, true)
}

/// Run interactive mode: one analysis per line on a shared session
fn run_interactive(analyzer: &BiasAnalyzer, args: &Args) -> Result<()> {
    print_header("Interactive", args.no_color);
    println!("Type text and press Enter to analyze. Type 'quit' to exit.");
    println!("History accumulates: repeated high scores are damped.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let options = args.options();
    let mut analyzed = 0usize;

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let result = analyzer.analyze(line, &options)?;
        analyzed += 1;
        print_result(&result, args, false)?;
    }

    println!(
        "\nSession ended. Analyses: {} | History: {}",
        analyzed,
        analyzer.history().len()
    );
    Ok(())
}

/// Run a JSONL batch: one request per line, results printed in input order
async fn run_batch(analyzer: &Arc<BiasAnalyzer>, path: &Path, args: &Args) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch file {}", path.display()))?;

    let mut requests = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut request: AnalysisRequest = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid request", path.display(), number + 1))?;
        if request.options.language.is_none() {
            request.options.language = args.language;
        }
        request.options.skip_calibration |= args.no_calibration;
        request.options.skip_history |= args.no_history;
        requests.push(request);
    }

    tracing::info!(requests = requests.len(), file = %path.display(), "batch loaded");

    for result in analyzer.analyze_batch(requests).await {
        match result {
            Ok(result) => print_result(&result, args, false)?,
            Err(e) => eprintln!("error: {}", e),
        }
    }
    Ok(())
}

fn print_result(result: &AnalysisResult, args: &Args, pretty: bool) -> Result<()> {
    if args.json {
        let json = if pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        println!("{}", json);
    } else if args.verbose {
        print_verbose(result, args.no_color);
    } else if args.no_color {
        println!("{}", result.to_parseable_string());
    } else {
        println!("{}", result.to_terminal_string());
    }
    Ok(())
}

/// Print header
fn print_header(mode: &str, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  BiasLens v{} - {}", VERSION, mode);
        println!("========================================");
    } else {
        println!("\x1b[1m╔════════════════════════════════════════╗\x1b[0m");
        println!("\x1b[1m║  BiasLens v{} - {:<22}║\x1b[0m", VERSION, mode);
        println!("\x1b[1m╚════════════════════════════════════════╝\x1b[0m");
    }
    println!();
}

/// Print verbose breakdown
fn print_verbose(result: &AnalysisResult, no_color: bool) {
    let color = if no_color { "" } else { result.risk_level.color_code() };
    let reset = if no_color { "" } else { RiskLevel::color_reset() };

    println!("{}┌──────────────────────────────────────┐{}", color, reset);
    println!(
        "{}│ score = {:.0}  risk = {}  severity = {}{}",
        color, result.final_score, result.risk_level, result.severity, reset
    );
    println!(
        "{}│ {} words, language {}, raw {:.1}, calibrated {:.1}{}",
        color,
        result.word_count,
        result.language,
        result.raw.overall_score,
        result.calibrated.overall_score,
        reset
    );
    println!("{}├──────────────────────────────────────┤{}", color, reset);
    println!("{}│ Categories:{}", color, reset);
    for m in &result.raw.matches {
        println!(
            "{}│   {:<17} {:>5.1}  [{}]{}",
            color,
            m.category.code(),
            m.score,
            m.matched_terms.join(", "),
            reset
        );
    }
    println!("{}├──────────────────────────────────────┤{}", color, reset);
    let stats = &result.statistics;
    println!(
        "{}│ CI [{:.1}, {:.1}]  p = {:.3}  effect = {:?}{}",
        color,
        stats.confidence_interval.lower,
        stats.confidence_interval.upper,
        stats.p_value,
        stats.effect_magnitude,
        reset
    );
    if let Some(ratio) = stats.impact_ratio() {
        println!("{}│ four-fifths ratio = {:.2}{}", color, ratio, reset);
    }
    println!(
        "{}│ calibration: {} (tool bias {:.1}){}",
        color, result.calibration.quality, result.calibration.tool_bias, reset
    );
    if result.counterfactual.performed {
        println!(
            "{}│ counterfactual: {} ({} variants, SD {:.1}){}",
            color,
            result.counterfactual.verdict,
            result.counterfactual.cases.len(),
            result.counterfactual.std_dev,
            reset
        );
    }
    if let Some(h) = &result.howlround {
        println!(
            "{}│ howlround: {} (confidence {:.2}, β {:.2}){}",
            color, h.action.code(), h.confidence, h.attenuation_factor, reset
        );
    }
    println!("{}├──────────────────────────────────────┤{}", color, reset);
    for line in &result.recommendations {
        println!("{}│ • {}{}", color, line, reset);
    }
    println!("{}└──────────────────────────────────────┘{}", color, reset);
}
