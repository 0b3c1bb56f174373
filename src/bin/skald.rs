//! skald: content generation CLI
//!
//! Headless front end for the generation pipeline: pick a content type and
//! a model, pass a topic (or one topic per line in batch mode), get text.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use serde::Serialize;

use skald::batch::BatchEvent;
use skald::config::{Config, SUPPORTED_MODELS, Secrets, load_dotenv};
use skald::{
    AnalysisResult, BatchPlan, Generator, HistoryStore, Skald, SkaldError, TemplateRegistry,
    analyze, artifact, run_batch,
};

/// Skald content generator
#[derive(Parser)]
#[command(name = "skald")]
#[command(version = skald::PKG_VERSION)]
#[command(about = "Generate recipes, travel guides, reading notes and social posts with an LLM")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, global = true, env = "SKALD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate content for a topic (or one topic per line with --batch)
    Generate {
        /// Topic text (or omit to read from stdin)
        text: Option<String>,
        /// Content type (see `skald templates`)
        #[arg(short = 't', long = "type", default_value = "recipe")]
        content_type: String,
        /// Model to use (default from config)
        #[arg(short, long, value_parser = PossibleValuesParser::new(SUPPORTED_MODELS.iter().copied()))]
        model: Option<String>,
        /// Treat each non-empty line as a separate topic
        #[arg(short, long)]
        batch: bool,
        /// Maximum topics per batch (1-10, default from config)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        max_items: Option<u8>,
        /// Write each result as a markdown file into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show generation history, newest first
    History {
        /// Show at most this many records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available content types
    Templates,

    /// Show statistics for a piece of text
    Analyze {
        /// Text to analyze (or omit to read from stdin)
        text: Option<String>,
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    load_dotenv();
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Generate {
            text,
            content_type,
            model,
            batch,
            max_items,
            output_dir,
            json,
        } => {
            let text = resolve_text(text, "generate")?;
            let max_items = max_items.map_or(config.batch.max_items, usize::from);
            let plan = BatchPlan::new(&text, batch, max_items)?;
            let model = model.unwrap_or_else(|| config.api.default_model.clone());
            let output_dir = output_dir.or_else(|| config.output.dir.clone());

            let generator = build_generator(&config, &Secrets::load()?)?;
            generator.registry().lookup(&content_type).map_err(|_| {
                SkaldError::UnknownTemplate(format!(
                    "{content_type} (available: {})",
                    generator.registry().content_types().join(", ")
                ))
            })?;

            if plan.truncated() {
                eprintln!(
                    "warning: {} topics given, only the first {} will be generated",
                    plan.requested(),
                    plan.len()
                );
            }

            let options = RenderOptions {
                content_type: &content_type,
                output_dir: output_dir.as_deref(),
                json,
            };
            let failed = generate(&generator, &model, &plan, &options).await?;
            return Ok(if failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }

        Command::History { limit, json } => {
            let store = HistoryStore::open(&config.history.path)?;
            let records = match limit {
                Some(n) => store.list_recent(n)?,
                None => store.list_all()?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("no history yet");
            } else {
                for record in records {
                    println!(
                        "#{} {} [{} / {}] {}",
                        record.id,
                        record.timestamp,
                        record.content_type,
                        record.model,
                        one_line(&record.input_text, 60)
                    );
                }
            }
        }

        Command::Templates => {
            let registry = load_templates(&config)?;
            for content_type in registry.content_types() {
                let template = registry.lookup(content_type)?;
                println!(
                    "{content_type:<14} {}",
                    one_line(&template.system_prompt, 64)
                );
            }
        }

        Command::Analyze { text, json } => {
            let text = resolve_text(text, "analyze")?;
            let result = analyze(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_analysis(&result);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// How generated items are presented.
struct RenderOptions<'a> {
    content_type: &'a str,
    output_dir: Option<&'a Path>,
    json: bool,
}

/// One entry of `generate --json` output.
#[derive(Serialize)]
struct JsonItem {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifact: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the batch, rendering each item as it completes. Returns the number
/// of failed items.
async fn generate(
    generator: &Generator,
    model: &str,
    plan: &BatchPlan,
    options: &RenderOptions<'_>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut json_items = Vec::new();

    let report = run_batch(generator, options.content_type, model, plan, |event| {
        match event {
            BatchEvent::ItemFinished {
                index,
                total,
                input,
                outcome,
            } => {
                let mut item = JsonItem {
                    input: input.to_string(),
                    output: None,
                    analysis: None,
                    artifact: None,
                    error: None,
                };
                match outcome {
                    Ok(text) => {
                        let stats = analyze(text);
                        item.artifact = options.output_dir.and_then(|dir| {
                            let now = chrono::Local::now();
                            match artifact::write_artifact(dir, options.content_type, text, &now) {
                                Ok(path) => Some(path),
                                Err(e) => {
                                    eprintln!("warning: could not save result: {e}");
                                    None
                                }
                            }
                        });
                        if !options.json {
                            println!("## Result {}/{}\n", index + 1, total);
                            println!("{text}\n");
                            print_analysis(&stats);
                            if let Some(ref path) = item.artifact {
                                println!("saved: {}", path.display());
                            }
                            println!();
                        }
                        item.output = Some(text.clone());
                        item.analysis = Some(stats);
                    }
                    Err(err) => {
                        eprintln!("error ({}): {}", one_line(input, 40), describe_error(err));
                        item.error = Some(err.to_string());
                    }
                }
                json_items.push(item);
            }
            BatchEvent::Progress {
                completed,
                total,
                fraction,
            } => {
                if total > 1 {
                    eprintln!("[{completed}/{total}] {:.0}%", fraction * 100.0);
                }
            }
            BatchEvent::Completed { succeeded, failed } => {
                eprintln!("done: {succeeded} generated, {failed} failed");
            }
        }
    })
    .await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    }
    Ok(report.failed())
}

/// Build the generator from configuration and secrets.
fn build_generator(config: &Config, secrets: &Secrets) -> skald::Result<Generator> {
    let api_key = secrets.api_key().ok_or_else(|| {
        SkaldError::Configuration(
            "no API key: set OPENAI_API_KEY or add api_key to ~/.skald/secrets.toml".to_string(),
        )
    })?;

    Skald::builder()
        .templates(load_templates(config)?)
        .openai(api_key, config.api_base_url(), config.api_timeout())
        .cache(config.cache_config())
        .history_path(&config.history.path)
        .build()
}

/// Built-in templates plus the configured overlay file, if any.
fn load_templates(config: &Config) -> skald::Result<TemplateRegistry> {
    let registry = TemplateRegistry::builtin()?;
    match config.templates.path {
        Some(ref path) => registry.merge_json_file(path),
        None => Ok(registry),
    }
}

/// User-facing description of a failed item.
fn describe_error(err: &SkaldError) -> String {
    match err {
        SkaldError::RateLimited {
            retry_after: Some(after),
        } => format!(
            "API rate limit reached, try again in {} seconds",
            after.as_secs()
        ),
        SkaldError::RateLimited { retry_after: None } => {
            "API rate limit reached, wait about an hour and try again".to_string()
        }
        other => other.to_string(),
    }
}

fn print_analysis(stats: &AnalysisResult) {
    let line = stats
        .metrics()
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{line}");
}

/// First line of `text`, shortened to `max` characters.
fn one_line(text: &str, max: usize) -> String {
    let first = text.lines().next().unwrap_or("");
    if first.chars().count() > max {
        let cut: String = first.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    } else {
        first.to_string()
    }
}

/// Resolve text input from an optional CLI argument and/or stdin.
///
/// Combination rules:
/// - arg only → arg
/// - stdin only → stdin
/// - both → `"{arg}\n{stdin}"` (so batch mode sees both as lines)
/// - neither → error
fn resolve_text(arg: Option<String>, command: &str) -> Result<String, Box<dyn std::error::Error>> {
    let stdin_is_pipe = !io::stdin().is_terminal();
    let stdin_text = if stdin_is_pipe {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    } else {
        None
    };

    match (arg, stdin_text) {
        (Some(a), Some(s)) => Ok(format!("{a}\n{s}")),
        (Some(a), None) => Ok(a),
        (None, Some(s)) => Ok(s),
        (None, None) => {
            Err(format!("{command}: no input provided (pass text as argument or via stdin)").into())
        }
    }
}
