mod config;
mod db;
mod parser;
mod render;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use config::{ExtractorConfig, Platform};
use parser::candidate::{Message, Role};
use parser::Extractor;

#[derive(Parser)]
#[command(name = "chat_sources", about = "Extract learning resources from chat answers")]
struct Cli {
    /// Platform domain whose bare links get a friendly label (env: PLATFORM_DOMAIN)
    #[arg(long, global = true)]
    platform_domain: Option<String>,
    /// Display name for the platform (env: PLATFORM_NAME)
    #[arg(long, global = true)]
    platform_name: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one message from a file or stdin
    Process {
        /// Markdown file (default: stdin)
        path: Option<PathBuf>,
        /// Who wrote the message; user messages pass through untouched
        #[arg(long, value_enum, default_value = "assistant")]
        role: RoleArg,
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },
    /// Process every .md/.txt answer and .json transcript in a directory
    Ingest {
        dir: PathBuf,
        /// Max messages to process (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show ingest statistics
    Stats,
    /// Extracted resources table
    Overview {
        /// Filter by resource type (e.g. "book", "video")
        #[arg(short = 't', long = "type")]
        resource_type: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Assistant,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Role {
        match r {
            RoleArg::User => Role::User,
            RoleArg::Assistant => Role::Assistant,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Display text and resources as JSON
    Json,
    /// Sanitized display text only
    Text,
    /// Numbered sources list
    Sources,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut platform = Platform::from_env();
    if let Some(domain) = cli.platform_domain {
        platform.domain = domain;
    }
    if let Some(name) = cli.platform_name {
        platform.name = name;
    }
    let extractor = Extractor::new(ExtractorConfig {
        platform,
        ..Default::default()
    });

    let result = match cli.command {
        Commands::Process { path, role, format } => {
            let content = match &path {
                Some(p) => std::fs::read_to_string(p)
                    .with_context(|| format!("reading {}", p.display()))?,
                None => std::io::read_to_string(std::io::stdin()).context("reading stdin")?,
            };
            let message = Message {
                role: role.into(),
                content,
                is_loading: false,
                is_error: false,
            };
            let processed = extractor.process_message(&message);
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&processed)?),
                Format::Text => println!("{}", processed.display_text),
                Format::Sources => {
                    if processed.resources.is_empty() {
                        println!("No resources found.");
                    } else {
                        println!("{}", render::sources_list(&processed.resources));
                    }
                }
            }
            return Ok(());
        }
        Commands::Ingest { dir, limit } => {
            let conn = db::connect(&config::db_path())?;
            db::init_schema(&conn)?;
            let mut inputs = collect_inputs(&dir)?;
            if let Some(n) = limit {
                inputs.truncate(n);
            }
            if inputs.is_empty() {
                println!("No messages found in {}.", dir.display());
                return Ok(());
            }
            info!(
                platform = extractor.platform().domain.as_str(),
                messages = inputs.len(),
                "ingest"
            );
            println!("Processing {} messages...", inputs.len());
            let counts = ingest_messages(&conn, &extractor, &inputs)?;
            counts.print();
            Ok(())
        }
        Commands::Overview { resource_type, limit } => {
            let conn = db::connect(&config::db_path())?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, resource_type.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No resources found.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<24} | {:>3} | {:<32} | {:<20} | {:<18} | {:<4}",
                "#", "Source", "Pos", "Title", "Author", "Type", "Link"
            );
            println!("{}", "-".repeat(120));

            for (i, r) in rows.iter().enumerate() {
                let link = if r.detail_url == parser::candidate::NO_LINK { "-" } else { "yes" };
                println!(
                    "{:>3} | {:<24} | {:>3} | {:<32} | {:<20} | {:<18} | {:<4}",
                    i + 1,
                    truncate(&r.source, 24),
                    r.position,
                    truncate(&r.title, 32),
                    truncate(&r.author, 20),
                    truncate(&r.resource_type, 18),
                    link
                );
            }

            println!("\n{} resources", rows.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&config::db_path())?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Messages:       {}", s.messages);
            println!("With resources: {}", s.with_resources);
            println!("Resources:      {}", s.resources);
            println!("Linked:         {}", s.linked);
            println!("Unlinked:       {}", s.resources - s.linked);
            if !s.by_type.is_empty() {
                println!("\n--- By type ---");
                for (kind, n) in &s.by_type {
                    println!("  {:<28} {:>6}", truncate(kind, 28), n);
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// A message to ingest and the name it is stored under.
struct Input {
    source: String,
    message: Message,
}

/// Answers (`.md`, `.txt`) and transcripts (`.json` arrays of messages) in `dir`,
/// sorted by file name. Unreadable files are skipped with a warning.
fn collect_inputs(dir: &Path) -> anyhow::Result<Vec<Input>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut inputs = Vec::new();
    for path in paths {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "md" | "txt" => match std::fs::read_to_string(&path) {
                Ok(content) => inputs.push(Input {
                    source: name,
                    message: Message {
                        role: Role::Assistant,
                        content,
                        is_loading: false,
                        is_error: false,
                    },
                }),
                Err(e) => warn!(file = name.as_str(), error = %e, "skipping unreadable file"),
            },
            "json" => match read_transcript(&path) {
                Ok(messages) => {
                    for (i, message) in messages.into_iter().enumerate() {
                        inputs.push(Input {
                            source: format!("{}#{}", name, i),
                            message,
                        });
                    }
                }
                Err(e) => warn!(file = name.as_str(), error = %e, "skipping bad transcript"),
            },
            _ => {}
        }
    }
    Ok(inputs)
}

fn read_transcript(path: &Path) -> anyhow::Result<Vec<Message>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

struct IngestCounts {
    messages: usize,
    with_resources: usize,
    resources: usize,
    linked: usize,
}

impl IngestCounts {
    fn print(&self) {
        println!(
            "Saved {} messages ({} with resources), {} resources ({} linked).",
            self.messages, self.with_resources, self.resources, self.linked,
        );
    }
}

fn ingest_messages(
    conn: &rusqlite::Connection,
    extractor: &Extractor,
    inputs: &[Input],
) -> anyhow::Result<IngestCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = IngestCounts {
        messages: 0,
        with_resources: 0,
        resources: 0,
        linked: 0,
    };

    for chunk in inputs.chunks(500) {
        let rows: Vec<db::MessageRow> = chunk
            .par_iter()
            .map(|input| db::MessageRow {
                source: input.source.clone(),
                body: input.message.content.clone(),
                processed: extractor.process_message(&input.message),
            })
            .collect();

        for row in &rows {
            let found = &row.processed.resources;
            if !found.is_empty() {
                counts.with_resources += 1;
            }
            counts.resources += found.len();
            counts.linked += found.iter().filter(|r| r.has_link()).count();
        }

        counts.messages += db::save_processed(conn, &rows)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("Café Rust", 4), "Café...");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration(std::time::Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(std::time::Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn collects_answers_and_transcripts() {
        let dir = std::env::temp_dir().join(format!("chat_sources_inputs_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.md"), "answer").unwrap();
        std::fs::write(
            dir.join("b.json"),
            r#"[{"role":"user","content":"q"},{"role":"assistant","content":"a","isLoading":true}]"#,
        )
        .unwrap();
        std::fs::write(dir.join("c.json"), "not json").unwrap();
        std::fs::write(dir.join("d.png"), "x").unwrap();

        let inputs = collect_inputs(&dir).unwrap();
        let sources: Vec<&str> = inputs.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["a.md", "b.json#0", "b.json#1"]);
        assert_eq!(inputs[1].message.role, Role::User);
        assert!(inputs[2].message.is_loading);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
