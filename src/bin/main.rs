//! tmdl CLI - Load, edit and inspect TMDL models
//!
//! Usage:
//!   tmdl load <path>
//!   tmdl rename <path> <kind> <old> <new> [--table <table>]
//!   tmdl unused <path>
//!   tmdl format <path>
//!   tmdl diff <left> <right>
//!   tmdl validate <path>
//!
//! Examples:
//!   tmdl rename ./Sales column Amount "Net Amount" --table Sales
//!   tmdl create ./Finance --blueprint finance.toml
//!   tmdl --json validate ./Sales

use clap::{Parser, Subcommand};
use futures::StreamExt;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tmdl::config::Settings;
use tmdl::diff::DiffItem;
use tmdl::ops::{self, Blueprint};
use tmdl::progress::{NoProgress, ProgressSink, ProgressUpdate};
use tmdl::refactor::{ObjectKind, RenameRequest};
use tmdl::{Measure, TmdlError};
use tokio_util::sync::CancellationToken;
use tracing::Level;

#[derive(Parser)]
#[command(name = "tmdl")]
#[command(about = "tmdl - Load, rename, format, analyze and diff TMDL semantic models")]
#[command(version)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Print progress steps on stderr
    #[arg(long, global = true)]
    progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a model and summarize it
    Load {
        /// Model folder or .tmdl document
        path: PathBuf,
    },

    /// Rename a table, column or measure and rewrite its references
    Rename {
        path: PathBuf,

        /// table, column or measure
        kind: ObjectKind,

        old_name: String,

        new_name: String,

        /// Owning table (required for columns and measures)
        #[arg(short, long)]
        table: Option<String>,
    },

    /// List columns that no formula references
    Unused { path: PathBuf },

    /// Rewrite the model in canonical order
    Format { path: PathBuf },

    /// Stream a unified diff of two documents
    Diff { left: PathBuf, right: PathBuf },

    /// Check references, relationships and round-trip stability
    Validate { path: PathBuf },

    /// Add a measure, or replace the expression of an existing one
    AddMeasure {
        path: PathBuf,

        table: String,

        name: String,

        expression: String,

        #[arg(long)]
        format_string: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List table names
    ListTables { path: PathBuf },

    /// List the measures of a table
    ListMeasures { path: PathBuf, table: String },

    /// Create or extend a model from a TOML blueprint
    Create {
        path: PathBuf,

        #[arg(short, long)]
        blueprint: PathBuf,
    },

    /// List the available operations
    Tools,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .init();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let printer = StderrProgress;
    let sink: &dyn ProgressSink = if cli.progress { &printer } else { &NoProgress };

    let result = match cli.command {
        Commands::Load { path } => {
            let summary = ops::load_summary(&path, &settings, sink);
            print(cli.json, &summary, || {
                println!("Model: {}", summary.name);
                for table in &summary.tables {
                    println!(
                        "  {} ({} columns, {} measures)",
                        table.name, table.columns, table.measures
                    );
                }
                println!("Relationships: {}", summary.relationships);
                for warning in &summary.warnings {
                    println!("warning: {}", warning);
                }
            });
            Ok(())
        }
        Commands::Rename {
            path,
            kind,
            old_name,
            new_name,
            table,
        } => {
            let request = RenameRequest {
                kind,
                table,
                old_name,
                new_name,
            };
            ops::rename(&path, &request, &settings).map(|report| {
                print(cli.json, &report, || println!("{}", report));
            })
        }
        Commands::Unused { path } => {
            let unused = ops::detect_unused_columns(&path, &settings);
            print(cli.json, &unused, || {
                for column in &unused {
                    println!("{}", column);
                }
            });
            Ok(())
        }
        Commands::Format { path } => ops::format(&path, &settings).map(|report| {
            print(cli.json, &report, || {
                let state = if report.changed { "formatted" } else { "unchanged" };
                println!("{}: {}", report.document.display(), state);
            });
        }),
        Commands::Diff { left, right } => cmd_diff(left, right, &settings).await,
        Commands::Validate { path } => {
            let cancel = CancellationToken::new();
            match ops::validate(&path, &settings, sink, &cancel) {
                Ok(report) => {
                    print(cli.json, &report, || {
                        for issue in &report.issues {
                            println!("{}", issue);
                        }
                    });
                    if !report.is_valid() {
                        return ExitCode::FAILURE;
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Commands::AddMeasure {
            path,
            table,
            name,
            expression,
            format_string,
            description,
        } => {
            let mut measure = Measure::new(name, expression);
            measure.format_string = format_string;
            measure.description = description;
            ops::add_measure(&path, &table, measure, &settings).map(|change| {
                print(cli.json, &change, || println!("{:?}", change));
            })
        }
        Commands::ListTables { path } => {
            let tables = ops::list_tables(&path, &settings);
            print(cli.json, &tables, || {
                for table in &tables {
                    println!("{}", table);
                }
            });
            Ok(())
        }
        Commands::ListMeasures { path, table } => {
            ops::list_measures(&path, &table, &settings).map(|measures| {
                print(cli.json, &measures, || {
                    for measure in &measures {
                        println!("{}", measure);
                    }
                });
            })
        }
        Commands::Create { path, blueprint } => Blueprint::from_file(&blueprint)
            .and_then(|blueprint| {
                let cancel = CancellationToken::new();
                ops::create(&path, &blueprint, &settings, sink, &cancel)
            })
            .map(|report| {
                print(cli.json, &report, || {
                    println!(
                        "Model '{}': {} table(s), {} relationship(s), {} measure(s) created",
                        report.model,
                        report.tables_created.len(),
                        report.relationships_created.len(),
                        report.measures_created.len()
                    );
                    if let Some(document) = &report.document {
                        println!("Saved to {}", document.display());
                    }
                });
            }),
        Commands::Tools => {
            let tools = ops::list_tools();
            print(cli.json, &tools, || {
                for tool in tools {
                    println!("{:<16} {}", tool.name, tool.description);
                }
            });
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error ({}): {}", e.category(), e);
            ExitCode::FAILURE
        }
    }
}

/// Stream the diff to stdout, cancelling on Ctrl-C.
async fn cmd_diff(left: PathBuf, right: PathBuf, settings: &Settings) -> Result<(), TmdlError> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut stream = Box::pin(ops::diff(left, right, settings, cancel));
    while let Some(item) = stream.next().await {
        match item {
            DiffItem::Chunk(chunk) => print!("{}", chunk),
            DiffItem::ToolFailure(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn print<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) {
    if !json {
        text();
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{}", out),
        Err(e) => eprintln!("Error serializing output: {}", e),
    }
}

struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn report(&self, update: ProgressUpdate) {
        eprintln!("[{}] {}", update.ordinal, update.message);
    }
}
