//! cwsql CLI - Generate and check CloudWatch Metrics Insights queries
//!
//! Usage:
//!   cwsql generate <expression.json> [--account-id <id>] [--cross-account] [--strict]
//!   cwsql validate <queries.json>
//!   cwsql annotation <annotation.json>
//!
//! Examples:
//!   cwsql generate demos/cpu_by_instance.json
//!   cwsql generate demos/cpu_by_instance.json --cross-account --account-id 123456789012
//!   RUST_LOG=debug cwsql validate demos/panel_queries.json
//!   cwsql annotation demos/legacy_annotation.json

use clap::{Parser, Subcommand, ValueEnum};
use cwsql::compile::{compile_sql, CompileOptions};
use cwsql::config::Settings;
use cwsql::model::{prepare_annotation, prepare_query, AnnotationQuery, MetricsQuery};
use cwsql::validation::incompleteness;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cwsql")]
#[command(about = "cwsql - CloudWatch Metrics Insights query generation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Metrics Insights query from a builder expression
    Generate {
        /// Path to the expression JSON file
        file: PathBuf,

        /// Account filter selected for the query
        #[arg(long)]
        account_id: Option<String>,

        /// Enable cross-account querying (overrides the config file)
        #[arg(long)]
        cross_account: bool,

        /// Fail instead of rendering an expression that cannot run
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Check which metrics queries are complete enough to run
    Validate {
        /// Path to a JSON file holding a query or an array of queries
        file: PathBuf,
    },

    /// Migrate an annotation query and check whether it can run
    Annotation {
        /// Path to the annotation JSON file
        file: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output the query only
    Sql,
    /// Output the query with comments
    Verbose,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QueryFile {
    Many(Vec<MetricsQuery>),
    One(Box<MetricsQuery>),
}

impl QueryFile {
    fn into_queries(self) -> Vec<MetricsQuery> {
        match self {
            QueryFile::Many(queries) => queries,
            QueryFile::One(query) => vec![*query],
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = match settings.resolved_variables() {
        Ok(variables) => CompileOptions::from_settings(&settings).with_variables(variables),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Generate {
            file,
            account_id,
            cross_account,
            strict,
            output,
        } => {
            let mut options = options.with_strict(strict);
            if cross_account {
                options = options.with_cross_account(true);
            }
            if let Some(account_id) = account_id {
                options = options.with_account_id(account_id);
            }
            cmd_generate(file, options, output)
        }
        Commands::Validate { file } => cmd_validate(file, &options),
        Commands::Annotation { file } => cmd_annotation(file),
    }
}

fn read_file(file: &Path) -> Option<String> {
    match fs::read_to_string(file) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            None
        }
    }
}

fn cmd_generate(file: PathBuf, options: CompileOptions, output: OutputFormat) -> ExitCode {
    let Some(source) = read_file(&file) else {
        return ExitCode::FAILURE;
    };

    match compile_sql(&source, &options) {
        Ok(compiled) => {
            match output {
                OutputFormat::Sql => {
                    println!("{}", compiled.sql);
                }
                OutputFormat::Verbose => {
                    println!("-- Source: {}", file.display());
                    println!("-- Cross-account: {}", options.cross_account);
                    if let Some(account_id) = &options.account_id {
                        println!("-- Account: {}", account_id);
                    }
                    println!("-- Runnable: {}", compiled.expression.is_runnable());
                    println!();
                    println!("{}", compiled.sql);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(file: PathBuf, options: &CompileOptions) -> ExitCode {
    let Some(source) = read_file(&file) else {
        return ExitCode::FAILURE;
    };

    let queries = match serde_json::from_str::<QueryFile>(&source) {
        Ok(parsed) => parsed.into_queries(),
        Err(e) => {
            eprintln!("Parse error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let generator = options.generator();
    let mut incomplete = 0;
    for query in queries {
        let query = query.with_generated_sql(&generator);
        match incompleteness(&query) {
            None => println!("{}: OK", query.ref_id),
            Some(reason) => {
                incomplete += 1;
                println!("{}: skipped ({})", query.ref_id, reason);
            }
        }
    }

    if incomplete == 0 {
        ExitCode::SUCCESS
    } else {
        debug!("{} queries would be skipped", incomplete);
        ExitCode::FAILURE
    }
}

fn cmd_annotation(file: PathBuf) -> ExitCode {
    let Some(source) = read_file(&file) else {
        return ExitCode::FAILURE;
    };

    let annotation = match serde_json::from_str::<AnnotationQuery>(&source) {
        Ok(annotation) => prepare_annotation(annotation),
        Err(e) => {
            eprintln!("Parse error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&annotation) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if prepare_query(&annotation).is_some() {
        println!("OK: annotation can run");
        ExitCode::SUCCESS
    } else {
        eprintln!("Annotation target is incomplete");
        ExitCode::FAILURE
    }
}
