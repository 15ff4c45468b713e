// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

use lang2sql::app_config::{self, Config, ProviderKind};
use lang2sql::app_controller::Controller;

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::OpenAI => ProviderKind::OpenAI,
            CliProvider::Anthropic => ProviderKind::Anthropic,
            CliProvider::Ollama => ProviderKind::Ollama,
            CliProvider::LMStudio => ProviderKind::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive query loop (default command)
    Repl,

    /// Translate a single request and print the generated SQL
    Ask {
        /// Natural-language request
        #[arg(value_name = "QUERY")]
        query: String,

        /// Also run the generated SQL and print the rows
        #[arg(short, long)]
        execute: bool,

        /// Print the full translation result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the schema of the loaded table
    Describe,

    /// Generate shell completions for lang2sql
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// lang2sql - ask questions about a CSV dataset in plain language
///
/// Loads every CSV file in the data directory into one SQL table, asks a
/// language model to write a query for each request, and runs it.
#[derive(Parser, Debug)]
#[command(name = "lang2sql")]
#[command(version)]
#[command(about = "Natural-language questions to SQL over a CSV dataset")]
#[command(long_about = "lang2sql loads CSV files into a SQL table and turns plain-language requests into SQL queries using an LLM.

EXAMPLES:
    lang2sql                                        # Interactive mode using conf.json
    lang2sql ask \"number of thefts in 2023\"         # Print the SQL for one request
    lang2sql ask -e \"top 5 blocks by arrests\"       # Print the SQL and run it
    lang2sql -p ollama -m llama3.2:3b               # Use a local model
    lang2sql --data-dir ./crimes --table crimes     # Load a different dataset
    lang2sql describe                               # Show the loaded table schema
    lang2sql completions bash > lang2sql.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file doesn't
    exist, a default one is created. API keys left empty in the file are read
    from OPENAI_API_KEY or ANTHROPIC_API_KEY.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (default, requires API key)
    anthropic - Anthropic API (requires API key)
    ollama    - Local Ollama server
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: String,

    /// Completion provider to use
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Table the CSV data is loaded into
    #[arg(short, long, global = true)]
    table: Option<String>,

    /// Directory containing the CSV files
    #[arg(short, long, global = true)]
    data_dir: Option<String>,

    /// SQLite database file (in-memory when omitted)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Sampling temperature
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Verbosity is narrowed later through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "lang2sql", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level((&level).into());
    }

    let config = load_config(&cli)?;
    log::set_max_level((&config.log_level).into());

    let controller = Controller::with_config(config).await?;
    let mut stdout = std::io::stdout();

    match cli.command {
        Some(Commands::Ask { query, execute, json }) => {
            controller.ask(&query, execute, json, &mut stdout).await?;
        }
        Some(Commands::Describe) => {
            writeln!(stdout, "{}", controller.describe()?)?;
        }
        Some(Commands::Repl) | None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            controller.run_repl(stdin, &mut stdout).await?;
        }
        Some(Commands::Completions { .. }) => {}
    }

    Ok(())
}

/// Load the config file and apply command-line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config)?;

    if let Some(provider) = &cli.provider {
        config.provider.active = provider.clone().into();
    }
    if let Some(model) = &cli.model {
        config.completion.model = model.clone();
    }
    if let Some(table) = &cli.table {
        config.data.table_name = table.clone();
    }
    if let Some(data_dir) = &cli.data_dir {
        config.data.data_dir = data_dir.clone();
    }
    if let Some(database) = &cli.database {
        config.data.database_path = Some(database.clone());
    }
    if let Some(temperature) = cli.temperature {
        config.completion.temperature = temperature;
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.completion.max_tokens = max_tokens;
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}
