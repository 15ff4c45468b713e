use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::app_config::Config;
use crate::database::query::execute_query_async;
use crate::database::schema::create_table_sketch;
use crate::database::{ingest_directory, DatabaseConnection, IngestReport, QueryResult};
use crate::errors::{QueryError, TranslationError};
use crate::providers::{create_provider, Provider};
use crate::translation::{TranslationResult, TranslationService};

// @module: Application controller for the query loop and one-shot commands

const GREETING: &str = "Hi, please enter your query below. Enter 'q' to quit the program.";
const FAREWELL: &str = "Goodbye!";
const PROMPT: &str = "> ";

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Storage engine holding the loaded table
    db: DatabaseConnection,
    // @field: Translation service over the database and provider
    service: TranslationService,
    // @field: Show a spinner while waiting for the provider
    show_progress: bool,
}

impl Controller {
    // @method: Build a controller from configuration, loading the CSV data
    pub async fn with_config(config: Config) -> Result<Self> {
        let db = DatabaseConnection::open(config.data.database_path.as_deref())?;

        let report = Self::ingest(&db, &config).await?;
        info!(
            "Table {} ready: {} rows, {} columns",
            report.table,
            report.rows,
            report.columns.len()
        );

        let provider = create_provider(&config.provider);
        Ok(Self::new(config, db, provider).with_progress(true))
    }

    /// Build a controller over an already loaded database and a given provider
    pub fn new(config: Config, db: DatabaseConnection, provider: Arc<dyn Provider>) -> Self {
        let service = TranslationService::new(provider, Arc::new(db.clone()))
            .with_quote_order(config.quote_order);

        Self {
            config,
            db,
            service,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    // @loads: Every CSV in the data directory into the configured table
    async fn ingest(db: &DatabaseConnection, config: &Config) -> Result<IngestReport> {
        let data_dir = PathBuf::from(&config.data.data_dir);
        let table = config.data.table_name.clone();

        db.execute_async(move |conn| ingest_directory(conn, &data_dir, &table))
            .await
    }

    /// Translate one request against the configured table
    pub async fn translate(&self, query: &str) -> Result<TranslationResult, TranslationError> {
        let spinner = self.spinner();
        let result = self
            .service
            .translate(&self.config.data.table_name, query, &self.config.completion)
            .await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        result
    }

    /// Run generated SQL against the loaded table
    pub async fn execute(&self, sql: &str) -> Result<QueryResult, QueryError> {
        execute_query_async(&self.db, sql).await
    }

    /// `CREATE TABLE` sketch of the configured table
    pub fn describe(&self) -> Result<String> {
        let table = &self.config.data.table_name;
        let columns = self.service.describe(table)?;
        Ok(create_table_sketch(table, &columns))
    }

    /// Translate a single request and print the SQL (and optionally its result)
    pub async fn ask<W: Write>(&self, query: &str, run: bool, as_json: bool, out: &mut W) -> Result<()> {
        let translation = self.translate(query).await?;

        let rows = if run {
            Some(self.execute(translation.final_sql()).await?)
        } else {
            None
        };

        if as_json {
            let mut value = serde_json::to_value(&translation)
                .context("Failed to serialize translation result")?;
            if let (Some(rows), Some(object)) = (&rows, value.as_object_mut()) {
                object.insert("rows".to_string(), rows.to_json());
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        } else {
            writeln!(out, "{}", translation.final_sql())?;
            if let Some(rows) = rows {
                write!(out, "{}", rows.render(self.config.data.max_display_rows))?;
            }
        }

        Ok(())
    }

    /// Interactive loop: read a request per line until `q` or end of input
    pub async fn run_repl<R, W>(&self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        writeln!(out, "{}", GREETING)?;

        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };
            let query = line.trim();

            if query.eq_ignore_ascii_case("q") {
                writeln!(out, "{}", FAREWELL)?;
                break;
            }
            if query.is_empty() {
                continue;
            }

            writeln!(out, "Processing query: {}", query)?;
            if let Err(e) = self.answer(query, out).await {
                error!("{}", e);
                writeln!(out, "Error: {}", e)?;
            }
        }

        Ok(())
    }

    // @handles: One interactive request; failures are returned to the loop
    async fn answer<W: Write>(&self, query: &str, out: &mut W) -> Result<()> {
        let translation = self.translate(query).await?;
        writeln!(out, "Generated SQL Query:  {}", translation.final_sql())?;

        writeln!(out, "Running SQL Query...")?;
        let rows = self.execute(translation.final_sql()).await?;
        debug!("Query returned {} rows", rows.row_count());
        write!(out, "{}", rows.render(self.config.data.max_display_rows))?;
        Ok(())
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(format!("Waiting for {}...", self.service.provider_name()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        Some(spinner)
    }
}
