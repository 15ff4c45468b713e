/*!
 * Core translation service implementation.
 *
 * `TranslationService` ties the pieces together: it asks the schema
 * collaborator for the table's columns, builds the two prompts, sends them
 * to the completion provider and wraps the reply into a `TranslationResult`.
 * Collaborator failures are returned as they are; nothing is retried.
 */

use log::debug;
use std::sync::Arc;
use std::time::Instant;

use super::model::{ColumnSchema, CompletionResult, PromptPair, TranslationResult};
use super::prompts::SqlPromptBuilder;
use super::quoting::{quote_with_order, QuoteOrder};
use crate::app_config::CompletionConfig;
use crate::database::SchemaProvider;
use crate::errors::TranslationError;
use crate::providers::Provider;

/// Package a completion into a result, quoting column names in schema order
pub fn assemble(
    prompt: PromptPair,
    columns: Vec<ColumnSchema>,
    completion: CompletionResult,
) -> TranslationResult {
    assemble_with_order(prompt, columns, completion, QuoteOrder::AsGiven)
}

/// Package a completion into a result using an explicit quoting order
pub fn assemble_with_order(
    prompt: PromptPair,
    columns: Vec<ColumnSchema>,
    completion: CompletionResult,
    order: QuoteOrder,
) -> TranslationResult {
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let final_sql = quote_with_order(completion.raw_text(), &names, order);
    TranslationResult::new(prompt, columns, completion, final_sql)
}

/// Natural-language to SQL translation service
pub struct TranslationService {
    provider: Arc<dyn Provider>,
    schema: Arc<dyn SchemaProvider>,
    prompt_builder: SqlPromptBuilder,
    quote_order: QuoteOrder,
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("provider", &self.provider.name())
            .field("quote_order", &self.quote_order)
            .finish()
    }
}

impl TranslationService {
    /// Create a service over the given collaborators
    pub fn new(provider: Arc<dyn Provider>, schema: Arc<dyn SchemaProvider>) -> Self {
        Self {
            provider,
            schema,
            prompt_builder: SqlPromptBuilder::default(),
            quote_order: QuoteOrder::default(),
        }
    }

    pub fn with_quote_order(mut self, order: QuoteOrder) -> Self {
        self.quote_order = order;
        self
    }

    pub fn with_prompt_builder(mut self, builder: SqlPromptBuilder) -> Self {
        self.prompt_builder = builder;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn quote_order(&self) -> QuoteOrder {
        self.quote_order
    }

    /// Describe a table, rejecting tables without columns
    pub fn describe(&self, table: &str) -> Result<Vec<ColumnSchema>, TranslationError> {
        let columns = self.schema.describe_table(table)?;
        if columns.is_empty() {
            return Err(TranslationError::EmptySchema(table.to_string()));
        }
        Ok(columns)
    }

    /// Translate a natural-language request about `table` into SQL
    pub async fn translate(
        &self,
        table: &str,
        query: &str,
        config: &CompletionConfig,
    ) -> Result<TranslationResult, TranslationError> {
        let columns = self.describe(table)?;
        debug!(
            "Translating request against {} ({} columns) with {} model {}",
            table,
            columns.len(),
            self.provider.name(),
            config.model
        );

        let prompt = self.prompt_builder.build(table, &columns, query);

        let start = Instant::now();
        let completion = self.provider.complete(&prompt, config).await?;
        debug!("Completion received in {:?}", start.elapsed());

        let result = assemble_with_order(prompt, columns, completion, self.quote_order);
        debug!("Final SQL: {}", result.final_sql());
        Ok(result)
    }
}
