/*!
 * Prompt templates for natural-language to SQL translation.
 *
 * The system prompt carries a `CREATE TABLE` sketch of the target table so the
 * model knows every column and its declared type; the user prompt wraps the
 * request in a fixed instruction.
 */

use super::model::{ColumnSchema, PromptPair};

/// A prompt template with `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt. Placeholders: `{table_name}`, `{columns}`.
    pub const SQL_WRITER: &'static str = "Given the following SQL table, your job is to write queries given a user's request.\n\nCREATE TABLE {table_name} ({columns})\n";

    /// The default user prompt. Placeholder: `{query}`.
    pub const SQL_REQUEST: &'static str = "Write a SQL query that returns - {query}";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default system prompt template.
    pub fn sql_writer() -> Self {
        Self::new(Self::SQL_WRITER)
    }

    /// Create the default user prompt template.
    pub fn sql_request() -> Self {
        Self::new(Self::SQL_REQUEST)
    }

    /// Render the template with the given variables.
    ///
    /// Substitution is a single pass over the template: braces inside the
    /// substituted values are copied verbatim and never expanded. Unknown
    /// placeholders are left untouched.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let replaced = after.find('}').and_then(|close| {
                let key = &after[..close];
                vars.iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| (close, *value))
            });

            match replaced {
                Some((close, value)) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Builds the system/user prompt pair for one translation request.
#[derive(Debug, Clone)]
pub struct SqlPromptBuilder {
    system_template: PromptTemplate,
    user_template: PromptTemplate,
}

impl SqlPromptBuilder {
    /// Create a builder with the default templates.
    pub fn new() -> Self {
        Self {
            system_template: PromptTemplate::sql_writer(),
            user_template: PromptTemplate::sql_request(),
        }
    }

    /// Replace the system prompt template.
    pub fn with_system_template(mut self, template: PromptTemplate) -> Self {
        self.system_template = template;
        self
    }

    /// Replace the user prompt template.
    pub fn with_user_template(mut self, template: PromptTemplate) -> Self {
        self.user_template = template;
        self
    }

    /// Render both prompts.
    ///
    /// An empty `columns` slice still renders, as `CREATE TABLE t ()`; rejecting
    /// empty schemas is the caller's job.
    pub fn build(&self, table_name: &str, columns: &[ColumnSchema], user_query: &str) -> PromptPair {
        let column_list = column_definitions(columns);

        let system = self.system_template.render(&[
            ("table_name", table_name),
            ("columns", &column_list),
        ]);
        let user = self.user_template.render(&[("query", user_query)]);

        PromptPair::new(system, user)
    }
}

impl Default for SqlPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `name type, name type, ...` in schema order.
pub fn column_definitions(columns: &[ColumnSchema]) -> String {
    columns
        .iter()
        .map(ColumnSchema::definition)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build a prompt pair with the default templates.
pub fn build(table_name: &str, columns: &[ColumnSchema], user_query: &str) -> PromptPair {
    SqlPromptBuilder::new().build(table_name, columns, user_query)
}
