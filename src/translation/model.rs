/*!
 * Value types passed along the translation pipeline.
 *
 * All of them are immutable after construction: fields are private and only
 * exposed through accessors, so a `TranslationResult` handed to a caller can
 * be logged or serialized but never edited in place.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One column of the target table, as reported by the storage engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name, verbatim (may contain spaces or reserved words)
    pub name: String,
    /// Declared type, verbatim
    pub declared_type: String,
}

impl ColumnSchema {
    /// Create a new column description
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }

    /// Name and type joined by a single space, as used in the `CREATE TABLE` sketch
    pub fn definition(&self) -> String {
        format!("{} {}", self.name, self.declared_type)
    }
}

/// The two rendered prompts sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPair {
    system_prompt: String,
    user_prompt: String,
}

impl PromptPair {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }
}

/// Raw completion text plus the provider's full response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionResult {
    raw_text: String,
    /// Kept for diagnostics only; never interpreted after the text is extracted
    envelope: Value,
}

impl CompletionResult {
    pub fn new(raw_text: impl Into<String>, envelope: Value) -> Self {
        Self {
            raw_text: raw_text.into(),
            envelope,
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn envelope(&self) -> &Value {
        &self.envelope
    }
}

/// Everything produced by one successful translation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationResult {
    prompt: PromptPair,
    columns: Vec<ColumnSchema>,
    completion: CompletionResult,
    final_sql: String,
}

impl TranslationResult {
    /// Only the result wrapper builds these, so `final_sql` always derives from the completion.
    pub(crate) fn new(
        prompt: PromptPair,
        columns: Vec<ColumnSchema>,
        completion: CompletionResult,
        final_sql: String,
    ) -> Self {
        Self {
            prompt,
            columns,
            completion,
            final_sql,
        }
    }

    pub fn prompt(&self) -> &PromptPair {
        &self.prompt
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn completion(&self) -> &CompletionResult {
        &self.completion
    }

    /// The quoted SQL statement, ready for the query executor
    pub fn final_sql(&self) -> &str {
        &self.final_sql
    }
}
