/*!
 * Natural-language to SQL translation.
 *
 * - `model`: value types passed between the stages
 * - `prompts`: system/user prompt templates and builder
 * - `quoting`: column-name quoting applied to generated SQL
 * - `core`: the translation service and result wrapper
 */

// Re-export main types for easier usage
pub use self::core::{assemble, assemble_with_order, TranslationService};
pub use self::model::{ColumnSchema, CompletionResult, PromptPair, TranslationResult};
pub use self::prompts::{PromptTemplate, SqlPromptBuilder};
pub use self::quoting::{quote, quote_with_order, QuoteOrder};

// Submodules
pub mod core;
pub mod model;
pub mod prompts;
pub mod quoting;
