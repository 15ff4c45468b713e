/*!
 * Integration tests for the schema -> prompt -> completion -> SQL pipeline
 */

use anyhow::Result;
use rusqlite::types::Value;
use std::sync::Arc;

use lang2sql::app_config::CompletionConfig;
use lang2sql::errors::{ProviderErrorKind, TranslationError};
use lang2sql::providers::mock::{MockBehavior, MockProvider};
use lang2sql::translation::{QuoteOrder, TranslationService};

use crate::common::{self, StaticSchema, TEST_TABLE};

#[tokio::test]
async fn test_translate_withMockProvider_shouldQuoteColumnsAndRun() -> Result<()> {
    let (_dir, db) = common::crime_database()?;
    let provider = Arc::new(MockProvider::responding(
        "SELECT Primary Type, COUNT(*) AS n FROM chicago_crime WHERE Arrest = 1 GROUP BY Primary Type",
    ));
    let service = TranslationService::new(provider.clone(), Arc::new(db.clone()));

    let result = service
        .translate(TEST_TABLE, "arrests per crime type", &CompletionConfig::default())
        .await?;

    assert_eq!(
        result.final_sql(),
        "SELECT \"Primary Type\", COUNT(*) AS n FROM chicago_crime WHERE \"Arrest\" = 1 GROUP BY \"Primary Type\""
    );
    assert_eq!(provider.request_count(), 1);

    let rows = common::run_sql(&db, result.final_sql())?;
    assert_eq!(rows.row_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_translate_shouldSendSchemaPromptToProvider() -> Result<()> {
    let schema = StaticSchema::new(
        "chicago_crime",
        &[("case_id", "INT"), ("date", "DATE")],
    );
    let provider = Arc::new(MockProvider::responding("SELECT case_id FROM chicago_crime WHERE date > '2020-12-31'"));
    let service = TranslationService::new(provider.clone(), schema);
    let config = CompletionConfig::for_model("gpt-4o-mini");

    let result = service
        .translate("chicago_crime", "all cases after 2020", &config)
        .await?;

    let (prompt, sent_config) = provider.last_request().expect("provider was not called");
    assert!(prompt
        .system_prompt()
        .contains("CREATE TABLE chicago_crime (case_id INT, date DATE)"));
    assert_eq!(prompt.user_prompt(), "Write a SQL query that returns - all cases after 2020");
    assert_eq!(sent_config, config);

    assert_eq!(result.prompt(), &prompt);
    assert_eq!(result.columns().len(), 2);
    assert_eq!(
        result.completion().raw_text(),
        "SELECT case_id FROM chicago_crime WHERE date > '2020-12-31'"
    );
    assert_eq!(
        result.final_sql(),
        "SELECT \"case_id\" FROM chicago_crime WHERE \"date\" > '2020-12-31'"
    );
    Ok(())
}

#[tokio::test]
async fn test_translate_withAuthenticationFailure_shouldReturnProviderError() {
    let schema = StaticSchema::new("chicago_crime", &[("date", "DATE")]);
    let provider = Arc::new(MockProvider::failing(ProviderErrorKind::Authentication));
    let service = TranslationService::new(provider.clone(), schema);

    let result = service
        .translate("chicago_crime", "anything", &CompletionConfig::default())
        .await;

    let err = result.expect_err("translation should fail");
    assert!(matches!(err, TranslationError::Provider(_)));
    assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Authentication));
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withEveryProviderFailureKind_shouldSurfaceKindUnchanged() {
    for kind in [
        ProviderErrorKind::RateLimit,
        ProviderErrorKind::Transient,
        ProviderErrorKind::MalformedResponse,
        ProviderErrorKind::Rejected,
    ] {
        let schema = StaticSchema::new("t", &[("x", "INT")]);
        let provider = Arc::new(MockProvider::failing(kind));
        let service = TranslationService::new(provider.clone(), schema);

        let err = service
            .translate("t", "q", &CompletionConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.provider_kind(), Some(kind));
        // No retries
        assert_eq!(provider.request_count(), 1);
    }
}

#[tokio::test]
async fn test_translate_withUnknownTable_shouldFailBeforeCallingProvider() -> Result<()> {
    let (_dir, db) = common::crime_database()?;
    let provider = Arc::new(MockProvider::responding("SELECT 1"));
    let service = TranslationService::new(provider.clone(), Arc::new(db));

    let err = service
        .translate("crimes", "q", &CompletionConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::SchemaNotFound(ref t) if t == "crimes"));
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_translate_withEmptySchema_shouldFailBeforeCallingProvider() {
    let schema = StaticSchema::new("empty", &[]);
    let provider = Arc::new(MockProvider::responding("SELECT 1"));
    let service = TranslationService::new(provider.clone(), schema);

    let err = service
        .translate("empty", "q", &CompletionConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::EmptySchema(ref t) if t == "empty"));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withLongestFirstOrder_shouldUseConfiguredOrder() -> Result<()> {
    let schema = StaticSchema::new("people", &[("date", "DATE"), ("date_of_birth", "DATE")]);
    let provider = Arc::new(MockProvider::responding("SELECT date_of_birth FROM people"));

    let as_given = TranslationService::new(provider.clone(), schema.clone());
    let longest = TranslationService::new(provider, schema).with_quote_order(QuoteOrder::LongestFirst);
    let config = CompletionConfig::default();

    assert_eq!(
        as_given.translate("people", "birthdays", &config).await?.final_sql(),
        "SELECT \"date\"_of_birth FROM people"
    );
    assert_eq!(
        longest.translate("people", "birthdays", &config).await?.final_sql(),
        "SELECT \"date_of_birth\" FROM people"
    );
    Ok(())
}

#[tokio::test]
async fn test_translate_concurrentRequests_shouldBeIndependent() -> Result<()> {
    let (_dir, db) = common::crime_database()?;
    let provider = Arc::new(MockProvider::new(MockBehavior::Slow {
        completion: "SELECT COUNT(*) FROM chicago_crime".to_string(),
        delay_ms: 20,
    }));
    let service = Arc::new(TranslationService::new(provider.clone(), Arc::new(db.clone())));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .translate(TEST_TABLE, &format!("request {}", i), &CompletionConfig::default())
                    .await
            })
        })
        .collect();

    for handle in handles {
        let result = handle.await??;
        let rows = common::run_sql(&db, result.final_sql())?;
        assert_eq!(rows.rows[0][0], Value::Integer(5));
    }
    assert_eq!(provider.request_count(), 4);
    Ok(())
}
