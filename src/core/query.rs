use crate::domain::model::{QueryHandle, QueryRequest};
use crate::domain::ports::QueryEngine;
use crate::utils::error::Result;

pub fn create_database_statement(database: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {}", database)
}

/// Submits the database statement and returns as soon as the engine accepts
/// it. Completion is never polled.
pub async fn configure<Q: QueryEngine + ?Sized>(
    engine: &Q,
    database: &str,
    output_location: &str,
) -> Result<QueryHandle> {
    let request = QueryRequest {
        database: database.to_string(),
        statement: create_database_statement(database),
        output_location: output_location.to_string(),
    };

    let handle = engine.start_query(&request).await?;
    tracing::info!(
        "Athena query {} submitted, results go to {}",
        handle.execution_id,
        output_location
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryQueryEngine;

    #[tokio::test]
    async fn test_configure_submits_single_statement() {
        let engine = InMemoryQueryEngine::new();

        let handle = configure(&engine, "glue_nba_data_lake", "s3://lake/athena-results/")
            .await
            .unwrap();

        assert_eq!(handle.execution_id, "query-1");
        let submitted = engine.submitted().await;
        assert_eq!(submitted.len(), 1);
        assert_eq!(
            submitted[0].statement,
            "CREATE DATABASE IF NOT EXISTS glue_nba_data_lake"
        );
        assert_eq!(submitted[0].database, "glue_nba_data_lake");
        assert_eq!(submitted[0].output_location, "s3://lake/athena-results/");
    }
}
