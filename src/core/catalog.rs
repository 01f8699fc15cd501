use crate::domain::model::{Provisioned, TableDefinition};
use crate::domain::ports::Catalog;
use crate::utils::error::Result;

/// Probe-then-create, same as the bucket step, so a second run is a no-op.
///
/// A create that loses a race and reports "already exists" still counts as
/// success.
pub async fn ensure_database<C: Catalog + ?Sized>(catalog: &C, database: &str) -> Result<Provisioned> {
    if catalog.database_exists(database).await? {
        tracing::info!("Glue database {} already exists", database);
        return Ok(Provisioned::AlreadyExisted);
    }

    if catalog.create_database(database).await? {
        tracing::info!("Glue database {} created", database);
        Ok(Provisioned::Created)
    } else {
        tracing::info!("Glue database {} was created concurrently", database);
        Ok(Provisioned::AlreadyExisted)
    }
}

pub async fn ensure_table<C: Catalog + ?Sized>(
    catalog: &C,
    database: &str,
    table: &TableDefinition,
) -> Result<Provisioned> {
    if catalog.table_exists(database, &table.name).await? {
        tracing::info!("Glue table {}.{} already exists", database, table.name);
        return Ok(Provisioned::AlreadyExisted);
    }

    if catalog.create_table(database, table).await? {
        tracing::info!(
            "Glue table {}.{} created at {}",
            database,
            table.name,
            table.location
        );
        Ok(Provisioned::Created)
    } else {
        tracing::info!("Glue table {}.{} was created concurrently", database, table.name);
        Ok(Provisioned::AlreadyExisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCatalog;
    use crate::utils::error::LakeError;

    const DB: &str = "glue_nba_data_lake";

    #[tokio::test]
    async fn test_ensure_database_twice_creates_once() {
        let catalog = InMemoryCatalog::new();

        assert_eq!(
            ensure_database(&catalog, DB).await.unwrap(),
            Provisioned::Created
        );
        assert_eq!(
            ensure_database(&catalog, DB).await.unwrap(),
            Provisioned::AlreadyExisted
        );
        assert_eq!(catalog.create_database_calls().await, 1);
    }

    #[tokio::test]
    async fn test_ensure_database_skips_existing() {
        let catalog = InMemoryCatalog::new().with_database(DB).await;

        let outcome = ensure_database(&catalog, DB).await.unwrap();

        assert_eq!(outcome, Provisioned::AlreadyExisted);
        assert_eq!(catalog.create_database_calls().await, 0);
    }

    #[tokio::test]
    async fn test_ensure_table_registers_fixed_schema() {
        let catalog = InMemoryCatalog::new().with_database(DB).await;
        let table = TableDefinition::stats_table("nba_data", "s3://lake/");

        let first = ensure_table(&catalog, DB, &table).await.unwrap();
        let second = ensure_table(&catalog, DB, &table).await.unwrap();

        assert_eq!(first, Provisioned::Created);
        assert_eq!(second, Provisioned::AlreadyExisted);
        assert_eq!(catalog.create_table_calls().await, 1);

        let stored = catalog.table(DB, "nba_data").await.unwrap();
        assert_eq!(stored, table);
    }

    #[tokio::test]
    async fn test_lost_create_race_counts_as_existing() {
        let catalog = InMemoryCatalog::new().with_racing_creates().await;
        let table = TableDefinition::stats_table("nba_data", "s3://lake/");

        let database = ensure_database(&catalog, DB).await.unwrap();
        let registered = ensure_table(&catalog, DB, &table).await.unwrap();

        assert_eq!(database, Provisioned::AlreadyExisted);
        assert_eq!(registered, Provisioned::AlreadyExisted);
        // 兩者都確實嘗試過建立
        assert_eq!(catalog.create_database_calls().await, 1);
        assert_eq!(catalog.create_table_calls().await, 1);
    }

    #[tokio::test]
    async fn test_ensure_table_requires_database() {
        let catalog = InMemoryCatalog::new();
        let table = TableDefinition::stats_table("nba_data", "s3://lake/");

        let err = ensure_table(&catalog, DB, &table).await.unwrap_err();

        assert!(matches!(err, LakeError::CatalogError { .. }));
    }
}
