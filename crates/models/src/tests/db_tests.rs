use crate::db::{connect_for_tests, connect_in_memory};
use anyhow::Result;
use sea_orm::{ConnectionTrait, Statement};

#[tokio::test]
async fn in_memory_database_answers_queries() -> Result<()> {
    let db = connect_in_memory().await?;
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(backend, "SELECT 1 AS test".to_string()))
        .await?;
    let row = row.expect("one row");
    let value: i32 = row.try_get("", "test")?;
    assert_eq!(value, 1);
    Ok(())
}

#[tokio::test]
async fn migrations_create_every_table() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = connect_for_tests().await?;
    let backend = db.get_database_backend();
    for table in [
        "asset",
        "proto_action_item",
        "template_action_set",
        "template_action_item",
        "maintenance_plan",
        "maintenance_action_set",
        "action",
        "part_demand",
        "action_tool",
        "template_builder_memory",
        "template_builder_attachment_reference",
    ] {
        let sql = format!("SELECT COUNT(*) AS n FROM {table}");
        let res = db.query_one(Statement::from_string(backend, sql)).await;
        assert!(res.is_ok(), "table {table} missing: {res:?}");
    }
    Ok(())
}

#[tokio::test]
async fn in_memory_databases_are_isolated() -> Result<()> {
    let a = connect_in_memory().await?;
    let b = connect_in_memory().await?;
    crate::asset::create(
        &a,
        &crate::asset::NewAsset { name: "Pump".into(), serial_number: "P-1".into(), ..Default::default() },
        None,
    )
    .await?;
    use sea_orm::{EntityTrait, PaginatorTrait};
    assert_eq!(crate::asset::Entity::find().count(&a).await?, 1);
    assert_eq!(crate::asset::Entity::find().count(&b).await?, 0);
    Ok(())
}
