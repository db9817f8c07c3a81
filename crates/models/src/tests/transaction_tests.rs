use crate::db::connect_for_tests;
use crate::template_action_set;
use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

#[tokio::test]
async fn rolled_back_insert_is_not_visible() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = connect_for_tests().await?;
    let id = Uuid::new_v4();
    let now = Utc::now().into();

    let txn = db.begin().await?;
    template_action_set::ActiveModel {
        id: Set(id),
        task_name: Set("Rolled back".into()),
        description: Set(None),
        estimated_duration: Set(None),
        safety_review_required: Set(false),
        staff_count: Set(None),
        parts_cost: Set(None),
        labor_hours: Set(None),
        revision: Set(None),
        prior_revision_id: Set(None),
        is_active: Set(true),
        maintenance_plan_id: Set(None),
        asset_type_id: Set(None),
        make_model_id: Set(None),
        created_by_id: Set(None),
        updated_by_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    let inside = template_action_set::Entity::find_by_id(id).one(&txn).await?;
    assert!(inside.is_some());
    txn.rollback().await?;

    let after = template_action_set::Entity::find_by_id(id).one(&db).await?;
    assert!(after.is_none());
    Ok(())
}
