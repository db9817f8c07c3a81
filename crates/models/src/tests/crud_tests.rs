use crate::db::connect_for_tests;
use crate::{asset, template_action_item, template_action_set, template_part_demand};
use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

fn new_set(task_name: &str) -> template_action_set::ActiveModel {
    let now = Utc::now().into();
    template_action_set::ActiveModel {
        id: Set(Uuid::new_v4()),
        task_name: Set(task_name.to_string()),
        description: Set(None),
        estimated_duration: Set(Some(2.0)),
        safety_review_required: Set(false),
        staff_count: Set(Some(1)),
        parts_cost: Set(None),
        labor_hours: Set(None),
        revision: Set(Some("0".into())),
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
}

fn new_item(set_id: Uuid, name: &str, seq: i32) -> template_action_item::ActiveModel {
    let now = Utc::now().into();
    template_action_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        template_action_set_id: Set(set_id),
        proto_action_item_id: Set(None),
        action_name: Set(name.to_string()),
        description: Set(None),
        estimated_duration: Set(None),
        expected_billable_hours: Set(None),
        safety_notes: Set(None),
        notes: Set(None),
        is_required: Set(true),
        instructions: Set(None),
        instructions_type: Set(None),
        minimum_staff_count: Set(1),
        required_skills: Set(None),
        sequence_order: Set(seq),
        revision: Set(None),
        prior_revision_id: Set(None),
        created_by_id: Set(None),
        updated_by_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[tokio::test]
async fn asset_create_meters_and_deactivate() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = connect_for_tests().await?;
    let serial = format!("SN-{}", Uuid::new_v4());
    let created = asset::create(
        &db,
        &asset::NewAsset { name: "Truck 12".into(), serial_number: serial.clone(), meters: [Some(100.0), None, None, None], ..Default::default() },
        None,
    )
    .await?;
    assert!(created.is_active);
    assert_eq!(created.meter(1), Some(100.0));

    let updated = asset::update_meters(&db, created.id, [None, Some(7.5), None, None]).await?.expect("asset exists");
    assert_eq!(updated.meters(), [Some(100.0), Some(7.5), None, None]);

    let off = asset::set_active(&db, created.id, false).await?.expect("asset exists");
    assert!(!off.is_active);

    let found = asset::Entity::find().filter(asset::Column::SerialNumber.eq(serial)).one(&db).await?;
    assert_eq!(found.map(|a| a.id), Some(created.id));

    assert!(asset::update_meters(&db, Uuid::new_v4(), [Some(1.0), None, None, None]).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn asset_requires_name_and_serial() -> Result<()> {
    let db = connect_for_tests().await?;
    let err = asset::create(&db, &asset::NewAsset { name: " ".into(), serial_number: "x".into(), ..Default::default() }, None).await;
    assert!(matches!(err, Err(crate::errors::ModelError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn deleting_template_cascades_to_items_and_parts() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = connect_for_tests().await?;
    let set = new_set("Quarterly inspection").insert(&db).await?;
    let item = new_item(set.id, "Check belts", 1).insert(&db).await?;
    template_part_demand::ActiveModel {
        id: Set(Uuid::new_v4()),
        template_action_item_id: Set(item.id),
        part_id: Set(Uuid::new_v4()),
        quantity_required: Set(2.0),
        expected_cost: Set(Some(12.5)),
        notes: Set(None),
        is_optional: Set(false),
        sequence_order: Set(1),
    }
    .insert(&db)
    .await?;

    template_action_set::Entity::delete_by_id(set.id).exec(&db).await?;

    let items = template_action_item::Entity::find()
        .filter(template_action_item::Column::TemplateActionSetId.eq(set.id))
        .all(&db)
        .await?;
    assert!(items.is_empty());
    let parts = template_part_demand::Entity::find()
        .filter(template_part_demand::Column::TemplateActionItemId.eq(item.id))
        .all(&db)
        .await?;
    assert!(parts.is_empty());
    Ok(())
}

#[tokio::test]
async fn template_activation_toggles_flag() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = connect_for_tests().await?;
    let set = new_set("Annual overhaul").insert(&db).await?;
    let off = template_action_set::set_active(&db, set.id, false).await?.expect("set exists");
    assert!(!off.is_active);
    let on = template_action_set::set_active(&db, set.id, true).await?.expect("set exists");
    assert!(on.is_active);
    assert!(template_action_set::set_active(&db, Uuid::new_v4(), true).await?.is_none());
    Ok(())
}
