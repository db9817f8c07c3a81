#![cfg(test)]
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::asset::{self, NewAsset};
use serde_json::json;

use crate::builder::{BuildAction, BuildActionTool, BuildPartDemand, TemplateBuilder};

/// Fresh migrated database for one test.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::connect_for_tests().await
}

pub async fn seed_asset(db: &DatabaseConnection, name: &str, meters: [Option<f64>; 4]) -> Result<asset::Model, anyhow::Error> {
    let input = NewAsset {
        name: name.to_string(),
        serial_number: format!("SN-{}", Uuid::new_v4()),
        asset_type_id: None,
        make_model_id: None,
        meters,
    };
    Ok(asset::create(db, &input, None).await?)
}

/// Submitted two-action template; the first action has one part demand and one tool.
pub async fn seed_template(db: &DatabaseConnection) -> Result<Uuid, anyhow::Error> {
    let b = TemplateBuilder::new(db.clone());
    let mem = b.create_blank("Service", None, None).await?;
    b.set_metadata(mem.id, &serde_json::from_value(json!({"task_name": "250h service", "estimated_duration": 2}))?).await?;
    b.add_custom_action(mem.id, BuildAction { action_name: "Change oil".into(), ..Default::default() }).await?;
    b.add_part_demand_to_action(mem.id, 0, BuildPartDemand { part_id: Uuid::new_v4(), quantity_required: 5.0, ..Default::default() }).await?;
    b.add_tool_to_action(mem.id, 0, BuildActionTool { tool_id: Uuid::new_v4(), ..Default::default() }).await?;
    b.add_custom_action(mem.id, BuildAction { action_name: "Grease pins".into(), ..Default::default() }).await?;
    b.submit(mem.id, None)
        .await?
        .template_action_set_id
        .ok_or_else(|| anyhow::anyhow!("submitted build has no template"))
}
