//! Minimal asset registry: enough for planning and event completion.

use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::info;
use uuid::Uuid;

use models::asset::{self, NewAsset};

use crate::errors::ServiceError;

pub async fn create_asset(db: &DatabaseConnection, input: &NewAsset, user_id: Option<Uuid>) -> Result<asset::Model, ServiceError> {
    let m = asset::create(db, input, user_id).await?;
    info!(id = %m.id, serial = %m.serial_number, "asset created");
    Ok(m)
}

pub async fn get_asset(db: &DatabaseConnection, id: Uuid) -> Result<asset::Model, ServiceError> {
    asset::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("asset"))
}

pub async fn update_meters(db: &DatabaseConnection, id: Uuid, meters: [Option<f64>; 4]) -> Result<asset::Model, ServiceError> {
    if meters.iter().flatten().any(|v| *v < 0.0 || !v.is_finite()) {
        return Err(ServiceError::Validation("meter readings must be non-negative numbers".into()));
    }
    let m = asset::update_meters(db, id, meters).await?.ok_or_else(|| ServiceError::not_found("asset"))?;
    info!(id = %m.id, "asset meters updated");
    Ok(m)
}

pub async fn set_asset_active(db: &DatabaseConnection, id: Uuid, active: bool) -> Result<asset::Model, ServiceError> {
    let m = asset::set_active(db, id, active).await?.ok_or_else(|| ServiceError::not_found("asset"))?;
    info!(id = %m.id, active, "asset activation changed");
    Ok(m)
}
