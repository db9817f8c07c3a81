use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validation::require_text;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub serial_number: String,
    pub asset_type_id: Option<Uuid>,
    pub make_model_id: Option<Uuid>,
    pub meter1: Option<f64>,
    pub meter2: Option<f64>,
    pub meter3: Option<f64>,
    pub meter4: Option<f64>,
    pub is_active: bool,
    pub created_by_id: Option<Uuid>,
    pub updated_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Reading of meter `n` (1..=4).
    pub fn meter(&self, n: usize) -> Option<f64> {
        match n {
            1 => self.meter1,
            2 => self.meter2,
            3 => self.meter3,
            4 => self.meter4,
            _ => None,
        }
    }

    pub fn meters(&self) -> [Option<f64>; 4] {
        [self.meter1, self.meter2, self.meter3, self.meter4]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAsset {
    pub name: String,
    pub serial_number: String,
    #[serde(default)]
    pub asset_type_id: Option<Uuid>,
    #[serde(default)]
    pub make_model_id: Option<Uuid>,
    #[serde(default)]
    pub meters: [Option<f64>; 4],
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: &NewAsset,
    user_id: Option<Uuid>,
) -> Result<Model, ModelError> {
    require_text("name", &input.name)?;
    require_text("serial_number", &input.serial_number)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        serial_number: Set(input.serial_number.trim().to_string()),
        asset_type_id: Set(input.asset_type_id),
        make_model_id: Set(input.make_model_id),
        meter1: Set(input.meters[0]),
        meter2: Set(input.meters[1]),
        meter3: Set(input.meters[2]),
        meter4: Set(input.meters[3]),
        is_active: Set(true),
        created_by_id: Set(user_id),
        updated_by_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

/// Overwrites the meters that are `Some`; `None` leaves the stored reading alone.
pub async fn update_meters<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    meters: [Option<f64>; 4],
) -> Result<Option<Model>, ModelError> {
    let Some(found) = Entity::find_by_id(id).one(db).await? else { return Ok(None) };
    let mut am: ActiveModel = found.into();
    if let Some(v) = meters[0] { am.meter1 = Set(Some(v)); }
    if let Some(v) = meters[1] { am.meter2 = Set(Some(v)); }
    if let Some(v) = meters[2] { am.meter3 = Set(Some(v)); }
    if let Some(v) = meters[3] { am.meter4 = Set(Some(v)); }
    am.updated_at = Set(Utc::now().into());
    Ok(Some(am.update(db).await?))
}

pub async fn set_active<C: ConnectionTrait>(db: &C, id: Uuid, active: bool) -> Result<Option<Model>, ModelError> {
    let Some(found) = Entity::find_by_id(id).one(db).await? else { return Ok(None) };
    let mut am: ActiveModel = found.into();
    am.is_active = Set(active);
    am.updated_at = Set(Utc::now().into());
    Ok(Some(am.update(db).await?))
}
