//! ShareLink entity, supplemented from the original's `dao.ShareLink`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "share_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: i64,
    pub folder_id: i64,
    pub password: Option<String>,
    pub created_at: DateTimeUtc,
    pub expire_at: DateTimeUtc,
    /// 1 = active, 2 = expired, 3 = cancelled, matching the original's status codes.
    pub status: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::share_file::Entity")]
    ShareFiles,
}

impl Related<super::share_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShareFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
