use sea_orm::entity::prelude::*;

/// Single-use code uploaded by an operator.
/// `id` is assigned on insert and defines FIFO distribution order; `value` is unique.
/// `used_by` and `used_at` are written together with `is_used = true`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub value: String,
    pub is_used: bool,
    pub uploaded_by: i64,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    pub used_by: Option<i64>,
    pub used_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
