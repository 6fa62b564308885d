use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "order_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub order_id: String,
    pub product_id: String,
    pub quantity: i32,
    /// Unit price captured at checkout.
    pub price: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Related<crate::entities::order::Entity> for Entity {
    fn to() -> RelationDef {
        Entity::belongs_to(crate::entities::order::Entity)
            .from(Column::OrderId)
            .to(crate::entities::order::Column::Id)
            .into()
    }
}
