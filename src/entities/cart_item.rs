use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub price: f64,
    pub created_at: DateTimeUtc,
}

// Relations are join-only: products are owned by the catalog and may disappear
// from under a cart, so no foreign keys are emitted for this table.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Related<crate::entities::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Entity::belongs_to(crate::entities::cart::Entity)
            .from(Column::CartId)
            .to(crate::entities::cart::Column::Id)
            .into()
    }
}

impl Related<crate::entities::product::Entity> for Entity {
    fn to() -> RelationDef {
        Entity::belongs_to(crate::entities::product::Entity)
            .from(Column::ProductId)
            .to(crate::entities::product::Column::Id)
            .into()
    }
}
