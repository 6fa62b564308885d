pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;

use sea_orm::{
    sea_query::Index, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    Schema, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{
    cart::Entity as Cart, cart_item::Entity as CartItem, order::Entity as Order,
    order_item::Entity as OrderItem, product::Entity as Product,
};

macro_rules! create_table {
    ($db:expr, $schema:expr, $entity:expr) => {{
        let backend = $db.get_database_backend();
        let mut table = $schema.create_table_from_entity($entity);
        table.if_not_exists();
        $db.execute(backend.build(&table)).await?;
        for mut index in $schema.create_index_from_entity($entity) {
            index.if_not_exists();
            $db.execute(backend.build(&index)).await?;
        }
    }};
}

pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table!(db, schema, Product);
    create_table!(db, schema, Cart);
    create_table!(db, schema, CartItem);
    create_table!(db, schema, Order);
    create_table!(db, schema, OrderItem);

    // Upserts on cart items conflict on this pair.
    let cart_product_unique = Index::create()
        .if_not_exists()
        .name("idx-cart_items-cart_id-product_id")
        .table(CartItem)
        .col(cart_item::Column::CartId)
        .col(cart_item::Column::ProductId)
        .unique()
        .to_owned();
    db.execute(db.get_database_backend().build(&cart_product_unique))
        .await?;

    Ok(())
}

/// Fills an empty catalog with a few products so a local instance has
/// something to put in a cart.
pub async fn seed_demo_catalog(db: &DatabaseConnection) -> Result<(), DbErr> {
    if Product::find().count(db).await? > 0 {
        info!("Product catalog already populated, skipping demo seed");
        return Ok(());
    }

    let demo = [
        ("demo-bagel", "Sesame bagel", 1.5, "demo-bakery"),
        ("demo-baranki", "Baranki, 200g", 2.25, "demo-bakery"),
        ("demo-coffee", "Filter coffee", 3.0, "demo-cafe"),
        ("demo-tea", "Black tea", 2.0, "demo-cafe"),
    ];
    let products = demo.map(|(id, name, price, business_id)| product::ActiveModel {
        id: Set(id.to_owned()),
        name: Set(name.to_owned()),
        price: Set(price),
        business_id: Set(business_id.to_owned()),
    });

    let txn = db.begin().await?;
    Product::insert_many(products).exec(&txn).await?;
    txn.commit().await?;

    info!(count = demo.len(), "Seeded demo product catalog");
    Ok(())
}
