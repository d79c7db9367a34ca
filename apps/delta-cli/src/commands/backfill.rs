//! `backfill-order-numbers`

use domain_categories::{CategoryService, MongoCategoryRepository};
use domain_orders::{MongoOrderRepository, OrderService};
use domain_products::{MongoProductRepository, ProductService};
use mongodb::Database;
use tracing::info;

pub async fn run(db: &Database) -> eyre::Result<()> {
    let categories = CategoryService::new(MongoCategoryRepository::new(db));
    let products = ProductService::new(MongoProductRepository::new(db), categories);

    let repository = MongoOrderRepository::new(db);
    repository.init_indexes().await?;
    let orders = OrderService::new(repository, products);

    let assigned = orders.backfill_order_numbers().await?;
    info!(assigned, "Order number backfill finished");
    Ok(())
}
