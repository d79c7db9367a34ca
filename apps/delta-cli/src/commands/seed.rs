//! `seed`: a small demo catalog for local development

use domain_banners::{BannerPlacement, BannerService, CreateBanner, MongoBannerRepository};
use domain_categories::{CategoryFilter, CategoryService, CreateCategory, MongoCategoryRepository};
use domain_products::{CreateProduct, MongoProductRepository, ProductService, Variant};
use mongodb::Database;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

struct DemoCategory {
    name: &'static str,
    description: &'static str,
    children: &'static [&'static str],
}

const CATEGORIES: &[DemoCategory] = &[
    DemoCategory {
        name: "Femme",
        description: "Robes, tops et ensembles",
        children: &["Robes", "Tops"],
    },
    DemoCategory {
        name: "Homme",
        description: "Chemises et pantalons",
        children: &["Chemises", "Pantalons"],
    },
    DemoCategory {
        name: "Accessoires",
        description: "Sacs, foulards et bijoux",
        children: &[],
    },
];

/// (category, name, price, compare-at, colors, featured)
const PRODUCTS: &[(&str, &str, i64, Option<i64>, &[&str], bool)] = &[
    ("Robes", "Robe Wax Portefeuille", 24_900, Some(29_900), &["Indigo", "Ocre"], true),
    ("Robes", "Robe Longue Bazin", 34_500, None, &["Blanc", "Bordeaux"], false),
    ("Tops", "Top Brodé Dakar", 12_900, None, &["Blanc"], true),
    ("Chemises", "Chemise Lin Col Mao", 18_500, Some(21_000), &["Sable", "Noir"], false),
    ("Pantalons", "Pantalon Chino Ajusté", 16_900, None, &["Kaki", "Marine"], true),
    ("Accessoires", "Foulard Soie Imprimé", 8_900, None, &["Multicolore"], false),
];

const SIZES: &[&str] = &["S", "M", "L", "XL"];

fn demo_product(category_id: Uuid, entry: &(&str, &str, i64, Option<i64>, &[&str], bool)) -> CreateProduct {
    let (_, name, price, compare_at_price, colors, is_featured) = *entry;
    let variants = colors
        .iter()
        .flat_map(|color| {
            SIZES.iter().map(move |size| Variant {
                size: size.to_string(),
                color: color.to_string(),
                stock: 10,
                sku: None,
            })
        })
        .collect();

    CreateProduct {
        name: name.to_string(),
        description: format!("{name}, confection artisanale."),
        price,
        compare_at_price,
        category_id,
        images: Vec::new(),
        variants,
        tags: vec!["nouveautes".to_string()],
        is_featured,
        is_active: true,
    }
}

fn demo_banners() -> Vec<CreateBanner> {
    vec![
        CreateBanner {
            title: "Nouvelle Collection".to_string(),
            subtitle: Some("Le wax revisité pour la saison".to_string()),
            image: "/uploads/demo-hero.jpg".to_string(),
            link: Some("/products?category=femme".to_string()),
            button_text: Some("Découvrir".to_string()),
            placement: BannerPlacement::Hero,
            sort_order: 0,
            is_active: true,
            starts_at: None,
            ends_at: None,
        },
        CreateBanner {
            title: "Livraison offerte".to_string(),
            subtitle: Some("Dès 100 € d'achat".to_string()),
            image: "/uploads/demo-promo.jpg".to_string(),
            link: None,
            button_text: None,
            placement: BannerPlacement::Promo,
            sort_order: 1,
            is_active: true,
            starts_at: None,
            ends_at: None,
        },
    ]
}

fn category_input(name: &str, description: Option<&str>, parent_id: Option<Uuid>, sort_order: i32) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        description: description.map(str::to_string),
        image: None,
        parent_id,
        sort_order,
        is_active: true,
    }
}

pub async fn run(db: &Database) -> eyre::Result<()> {
    let category_repository = MongoCategoryRepository::new(db);
    category_repository.init_indexes().await?;
    let categories = CategoryService::new(category_repository);

    if !categories.list(CategoryFilter::default()).await?.is_empty() {
        info!("Categories already exist, skipping seed");
        return Ok(());
    }

    let product_repository = MongoProductRepository::new(db);
    product_repository.init_indexes().await?;
    let products = ProductService::new(product_repository, categories.clone());

    let banner_repository = MongoBannerRepository::new(db);
    banner_repository.init_indexes().await?;
    let banners = BannerService::new(banner_repository);

    let mut by_name = std::collections::HashMap::new();
    for (position, demo) in (0..).zip(CATEGORIES) {
        let parent = categories
            .create(category_input(demo.name, Some(demo.description), None, position))
            .await?;
        for (child_position, child) in (0..).zip(demo.children) {
            let created = categories
                .create(category_input(child, None, Some(parent.id), child_position))
                .await?;
            by_name.insert(*child, created.id);
        }
        by_name.insert(demo.name, parent.id);
    }

    let mut product_count = 0;
    for entry in PRODUCTS {
        let category_id = by_name
            .get(entry.0)
            .copied()
            .ok_or_else(|| eyre::eyre!("demo category {} missing", entry.0))?;
        let input = demo_product(category_id, entry);
        input.validate()?;
        products.create(input).await?;
        product_count += 1;
    }

    for input in demo_banners() {
        input.validate()?;
        banners.create(input).await?;
    }

    info!(
        categories = by_name.len(),
        products = product_count,
        "Demo catalog seeded"
    );
    Ok(())
}
