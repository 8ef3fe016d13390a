//! Repository tests against a live PostgreSQL.
//!
//! Skipped unless `TEST_DATABASE_URL` points at a database the tests may
//! migrate and write to.

use std::str::FromStr;
use std::time::Duration;

use bigdecimal::BigDecimal;
use emporium::config::DatabaseConfig;
use emporium::db::{establish_async_connection_pool, run_pending_migrations};
use emporium::error::AppError;
use emporium::models::{
    Address, Category, ComplaintStatus, DeliveryStatus, DeliveryTariff, NewAddress, NewCategory,
    NewCity, NewComplaint, NewCountry, NewDeliveryTariff, NewProduct, NewProductVariant,
    NewReview, NewSeller, Product, ProductStatus, UpdateCategory, UpdateSeller,
};
use emporium::repositories::{
    PageRequest, PlaceDeliveryOrder, Repositories, SellerFilter, SellerSortKey, StatusChange,
};
use uuid::Uuid;

async fn repositories() -> Option<Repositories> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };

    run_pending_migrations(&url).await.unwrap();
    let config = DatabaseConfig {
        url,
        max_connections: 4,
        ..DatabaseConfig::default()
    };
    let pool = establish_async_connection_pool(&config).await.unwrap();
    Some(Repositories::new(pool, Duration::from_secs(10)))
}

fn new_seller(name: &str) -> NewSeller {
    NewSeller {
        id: Uuid::new_v4(),
        name: name.to_string(),
        normalized_name: String::new(),
        email: "owner@shop.example".to_string(),
        phone: None,
        description: None,
        is_verified: false,
    }
}

/// A name prefix no other test run shares.
fn unique_prefix() -> String {
    format!("it-{}", Uuid::new_v4().simple())
}

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn new_category(name: &str, parent_id: Option<i32>) -> NewCategory {
    NewCategory {
        parent_id,
        name: name.to_string(),
        normalized_name: String::new(),
        description: None,
    }
}

fn new_variant(product_id: Uuid, sku: &str, stock_quantity: i32) -> NewProductVariant {
    NewProductVariant {
        id: Uuid::new_v4(),
        product_id,
        sku: sku.to_string(),
        name: "Default".to_string(),
        price: dec("10.00"),
        stock_quantity,
    }
}

fn reparent(parent_id: i32) -> UpdateCategory {
    UpdateCategory {
        parent_id: Some(parent_id),
        ..UpdateCategory::default()
    }
}

fn assert_validation_on(result: Result<Category, AppError>, expected: &str) {
    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, expected),
        other => panic!("expected validation error on {expected}, got {:?}", other),
    }
}

fn assert_unprocessable<T: std::fmt::Debug>(result: Result<T, AppError>) {
    assert!(
        matches!(result, Err(AppError::UnprocessableContent { .. })),
        "expected unprocessable content, got {:?}",
        result
    );
}

/// An active product with its own seller and category.
async fn product(repos: &Repositories) -> Product {
    let prefix = unique_prefix();
    let seller = repos.sellers.create(new_seller(&prefix)).await.unwrap();
    let category = repos
        .categories
        .create(new_category(&prefix, None))
        .await
        .unwrap();
    repos
        .products
        .create(NewProduct {
            id: Uuid::new_v4(),
            seller_id: seller.id,
            category_id: category.id,
            name: format!("{} kettle", prefix),
            normalized_name: String::new(),
            description: None,
            price: dec("10.00"),
            status: ProductStatus::Active,
        })
        .await
        .unwrap()
}

/// An address in a fresh city of the shared test country.
async fn address(repos: &Repositories) -> Address {
    let country = match repos
        .countries
        .create(NewCountry {
            name: "Testland".to_string(),
            normalized_name: String::new(),
            iso_code: "ZZ".to_string(),
        })
        .await
    {
        Ok(country) => country,
        Err(AppError::Duplicate { .. }) => repos
            .countries
            .find_by_iso_code("ZZ")
            .await
            .unwrap()
            .unwrap(),
        Err(e) => panic!("failed to create country: {e:?}"),
    };
    let city = repos
        .cities
        .create(NewCity {
            country_id: country.id,
            name: unique_prefix(),
            normalized_name: String::new(),
        })
        .await
        .unwrap();
    repos
        .addresses
        .create(NewAddress {
            id: Uuid::new_v4(),
            city_id: city.id,
            street: "Harbour Road".to_string(),
            building: "12".to_string(),
            apartment: None,
            postal_code: "10115".to_string(),
        })
        .await
        .unwrap()
}

async fn tariff(repos: &Repositories, is_active: bool) -> DeliveryTariff {
    repos
        .delivery_tariffs
        .create(NewDeliveryTariff {
            name: unique_prefix(),
            base_price: dec("5.00"),
            price_per_kg: dec("1.50"),
            min_days: 1,
            max_days: 3,
            is_active,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_seller_crud_and_soft_delete() {
    let Some(repos) = repositories().await else {
        return;
    };
    let name = format!("  {} shop ", unique_prefix());

    let created = repos.sellers.create(new_seller(&name)).await.unwrap();
    assert_eq!(created.normalized_name, name.trim().to_uppercase());
    assert!(created.updated_date.is_none());

    let updated = repos
        .sellers
        .update(
            created.id,
            UpdateSeller {
                is_verified: Some(true),
                ..UpdateSeller::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_verified);
    assert!(updated.updated_date.is_some());

    let by_name = repos
        .sellers
        .find_by_normalized_name(&name.to_lowercase())
        .await
        .unwrap();
    assert_eq!(by_name.map(|s| s.id), Some(created.id));

    repos.sellers.delete(created.id).await.unwrap();
    assert!(repos.sellers.find_by_id(created.id).await.unwrap().is_none());
    assert!(!repos.sellers.exists(created.id).await.unwrap());
    assert!(matches!(
        repos.sellers.delete(created.id).await,
        Err(AppError::NotFound { .. })
    ));

    let deleted = repos
        .sellers
        .list(
            &SellerFilter {
                name: Some(name.trim().to_string()),
                is_deleted: Some(true),
                ..SellerFilter::default()
            },
            SellerSortKey::Id,
            PageRequest::new(1, 10, false).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.total, 1);
    assert!(deleted.items[0].deleted_date.is_some());
}

#[tokio::test]
async fn test_duplicate_seller_name_is_conflict() {
    let Some(repos) = repositories().await else {
        return;
    };
    let name = unique_prefix();

    repos.sellers.create(new_seller(&name)).await.unwrap();
    let result = repos.sellers.create(new_seller(&name.to_uppercase())).await;
    match result {
        Err(AppError::Duplicate { field, .. }) => assert_eq!(field, "normalized_name"),
        other => panic!("expected duplicate error, got {:?}", other.map(|s| s.id)),
    }
}

#[tokio::test]
async fn test_seller_listing_order_and_paging() {
    let Some(repos) = repositories().await else {
        return;
    };
    let prefix = unique_prefix();
    for suffix in ["b", "a", "c"] {
        repos
            .sellers
            .create(new_seller(&format!("{}-{}", prefix, suffix)))
            .await
            .unwrap();
    }
    let filter = SellerFilter {
        name: Some(prefix.clone()),
        ..SellerFilter::default()
    };

    let first = repos
        .sellers
        .list(&filter, SellerSortKey::Name, PageRequest::new(1, 2, true).unwrap())
        .await
        .unwrap();
    assert_eq!(first.total, 3);
    let names: Vec<_> = first.items.iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec![format!("{}-c", prefix), format!("{}-b", prefix)]);

    let second = repos
        .sellers
        .list(&filter, SellerSortKey::Name, PageRequest::new(2, 2, true).unwrap())
        .await
        .unwrap();
    assert_eq!(second.total, 3);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].name, format!("{}-a", prefix));

    let beyond = repos
        .sellers
        .list(&filter, SellerSortKey::Name, PageRequest::new(5, 2, true).unwrap())
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 3);
}

#[tokio::test]
async fn test_deleted_seller_releases_its_name() {
    let Some(repos) = repositories().await else {
        return;
    };
    let name = unique_prefix();

    let first = repos.sellers.create(new_seller(&name)).await.unwrap();
    repos.sellers.delete(first.id).await.unwrap();

    let second = repos.sellers.create(new_seller(&name)).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.normalized_name, second.normalized_name);
}

#[tokio::test]
async fn test_deleted_category_releases_its_name() {
    let Some(repos) = repositories().await else {
        return;
    };
    let name = unique_prefix();

    let first = repos
        .categories
        .create(new_category(&name, None))
        .await
        .unwrap();
    repos.categories.delete(first.id).await.unwrap();

    let second = repos
        .categories
        .create(new_category(&name, None))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    let duplicate = repos.categories.create(new_category(&name, None)).await;
    assert!(matches!(duplicate, Err(AppError::Duplicate { .. })));
}

#[tokio::test]
async fn test_deleted_variant_releases_its_sku() {
    let Some(repos) = repositories().await else {
        return;
    };
    let product = product(&repos).await;
    let sku = format!("{}-sku", unique_prefix());

    let first = repos
        .product_variants
        .create(new_variant(product.id, &sku, 1))
        .await
        .unwrap();
    repos.product_variants.delete(first.id).await.unwrap();

    let second = repos
        .product_variants
        .create(new_variant(product.id, &sku, 1))
        .await
        .unwrap();
    let by_sku = repos.product_variants.find_by_sku(&sku).await.unwrap();
    assert_eq!(by_sku.map(|v| v.id), Some(second.id));
}

#[tokio::test]
async fn test_category_cannot_be_moved_under_itself_or_a_descendant() {
    let Some(repos) = repositories().await else {
        return;
    };
    let prefix = unique_prefix();
    let root = repos
        .categories
        .create(new_category(&format!("{}-a", prefix), None))
        .await
        .unwrap();
    let child = repos
        .categories
        .create(new_category(&format!("{}-b", prefix), Some(root.id)))
        .await
        .unwrap();
    let grandchild = repos
        .categories
        .create(new_category(&format!("{}-c", prefix), Some(child.id)))
        .await
        .unwrap();

    assert_validation_on(
        repos.categories.update(root.id, reparent(root.id)).await,
        "parent_id",
    );
    assert_validation_on(
        repos.categories.update(root.id, reparent(grandchild.id)).await,
        "parent_id",
    );
    assert_validation_on(
        repos.categories.update(root.id, reparent(child.id)).await,
        "parent_id",
    );

    let unchanged = repos.categories.find_by_id(root.id).await.unwrap().unwrap();
    assert!(unchanged.parent_id.is_none());

    let moved = repos
        .categories
        .update(grandchild.id, reparent(root.id))
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(root.id));
}

#[tokio::test]
async fn test_cart_is_created_once_per_customer() {
    let Some(repos) = repositories().await else {
        return;
    };
    let customer_id = Uuid::new_v4();

    let first = repos.carts.get_or_create_for_customer(customer_id).await.unwrap();
    let second = repos.carts.get_or_create_for_customer(customer_id).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.customer_id, customer_id);
}

#[tokio::test]
async fn test_adding_same_product_increments_the_line() {
    let Some(repos) = repositories().await else {
        return;
    };
    let product = product(&repos).await;
    let cart = repos
        .carts
        .get_or_create_for_customer(Uuid::new_v4())
        .await
        .unwrap();

    let first = repos.carts.add_item(cart.id, product.id, 2).await.unwrap();
    assert_eq!(first.amount, 2);
    let second = repos.carts.add_item(cart.id, product.id, 3).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.amount, 5);

    let items = repos.carts.list_items(cart.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].amount, 5);
}

#[tokio::test]
async fn test_stock_cannot_drop_below_zero() {
    let Some(repos) = repositories().await else {
        return;
    };
    let product = product(&repos).await;
    let variant = repos
        .product_variants
        .create(new_variant(product.id, &format!("{}-sku", unique_prefix()), 3))
        .await
        .unwrap();

    let reduced = repos
        .product_variants
        .adjust_stock(variant.id, -2)
        .await
        .unwrap();
    assert_eq!(reduced.stock_quantity, 1);

    assert_unprocessable(repos.product_variants.adjust_stock(variant.id, -5).await);

    let current = repos
        .product_variants
        .find_by_id(variant.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.stock_quantity, 1);

    let missing = repos.product_variants.adjust_stock(Uuid::new_v4(), 1).await;
    assert!(matches!(missing, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn test_placing_order_prices_it_and_starts_tracking() {
    let Some(repos) = repositories().await else {
        return;
    };
    let address = address(&repos).await;
    let standard = tariff(&repos, true).await;
    let customer_id = Uuid::new_v4();

    let order = repos
        .delivery_orders
        .create(PlaceDeliveryOrder {
            address_id: address.id,
            tariff_id: standard.id,
            customer_id,
            weight_kg: dec("2.5"),
        })
        .await
        .unwrap();
    assert_eq!(order.status, DeliveryStatus::Created);
    assert_eq!(order.total_price, dec("8.75"));
    assert!(order.delivered_date.is_none());

    let history = repos
        .delivery_tracking
        .list_for_order(order.id, PageRequest::new(1, 10, false).unwrap())
        .await
        .unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.items[0].status, DeliveryStatus::Created);

    let inactive = tariff(&repos, false).await;
    assert_unprocessable(
        repos
            .delivery_orders
            .create(PlaceDeliveryOrder {
                address_id: address.id,
                tariff_id: inactive.id,
                customer_id,
                weight_kg: dec("1"),
            })
            .await,
    );
}

#[tokio::test]
async fn test_order_status_moves_forward_until_final() {
    let Some(repos) = repositories().await else {
        return;
    };
    let address = address(&repos).await;
    let standard = tariff(&repos, true).await;
    let order = repos
        .delivery_orders
        .create(PlaceDeliveryOrder {
            address_id: address.id,
            tariff_id: standard.id,
            customer_id: Uuid::new_v4(),
            weight_kg: dec("1"),
        })
        .await
        .unwrap();
    let change = |status, location: Option<&str>| StatusChange {
        status,
        location: location.map(str::to_string),
        note: None,
    };

    let in_transit = repos
        .delivery_orders
        .change_status(order.id, change(DeliveryStatus::InTransit, Some("Hub A")))
        .await
        .unwrap();
    assert_eq!(in_transit.status, DeliveryStatus::InTransit);
    assert!(in_transit.delivered_date.is_none());

    repos
        .delivery_orders
        .change_status(order.id, change(DeliveryStatus::InTransit, Some("Hub B")))
        .await
        .unwrap();
    assert_unprocessable(
        repos
            .delivery_orders
            .change_status(order.id, change(DeliveryStatus::InTransit, None))
            .await,
    );
    assert_unprocessable(
        repos
            .delivery_orders
            .change_status(order.id, change(DeliveryStatus::Created, None))
            .await,
    );

    let delivered = repos
        .delivery_orders
        .change_status(order.id, change(DeliveryStatus::Delivered, None))
        .await
        .unwrap();
    assert_eq!(delivered.status, DeliveryStatus::Delivered);
    assert!(delivered.delivered_date.is_some());

    assert_unprocessable(
        repos
            .delivery_orders
            .change_status(order.id, change(DeliveryStatus::Cancelled, None))
            .await,
    );

    let history = repos
        .delivery_tracking
        .list_for_order(order.id, PageRequest::new(1, 10, false).unwrap())
        .await
        .unwrap();
    let statuses: Vec<_> = history.items.iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        vec![
            DeliveryStatus::Created,
            DeliveryStatus::InTransit,
            DeliveryStatus::InTransit,
            DeliveryStatus::Delivered,
        ]
    );
    assert_eq!(history.items[2].location.as_deref(), Some("Hub B"));
}

#[tokio::test]
async fn test_closing_complaint_sets_resolved_date() {
    let Some(repos) = repositories().await else {
        return;
    };
    let product = product(&repos).await;
    let complaint = repos
        .complaints
        .create(NewComplaint {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            seller_id: Some(product.seller_id),
            product_id: Some(product.id),
            subject: "Arrived broken".to_string(),
            body: "The lid was cracked".to_string(),
            status: ComplaintStatus::Open,
        })
        .await
        .unwrap();

    let in_review = repos
        .complaints
        .resolve(complaint.id, ComplaintStatus::InReview)
        .await
        .unwrap();
    assert_eq!(in_review.status, ComplaintStatus::InReview);
    assert!(in_review.resolved_date.is_none());

    let resolved = repos
        .complaints
        .resolve(complaint.id, ComplaintStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(resolved.status, ComplaintStatus::Resolved);
    assert!(resolved.resolved_date.is_some());

    assert_unprocessable(
        repos
            .complaints
            .resolve(complaint.id, ComplaintStatus::Rejected)
            .await,
    );
}

#[tokio::test]
async fn test_average_rating_ignores_deleted_reviews() {
    let Some(repos) = repositories().await else {
        return;
    };
    let product = product(&repos).await;

    let empty = repos.reviews.average_rating(product.id).await.unwrap();
    assert_eq!(empty.count, 0);
    assert!(empty.average.is_none());

    let mut ids = Vec::new();
    for rating in [5, 4, 1] {
        let review = repos
            .reviews
            .create(NewReview {
                id: Uuid::new_v4(),
                product_id: product.id,
                customer_id: Uuid::new_v4(),
                rating,
                comment: None,
            })
            .await
            .unwrap();
        ids.push(review.id);
    }
    repos.reviews.delete(ids[2]).await.unwrap();

    let summary = repos.reviews.average_rating(product.id).await.unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.average, Some(dec("4.50")));
}
