//! Repository layer for data access operations.
//!
//! One repository per entity. All of them share a single [`QueryExecutor`]
//! and follow the listing convention defined in [`query`].

pub mod query;

mod address_repo;
mod cart_repo;
mod category_repo;
mod city_repo;
mod complaint_repo;
mod country_repo;
mod delivery_order_repo;
mod delivery_tariff_repo;
mod delivery_tracking_repo;
mod product_repo;
mod product_variant_repo;
mod review_repo;
mod seller_repo;

pub use address_repo::{AddressFilter, AddressRepository, AddressSortKey};
pub use cart_repo::{ShoppingCartFilter, ShoppingCartRepository, ShoppingCartSortKey};
pub use category_repo::{CategoryFilter, CategoryRepository, CategorySortKey};
pub use city_repo::{CityFilter, CityRepository, CitySortKey};
pub use complaint_repo::{ComplaintFilter, ComplaintRepository, ComplaintSortKey};
pub use country_repo::{CountryFilter, CountryRepository, CountrySortKey};
pub use delivery_order_repo::{
    DeliveryOrderFilter, DeliveryOrderRepository, DeliveryOrderSortKey, PlaceDeliveryOrder,
    StatusChange,
};
pub use delivery_tariff_repo::{
    DeliveryTariffFilter, DeliveryTariffRepository, DeliveryTariffSortKey,
};
pub use delivery_tracking_repo::{
    DeliveryTrackingFilter, DeliveryTrackingRepository, DeliveryTrackingSortKey,
};
pub use product_repo::{ProductFilter, ProductRepository, ProductSortKey};
pub use product_variant_repo::{
    ProductVariantFilter, ProductVariantRepository, ProductVariantSortKey,
};
pub use query::{Page, PageRequest, QueryExecutor, SortDirection, SortKey};
pub use review_repo::{RatingSummary, ReviewFilter, ReviewRepository, ReviewSortKey};
pub use seller_repo::{SellerFilter, SellerRepository, SellerSortKey};

use std::time::Duration;

use crate::db::AsyncDbPool;

/// Aggregates all repositories.
///
/// Cloning is cheap: every repository holds the same pool handle.
#[derive(Clone)]
pub struct Repositories {
    pub countries: CountryRepository,
    pub cities: CityRepository,
    pub addresses: AddressRepository,
    pub sellers: SellerRepository,
    pub categories: CategoryRepository,
    pub products: ProductRepository,
    pub product_variants: ProductVariantRepository,
    pub carts: ShoppingCartRepository,
    pub delivery_tariffs: DeliveryTariffRepository,
    pub delivery_orders: DeliveryOrderRepository,
    pub delivery_tracking: DeliveryTrackingRepository,
    pub reviews: ReviewRepository,
    pub complaints: ComplaintRepository,
}

impl Repositories {
    pub fn new(pool: AsyncDbPool, query_timeout: Duration) -> Self {
        let db = QueryExecutor::new(pool, query_timeout);
        Self {
            countries: CountryRepository::new(db.clone()),
            cities: CityRepository::new(db.clone()),
            addresses: AddressRepository::new(db.clone()),
            sellers: SellerRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            product_variants: ProductVariantRepository::new(db.clone()),
            carts: ShoppingCartRepository::new(db.clone()),
            delivery_tariffs: DeliveryTariffRepository::new(db.clone()),
            delivery_orders: DeliveryOrderRepository::new(db.clone()),
            delivery_tracking: DeliveryTrackingRepository::new(db.clone()),
            reviews: ReviewRepository::new(db.clone()),
            complaints: ComplaintRepository::new(db),
        }
    }
}
