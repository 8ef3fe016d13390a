//! Service layer for business logic operations.
//!
//! Services wrap the repositories: lookups by id turn a missing row into
//! `NotFound`, and creates check that referenced parents exist.

mod cart_service;
mod catalog_service;
mod delivery_service;
mod feedback_service;
mod geography_service;

pub use cart_service::{CART_AMOUNT_RANGE, CartContents, CartService, validate_amount};
pub use catalog_service::{CategoryService, ProductService, ProductVariantService, SellerService};
pub use delivery_service::{DeliveryOrderService, DeliveryTariffService, validate_day_range};
pub use feedback_service::{ComplaintService, ReviewService};
pub use geography_service::{AddressService, CityService, CountryService};

use crate::repositories::Repositories;

/// Aggregates all services.
///
/// Used as part of the Axum application state; cloning is cheap.
#[derive(Clone)]
pub struct Services {
    pub countries: CountryService,
    pub cities: CityService,
    pub addresses: AddressService,
    pub sellers: SellerService,
    pub categories: CategoryService,
    pub products: ProductService,
    pub product_variants: ProductVariantService,
    pub carts: CartService,
    pub delivery_tariffs: DeliveryTariffService,
    pub delivery_orders: DeliveryOrderService,
    pub reviews: ReviewService,
    pub complaints: ComplaintService,
}

impl Services {
    pub fn new(repos: Repositories) -> Self {
        Self {
            countries: CountryService::new(repos.countries.clone()),
            cities: CityService::new(repos.cities.clone(), repos.countries),
            addresses: AddressService::new(repos.addresses.clone(), repos.cities),
            sellers: SellerService::new(repos.sellers.clone()),
            categories: CategoryService::new(repos.categories.clone()),
            products: ProductService::new(
                repos.products.clone(),
                repos.sellers.clone(),
                repos.categories,
            ),
            product_variants: ProductVariantService::new(
                repos.product_variants,
                repos.products.clone(),
            ),
            carts: CartService::new(repos.carts, repos.products.clone()),
            delivery_tariffs: DeliveryTariffService::new(repos.delivery_tariffs),
            delivery_orders: DeliveryOrderService::new(
                repos.delivery_orders,
                repos.delivery_tracking,
                repos.addresses,
            ),
            reviews: ReviewService::new(repos.reviews, repos.products.clone()),
            complaints: ComplaintService::new(repos.complaints, repos.sellers, repos.products),
        }
    }
}
