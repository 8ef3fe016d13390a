use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::middleware::CUSTOMER_ID_HEADER;

pub const GEOGRAPHY_TAG: &str = "Geography";
pub const CATALOG_TAG: &str = "Catalog";
pub const CART_TAG: &str = "Cart";
pub const DELIVERY_TAG: &str = "Delivery";
pub const FEEDBACK_TAG: &str = "Feedback";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Emporium",
        description = "Marketplace catalog, cart, delivery and feedback API",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
        )
    ),
    tags(
        (name = GEOGRAPHY_TAG, description = "Countries, cities and addresses"),
        (name = CATALOG_TAG, description = "Sellers, categories, products and variants"),
        (name = CART_TAG, description = "Shopping cart of the calling customer"),
        (name = DELIVERY_TAG, description = "Delivery tariffs, orders and tracking"),
        (name = FEEDBACK_TAG, description = "Product reviews and complaints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "customerId",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    CUSTOMER_ID_HEADER,
                    "UUID of the customer owning the cart",
                ))),
            )
        }
    }
}
