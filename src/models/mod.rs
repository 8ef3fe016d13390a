//! Database models, one file per business area.
//!
//! Each entity has a query model (`Queryable` + `Selectable`), an insert
//! model (`Insertable`) and, where it can be edited, a changeset model
//! (`AsChangeset`) whose `None` fields are left untouched.

mod cart;
mod catalog;
mod delivery;
mod feedback;
mod geography;

pub use cart::{NewShoppingCart, NewShoppingCartItem, ShoppingCart, ShoppingCartItem};
pub use catalog::{
    Category, NewCategory, NewProduct, NewProductVariant, NewSeller, Product, ProductStatus,
    ProductVariant, Seller, UpdateCategory, UpdateProduct, UpdateProductVariant, UpdateSeller,
};
pub use delivery::{
    DeliveryOrder, DeliveryStatus, DeliveryTariff, DeliveryTracking, NewDeliveryOrder,
    NewDeliveryTariff, NewDeliveryTracking, UpdateDeliveryOrder, UpdateDeliveryTariff, quote_price,
};
pub use feedback::{
    Complaint, ComplaintStatus, NewComplaint, NewReview, Review, UpdateComplaint, UpdateReview,
};
pub use geography::{
    Address, City, Country, NewAddress, NewCity, NewCountry, UpdateAddress, UpdateCity,
    UpdateCountry,
};

/// Upper-cased, whitespace-trimmed form of a display name.
///
/// Stored next to the name and used for uniqueness and exact lookups.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_trims_and_uppercases() {
        assert_eq!(normalize_name("  Acme Tools "), "ACME TOOLS");
        assert_eq!(normalize_name("germany"), "GERMANY");
    }

    #[test]
    fn test_normalize_name_keeps_inner_whitespace() {
        assert_eq!(normalize_name("new  york"), "NEW  YORK");
    }

    #[test]
    fn test_normalize_name_handles_unicode() {
        assert_eq!(normalize_name(" straße "), "STRASSE");
        assert_eq!(normalize_name("ÖSTERREICH"), "ÖSTERREICH");
    }

    #[test]
    fn test_normalize_name_empty() {
        assert_eq!(normalize_name("   "), "");
    }
}
