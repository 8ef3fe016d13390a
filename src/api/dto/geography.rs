//! Country, city and address DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{optional_timestamp, timestamp};
use crate::models::{
    Address, City, Country, NewAddress, NewCity, NewCountry, UpdateAddress, UpdateCity,
    UpdateCountry,
};
use crate::repositories::{AddressFilter, CityFilter, CountryFilter};

// ============================================================================
// Countries
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCountryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Germany", min_length = 1, max_length = 100)]
    pub name: String,
    /// ISO 3166-1 alpha-2 code
    #[validate(length(equal = 2, message = "ISO code must be exactly 2 characters"))]
    #[schema(example = "DE", min_length = 2, max_length = 2)]
    pub iso_code: String,
}

impl CreateCountryRequest {
    pub fn into_new_country(self) -> NewCountry {
        NewCountry {
            name: self.name,
            normalized_name: String::new(),
            iso_code: self.iso_code,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateCountryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(equal = 2, message = "ISO code must be exactly 2 characters"))]
    pub iso_code: Option<String>,
}

impl UpdateCountryRequest {
    pub fn into_update_country(self) -> UpdateCountry {
        UpdateCountry {
            name: self.name,
            normalized_name: None,
            iso_code: self.iso_code,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct CountryListQuery {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    #[validate(length(equal = 2, message = "ISO code must be exactly 2 characters"))]
    pub iso_code: Option<String>,
}

impl From<CountryListQuery> for CountryFilter {
    fn from(query: CountryListQuery) -> Self {
        CountryFilter {
            name: query.name,
            iso_code: query.iso_code,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountryResponse {
    pub id: i32,
    pub name: String,
    pub normalized_name: String,
    pub iso_code: String,
    pub created_date: String,
    pub updated_date: Option<String>,
}

impl From<Country> for CountryResponse {
    fn from(country: Country) -> Self {
        Self {
            id: country.id,
            name: country.name,
            normalized_name: country.normalized_name,
            iso_code: country.iso_code,
            created_date: timestamp(&country.created_date),
            updated_date: optional_timestamp(country.updated_date.as_ref()),
        }
    }
}

// ============================================================================
// Cities
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCityRequest {
    #[validate(range(min = 1, message = "Country id must be positive"))]
    pub country_id: i32,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Berlin")]
    pub name: String,
}

impl CreateCityRequest {
    pub fn into_new_city(self) -> NewCity {
        NewCity {
            country_id: self.country_id,
            name: self.name,
            normalized_name: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateCityRequest {
    #[validate(range(min = 1, message = "Country id must be positive"))]
    pub country_id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
}

impl UpdateCityRequest {
    pub fn into_update_city(self) -> UpdateCity {
        UpdateCity {
            country_id: self.country_id,
            name: self.name,
            normalized_name: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct CityListQuery {
    pub country_id: Option<i32>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
}

impl From<CityListQuery> for CityFilter {
    fn from(query: CityListQuery) -> Self {
        CityFilter {
            country_id: query.country_id,
            name: query.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CityResponse {
    pub id: i32,
    pub country_id: i32,
    pub name: String,
    pub normalized_name: String,
    pub created_date: String,
    pub updated_date: Option<String>,
}

impl From<City> for CityResponse {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            country_id: city.country_id,
            name: city.name,
            normalized_name: city.normalized_name,
            created_date: timestamp(&city.created_date),
            updated_date: optional_timestamp(city.updated_date.as_ref()),
        }
    }
}

// ============================================================================
// Addresses
// ============================================================================

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAddressRequest {
    #[validate(range(min = 1, message = "City id must be positive"))]
    pub city_id: i32,
    #[validate(length(min = 1, max = 200, message = "Street must be between 1 and 200 characters"))]
    #[schema(example = "Unter den Linden")]
    pub street: String,
    #[validate(length(min = 1, max = 20, message = "Building must be between 1 and 20 characters"))]
    #[schema(example = "77")]
    pub building: String,
    #[validate(length(max = 20, message = "Apartment must be at most 20 characters"))]
    pub apartment: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Postal code must be between 1 and 20 characters"))]
    #[schema(example = "10117")]
    pub postal_code: String,
}

impl CreateAddressRequest {
    pub fn into_new_address(self) -> NewAddress {
        NewAddress {
            id: Uuid::new_v4(),
            city_id: self.city_id,
            street: self.street,
            building: self.building,
            apartment: self.apartment,
            postal_code: self.postal_code,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateAddressRequest {
    #[validate(range(min = 1, message = "City id must be positive"))]
    pub city_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Street must be between 1 and 200 characters"))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Building must be between 1 and 20 characters"))]
    pub building: Option<String>,
    #[validate(length(max = 20, message = "Apartment must be at most 20 characters"))]
    pub apartment: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Postal code must be between 1 and 20 characters"))]
    pub postal_code: Option<String>,
}

impl UpdateAddressRequest {
    pub fn into_update_address(self) -> UpdateAddress {
        UpdateAddress {
            city_id: self.city_id,
            street: self.street,
            building: self.building,
            apartment: self.apartment,
            postal_code: self.postal_code,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct AddressListQuery {
    pub city_id: Option<i32>,
    pub postal_code: Option<String>,
    /// Case-insensitive substring of the street
    pub street: Option<String>,
    /// List soft-deleted addresses instead of live ones
    pub is_deleted: Option<bool>,
}

impl From<AddressListQuery> for AddressFilter {
    fn from(query: AddressListQuery) -> Self {
        AddressFilter {
            city_id: query.city_id,
            postal_code: query.postal_code,
            street: query.street,
            is_deleted: query.is_deleted,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressResponse {
    pub id: Uuid,
    pub city_id: i32,
    pub street: String,
    pub building: String,
    pub apartment: Option<String>,
    pub postal_code: String,
    pub is_deleted: bool,
    pub created_date: String,
    pub updated_date: Option<String>,
    pub deleted_date: Option<String>,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            city_id: address.city_id,
            street: address.street,
            building: address.building,
            apartment: address.apartment,
            postal_code: address.postal_code,
            is_deleted: address.is_deleted,
            created_date: timestamp(&address.created_date),
            updated_date: optional_timestamp(address.updated_date.as_ref()),
            deleted_date: optional_timestamp(address.deleted_date.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_code_must_have_two_letters() {
        let request = CreateCountryRequest {
            name: "Germany".to_string(),
            iso_code: "DEU".to_string(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("iso_code"));
    }

    #[test]
    fn test_new_address_gets_fresh_id() {
        let request = || CreateAddressRequest {
            city_id: 1,
            street: "Main".to_string(),
            building: "1".to_string(),
            apartment: None,
            postal_code: "12345".to_string(),
        };
        let first = request().into_new_address();
        let second = request().into_new_address();
        assert!(!first.id.is_nil());
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_city_requires_positive_country() {
        let request = CreateCityRequest {
            country_id: 0,
            name: "Berlin".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
