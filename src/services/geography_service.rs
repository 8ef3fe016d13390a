//! Countries, cities and addresses.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Address, City, Country, NewAddress, NewCity, NewCountry, UpdateAddress, UpdateCity,
    UpdateCountry,
};
use crate::repositories::{
    AddressFilter, AddressRepository, AddressSortKey, CityFilter, CityRepository, CitySortKey,
    CountryFilter, CountryRepository, CountrySortKey, Page, PageRequest,
};

#[derive(Clone)]
pub struct CountryService {
    repo: CountryRepository,
}

impl CountryService {
    pub fn new(repo: CountryRepository) -> Self {
        Self { repo }
    }

    pub async fn list_countries(
        &self,
        filter: &CountryFilter,
        sort: CountrySortKey,
        page: PageRequest,
    ) -> AppResult<Page<Country>> {
        self.repo.list(filter, sort, page).await
    }

    /// Gets a country by id, or `NotFound`.
    pub async fn get_country(&self, id: i32) -> AppResult<Country> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("country", "id", id))
    }

    pub async fn get_country_by_iso_code(&self, code: &str) -> AppResult<Country> {
        self.repo
            .find_by_iso_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("country", "iso_code", code))
    }

    pub async fn create_country(&self, new_country: NewCountry) -> AppResult<Country> {
        self.repo.create(new_country).await
    }

    pub async fn update_country(&self, id: i32, changes: UpdateCountry) -> AppResult<Country> {
        self.get_country(id).await?;
        self.repo.update(id, changes).await
    }

    pub async fn delete_country(&self, id: i32) -> AppResult<()> {
        self.repo.delete(id).await
    }
}

#[derive(Clone)]
pub struct CityService {
    repo: CityRepository,
    countries: CountryRepository,
}

impl CityService {
    pub fn new(repo: CityRepository, countries: CountryRepository) -> Self {
        Self { repo, countries }
    }

    async fn ensure_country(&self, country_id: i32) -> AppResult<()> {
        if !self.countries.exists(country_id).await? {
            return Err(AppError::validation(
                "country_id",
                format!("Country {} does not exist", country_id),
            ));
        }
        Ok(())
    }

    pub async fn list_cities(
        &self,
        filter: &CityFilter,
        sort: CitySortKey,
        page: PageRequest,
    ) -> AppResult<Page<City>> {
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_city(&self, id: i32) -> AppResult<City> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("city", "id", id))
    }

    pub async fn create_city(&self, new_city: NewCity) -> AppResult<City> {
        self.ensure_country(new_city.country_id).await?;
        self.repo.create(new_city).await
    }

    pub async fn update_city(&self, id: i32, changes: UpdateCity) -> AppResult<City> {
        self.get_city(id).await?;
        if let Some(country_id) = changes.country_id {
            self.ensure_country(country_id).await?;
        }
        self.repo.update(id, changes).await
    }

    pub async fn delete_city(&self, id: i32) -> AppResult<()> {
        self.repo.delete(id).await
    }
}

#[derive(Clone)]
pub struct AddressService {
    repo: AddressRepository,
    cities: CityRepository,
}

impl AddressService {
    pub fn new(repo: AddressRepository, cities: CityRepository) -> Self {
        Self { repo, cities }
    }

    async fn ensure_city(&self, city_id: i32) -> AppResult<()> {
        if !self.cities.exists(city_id).await? {
            return Err(AppError::validation(
                "city_id",
                format!("City {} does not exist", city_id),
            ));
        }
        Ok(())
    }

    pub async fn list_addresses(
        &self,
        filter: &AddressFilter,
        sort: AddressSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Address>> {
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_address(&self, id: Uuid) -> AppResult<Address> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("address", "id", id))
    }

    pub async fn create_address(&self, new_address: NewAddress) -> AppResult<Address> {
        self.ensure_city(new_address.city_id).await?;
        self.repo.create(new_address).await
    }

    pub async fn update_address(&self, id: Uuid, changes: UpdateAddress) -> AppResult<Address> {
        self.get_address(id).await?;
        if let Some(city_id) = changes.city_id {
            self.ensure_city(city_id).await?;
        }
        self.repo.update(id, changes).await
    }

    pub async fn delete_address(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await
    }
}
