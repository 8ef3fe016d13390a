//! Delivery tariffs, orders and tracking.

use bigdecimal::BigDecimal;

use crate::error::{AppError, AppResult};
use crate::models::{
    DeliveryOrder, DeliveryTariff, DeliveryTracking, NewDeliveryTariff, UpdateDeliveryOrder,
    UpdateDeliveryTariff,
};
use crate::repositories::{
    AddressRepository, DeliveryOrderFilter, DeliveryOrderRepository, DeliveryOrderSortKey,
    DeliveryTariffFilter, DeliveryTariffRepository, DeliveryTariffSortKey,
    DeliveryTrackingRepository, Page, PageRequest, PlaceDeliveryOrder, StatusChange,
};

/// Rejects a delivery window that ends before it starts.
pub fn validate_day_range(min_days: i32, max_days: i32) -> AppResult<()> {
    if min_days < 0 {
        return Err(AppError::validation("min_days", "Must not be negative"));
    }
    if max_days < min_days {
        return Err(AppError::validation(
            "max_days",
            format!("max_days ({}) is below min_days ({})", max_days, min_days),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct DeliveryTariffService {
    repo: DeliveryTariffRepository,
}

impl DeliveryTariffService {
    pub fn new(repo: DeliveryTariffRepository) -> Self {
        Self { repo }
    }

    pub async fn list_tariffs(
        &self,
        filter: &DeliveryTariffFilter,
        sort: DeliveryTariffSortKey,
        page: PageRequest,
    ) -> AppResult<Page<DeliveryTariff>> {
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_tariff(&self, id: i32) -> AppResult<DeliveryTariff> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("delivery tariff", "id", id))
    }

    pub async fn create_tariff(&self, new_tariff: NewDeliveryTariff) -> AppResult<DeliveryTariff> {
        validate_day_range(new_tariff.min_days, new_tariff.max_days)?;
        self.repo.create(new_tariff).await
    }

    pub async fn update_tariff(
        &self,
        id: i32,
        changes: UpdateDeliveryTariff,
    ) -> AppResult<DeliveryTariff> {
        let current = self.get_tariff(id).await?;
        validate_day_range(
            changes.min_days.unwrap_or(current.min_days),
            changes.max_days.unwrap_or(current.max_days),
        )?;
        self.repo.update(id, changes).await
    }

    pub async fn delete_tariff(&self, id: i32) -> AppResult<()> {
        self.repo.delete(id).await
    }

    pub async fn quote(&self, id: i32, weight_kg: &BigDecimal) -> AppResult<BigDecimal> {
        self.repo.quote(id, weight_kg).await
    }
}

#[derive(Clone)]
pub struct DeliveryOrderService {
    repo: DeliveryOrderRepository,
    tracking: DeliveryTrackingRepository,
    addresses: AddressRepository,
}

impl DeliveryOrderService {
    pub fn new(
        repo: DeliveryOrderRepository,
        tracking: DeliveryTrackingRepository,
        addresses: AddressRepository,
    ) -> Self {
        Self {
            repo,
            tracking,
            addresses,
        }
    }

    async fn ensure_address(&self, address_id: uuid::Uuid) -> AppResult<()> {
        if !self.addresses.exists(address_id).await? {
            return Err(AppError::validation(
                "address_id",
                format!("Address {} does not exist", address_id),
            ));
        }
        Ok(())
    }

    pub async fn list_orders(
        &self,
        filter: &DeliveryOrderFilter,
        sort: DeliveryOrderSortKey,
        page: PageRequest,
    ) -> AppResult<Page<DeliveryOrder>> {
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_order(&self, id: i64) -> AppResult<DeliveryOrder> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("delivery order", "id", id))
    }

    pub async fn place_order(&self, order: PlaceDeliveryOrder) -> AppResult<DeliveryOrder> {
        self.ensure_address(order.address_id).await?;
        let created = self.repo.create(order).await?;
        tracing::info!(
            order_id = created.id,
            tariff_id = created.tariff_id,
            total_price = %created.total_price,
            "Delivery order placed"
        );
        Ok(created)
    }

    pub async fn change_status(&self, id: i64, change: StatusChange) -> AppResult<DeliveryOrder> {
        let updated = self.repo.change_status(id, change).await?;
        tracing::info!(order_id = id, status = %updated.status, "Delivery status changed");
        Ok(updated)
    }

    pub async fn update_order(
        &self,
        id: i64,
        changes: UpdateDeliveryOrder,
    ) -> AppResult<DeliveryOrder> {
        let current = self.get_order(id).await?;
        if current.status.is_terminal() {
            return Err(AppError::unprocessable(format!(
                "Delivery order {} is {} and can no longer be changed",
                id, current.status
            )));
        }
        if let Some(address_id) = changes.address_id {
            self.ensure_address(address_id).await?;
        }
        self.repo.update(id, changes).await
    }

    pub async fn delete_order(&self, id: i64) -> AppResult<()> {
        self.repo.delete(id).await
    }

    /// Tracking history of an existing order.
    pub async fn tracking(&self, id: i64, page: PageRequest) -> AppResult<Page<DeliveryTracking>> {
        self.get_order(id).await?;
        self.tracking.list_for_order(id, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_range_accepts_same_day() {
        assert!(validate_day_range(0, 0).is_ok());
        assert!(validate_day_range(2, 5).is_ok());
    }

    #[test]
    fn test_day_range_rejects_inverted_window() {
        match validate_day_range(5, 2) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "max_days"),
            other => panic!("Expected max_days validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_day_range_rejects_negative_minimum() {
        match validate_day_range(-1, 2) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "min_days"),
            other => panic!("Expected min_days validation error, got {:?}", other),
        }
    }
}
