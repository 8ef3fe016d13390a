//! Sellers, categories, products and product variants.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Category, NewCategory, NewProduct, NewProductVariant, NewSeller, Product, ProductVariant,
    Seller, UpdateCategory, UpdateProduct, UpdateProductVariant, UpdateSeller,
};
use crate::repositories::{
    CategoryFilter, CategoryRepository, CategorySortKey, Page, PageRequest, ProductFilter,
    ProductRepository, ProductSortKey, ProductVariantFilter, ProductVariantRepository,
    ProductVariantSortKey, SellerFilter, SellerRepository, SellerSortKey,
};

#[derive(Clone)]
pub struct SellerService {
    repo: SellerRepository,
}

impl SellerService {
    pub fn new(repo: SellerRepository) -> Self {
        Self { repo }
    }

    pub async fn list_sellers(
        &self,
        filter: &SellerFilter,
        sort: SellerSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Seller>> {
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_seller(&self, id: Uuid) -> AppResult<Seller> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("seller", "id", id))
    }

    /// Looks a seller up by display name, ignoring case and surrounding blanks.
    pub async fn get_seller_by_name(&self, name: &str) -> AppResult<Seller> {
        self.repo
            .find_by_normalized_name(name)
            .await?
            .ok_or_else(|| AppError::not_found("seller", "name", name.trim()))
    }

    pub async fn create_seller(&self, new_seller: NewSeller) -> AppResult<Seller> {
        self.repo.create(new_seller).await
    }

    pub async fn update_seller(&self, id: Uuid, changes: UpdateSeller) -> AppResult<Seller> {
        self.get_seller(id).await?;
        self.repo.update(id, changes).await
    }

    pub async fn delete_seller(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await
    }
}

#[derive(Clone)]
pub struct CategoryService {
    repo: CategoryRepository,
}

impl CategoryService {
    pub fn new(repo: CategoryRepository) -> Self {
        Self { repo }
    }

    async fn ensure_parent(&self, parent_id: i32) -> AppResult<()> {
        if !self.repo.exists(parent_id).await? {
            return Err(AppError::validation(
                "parent_id",
                format!("Category {} does not exist", parent_id),
            ));
        }
        Ok(())
    }

    pub async fn list_categories(
        &self,
        filter: &CategoryFilter,
        sort: CategorySortKey,
        page: PageRequest,
    ) -> AppResult<Page<Category>> {
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_category(&self, id: i32) -> AppResult<Category> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("category", "id", id))
    }

    pub async fn list_children(&self, id: i32) -> AppResult<Vec<Category>> {
        self.get_category(id).await?;
        self.repo.list_children(id).await
    }

    pub async fn create_category(&self, new_category: NewCategory) -> AppResult<Category> {
        if let Some(parent_id) = new_category.parent_id {
            self.ensure_parent(parent_id).await?;
        }
        self.repo.create(new_category).await
    }

    pub async fn update_category(&self, id: i32, changes: UpdateCategory) -> AppResult<Category> {
        self.get_category(id).await?;
        if let Some(parent_id) = changes.parent_id {
            self.ensure_parent(parent_id).await?;
        }
        self.repo.update(id, changes).await
    }

    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        self.repo.delete(id).await
    }
}

#[derive(Clone)]
pub struct ProductService {
    repo: ProductRepository,
    sellers: SellerRepository,
    categories: CategoryRepository,
}

impl ProductService {
    pub fn new(
        repo: ProductRepository,
        sellers: SellerRepository,
        categories: CategoryRepository,
    ) -> Self {
        Self {
            repo,
            sellers,
            categories,
        }
    }

    async fn ensure_category(&self, category_id: i32) -> AppResult<()> {
        if !self.categories.exists(category_id).await? {
            return Err(AppError::validation(
                "category_id",
                format!("Category {} does not exist", category_id),
            ));
        }
        Ok(())
    }

    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        sort: ProductSortKey,
        page: PageRequest,
    ) -> AppResult<Page<Product>> {
        if let (Some(min), Some(max)) = (&filter.min_price, &filter.max_price) {
            if min > max {
                return Err(AppError::validation(
                    "min_price",
                    "min_price must not exceed max_price",
                ));
            }
        }
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("product", "id", id))
    }

    pub async fn create_product(&self, new_product: NewProduct) -> AppResult<Product> {
        if !self.sellers.exists(new_product.seller_id).await? {
            return Err(AppError::validation(
                "seller_id",
                format!("Seller {} does not exist", new_product.seller_id),
            ));
        }
        self.ensure_category(new_product.category_id).await?;
        self.repo.create(new_product).await
    }

    pub async fn update_product(&self, id: Uuid, changes: UpdateProduct) -> AppResult<Product> {
        self.get_product(id).await?;
        if let Some(category_id) = changes.category_id {
            self.ensure_category(category_id).await?;
        }
        self.repo.update(id, changes).await
    }

    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await
    }
}

#[derive(Clone)]
pub struct ProductVariantService {
    repo: ProductVariantRepository,
    products: ProductRepository,
}

impl ProductVariantService {
    pub fn new(repo: ProductVariantRepository, products: ProductRepository) -> Self {
        Self { repo, products }
    }

    pub async fn list_variants(
        &self,
        filter: &ProductVariantFilter,
        sort: ProductVariantSortKey,
        page: PageRequest,
    ) -> AppResult<Page<ProductVariant>> {
        self.repo.list(filter, sort, page).await
    }

    pub async fn get_variant(&self, id: Uuid) -> AppResult<ProductVariant> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("product variant", "id", id))
    }

    pub async fn get_variant_by_sku(&self, sku: &str) -> AppResult<ProductVariant> {
        self.repo
            .find_by_sku(sku)
            .await?
            .ok_or_else(|| AppError::not_found("product variant", "sku", sku))
    }

    pub async fn create_variant(
        &self,
        new_variant: NewProductVariant,
    ) -> AppResult<ProductVariant> {
        if !self.products.exists(new_variant.product_id).await? {
            return Err(AppError::validation(
                "product_id",
                format!("Product {} does not exist", new_variant.product_id),
            ));
        }
        self.repo.create(new_variant).await
    }

    pub async fn update_variant(
        &self,
        id: Uuid,
        changes: UpdateProductVariant,
    ) -> AppResult<ProductVariant> {
        self.get_variant(id).await?;
        self.repo.update(id, changes).await
    }

    /// Adds `delta` (negative to withdraw) to the stock of a variant.
    pub async fn adjust_stock(&self, id: Uuid, delta: i32) -> AppResult<ProductVariant> {
        if delta == 0 {
            return Err(AppError::validation("delta", "Stock change must not be zero"));
        }
        self.repo.adjust_stock(id, delta).await
    }

    pub async fn delete_variant(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await
    }
}
