//! Shopping carts and their lines.
//!
//! A customer owns at most one cart (unique `customer_id`), and a cart holds
//! at most one line per product (unique `(cart_id, product_id)`).

use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewShoppingCart, NewShoppingCartItem, ShoppingCart, ShoppingCartItem};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, ensure_uuid, order_by, sort_keys,
};
use crate::schema::{shopping_cart_items, shopping_carts};

sort_keys! {
    pub enum ShoppingCartSortKey {
        #[default]
        Id => "id",
        CreatedDate => "created_date",
        UpdatedDate => "updated_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShoppingCartFilter {
    pub customer_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ShoppingCartRepository {
    db: QueryExecutor,
}

impl ShoppingCartRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &ShoppingCartFilter) -> shopping_carts::BoxedQuery<'static, Pg> {
        let mut query = shopping_carts::table.into_boxed();
        if let Some(customer) = filter.customer_id {
            query = query.filter(shopping_carts::customer_id.eq(customer));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &ShoppingCartFilter,
        sort: ShoppingCartSortKey,
        page: PageRequest,
    ) -> AppResult<Page<ShoppingCart>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    ShoppingCartSortKey::Id => {
                        order_by!(query, page.direction, shopping_carts::id, shopping_carts::id)
                    }
                    ShoppingCartSortKey::CreatedDate => order_by!(
                        query,
                        page.direction,
                        shopping_carts::created_date,
                        shopping_carts::id
                    ),
                    ShoppingCartSortKey::UpdatedDate => order_by!(
                        query,
                        page.direction,
                        shopping_carts::updated_date,
                        shopping_carts::id
                    ),
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(ShoppingCart::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list shopping carts", page_query).await
    }

    pub async fn find_by_id(&self, cart_id: Uuid) -> AppResult<Option<ShoppingCart>> {
        ensure_uuid("shopping cart", cart_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find shopping cart", async {
                shopping_carts::table
                    .find(cart_id)
                    .select(ShoppingCart::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn find_by_customer(&self, customer_id: Uuid) -> AppResult<Option<ShoppingCart>> {
        ensure_uuid("customer", customer_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find shopping cart by customer", async {
                shopping_carts::table
                    .filter(shopping_carts::customer_id.eq(customer_id))
                    .select(ShoppingCart::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    /// Returns the customer's cart, creating an empty one on first use.
    ///
    /// Concurrent first calls race on the unique `customer_id`; the loser's
    /// insert is a no-op and both read the same row back.
    pub async fn get_or_create_for_customer(&self, customer_id: Uuid) -> AppResult<ShoppingCart> {
        ensure_uuid("customer", customer_id)?;
        let mut conn = self.db.connection().await?;

        let new_cart = NewShoppingCart {
            id: Uuid::new_v4(),
            customer_id,
        };

        self.db
            .run(
                "insert shopping cart",
                diesel::insert_into(shopping_carts::table)
                    .values(&new_cart)
                    .on_conflict(shopping_carts::customer_id)
                    .do_nothing()
                    .execute(&mut conn),
            )
            .await?;

        self.db
            .run(
                "find shopping cart by customer",
                shopping_carts::table
                    .filter(shopping_carts::customer_id.eq(customer_id))
                    .select(ShoppingCart::as_select())
                    .first(&mut conn),
            )
            .await
    }

    /// Adds `amount` of a product to the cart. An existing line for the same
    /// product has its amount increased instead of a second line appearing.
    pub async fn add_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> AppResult<ShoppingCartItem> {
        ensure_uuid("shopping cart", cart_id)?;
        ensure_uuid("product", product_id)?;
        let mut conn = self.db.connection().await?;

        let new_item = NewShoppingCartItem {
            id: Uuid::new_v4(),
            cart_id,
            product_id,
            amount,
        };

        let item = self
            .db
            .run(
                "upsert shopping cart item",
                diesel::insert_into(shopping_cart_items::table)
                    .values(&new_item)
                    .on_conflict((shopping_cart_items::cart_id, shopping_cart_items::product_id))
                    .do_update()
                    .set((
                        shopping_cart_items::amount.eq(
                            shopping_cart_items::amount + excluded(shopping_cart_items::amount),
                        ),
                        shopping_cart_items::updated_date.eq(now),
                    ))
                    .returning(ShoppingCartItem::as_returning())
                    .get_result(&mut conn),
            )
            .await?;

        self.touch(&mut conn, cart_id).await?;
        Ok(item)
    }

    /// Replaces the amount of an existing line.
    pub async fn set_item_amount(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        amount: i32,
    ) -> AppResult<ShoppingCartItem> {
        ensure_uuid("shopping cart", cart_id)?;
        ensure_uuid("product", product_id)?;
        let mut conn = self.db.connection().await?;

        let item = self
            .db
            .run("update shopping cart item", async {
                diesel::update(
                    shopping_cart_items::table
                        .filter(shopping_cart_items::cart_id.eq(cart_id))
                        .filter(shopping_cart_items::product_id.eq(product_id)),
                )
                .set((
                    shopping_cart_items::amount.eq(amount),
                    shopping_cart_items::updated_date.eq(now),
                ))
                .returning(ShoppingCartItem::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("shopping cart item", "product_id", product_id))?;

        self.touch(&mut conn, cart_id).await?;
        Ok(item)
    }

    pub async fn remove_item(&self, cart_id: Uuid, product_id: Uuid) -> AppResult<()> {
        ensure_uuid("shopping cart", cart_id)?;
        ensure_uuid("product", product_id)?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete shopping cart item",
                diesel::delete(
                    shopping_cart_items::table
                        .filter(shopping_cart_items::cart_id.eq(cart_id))
                        .filter(shopping_cart_items::product_id.eq(product_id)),
                )
                .execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found(
                "shopping cart item",
                "product_id",
                product_id,
            ));
        }
        self.touch(&mut conn, cart_id).await
    }

    /// Removes every line; returns how many were removed.
    pub async fn clear(&self, cart_id: Uuid) -> AppResult<usize> {
        ensure_uuid("shopping cart", cart_id)?;
        let mut conn = self.db.connection().await?;

        let removed = self
            .db
            .run(
                "clear shopping cart",
                diesel::delete(
                    shopping_cart_items::table.filter(shopping_cart_items::cart_id.eq(cart_id)),
                )
                .execute(&mut conn),
            )
            .await?;

        self.touch(&mut conn, cart_id).await?;
        Ok(removed)
    }

    /// Lines of the cart in the order they were first added.
    pub async fn list_items(&self, cart_id: Uuid) -> AppResult<Vec<ShoppingCartItem>> {
        ensure_uuid("shopping cart", cart_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "list shopping cart items",
                shopping_cart_items::table
                    .filter(shopping_cart_items::cart_id.eq(cart_id))
                    .order((
                        shopping_cart_items::created_date.asc(),
                        shopping_cart_items::id.asc(),
                    ))
                    .select(ShoppingCartItem::as_select())
                    .load(&mut conn),
            )
            .await
    }

    /// Hard delete; the lines go with it (`ON DELETE CASCADE`).
    pub async fn delete(&self, cart_id: Uuid) -> AppResult<()> {
        ensure_uuid("shopping cart", cart_id)?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete shopping cart",
                diesel::delete(shopping_carts::table.find(cart_id)).execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("shopping cart", "id", cart_id));
        }
        Ok(())
    }

    pub async fn exists(&self, cart_id: Uuid) -> AppResult<bool> {
        ensure_uuid("shopping cart", cart_id)?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check shopping cart exists",
                diesel::select(diesel::dsl::exists(shopping_carts::table.find(cart_id)))
                    .get_result::<bool>(&mut conn),
            )
            .await
    }

    async fn touch(
        &self,
        conn: &mut diesel_async::AsyncPgConnection,
        cart_id: Uuid,
    ) -> AppResult<()> {
        self.db
            .run(
                "touch shopping cart",
                diesel::update(shopping_carts::table.find(cart_id))
                    .set(shopping_carts::updated_date.eq(now))
                    .execute(conn),
            )
            .await?;
        Ok(())
    }
}
