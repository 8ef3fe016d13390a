use diesel::dsl::now;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::error::{AppError, AppResult};
use crate::models::{Category, NewCategory, UpdateCategory, normalize_name};
use crate::repositories::query::{
    Page, PageRequest, QueryExecutor, contains_pattern, ensure_positive, order_by, sort_keys,
};
use crate::schema::categories;

sort_keys! {
    pub enum CategorySortKey {
        #[default]
        Id => "id",
        Name => "name",
        ParentId => "parent_id",
        CreatedDate => "created_date",
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub parent_id: Option<i32>,
    /// Only top-level categories (no parent)
    pub root_only: bool,
    pub name: Option<String>,
    pub is_deleted: Option<bool>,
}

/// `parent_id` itself and every ancestor above it. `UNION` stops on rows
/// already visited.
const LINEAGE_SQL: &str = "\
WITH RECURSIVE lineage(id, parent_id) AS (
    SELECT id, parent_id FROM categories WHERE id = $1
    UNION
    SELECT c.id, c.parent_id FROM categories c JOIN lineage l ON c.id = l.parent_id
)
SELECT id FROM lineage";

#[derive(QueryableByName)]
struct LineageRow {
    #[diesel(sql_type = Integer)]
    id: i32,
}

/// Rejects a parent that is the category itself or one of its descendants.
///
/// `lineage` is the new parent followed by its ancestors.
pub fn check_new_parent(category_id: i32, parent_id: i32, lineage: &[i32]) -> AppResult<()> {
    if parent_id == category_id {
        return Err(AppError::validation(
            "parent_id",
            "A category cannot be its own parent",
        ));
    }
    if lineage.contains(&category_id) {
        return Err(AppError::validation(
            "parent_id",
            format!(
                "Category {} is a descendant of category {}",
                parent_id, category_id
            ),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CategoryRepository {
    db: QueryExecutor,
}

impl CategoryRepository {
    pub fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    fn filtered(filter: &CategoryFilter) -> categories::BoxedQuery<'static, Pg> {
        let mut query = categories::table
            .filter(categories::is_deleted.eq(filter.is_deleted.unwrap_or(false)))
            .into_boxed();
        if let Some(parent) = filter.parent_id {
            query = query.filter(categories::parent_id.eq(parent));
        } else if filter.root_only {
            query = query.filter(categories::parent_id.is_null());
        }
        if let Some(name) = &filter.name {
            query = query.filter(categories::name.ilike(contains_pattern(name)));
        }
        query
    }

    pub async fn list(
        &self,
        filter: &CategoryFilter,
        sort: CategorySortKey,
        page: PageRequest,
    ) -> AppResult<Page<Category>> {
        let mut conn = self.db.connection().await?;
        let mut snapshot = conn.build_transaction().read_only().repeatable_read();
        let page_query = snapshot.run(|conn| {
            async move {
                let total = Self::filtered(filter).count().get_result::<i64>(conn).await?;

                let query = Self::filtered(filter);
                let query = match sort {
                    CategorySortKey::Id => {
                        order_by!(query, page.direction, categories::id, categories::id)
                    }
                    CategorySortKey::Name => {
                        order_by!(query, page.direction, categories::name, categories::id)
                    }
                    CategorySortKey::ParentId => {
                        order_by!(query, page.direction, categories::parent_id, categories::id)
                    }
                    CategorySortKey::CreatedDate => {
                        order_by!(query, page.direction, categories::created_date, categories::id)
                    }
                };

                let items = query
                    .offset(page.offset())
                    .limit(page.limit())
                    .select(Category::as_select())
                    .load(conn)
                    .await?;

                Ok::<_, diesel::result::Error>(Page { items, total })
            }
            .scope_boxed()
        });

        self.db.run("list categories", page_query).await
    }

    /// Direct, live children of `parent_id` ordered by name.
    pub async fn list_children(&self, parent_id: i32) -> AppResult<Vec<Category>> {
        ensure_positive("category", "parent_id", parent_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "list child categories",
                categories::table
                    .filter(categories::parent_id.eq(parent_id))
                    .filter(categories::is_deleted.eq(false))
                    .order((categories::name.asc(), categories::id.asc()))
                    .select(Category::as_select())
                    .load(&mut conn),
            )
            .await
    }

    pub async fn find_by_id(&self, category_id: i32) -> AppResult<Option<Category>> {
        ensure_positive("category", "id", category_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run("find category", async {
                categories::table
                    .find(category_id)
                    .filter(categories::is_deleted.eq(false))
                    .select(Category::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
            })
            .await
    }

    pub async fn create(&self, new_category: NewCategory) -> AppResult<Category> {
        let new_category = NewCategory {
            normalized_name: normalize_name(&new_category.name),
            ..new_category
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "insert category",
                diesel::insert_into(categories::table)
                    .values(&new_category)
                    .returning(Category::as_returning())
                    .get_result(&mut conn),
            )
            .await
    }

    pub async fn update(&self, category_id: i32, changes: UpdateCategory) -> AppResult<Category> {
        ensure_positive("category", "id", category_id.into())?;
        if let Some(parent_id) = changes.parent_id {
            check_new_parent(category_id, parent_id, &[])?;
            let lineage = self.lineage(parent_id).await?;
            check_new_parent(category_id, parent_id, &lineage)?;
        }
        let changes = UpdateCategory {
            normalized_name: changes.name.as_deref().map(normalize_name),
            ..changes
        };
        let mut conn = self.db.connection().await?;

        self.db
            .run("update category", async {
                diesel::update(
                    categories::table
                        .find(category_id)
                        .filter(categories::is_deleted.eq(false)),
                )
                .set((&changes, categories::updated_date.eq(now)))
                .returning(Category::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
            })
            .await?
            .ok_or_else(|| AppError::not_found("category", "id", category_id))
    }

    /// Ids of `category_id` and all of its ancestors, nearest first.
    pub async fn lineage(&self, category_id: i32) -> AppResult<Vec<i32>> {
        ensure_positive("category", "id", category_id.into())?;
        let mut conn = self.db.connection().await?;

        let rows = self
            .db
            .run(
                "load category lineage",
                diesel::sql_query(LINEAGE_SQL)
                    .bind::<Integer, _>(category_id)
                    .load::<LineageRow>(&mut conn),
            )
            .await?;

        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    pub async fn delete(&self, category_id: i32) -> AppResult<()> {
        ensure_positive("category", "id", category_id.into())?;
        let mut conn = self.db.connection().await?;

        let affected = self
            .db
            .run(
                "delete category",
                diesel::update(
                    categories::table
                        .find(category_id)
                        .filter(categories::is_deleted.eq(false)),
                )
                .set((
                    categories::is_deleted.eq(true),
                    categories::deleted_date.eq(now),
                ))
                .execute(&mut conn),
            )
            .await?;

        if affected == 0 {
            return Err(AppError::not_found("category", "id", category_id));
        }
        Ok(())
    }

    pub async fn exists(&self, category_id: i32) -> AppResult<bool> {
        ensure_positive("category", "id", category_id.into())?;
        let mut conn = self.db.connection().await?;

        self.db
            .run(
                "check category exists",
                diesel::select(diesel::dsl::exists(
                    categories::table
                        .find(category_id)
                        .filter(categories::is_deleted.eq(false)),
                ))
                .get_result::<bool>(&mut conn),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(result: AppResult<()>) -> String {
        match result {
            Err(AppError::Validation { field, .. }) => field,
            other => panic!("Expected parent_id validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_category_cannot_be_its_own_parent() {
        assert_eq!(rejected_field(check_new_parent(4, 4, &[])), "parent_id");
    }

    #[test]
    fn test_descendant_cannot_become_parent() {
        // 1 -> 2 -> 3: moving 1 under 3 would close the loop.
        let lineage_of_3 = [3, 2, 1];
        assert_eq!(
            rejected_field(check_new_parent(1, 3, &lineage_of_3)),
            "parent_id"
        );
    }

    #[test]
    fn test_unrelated_parent_is_accepted() {
        assert!(check_new_parent(1, 7, &[7, 5]).is_ok());
        assert!(check_new_parent(2, 1, &[1]).is_ok());
    }
}
