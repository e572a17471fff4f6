use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{
        repo::IdentityStore,
        repo_types::{IdentityRecord, NewIdentity},
    },
    data::{DataClient, DataError, Order, RecipeQuery},
    profiles::{repo_types::Profile, services::default_username},
    recipes::repo_types::{NewRecipe, Recipe, RecipeWithAuthor},
};

const RECIPE_COLUMNS: &str = "r.id, r.user_id, r.name, r.image_url, r.ingredients, r.instructions, \
     r.cooking_time, r.category, r.created_at, r.updated_at";

/// Data client backed by the Postgres store.
#[derive(Clone)]
pub struct PgClient {
    pool: PgPool,
}

impl PgClient {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique / foreign-key / check violations to [`DataError::Constraint`].
fn map_db_error(e: sqlx::Error) -> DataError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation() {
            return DataError::Constraint(db.constraint().unwrap_or("unknown").to_string());
        }
    }
    DataError::Database(e)
}

/// Scopes the row-level policies of the current transaction to `caller`.
const SET_CALLER_SQL: &str = "SELECT set_config('app.user_id', $1, true)";

async fn act_as(tx: &mut Transaction<'_, Postgres>, caller: Uuid) -> Result<(), DataError> {
    sqlx::query(SET_CALLER_SQL)
        .bind(caller.to_string())
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

fn select_recipes_sql(query: &RecipeQuery) -> String {
    let mut sql = format!(
        "SELECT {RECIPE_COLUMNS}, p.username AS author_username \
         FROM recipes r LEFT JOIN profiles p ON p.user_id = r.user_id"
    );
    if query.owner.is_some() {
        sql.push_str(" WHERE r.user_id = $1");
    }
    sql.push_str(match query.order {
        Order::Asc => " ORDER BY r.created_at ASC",
        Order::Desc => " ORDER BY r.created_at DESC",
    });
    sql
}

#[async_trait]
impl DataClient for PgClient {
    async fn select_recipes(&self, query: RecipeQuery) -> Result<Vec<RecipeWithAuthor>, DataError> {
        let sql = select_recipes_sql(&query);
        let mut q = sqlx::query_as::<_, RecipeWithAuthor>(&sql);
        if let Some(owner) = query.owner {
            q = q.bind(owner);
        }
        let rows = q.fetch_all(&self.pool).await.map_err(map_db_error)?;
        debug!(count = rows.len(), owner = ?query.owner, "recipes selected");
        Ok(rows)
    }

    async fn insert_recipe(&self, caller: Uuid, recipe: NewRecipe) -> Result<Recipe, DataError> {
        // same rule as the recipes_insert_own policy
        if recipe.user_id != caller {
            return Err(DataError::Forbidden);
        }

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        act_as(&mut tx, caller).await?;

        let row = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes
                (user_id, name, image_url, ingredients, instructions, cooking_time, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, image_url, ingredients, instructions,
                      cooking_time, category, created_at, updated_at
            "#,
        )
        .bind(recipe.user_id)
        .bind(&recipe.name)
        .bind(&recipe.image_url)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.cooking_time)
        .bind(&recipe.category)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(row)
    }

    async fn delete_recipe(&self, caller: Uuid, recipe_id: Uuid) -> Result<u64, DataError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        act_as(&mut tx, caller).await?;

        let res = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(recipe_id)
            .bind(caller)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(res.rows_affected())
    }

    async fn profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, DataError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, username, avatar_url, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(profile)
    }
}

#[async_trait]
impl IdentityStore for PgClient {
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DataError> {
        let identity = sqlx::query_as::<_, IdentityRecord>(
            r#"
            SELECT id, email, password_hash, user_metadata, created_at
            FROM identities
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(identity)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<IdentityRecord>, DataError> {
        let identity = sqlx::query_as::<_, IdentityRecord>(
            r#"
            SELECT id, email, password_hash, user_metadata, created_at
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(identity)
    }

    async fn create_with_profile(
        &self,
        new: NewIdentity,
    ) -> Result<(IdentityRecord, Profile), DataError> {
        let username = default_username(&new.email, &new.metadata);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let identity = sqlx::query_as::<_, IdentityRecord>(
            r#"
            INSERT INTO identities (email, password_hash, user_metadata)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, user_metadata, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(sqlx::types::Json(&new.metadata))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, username)
            VALUES ($1, $2)
            RETURNING id, user_id, username, avatar_url, created_at, updated_at
            "#,
        )
        .bind(identity.id)
        .bind(&username)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok((identity, profile))
    }
}
