use crate::error::Result;
use crate::models::AssetType;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for asset type rows.
pub struct AssetTypeRepository {
    pool: PgPool,
}

impl AssetTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, asset: &AssetType) -> Result<AssetType> {
        let row = sqlx::query_as::<_, AssetType>(
            r#"
            INSERT INTO asset_types (id, name, symbol, description, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, symbol, description, is_active, created_at
            "#,
        )
        .bind(asset.id)
        .bind(&asset.name)
        .bind(&asset.symbol)
        .bind(&asset.description)
        .bind(asset.is_active)
        .bind(asset.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AssetType>> {
        let row = sqlx::query_as::<_, AssetType>(
            r#"
            SELECT id, name, symbol, description, is_active, created_at
            FROM asset_types
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_by_symbol(&self, symbol: &str) -> Result<Option<AssetType>> {
        let row = sqlx::query_as::<_, AssetType>(
            r#"
            SELECT id, name, symbol, description, is_active, created_at
            FROM asset_types
            WHERE symbol = $1
            "#,
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_active(&self) -> Result<Vec<AssetType>> {
        let rows = sqlx::query_as::<_, AssetType>(
            r#"
            SELECT id, name, symbol, description, is_active, created_at
            FROM asset_types
            WHERE is_active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
