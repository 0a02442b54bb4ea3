// SQLite ProfileRepository Implementation

use crate::error::map_sqlx_error;
use accelerate_core::domain::{Profile, Role};
use accelerate_core::error::Result;
use accelerate_core::port::ProfileRepository;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepository {
    async fn upsert(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (
                id, full_name, email, phone, avatar_url, role,
                organization, designation, geography, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                email = excluded.email,
                phone = excluded.phone,
                avatar_url = excluded.avatar_url,
                role = excluded.role,
                organization = excluded.organization,
                designation = excluded.designation,
                geography = excluded.geography,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.avatar_url)
        .bind(profile.role.as_str())
        .bind(&profile.organization)
        .bind(&profile.designation)
        .bind(&profile.geography)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_profile()).transpose()
    }

    async fn find_first_by_role(&self, role: Role) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM profiles WHERE role = ? ORDER BY created_at ASC, rowid ASC LIMIT 1",
        )
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|r| r.into_profile()).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles ORDER BY created_at ASC, rowid ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_profile()).collect()
    }

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM profiles GROUP BY role ORDER BY role")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(role, n)| Ok((role.parse::<Role>()?, n)))
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    full_name: String,
    email: String,
    phone: Option<String>,
    avatar_url: Option<String>,
    role: String,
    organization: Option<String>,
    designation: Option<String>,
    geography: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile> {
        Ok(Profile {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            avatar_url: self.avatar_url,
            role: self.role.parse()?,
            organization: self.organization,
            designation: self.designation,
            geography: self.geography,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
