use sqlx::PgPool;
use tracing::info;

use crate::auth::password::hash_password;
use crate::config::AdminConfig;
use crate::users::repo_types::{Role, User};

/// Ensure exactly one administrator account exists for the configured
/// email, creating it or overwriting its password hash and role. Runs at
/// startup and is idempotent; the plaintext password is never stored.
pub async fn ensure_admin(db: &PgPool, admin: &AdminConfig) -> anyhow::Result<()> {
    let hash = hash_password(&admin.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, name, password_hash, role)
        VALUES ($1, 'Admin', $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET password_hash = EXCLUDED.password_hash,
            role = EXCLUDED.role,
            updated_at = now()
        RETURNING id, email, name, password_hash, role, created_at, updated_at
        "#,
    )
    .bind(admin.email.trim().to_lowercase())
    .bind(&hash)
    .bind(Role::Admin)
    .fetch_one(db)
    .await?;

    info!(user_id = %user.id, email = %user.email, "admin user created/updated");
    Ok(())
}
