//! PostgreSQL settings store.
//!
//! Schema is created on connect if missing. Upserts refresh
//! `updated_at`; each operation is a single statement.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use crate::config::PostgresConfig;

use super::{ClientLimit, Storage, StorageError};

/// Settings store backed by a `rate_limits` table.
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Connect and initialize the schema. Any failure here is a fatal
    /// startup error for the caller.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, StorageError> {
        let ssl_mode = parse_ssl_mode(&config.sslmode)?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.dbname)
            .ssl_mode(ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(25)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rate_limits (
                client_id VARCHAR(255) PRIMARY KEY,
                capacity INTEGER NOT NULL,
                refill_rate FLOAT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn parse_ssl_mode(sslmode: &str) -> Result<PgSslMode, StorageError> {
    match sslmode {
        "disable" => Ok(PgSslMode::Disable),
        "allow" => Ok(PgSslMode::Allow),
        "prefer" => Ok(PgSslMode::Prefer),
        "require" => Ok(PgSslMode::Require),
        "verify-ca" => Ok(PgSslMode::VerifyCa),
        "verify-full" => Ok(PgSslMode::VerifyFull),
        other => Err(StorageError::Config(format!("unknown sslmode: {other}"))),
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn save(
        &self,
        client_id: &str,
        capacity: u32,
        refill_rate: f64,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO rate_limits (client_id, capacity, refill_rate, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (client_id)
            DO UPDATE SET
                capacity = EXCLUDED.capacity,
                refill_rate = EXCLUDED.refill_rate,
                updated_at = NOW()
            "#,
        )
        .bind(client_id)
        .bind(capacity as i32)
        .bind(refill_rate)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, client_id: &str) -> Result<Option<ClientLimit>, StorageError> {
        let row: Option<(i32, f64)> = sqlx::query_as(
            "SELECT capacity, refill_rate FROM rate_limits WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(capacity, refill_rate)| ClientLimit {
            capacity: capacity as u32,
            refill_rate,
        }))
    }

    async fn load_all(&self) -> Result<HashMap<String, ClientLimit>, StorageError> {
        let rows: Vec<(String, i32, f64)> =
            sqlx::query_as("SELECT client_id, capacity, refill_rate FROM rate_limits")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(client_id, capacity, refill_rate)| {
                (
                    client_id,
                    ClientLimit {
                        capacity: capacity as u32,
                        refill_rate,
                    },
                )
            })
            .collect())
    }

    async fn delete(&self, client_id: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM rate_limits WHERE client_id = $1")
            .bind(client_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_ssl_modes() {
        assert!(matches!(parse_ssl_mode("disable"), Ok(PgSslMode::Disable)));
        assert!(matches!(parse_ssl_mode("require"), Ok(PgSslMode::Require)));
        assert!(matches!(
            parse_ssl_mode("verify-full"),
            Ok(PgSslMode::VerifyFull)
        ));
    }

    #[test]
    fn rejects_unknown_ssl_mode() {
        assert!(matches!(
            parse_ssl_mode("mystery"),
            Err(StorageError::Config(_))
        ));
    }
}
