use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Car;
use crate::error::{AppError, Result};

/// Plates passed in are already normalized.
#[async_trait]
pub trait CarStore: Send + Sync {
    /// A plate already on file is `DuplicateConflict`; an unknown owner is `NotFound`.
    async fn insert(&self, car: &Car) -> Result<Car>;
    async fn find(&self, plate: &str) -> Result<Option<Car>>;
    async fn list(&self) -> Result<Vec<Car>>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Car>>;
    /// Writes status and timestamp together.
    async fn set_status(
        &self,
        plate: &str,
        status: bool,
        activated_at: Option<OffsetDateTime>,
    ) -> Result<Option<Car>>;
    async fn delete(&self, plate: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgCarStore {
    db: PgPool,
}

impl PgCarStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CarStore for PgCarStore {
    async fn insert(&self, car: &Car) -> Result<Car> {
        sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (plate_number, user_id, car_status, activated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING plate_number, user_id, car_status, activated_at
            "#,
        )
        .bind(&car.plate_number)
        .bind(car.user_id)
        .bind(car.car_status)
        .bind(car.activated_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "plate number"))
    }

    async fn find(&self, plate: &str) -> Result<Option<Car>> {
        sqlx::query_as::<_, Car>(
            r#"
            SELECT plate_number, user_id, car_status, activated_at
            FROM cars
            WHERE plate_number = $1
            "#,
        )
        .bind(plate)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "car"))
    }

    async fn list(&self) -> Result<Vec<Car>> {
        sqlx::query_as::<_, Car>(
            r#"SELECT plate_number, user_id, car_status, activated_at FROM cars"#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "cars"))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Car>> {
        sqlx::query_as::<_, Car>(
            r#"
            SELECT plate_number, user_id, car_status, activated_at
            FROM cars
            WHERE user_id = $1
            ORDER BY plate_number
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "cars"))
    }

    async fn set_status(
        &self,
        plate: &str,
        status: bool,
        activated_at: Option<OffsetDateTime>,
    ) -> Result<Option<Car>> {
        sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
               SET car_status = $2,
                   activated_at = $3
             WHERE plate_number = $1
            RETURNING plate_number, user_id, car_status, activated_at
            "#,
        )
        .bind(plate)
        .bind(status)
        .bind(activated_at)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_db(e, "car"))
    }

    async fn delete(&self, plate: &str) -> Result<bool> {
        let res = sqlx::query(r#"DELETE FROM cars WHERE plate_number = $1"#)
            .bind(plate)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::from_db(e, "car"))?;
        Ok(res.rows_affected() > 0)
    }
}
