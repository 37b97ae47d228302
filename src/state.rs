use std::sync::Arc;

use crate::{
    auth::jwt::JwtKeys,
    cars::repo::{CarStore, PgCarStore},
    config::AppConfig,
    db,
    notify::{HttpNotifier, Notifier},
    users::repo::{PgUserStore, UserStore},
};

/// Everything a request needs, built once at startup and injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub jwt: Arc<JwtKeys>,
    pub users: Arc<dyn UserStore>,
    pub cars: Arc<dyn CarStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await?;

        let notifier = Arc::new(HttpNotifier::new(&config.notify)?) as Arc<dyn Notifier>;
        Ok(Self::from_parts(
            JwtKeys::from_config(&config.jwt),
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgCarStore::new(pool)),
            notifier,
        ))
    }

    pub fn from_parts(
        jwt: JwtKeys,
        users: Arc<dyn UserStore>,
        cars: Arc<dyn CarStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            jwt: Arc::new(jwt),
            users,
            cars,
            notifier,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_notifier(Arc::new(crate::testing::RecordingNotifier::default()))
    }

    #[cfg(test)]
    pub fn fake_with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        use crate::testing::{MemoryCarStore, MemoryUserStore};

        let jwt = JwtKeys::from_config(&crate::config::JwtConfig {
            secret: "test-secret".into(),
            algorithm: jsonwebtoken::Algorithm::HS256,
            ttl_minutes: 5,
        });
        let cars = Arc::new(MemoryCarStore::default());
        Self::from_parts(
            jwt,
            Arc::new(MemoryUserStore::with_cars(cars.clone())),
            cars,
            notifier,
        )
    }
}
