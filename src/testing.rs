//! In-memory stores, a recording notifier and request helpers for unit tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    app::build_app,
    auth::services::session_for,
    cars::{repo::CarStore, repo_types::Car},
    error::{AppError, Result},
    notify::{CallId, DeliveryError, Notifier},
    state::AppState,
    users::{
        repo::UserStore,
        repo_types::{ProfileUpdate, User},
    },
};

/// Deleting a user drops their cars too, like the `ON DELETE CASCADE` foreign key.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<HashMap<Uuid, User>>,
    cars: Arc<MemoryCarStore>,
}

impl MemoryUserStore {
    pub fn with_cars(cars: Arc<MemoryCarStore>) -> Self {
        Self {
            rows: Mutex::default(),
            cars,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, email: &str, hashed_password: &str) -> Result<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|u| u.email == email) {
            return Err(AppError::DuplicateConflict("email".into()));
        }
        let user = User {
            user_id: Uuid::new_v4(),
            email: email.into(),
            hashed_password: hashed_password.into(),
            pin_number: None,
            phone_number: None,
        };
        rows.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Option<User>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(user) = rows.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(pin) = &update.pin_number {
            user.pin_number = Some(pin.clone());
        }
        if let Some(phone) = &update.phone_number {
            user.phone_number = Some(phone.clone());
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool> {
        let removed = self.rows.lock().unwrap().remove(&user_id).is_some();
        if removed {
            self.cars.remove_owned_by(user_id);
        }
        Ok(removed)
    }
}

#[derive(Default)]
pub struct MemoryCarStore {
    rows: Mutex<HashMap<String, Car>>,
}

impl MemoryCarStore {
    fn remove_owned_by(&self, user_id: Uuid) {
        self.rows.lock().unwrap().retain(|_, c| c.user_id != user_id);
    }
}

#[async_trait]
impl CarStore for MemoryCarStore {
    async fn insert(&self, car: &Car) -> Result<Car> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&car.plate_number) {
            return Err(AppError::DuplicateConflict("plate number".into()));
        }
        rows.insert(car.plate_number.clone(), car.clone());
        Ok(car.clone())
    }

    async fn find(&self, plate: &str) -> Result<Option<Car>> {
        Ok(self.rows.lock().unwrap().get(plate).cloned())
    }

    async fn list(&self) -> Result<Vec<Car>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Car>> {
        let mut cars: Vec<Car> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        cars.sort_by(|a, b| a.plate_number.cmp(&b.plate_number));
        Ok(cars)
    }

    async fn set_status(
        &self,
        plate: &str,
        status: bool,
        activated_at: Option<OffsetDateTime>,
    ) -> Result<Option<Car>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(car) = rows.get_mut(plate) else {
            return Ok(None);
        };
        car.car_status = status;
        car.activated_at = activated_at;
        Ok(Some(car.clone()))
    }

    async fn delete(&self, plate: &str) -> Result<bool> {
        Ok(self.rows.lock().unwrap().remove(plate).is_some())
    }
}

/// Records every dispatch attempt; optionally fails all of them.
#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    messages: Mutex<Vec<(String, String)>>,
    calls: Mutex<Vec<(String, String)>>,
    next_call: AtomicUsize,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_owner(
        &self,
        phone_number: &str,
        message: &str,
    ) -> std::result::Result<(), DeliveryError> {
        self.messages
            .lock()
            .unwrap()
            .push((phone_number.into(), message.into()));
        if self.fail {
            return Err(DeliveryError::Unreachable("provider down".into()));
        }
        Ok(())
    }

    async fn place_call(
        &self,
        phone_number: &str,
        script: &str,
    ) -> std::result::Result<CallId, DeliveryError> {
        self.calls
            .lock()
            .unwrap()
            .push((phone_number.into(), script.into()));
        if self.fail {
            return Err(DeliveryError::Rejected {
                status: 503,
                body: "unavailable".into(),
            });
        }
        let n = self.next_call.fetch_add(1, Ordering::SeqCst);
        Ok(CallId(format!("call-{n}")))
    }
}

pub fn bearer_for(st: &AppState, user: &User) -> String {
    st.jwt.issue(&session_for(user)).unwrap()
}

/// Drive one request through the full router; non-JSON bodies come back as strings.
pub async fn send(
    st: &AppState,
    method: Method,
    uri: &str,
    token: Option<&str>,
    json: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match json {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    dispatch(st, req.body(body).unwrap()).await
}

pub async fn send_form(st: &AppState, uri: &str, form: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    dispatch(st, req).await
}

async fn dispatch(st: &AppState, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = build_app(st.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}
