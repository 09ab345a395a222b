//! In-memory stand-in for the payment, order and favourite services.
//!
//! Every service is reachable both through the gateway layout
//! (`/api/{service}/...`) and its own layout (`/{service}/api/...`). Each
//! collection starts with fixtures `1..=20`.
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use shopload_core::{
    FavouriteRecord, OrderRecord, OrderStatus, PaymentRecord, PaymentStatus, FIXTURE_ID_RANGE,
};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    /// Answer `429 Too Many Requests` above this rate.
    pub max_rps: Option<NonZeroU32>,
}

pub async fn serve(listener: TcpListener, config: MockConfig) -> std::io::Result<()> {
    axum::serve(listener, router(config)).await
}

/// Bind an ephemeral local port and serve in the background.
pub async fn spawn(config: MockConfig) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = serve(listener, config).await {
            tracing::error!("Mock service stopped: {err}");
        }
    });
    Ok(addr)
}

pub fn router(config: MockConfig) -> Router {
    let state = AppState::new(config);

    Router::new()
        .nest("/api/payment-service", payment_routes())
        .nest("/payment-service/api", payment_routes())
        .nest("/api/order-service", resource_routes::<OrderRecord>("/orders"))
        .nest("/order-service/api", resource_routes::<OrderRecord>("/orders"))
        .nest(
            "/api/favourite-service",
            resource_routes::<FavouriteRecord>("/favourites"),
        )
        .nest(
            "/favourite-service/api",
            resource_routes::<FavouriteRecord>("/favourites"),
        )
        .layer(middleware::from_fn_with_state(state.clone(), admission))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn payment_routes() -> Router<AppState> {
    resource_routes::<PaymentRecord>("/payments")
        .route("/payments/order/:order_id", get(payments_by_order))
}

fn resource_routes<R: Resource>(collection: &str) -> Router<AppState> {
    Router::new()
        .route(collection, get(list::<R>).post(create::<R>))
        .route(
            &format!("{collection}/:id"),
            get(read::<R>).put(update::<R>).delete(remove::<R>),
        )
        .route(&format!("{collection}/user/:user_id"), get(by_user::<R>))
        .route("/actuator/health", get(health))
}

/** State **/

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl AppState {
    fn new(config: MockConfig) -> Self {
        Self {
            store: Arc::new(Store::with_fixtures()),
            limiter: config
                .max_rps
                .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps)))),
        }
    }
}

struct Table<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T> Table<T> {
    fn new(fixtures: impl IntoIterator<Item = T>) -> Self {
        let rows: BTreeMap<u64, T> = fixtures
            .into_iter()
            .enumerate()
            .map(|(idx, row)| (idx as u64 + 1, row))
            .collect();
        Self {
            next_id: rows.len() as u64 + 1,
            rows,
        }
    }

    fn insert(&mut self, row: T) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, row);
        id
    }
}

struct Store {
    payments: RwLock<Table<PaymentRecord>>,
    orders: RwLock<Table<OrderRecord>>,
    favourites: RwLock<Table<FavouriteRecord>>,
}

impl Store {
    fn with_fixtures() -> Self {
        let ids = || FIXTURE_ID_RANGE;
        let payments = ids().map(|i| PaymentRecord {
            payment_status: PaymentStatus::ALL[i as usize % PaymentStatus::ALL.len()],
            order_id: i,
            user_id: i,
            amount: Some(10. * i as f64),
        });
        let orders = ids().map(|i| OrderRecord {
            order_status: OrderStatus::ALL[i as usize % OrderStatus::ALL.len()],
            order_date: format!("2024-01-{i:02}T12:00:00"),
            user_id: i,
            total_amount: Some(25. * i as f64),
        });
        let favourites = ids().map(|i| FavouriteRecord {
            user_id: i,
            product_id: i,
        });

        Self {
            payments: RwLock::new(Table::new(payments)),
            orders: RwLock::new(Table::new(orders)),
            favourites: RwLock::new(Table::new(favourites)),
        }
    }
}

/// A collection served under `{collection}`, `{collection}/:id` and
/// `{collection}/user/:user_id`.
trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const ID_FIELD: &'static str;

    fn table(store: &Store) -> &RwLock<Table<Self>>;
    fn user_id(&self) -> u32;
}

impl Resource for PaymentRecord {
    const ID_FIELD: &'static str = "paymentId";

    fn table(store: &Store) -> &RwLock<Table<Self>> {
        &store.payments
    }

    fn user_id(&self) -> u32 {
        self.user_id
    }
}

impl Resource for OrderRecord {
    const ID_FIELD: &'static str = "orderId";

    fn table(store: &Store) -> &RwLock<Table<Self>> {
        &store.orders
    }

    fn user_id(&self) -> u32 {
        self.user_id
    }
}

impl Resource for FavouriteRecord {
    const ID_FIELD: &'static str = "favouriteId";

    fn table(store: &Store) -> &RwLock<Table<Self>> {
        &store.favourites
    }

    fn user_id(&self) -> u32 {
        self.user_id
    }
}

fn with_id<R: Resource>(id: u64, record: &R) -> Value {
    let mut value = serde_json::to_value(record).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut value {
        map.insert(R::ID_FIELD.to_string(), json!(id));
    }
    value
}

/// Apply the fields of `patch` on top of `record`.
fn merge<R: Resource>(record: &R, patch: Value) -> Result<R, serde_json::Error> {
    let mut value = serde_json::to_value(record)?;
    if let (Value::Object(base), Value::Object(patch)) = (&mut value, patch) {
        base.extend(patch);
    }
    serde_json::from_value(value)
}

/** Handlers **/

async fn list<R: Resource>(State(state): State<AppState>) -> Json<Vec<Value>> {
    let table = R::table(&state.store).read().await;
    Json(table.rows.iter().map(|(id, r)| with_id(*id, r)).collect())
}

async fn create<R: Resource>(
    State(state): State<AppState>,
    Json(record): Json<R>,
) -> (StatusCode, Json<Value>) {
    let id = R::table(&state.store).write().await.insert(record.clone());
    debug!("Created {} {id}", R::ID_FIELD);
    (StatusCode::CREATED, Json(with_id(id, &record)))
}

async fn read<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    let table = R::table(&state.store).read().await;
    table
        .rows
        .get(&id)
        .map(|r| Json(with_id(id, r)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut table = R::table(&state.store).write().await;
    let row = table.rows.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    *row = merge(row, patch).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(Json(with_id(id, row)))
}

async fn remove<R: Resource>(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    match R::table(&state.store).write().await.rows.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

async fn by_user<R: Resource>(
    State(state): State<AppState>,
    Path(user_id): Path<u32>,
) -> Json<Vec<Value>> {
    let table = R::table(&state.store).read().await;
    Json(
        table
            .rows
            .iter()
            .filter(|(_, r)| r.user_id() == user_id)
            .map(|(id, r)| with_id(*id, r))
            .collect(),
    )
}

async fn payments_by_order(
    State(state): State<AppState>,
    Path(order_id): Path<u32>,
) -> Json<Vec<Value>> {
    let table = state.store.payments.read().await;
    Json(
        table
            .rows
            .iter()
            .filter(|(_, r)| r.order_id == order_id)
            .map(|(id, r)| with_id(*id, r))
            .collect(),
    )
}

async fn health() -> Json<Value> {
    Json(json!({"status": "UP"}))
}

async fn admission(State(state): State<AppState>, request: Request, next: Next) -> Response {
    metrics::counter!("mock-service.requests").increment(1);
    REQUESTS.fetch_add(1, Ordering::Relaxed);

    if let Some(limiter) = &state.limiter {
        if limiter.check().is_err() {
            debug!("Rate limited {}", request.uri());
            return StatusCode::TOO_MANY_REQUESTS.into_response();
        }
    }
    next.run(request).await
}

/** RPS Printer **/

static REQUESTS: AtomicU64 = AtomicU64::new(0);

pub async fn rps_log_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let requests = REQUESTS.swap(0, Ordering::Relaxed);
        info!("{requests} RPS");
    }
}
