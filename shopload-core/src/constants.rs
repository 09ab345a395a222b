use std::ops::RangeInclusive;
use std::time::Duration;

/// Lower bound of the default inter-task wait.
pub const DEFAULT_WAIT_MIN: Duration = Duration::from_secs(1);

/// Upper bound of the default inter-task wait.
pub const DEFAULT_WAIT_MAX: Duration = Duration::from_secs(3);

pub const DEFAULT_USERS: usize = 1;
pub const DEFAULT_SPAWN_RATE: f64 = 1.;
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

pub const USER_ID_RANGE: RangeInclusive<u32> = 1..=50;
pub const ORDER_ID_RANGE: RangeInclusive<u32> = 1..=100;
pub const PRODUCT_ID_RANGE: RangeInclusive<u32> = 1..=100;

/// Ids assumed to exist as seeded fixtures in every service.
pub const FIXTURE_ID_RANGE: RangeInclusive<u32> = 1..=20;

pub const AMOUNT_MIN: f64 = 10.;
pub const AMOUNT_MAX: f64 = 500.;

pub const FAVOURITE_BASE_PATH: &str = "/favourite-service/api";
pub const ORDER_BASE_PATH: &str = "/order-service/api";
pub const PAYMENT_BASE_PATH: &str = "/payment-service/api";

pub const JSON_CONTENT_TYPE: &str = "application/json";
