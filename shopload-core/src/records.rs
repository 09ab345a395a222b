//! Outbound request bodies and their random generation.
//!
//! Every generator takes the RNG explicitly so a seeded RNG yields the same
//! sequence of payloads on every run.
use crate::{
    AMOUNT_MAX, AMOUNT_MIN, FIXTURE_ID_RANGE, ORDER_ID_RANGE, PRODUCT_ID_RANGE, USER_ID_RANGE,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Accepted,
    Rejected,
    Pending,
    Completed,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Accepted,
        PaymentStatus::Rejected,
        PaymentStatus::Pending,
        PaymentStatus::Completed,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub payment_status: PaymentStatus,
    pub order_id: u32,
    pub user_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl PaymentRecord {
    /// Fully random payment as sent to the payment service directly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            payment_status: PaymentStatus::random(rng),
            order_id: random_order_id(rng),
            user_id: random_user_id(rng),
            amount: Some(random_amount(rng)),
        }
    }

    /// Accepted payment without an amount, as sent through the gateway.
    pub fn accepted<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            payment_status: PaymentStatus::Accepted,
            order_id: random_order_id(rng),
            user_id: random_user_id(rng),
            amount: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_status: OrderStatus,
    pub order_date: String,
    pub user_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
}

impl OrderRecord {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, ceiling: OffsetDateTime) -> Self {
        Self {
            order_status: OrderStatus::random(rng),
            order_date: fake_date_time(rng, ceiling),
            user_id: random_user_id(rng),
            total_amount: Some(random_amount(rng)),
        }
    }

    /// Pending order without a total, as sent through the gateway.
    pub fn pending<R: Rng + ?Sized>(rng: &mut R, ceiling: OffsetDateTime) -> Self {
        Self {
            order_status: OrderStatus::Pending,
            order_date: fake_date_time(rng, ceiling),
            user_id: random_user_id(rng),
            total_amount: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteRecord {
    pub user_id: u32,
    pub product_id: u32,
}

impl FavouriteRecord {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            user_id: random_user_id(rng),
            product_id: random_product_id(rng),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
}

impl PaymentStatusUpdate {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            payment_status: PaymentStatus::random(rng),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub order_status: OrderStatus,
}

impl OrderStatusUpdate {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            order_status: OrderStatus::random(rng),
        }
    }
}

pub fn random_user_id<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(USER_ID_RANGE)
}

pub fn random_order_id<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(ORDER_ID_RANGE)
}

pub fn random_product_id<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(PRODUCT_ID_RANGE)
}

pub fn random_fixture_id<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(FIXTURE_ID_RANGE)
}

/// Uniform amount in `[10.00, 500.00]`, rounded to cents.
pub fn random_amount<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let raw = rng.gen_range(AMOUNT_MIN..=AMOUNT_MAX);
    (raw * 100.).round() / 100.
}

/// Date-time between the epoch and `ceiling`, formatted `YYYY-MM-DDTHH:MM:SS`.
pub fn fake_date_time<R: Rng + ?Sized>(rng: &mut R, ceiling: OffsetDateTime) -> String {
    let span = ceiling.unix_timestamp().max(0);
    let offset = rng.gen_range(0..=span);
    let at = OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(offset);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}
