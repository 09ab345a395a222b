use crate::error::ProfileError;
use crate::profile::{created_id, json_headers, Profile, TaskResult};
use crate::session::Session;
use crate::task;
use rand::Rng;
use reqwest::StatusCode;
use shopload_core::{FavouriteRecord, OrderRecord, PaymentRecord, ProfileKind};

const HEALTH_PATHS: [&str; 3] = [
    "/api/payment-service/actuator/health",
    "/api/order-service/actuator/health",
    "/api/favourite-service/actuator/health",
];

const PAYMENTS: &str = "/api/payment-service/payments";
const ORDERS: &str = "/api/order-service/orders";
const FAVOURITES: &str = "/api/favourite-service/favourites";

pub fn profile() -> Result<Profile, ProfileError> {
    Profile::new(
        ProfileKind::Combined,
        json_headers,
        vec![
            task!(3, health_check),
            task!(2, payment_workflow),
            task!(2, order_workflow),
            task!(1, favourite_workflow),
        ],
    )
}

async fn health_check(session: &mut Session) -> TaskResult {
    let path = HEALTH_PATHS[session.rng().gen_range(0..HEALTH_PATHS.len())];
    let _ = session.get(path, path).await;
    Ok(())
}

async fn payment_workflow(session: &mut Session) -> TaskResult {
    let _ = session.get(PAYMENTS, PAYMENTS).await;

    let payment = PaymentRecord::accepted(session.rng());
    let Ok(response) = session.post(PAYMENTS, PAYMENTS, &payment).await else {
        return Ok(());
    };

    if let Some(id) = created_id(&response, "POST /api/payment-service/payments", "paymentId")? {
        let _ = session
            .get(
                &format!("{PAYMENTS}/{id}"),
                "/api/payment-service/payments/{id}",
            )
            .await;
    }
    Ok(())
}

async fn order_workflow(session: &mut Session) -> TaskResult {
    let _ = session.get(ORDERS, ORDERS).await;

    let clock = session.clock();
    let order = OrderRecord::pending(session.rng(), clock);
    let Ok(response) = session.post(ORDERS, ORDERS, &order).await else {
        return Ok(());
    };

    if let Some(id) = created_id(&response, "POST /api/order-service/orders", "orderId")? {
        let _ = session
            .get(&format!("{ORDERS}/{id}"), "/api/order-service/orders/{id}")
            .await;
    }
    Ok(())
}

/// Unlike the other workflows, the follow-up reads by the user id that was
/// just sent, so only the status of the create call matters.
async fn favourite_workflow(session: &mut Session) -> TaskResult {
    let _ = session.get(FAVOURITES, FAVOURITES).await;

    let favourite = FavouriteRecord::random(session.rng());
    let Ok(response) = session.post(FAVOURITES, FAVOURITES, &favourite).await else {
        return Ok(());
    };

    if response.status() == StatusCode::CREATED {
        let _ = session
            .get(
                &format!("{FAVOURITES}/user/{}", favourite.user_id),
                "/api/favourite-service/favourites/user/{userId}",
            )
            .await;
    }
    Ok(())
}
