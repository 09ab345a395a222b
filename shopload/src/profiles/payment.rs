use crate::error::ProfileError;
use crate::profile::{created_id, json_headers, Profile, TaskResult};
use crate::session::Session;
use crate::task;
use shopload_core::{
    random_fixture_id, random_order_id, random_user_id, PaymentRecord, PaymentStatusUpdate,
    ProfileKind, PAYMENT_BASE_PATH,
};

pub fn profile() -> Result<Profile, ProfileError> {
    Profile::new(
        ProfileKind::Payment,
        on_start,
        vec![
            task!(3, get_all_payments),
            task!(2, create_payment),
            task!(2, get_payments_by_user),
            task!(2, get_payments_by_order),
            task!(1, get_payment_by_id),
            task!(1, update_payment_status),
            task!(1, delete_payment),
            task!(1, health_check),
        ],
    )
}

fn on_start(session: &mut Session) {
    json_headers(session);
    session.set_base_path(PAYMENT_BASE_PATH);
}

async fn get_all_payments(session: &mut Session) -> TaskResult {
    let _ = session.get("/payments", "/payments").await;
    Ok(())
}

async fn create_payment(session: &mut Session) -> TaskResult {
    let payment = PaymentRecord::random(session.rng());
    let Ok(response) = session.post("/payments", "/payments", &payment).await else {
        return Ok(());
    };

    if let Some(id) = created_id(&response, "POST /payments", "paymentId")? {
        let _ = session
            .get(&format!("/payments/{id}"), "/payments/{id}")
            .await;
    }
    Ok(())
}

async fn get_payments_by_user(session: &mut Session) -> TaskResult {
    let user_id = random_user_id(session.rng());
    let _ = session
        .get(&format!("/payments/user/{user_id}"), "/payments/user/{userId}")
        .await;
    Ok(())
}

async fn get_payments_by_order(session: &mut Session) -> TaskResult {
    let order_id = random_order_id(session.rng());
    let _ = session
        .get(
            &format!("/payments/order/{order_id}"),
            "/payments/order/{orderId}",
        )
        .await;
    Ok(())
}

async fn get_payment_by_id(session: &mut Session) -> TaskResult {
    let id = random_fixture_id(session.rng());
    let _ = session
        .get(&format!("/payments/{id}"), "/payments/{id}")
        .await;
    Ok(())
}

async fn update_payment_status(session: &mut Session) -> TaskResult {
    let id = random_fixture_id(session.rng());
    let update = PaymentStatusUpdate::random(session.rng());
    let _ = session
        .put(&format!("/payments/{id}"), "/payments/{id}", &update)
        .await;
    Ok(())
}

async fn delete_payment(session: &mut Session) -> TaskResult {
    let id = random_fixture_id(session.rng());
    let _ = session
        .delete(&format!("/payments/{id}"), "/payments/{id}")
        .await;
    Ok(())
}

async fn health_check(session: &mut Session) -> TaskResult {
    let _ = session.get("/actuator/health", "/actuator/health").await;
    Ok(())
}
