use crate::error::ProfileError;
use crate::profile::{created_id, json_headers, Profile, TaskResult};
use crate::session::Session;
use crate::task;
use shopload_core::{
    random_fixture_id, random_user_id, OrderRecord, OrderStatusUpdate, ProfileKind,
    ORDER_BASE_PATH,
};

pub fn profile() -> Result<Profile, ProfileError> {
    Profile::new(
        ProfileKind::Order,
        on_start,
        vec![
            task!(3, get_all_orders),
            task!(2, create_order),
            task!(2, get_orders_by_user),
            task!(1, get_order_by_id),
            task!(1, update_order_status),
            task!(1, delete_order),
            task!(1, health_check),
        ],
    )
}

fn on_start(session: &mut Session) {
    json_headers(session);
    session.set_base_path(ORDER_BASE_PATH);
}

async fn get_all_orders(session: &mut Session) -> TaskResult {
    let _ = session.get("/orders", "/orders").await;
    Ok(())
}

async fn create_order(session: &mut Session) -> TaskResult {
    let clock = session.clock();
    let order = OrderRecord::random(session.rng(), clock);
    let Ok(response) = session.post("/orders", "/orders", &order).await else {
        return Ok(());
    };

    if let Some(id) = created_id(&response, "POST /orders", "orderId")? {
        let _ = session.get(&format!("/orders/{id}"), "/orders/{id}").await;
    }
    Ok(())
}

async fn get_orders_by_user(session: &mut Session) -> TaskResult {
    let user_id = random_user_id(session.rng());
    let _ = session
        .get(&format!("/orders/user/{user_id}"), "/orders/user/{userId}")
        .await;
    Ok(())
}

async fn get_order_by_id(session: &mut Session) -> TaskResult {
    let id = random_fixture_id(session.rng());
    let _ = session.get(&format!("/orders/{id}"), "/orders/{id}").await;
    Ok(())
}

async fn update_order_status(session: &mut Session) -> TaskResult {
    let id = random_fixture_id(session.rng());
    let update = OrderStatusUpdate::random(session.rng());
    let _ = session
        .put(&format!("/orders/{id}"), "/orders/{id}", &update)
        .await;
    Ok(())
}

async fn delete_order(session: &mut Session) -> TaskResult {
    let id = random_fixture_id(session.rng());
    let _ = session
        .delete(&format!("/orders/{id}"), "/orders/{id}")
        .await;
    Ok(())
}

async fn health_check(session: &mut Session) -> TaskResult {
    let _ = session.get("/actuator/health", "/actuator/health").await;
    Ok(())
}
