use crate::error::ProfileError;
use crate::profile::{created_id, json_headers, Profile, TaskResult};
use crate::session::Session;
use crate::task;
use shopload_core::{
    random_fixture_id, random_user_id, FavouriteRecord, ProfileKind, FAVOURITE_BASE_PATH,
};

pub fn profile() -> Result<Profile, ProfileError> {
    Profile::new(
        ProfileKind::Favourite,
        on_start,
        vec![
            task!(3, get_all_favourites),
            task!(2, create_favourite),
            task!(2, get_favourites_by_user),
            task!(1, get_favourite_by_id),
            task!(1, delete_favourite),
            task!(1, health_check),
        ],
    )
}

fn on_start(session: &mut Session) {
    json_headers(session);
    session.set_base_path(FAVOURITE_BASE_PATH);
}

async fn get_all_favourites(session: &mut Session) -> TaskResult {
    let _ = session.get("/favourites", "/favourites").await;
    Ok(())
}

async fn create_favourite(session: &mut Session) -> TaskResult {
    let favourite = FavouriteRecord::random(session.rng());
    let Ok(response) = session.post("/favourites", "/favourites", &favourite).await else {
        return Ok(());
    };

    if let Some(id) = created_id(&response, "POST /favourites", "favouriteId")? {
        let _ = session
            .get(&format!("/favourites/{id}"), "/favourites/{id}")
            .await;
    }
    Ok(())
}

async fn get_favourites_by_user(session: &mut Session) -> TaskResult {
    let user_id = random_user_id(session.rng());
    let _ = session
        .get(&format!("/favourites/user/{user_id}"), "/favourites/user/{userId}")
        .await;
    Ok(())
}

async fn get_favourite_by_id(session: &mut Session) -> TaskResult {
    let id = random_fixture_id(session.rng());
    let _ = session
        .get(&format!("/favourites/{id}"), "/favourites/{id}")
        .await;
    Ok(())
}

async fn delete_favourite(session: &mut Session) -> TaskResult {
    let id = random_fixture_id(session.rng());
    let _ = session
        .delete(&format!("/favourites/{id}"), "/favourites/{id}")
        .await;
    Ok(())
}

async fn health_check(session: &mut Session) -> TaskResult {
    let _ = session.get("/actuator/health", "/actuator/health").await;
    Ok(())
}
