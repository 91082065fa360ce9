use axum::{response::Json, routing::get, Router};
use tracing::instrument;

use super::models::Banner;
use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/banners", get(list_banners))
}

#[utoipa::path(
    get,
    path = "/banners",
    responses(
        (status = 200, description = "Banners promoted on the storefront", body = [Banner]),
    ),
    tag = "storefront"
)]
#[instrument]
pub async fn list_banners() -> Json<Vec<Banner>> {
    // TODO: serve banner content from the database
    Json(vec![
        Banner {
            title: "Burger".to_string(),
            src: "/static/burger.jpg".to_string(),
            text: "Tasty Burger at your door step".to_string(),
        },
        Banner {
            title: "Spices".to_string(),
            src: "/static/food.jpg".to_string(),
            text: "All Cuisines".to_string(),
        },
        Banner {
            title: "New York".to_string(),
            src: "/static/tasty.jpg".to_string(),
            text: "Food is incomplete without a tasty dessert".to_string(),
        },
    ])
}
