use std::collections::{HashMap, HashSet};

use axum::{
    extract::Path,
    response::Json,
    routing::{get, post, put},
    Router,
};
use diesel::prelude::*;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ApiError, AppJson};
use crate::establish_connection;
use crate::models::{Product, Restaurant, RestaurantMenuItem};

use super::models::*;
use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", post(create_restaurant).get(list_restaurants))
        .route("/restaurants/{id}", get(get_restaurant))
        .route(
            "/restaurants/{id}/menu/{product_id}",
            put(set_menu_availability),
        )
}

#[utoipa::path(
    post,
    path = "/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant created successfully", body = CreateRestaurantResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 404, description = "Menu references an unknown product", body = ApiErrorResponse),
    ),
    tag = "restaurants"
)]
#[instrument]
pub async fn create_restaurant(
    AppJson(payload): AppJson<CreateRestaurantRequest>,
) -> Result<Json<CreateRestaurantResponse>, ApiError> {
    use crate::schema::{products, restaurant_menu_items, restaurants};

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Restaurant name must not be empty".to_string(),
        ));
    }
    if payload.address.trim().is_empty() {
        return Err(ApiError::Validation(
            "Restaurant address must not be empty".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for entry in &payload.menu {
        if !seen.insert(entry.product) {
            return Err(ApiError::Validation(
                "Duplicate product on the menu".to_string(),
            ));
        }
    }

    let conn = &mut establish_connection();

    let product_ids: Vec<Uuid> = payload.menu.iter().map(|entry| entry.product).collect();
    let known: i64 = products::table
        .filter(products::id.eq_any(&product_ids))
        .count()
        .get_result(conn)?;
    if known != product_ids.len() as i64 {
        return Err(ApiError::NotFound("Product".to_string()));
    }

    let restaurant = Restaurant {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        address: payload.address.trim().to_string(),
        contact_phone: payload.contact_phone,
    };
    let menu_items: Vec<RestaurantMenuItem> = payload
        .menu
        .iter()
        .map(|entry| RestaurantMenuItem {
            restaurant_id: restaurant.id,
            product_id: entry.product,
            availability: entry.availability,
        })
        .collect();

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::insert_into(restaurants::table)
            .values(&restaurant)
            .execute(conn)?;
        diesel::insert_into(restaurant_menu_items::table)
            .values(&menu_items)
            .execute(conn)?;
        Ok(())
    })?;

    Ok(Json(CreateRestaurantResponse { id: restaurant.id }))
}

#[utoipa::path(
    get,
    path = "/restaurants",
    responses(
        (status = 200, description = "List of restaurants with their menus", body = ListRestaurantsResponse),
    ),
    tag = "restaurants"
)]
#[instrument]
pub async fn list_restaurants() -> Result<Json<ListRestaurantsResponse>, ApiError> {
    use crate::schema::restaurants;

    let conn = &mut establish_connection();
    let all: Vec<Restaurant> = restaurants::table
        .select(Restaurant::as_select())
        .order(restaurants::name.asc())
        .load(conn)?;

    let menu_items: Vec<RestaurantMenuItem> = RestaurantMenuItem::belonging_to(&all)
        .select(RestaurantMenuItem::as_select())
        .load(conn)?;
    let product_index = load_product_index(conn, &menu_items)?;
    let grouped = menu_items.grouped_by(&all);

    Ok(Json(ListRestaurantsResponse {
        restaurants: all
            .into_iter()
            .zip(grouped)
            .map(|(restaurant, menu)| serialize_restaurant(restaurant, menu, &product_index))
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    responses(
        (status = 200, description = "Restaurant details", body = RestaurantResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = String, Path, description = "Restaurant ID")
    ),
    tag = "restaurants"
)]
#[instrument]
pub async fn get_restaurant(
    Path(restaurant_id): Path<String>,
) -> Result<Json<RestaurantResponse>, ApiError> {
    use crate::schema::restaurants;

    let restaurant_id = restaurant_id
        .parse::<Uuid>()
        .map_err(|_| ApiError::Validation("Invalid restaurant id".to_string()))?;

    let conn = &mut establish_connection();
    let restaurant = restaurants::table
        .find(restaurant_id)
        .select(Restaurant::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Restaurant".to_string()))?;

    let menu_items: Vec<RestaurantMenuItem> = RestaurantMenuItem::belonging_to(&restaurant)
        .select(RestaurantMenuItem::as_select())
        .load(conn)?;
    let product_index = load_product_index(conn, &menu_items)?;

    Ok(Json(serialize_restaurant(
        restaurant,
        menu_items,
        &product_index,
    )))
}

#[utoipa::path(
    put,
    path = "/restaurants/{id}/menu/{product_id}",
    request_body = SetAvailabilityRequest,
    responses(
        (status = 200, description = "Menu entry upserted", body = MenuEntryResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 404, description = "Restaurant or product not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = String, Path, description = "Restaurant ID"),
        ("product_id" = String, Path, description = "Product ID"),
    ),
    tag = "restaurants"
)]
#[instrument]
pub async fn set_menu_availability(
    Path((restaurant_id, product_id)): Path<(String, String)>,
    AppJson(payload): AppJson<SetAvailabilityRequest>,
) -> Result<Json<MenuEntryResponse>, ApiError> {
    use crate::schema::{products, restaurant_menu_items, restaurants};

    let restaurant_id = restaurant_id
        .parse::<Uuid>()
        .map_err(|_| ApiError::Validation("Invalid restaurant id".to_string()))?;
    let product_id = product_id
        .parse::<Uuid>()
        .map_err(|_| ApiError::Validation("Invalid product id".to_string()))?;

    let conn = &mut establish_connection();
    restaurants::table
        .find(restaurant_id)
        .select(Restaurant::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Restaurant".to_string()))?;
    let product = products::table
        .find(product_id)
        .select(Product::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Product".to_string()))?;

    let item = RestaurantMenuItem {
        restaurant_id,
        product_id,
        availability: payload.availability,
    };
    diesel::insert_into(restaurant_menu_items::table)
        .values(&item)
        .on_conflict((
            restaurant_menu_items::restaurant_id,
            restaurant_menu_items::product_id,
        ))
        .do_update()
        .set(restaurant_menu_items::availability.eq(payload.availability))
        .execute(conn)?;

    Ok(Json(MenuEntryResponse {
        product: product_id,
        name: product.name,
        price: product.price.to_string(),
        availability: payload.availability,
    }))
}

fn load_product_index(
    conn: &mut PgConnection,
    menu_items: &[RestaurantMenuItem],
) -> Result<HashMap<Uuid, Product>, ApiError> {
    use crate::schema::products;

    let product_ids: Vec<Uuid> = menu_items.iter().map(|item| item.product_id).collect();
    let index = products::table
        .filter(products::id.eq_any(&product_ids))
        .select(Product::as_select())
        .load(conn)?
        .into_iter()
        .map(|product: Product| (product.id, product))
        .collect();
    Ok(index)
}

fn serialize_restaurant(
    restaurant: Restaurant,
    menu: Vec<RestaurantMenuItem>,
    product_index: &HashMap<Uuid, Product>,
) -> RestaurantResponse {
    RestaurantResponse {
        id: restaurant.id,
        name: restaurant.name,
        address: restaurant.address,
        contact_phone: restaurant.contact_phone,
        menu: menu
            .into_iter()
            .map(|item| {
                let product = product_index.get(&item.product_id);
                MenuEntryResponse {
                    product: item.product_id,
                    name: product.map(|p| p.name.clone()).unwrap_or_default(),
                    price: product.map(|p| p.price.to_string()).unwrap_or_default(),
                    availability: item.availability,
                }
            })
            .collect(),
    }
}
