use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::dispatch::{create_order_restaurant_info, rank_dispatch_report};
use crate::error::{ApiError, AppJson};
use crate::establish_connection;
use crate::models::{
    Order, OrderChangeset, OrderProduct, OrderRestaurantInfo, OrderStatus, PaymentMethod, Product,
    Restaurant,
};

use super::models::*;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(register_order).get(list_orders))
        .route("/orders/{id}", get(get_order).patch(update_order))
        .route("/orders/{id}/restaurants", get(order_restaurants))
        .route("/orders/{id}/assign", post(assign_restaurant))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = RegisterOrderRequest,
    responses(
        (status = 200, description = "Order registered successfully", body = OrderResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 404, description = "Order references an unknown product", body = ApiErrorResponse),
    ),
    tag = "orders"
)]
#[instrument(skip(state))]
pub async fn register_order(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    use crate::schema::{order_products, orders, products};

    validate_register_order(&payload)?;
    let payment_method = match payload.payment_method.as_deref() {
        Some(raw) => PaymentMethod::parse(raw)
            .ok_or_else(|| ApiError::Validation("Invalid payment method".to_string()))?,
        None => PaymentMethod::Cash,
    };

    let conn = &mut establish_connection();

    let requested_ids: Vec<Uuid> = payload.products.iter().map(|item| item.product).collect();
    let product_index: HashMap<Uuid, Product> = products::table
        .filter(products::id.eq_any(&requested_ids))
        .select(Product::as_select())
        .load(conn)?
        .into_iter()
        .map(|product: Product| (product.id, product))
        .collect();
    ensure_products_exist(&requested_ids, &product_index)?;

    let order = Order {
        id: Uuid::new_v4(),
        status: OrderStatus::New,
        payment_method,
        customer_firstname: payload.firstname.trim().to_string(),
        customer_lastname: payload.lastname.trim().to_string(),
        customer_phone: payload.phonenumber.trim().to_string(),
        customer_address: payload.address.trim().to_string(),
        comments: payload.comments.clone(),
        order_date: Utc::now(),
        call_date: None,
        delivery_date: None,
        assigned_restaurant_id: None,
    };
    // Unit prices are snapshotted at registration time so later catalog
    // edits do not change already placed orders.
    let items: Vec<OrderProduct> = payload
        .products
        .iter()
        .map(|item| OrderProduct {
            order_id: order.id,
            product_id: item.product,
            quantity: item.quantity,
            price: product_index[&item.product].price.clone(),
        })
        .collect();

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::insert_into(orders::table)
            .values(&order)
            .execute(conn)?;
        diesel::insert_into(order_products::table)
            .values(&items)
            .execute(conn)?;
        Ok(())
    })?;

    // The dispatch report needs remote geocoding, so it is built after the
    // order is committed. A failure here must not lose the accepted order.
    if let Err(err) = create_order_restaurant_info(conn, &state.geocoder, &order).await {
        error!(order_id = %order.id, error = %err, "failed to build dispatch report");
    }

    Ok(Json(serialize_order(order, items, &product_index)))
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "List of orders", body = ListOrdersResponse),
        (status = 400, description = "Invalid status filter", body = ApiErrorResponse),
    ),
    params(
        ("status" = Option<String>, Query, description = "Filter by order status"),
    ),
    tag = "orders"
)]
#[instrument]
pub async fn list_orders(
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ListOrdersResponse>, ApiError> {
    use crate::schema::orders;

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            OrderStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation("Invalid order status".to_string()))?,
        ),
        None => None,
    };

    let conn = &mut establish_connection();
    let mut order_query = orders::table
        .select(Order::as_select())
        .order(orders::order_date.desc())
        .into_boxed();
    if let Some(status) = status {
        order_query = order_query.filter(orders::status.eq(status));
    }
    let all: Vec<Order> = order_query.load(conn)?;

    let items: Vec<OrderProduct> = OrderProduct::belonging_to(&all)
        .select(OrderProduct::as_select())
        .load(conn)?;
    let product_index = load_products_for_items(conn, &items)?;
    let grouped = items.grouped_by(&all);

    Ok(Json(ListOrdersResponse {
        orders: all
            .into_iter()
            .zip(grouped)
            .map(|(order, items)| serialize_order(order, items, &product_index))
            .collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    responses(
        (status = 200, description = "Order details", body = OrderResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    tag = "orders"
)]
#[instrument]
pub async fn get_order(Path(order_id): Path<String>) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&order_id)?;

    let conn = &mut establish_connection();
    let order = find_order(conn, order_id)?;
    let (items, product_index) = load_order_items(conn, &order)?;

    Ok(Json(serialize_order(order, items, &product_index)))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/restaurants",
    responses(
        (status = 200, description = "Restaurants ranked by fitness to prepare the order", body = OrderRestaurantsResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    tag = "orders"
)]
#[instrument]
pub async fn order_restaurants(
    Path(order_id): Path<String>,
) -> Result<Json<OrderRestaurantsResponse>, ApiError> {
    use crate::schema::restaurants;

    let order_id = parse_order_id(&order_id)?;

    let conn = &mut establish_connection();
    let order = find_order(conn, order_id)?;

    let mut report: Vec<OrderRestaurantInfo> = OrderRestaurantInfo::belonging_to(&order)
        .select(OrderRestaurantInfo::as_select())
        .load(conn)?;
    rank_dispatch_report(&mut report);

    let restaurant_ids: Vec<Uuid> = report.iter().map(|row| row.restaurant_id).collect();
    let restaurant_index: HashMap<Uuid, Restaurant> = restaurants::table
        .filter(restaurants::id.eq_any(&restaurant_ids))
        .select(Restaurant::as_select())
        .load(conn)?
        .into_iter()
        .map(|restaurant: Restaurant| (restaurant.id, restaurant))
        .collect();

    Ok(Json(OrderRestaurantsResponse {
        restaurants: report
            .into_iter()
            .filter_map(|row| {
                let restaurant = restaurant_index.get(&row.restaurant_id)?;
                Some(RestaurantOption {
                    id: row.restaurant_id,
                    name: restaurant.name.clone(),
                    address: restaurant.address.clone(),
                    can_prepare: row.can_prepare,
                    distance_km: row.distance_km,
                })
            })
            .collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/assign",
    request_body = AssignRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant assigned to the order", body = OrderResponse),
        (status = 400, description = "Restaurant cannot prepare this order", body = ApiErrorResponse),
        (status = 404, description = "Order or restaurant not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    tag = "orders"
)]
#[instrument]
pub async fn assign_restaurant(
    Path(order_id): Path<String>,
    AppJson(payload): AppJson<AssignRestaurantRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    use crate::schema::{order_restaurant_infos, orders};

    let order_id = parse_order_id(&order_id)?;

    let conn = &mut establish_connection();
    let order = find_order(conn, order_id)?;
    if order.status == OrderStatus::Completed {
        return Err(ApiError::Validation(
            "Order is already completed".to_string(),
        ));
    }

    let info: OrderRestaurantInfo = order_restaurant_infos::table
        .find((order_id, payload.restaurant_id))
        .select(OrderRestaurantInfo::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Restaurant".to_string()))?;
    if !info.can_prepare {
        return Err(ApiError::Validation(
            "Restaurant cannot prepare this order".to_string(),
        ));
    }

    let updated: Order = diesel::update(orders::table.find(order_id))
        .set((
            orders::assigned_restaurant_id.eq(Some(payload.restaurant_id)),
            orders::status.eq(OrderStatus::RestaurantProcessing),
        ))
        .get_result(conn)?;

    let (items, product_index) = load_order_items(conn, &updated)?;
    Ok(Json(serialize_order(updated, items, &product_index)))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}",
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    tag = "orders"
)]
#[instrument]
pub async fn update_order(
    Path(order_id): Path<String>,
    AppJson(payload): AppJson<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    use crate::schema::orders;

    let order_id = parse_order_id(&order_id)?;
    if payload.status.is_none() && payload.call_date.is_none() && payload.delivery_date.is_none() {
        return Err(ApiError::Validation("Nothing to update".to_string()));
    }
    let status = match payload.status.as_deref() {
        Some(raw) => Some(
            OrderStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation("Invalid order status".to_string()))?,
        ),
        None => None,
    };

    let conn = &mut establish_connection();
    find_order(conn, order_id)?;

    let changeset = OrderChangeset {
        status,
        call_date: payload.call_date,
        delivery_date: payload.delivery_date,
        assigned_restaurant_id: None,
    };
    let updated: Order = diesel::update(orders::table.find(order_id))
        .set(&changeset)
        .get_result(conn)?;

    let (items, product_index) = load_order_items(conn, &updated)?;
    Ok(Json(serialize_order(updated, items, &product_index)))
}

fn validate_register_order(payload: &RegisterOrderRequest) -> Result<(), ApiError> {
    if payload.firstname.trim().is_empty() {
        return Err(ApiError::Validation(
            "Firstname must not be empty".to_string(),
        ));
    }
    if payload.lastname.trim().is_empty() {
        return Err(ApiError::Validation(
            "Lastname must not be empty".to_string(),
        ));
    }
    if payload.address.trim().is_empty() {
        return Err(ApiError::Validation(
            "Address must not be empty".to_string(),
        ));
    }
    validate_phone(&payload.phonenumber)?;
    if payload.products.is_empty() {
        return Err(ApiError::Validation(
            "Products must not be empty".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for item in &payload.products {
        if item.quantity < 1 {
            return Err(ApiError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }
        if !seen.insert(item.product) {
            return Err(ApiError::Validation(
                "Products must not repeat".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_phone(raw: &str) -> Result<(), ApiError> {
    let allowed = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '));
    let digits = raw.chars().filter(char::is_ascii_digit).count();
    if !allowed || !(10..=15).contains(&digits) {
        return Err(ApiError::Validation(
            "Phonenumber is not a valid phone number".to_string(),
        ));
    }
    Ok(())
}

fn ensure_products_exist(
    requested_ids: &[Uuid],
    product_index: &HashMap<Uuid, Product>,
) -> Result<(), ApiError> {
    if requested_ids
        .iter()
        .any(|id| !product_index.contains_key(id))
    {
        return Err(ApiError::NotFound("Product".to_string()));
    }
    Ok(())
}

fn parse_order_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse::<Uuid>()
        .map_err(|_| ApiError::Validation("Invalid order id".to_string()))
}

fn find_order(conn: &mut PgConnection, order_id: Uuid) -> Result<Order, ApiError> {
    use crate::schema::orders;

    orders::table
        .find(order_id)
        .select(Order::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Order".to_string()))
}

fn load_order_items(
    conn: &mut PgConnection,
    order: &Order,
) -> Result<(Vec<OrderProduct>, HashMap<Uuid, Product>), ApiError> {
    let items: Vec<OrderProduct> = OrderProduct::belonging_to(order)
        .select(OrderProduct::as_select())
        .load(conn)?;
    let product_index = load_products_for_items(conn, &items)?;
    Ok((items, product_index))
}

fn load_products_for_items(
    conn: &mut PgConnection,
    items: &[OrderProduct],
) -> Result<HashMap<Uuid, Product>, ApiError> {
    use crate::schema::products;

    let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
    let index = products::table
        .filter(products::id.eq_any(&product_ids))
        .select(Product::as_select())
        .load(conn)?
        .into_iter()
        .map(|product: Product| (product.id, product))
        .collect();
    Ok(index)
}

fn serialize_order(
    order: Order,
    items: Vec<OrderProduct>,
    product_index: &HashMap<Uuid, Product>,
) -> OrderResponse {
    let mut total_cost = BigDecimal::from(0);
    let mut products = Vec::with_capacity(items.len());
    for item in &items {
        total_cost += &item.price * BigDecimal::from(item.quantity);
        products.push(OrderItemResponse {
            product: item.product_id,
            name: product_index
                .get(&item.product_id)
                .map(|product| product.name.clone())
                .unwrap_or_default(),
            quantity: item.quantity,
            price: item.price.to_string(),
        });
    }

    OrderResponse {
        id: order.id,
        status: order.status.as_str().to_string(),
        payment_method: order.payment_method.as_str().to_string(),
        firstname: order.customer_firstname,
        lastname: order.customer_lastname,
        phonenumber: order.customer_phone,
        address: order.customer_address,
        comments: order.comments,
        order_date: order.order_date,
        call_date: order.call_date,
        delivery_date: order.delivery_date,
        assigned_restaurant_id: order.assigned_restaurant_id,
        products,
        total_cost: total_cost.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> RegisterOrderRequest {
        RegisterOrderRequest {
            firstname: "Ivan".to_string(),
            lastname: "Petrov".to_string(),
            phonenumber: "+7 (999) 123-45-67".to_string(),
            address: "Moscow, Tverskaya 1".to_string(),
            comments: String::new(),
            payment_method: None,
            products: vec![OrderItemRequest {
                product: Uuid::from_u128(1),
                quantity: 2,
            }],
        }
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(validate_register_order(&valid_payload()).is_ok());
    }

    #[test]
    fn rejects_blank_customer_fields() {
        let mut payload = valid_payload();
        payload.firstname = "   ".to_string();
        assert!(matches!(
            validate_register_order(&payload),
            Err(ApiError::Validation(_))
        ));

        let mut payload = valid_payload();
        payload.lastname = String::new();
        assert!(validate_register_order(&payload).is_err());

        let mut payload = valid_payload();
        payload.address = String::new();
        assert!(validate_register_order(&payload).is_err());
    }

    #[test]
    fn rejects_implausible_phone_numbers() {
        for phone in ["", "12345", "not a phone", "+7 (999) 123-45-67 ext 5"] {
            let mut payload = valid_payload();
            payload.phonenumber = phone.to_string();
            assert!(
                validate_register_order(&payload).is_err(),
                "accepted {phone:?}"
            );
        }
    }

    #[test]
    fn rejects_empty_product_list() {
        let mut payload = valid_payload();
        payload.products.clear();
        assert!(validate_register_order(&payload).is_err());
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let mut payload = valid_payload();
        payload.products[0].quantity = 0;
        assert!(validate_register_order(&payload).is_err());

        payload.products[0].quantity = -3;
        assert!(validate_register_order(&payload).is_err());
    }

    #[test]
    fn rejects_repeated_products() {
        let mut payload = valid_payload();
        payload.products.push(OrderItemRequest {
            product: Uuid::from_u128(1),
            quantity: 1,
        });
        assert!(validate_register_order(&payload).is_err());
    }

    #[test]
    fn unknown_products_are_reported_as_missing() {
        use std::str::FromStr;

        let known = Product {
            id: Uuid::from_u128(1),
            name: "Burger".to_string(),
            category_id: None,
            price: BigDecimal::from_str("120.50").unwrap(),
            image: String::new(),
            special_offer: false,
            description: String::new(),
        };
        let index = HashMap::from([(known.id, known)]);

        assert!(ensure_products_exist(&[Uuid::from_u128(1)], &index).is_ok());
        assert!(matches!(
            ensure_products_exist(&[Uuid::from_u128(1), Uuid::from_u128(9)], &index),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn totals_multiply_price_by_quantity() {
        use std::str::FromStr;

        let product = Product {
            id: Uuid::from_u128(1),
            name: "Burger".to_string(),
            category_id: None,
            price: BigDecimal::from_str("120.50").unwrap(),
            image: String::new(),
            special_offer: false,
            description: String::new(),
        };
        let order = Order {
            id: Uuid::from_u128(2),
            status: OrderStatus::New,
            payment_method: PaymentMethod::Cash,
            customer_firstname: "Ivan".to_string(),
            customer_lastname: "Petrov".to_string(),
            customer_phone: "+79991234567".to_string(),
            customer_address: "Moscow".to_string(),
            comments: String::new(),
            order_date: Utc::now(),
            call_date: None,
            delivery_date: None,
            assigned_restaurant_id: None,
        };
        let items = vec![OrderProduct {
            order_id: order.id,
            product_id: product.id,
            quantity: 3,
            price: product.price.clone(),
        }];
        let index = HashMap::from([(product.id, product)]);

        let response = serialize_order(order, items, &index);
        assert_eq!(response.total_cost, "361.50");
        assert_eq!(response.products.len(), 1);
        assert_eq!(response.products[0].name, "Burger");
        assert_eq!(response.products[0].price, "120.50");
    }
}
