use std::str::FromStr;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ApiError, AppJson};
use crate::establish_connection;
use crate::models::{Product, ProductCategory};

use super::models::*;
use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/categories", post(create_category).get(list_categories))
}

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "Products currently available for order", body = [ProductResponse]),
    ),
    tag = "storefront"
)]
#[instrument]
pub async fn list_products() -> Result<Json<Vec<ProductResponse>>, ApiError> {
    use crate::schema::{product_categories, products, restaurant_menu_items};

    let conn = &mut establish_connection();

    // A product is sellable as long as at least one restaurant has it
    // available on its menu.
    let available_ids = restaurant_menu_items::table
        .filter(restaurant_menu_items::availability.eq(true))
        .select(restaurant_menu_items::product_id);

    let rows: Vec<(Product, Option<ProductCategory>)> = products::table
        .filter(products::id.eq_any(available_ids))
        .left_join(product_categories::table)
        .select((
            Product::as_select(),
            Option::<ProductCategory>::as_select(),
        ))
        .load(conn)?;

    Ok(Json(
        rows.into_iter()
            .map(|(product, category)| ProductResponse {
                id: product.id,
                name: product.name,
                price: product.price.to_string(),
                image: product.image,
                special_offer: product.special_offer,
                description: product.description,
                category: category.map(|category| CategoryResponse {
                    id: category.id,
                    name: category.name,
                }),
            })
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created successfully", body = CreateCategoryResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
    ),
    tag = "catalog"
)]
#[instrument]
pub async fn create_category(
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<Json<CreateCategoryResponse>, ApiError> {
    use crate::schema::product_categories;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Category name must not be empty".to_string(),
        ));
    }

    let category = ProductCategory {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
    };

    let conn = &mut establish_connection();
    diesel::insert_into(product_categories::table)
        .values(&category)
        .execute(conn)?;

    Ok(Json(CreateCategoryResponse { id: category.id }))
}

#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "List of product categories", body = ListCategoriesResponse),
    ),
    tag = "catalog"
)]
#[instrument]
pub async fn list_categories() -> Result<Json<ListCategoriesResponse>, ApiError> {
    use crate::schema::product_categories;

    let conn = &mut establish_connection();
    let categories: Vec<ProductCategory> = product_categories::table
        .select(ProductCategory::as_select())
        .order(product_categories::name.asc())
        .load(conn)?;

    Ok(Json(ListCategoriesResponse {
        categories: categories
            .into_iter()
            .map(|category| CategoryResponse {
                id: category.id,
                name: category.name,
            })
            .collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created successfully", body = CreateProductResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 404, description = "Category not found", body = ApiErrorResponse),
    ),
    tag = "catalog"
)]
#[instrument]
pub async fn create_product(
    AppJson(payload): AppJson<CreateProductRequest>,
) -> Result<Json<CreateProductResponse>, ApiError> {
    use crate::schema::{product_categories, products};

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Product name must not be empty".to_string(),
        ));
    }
    let price = BigDecimal::from_str(&payload.price)
        .map_err(|_| ApiError::Validation("Invalid price".to_string()))?;
    if price < BigDecimal::from(0) {
        return Err(ApiError::Validation(
            "Price must not be negative".to_string(),
        ));
    }

    let conn = &mut establish_connection();

    if let Some(category_id) = payload.category_id {
        product_categories::table
            .find(category_id)
            .select(ProductCategory::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| ApiError::NotFound("Category".to_string()))?;
    }

    let product = Product {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        category_id: payload.category_id,
        price,
        image: payload.image,
        special_offer: payload.special_offer,
        description: payload.description,
    };
    diesel::insert_into(products::table)
        .values(&product)
        .execute(conn)?;

    Ok(Json(CreateProductResponse { id: product.id }))
}
