pub mod banners;
pub mod models;
pub mod orders;
pub mod products;
pub mod restaurants;
pub mod server;

// Re-export routers for easier importing
pub use banners::router as banners_router;
pub use orders::router as orders_router;
pub use products::router as products_router;
pub use restaurants::router as restaurants_router;

use utoipa::OpenApi;

use crate::geo::Geocoder;

#[derive(Clone)]
pub struct AppState {
    pub geocoder: Geocoder,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        banners::list_banners,
        products::list_products,
        products::create_category,
        products::list_categories,
        products::create_product,
        restaurants::create_restaurant,
        restaurants::list_restaurants,
        restaurants::get_restaurant,
        restaurants::set_menu_availability,
        orders::register_order,
        orders::list_orders,
        orders::get_order,
        orders::order_restaurants,
        orders::assign_restaurant,
        orders::update_order,
    ),
    components(
        schemas(
            models::Banner,
            models::CategoryResponse,
            models::CreateCategoryRequest,
            models::CreateCategoryResponse,
            models::ListCategoriesResponse,
            models::ProductResponse,
            models::CreateProductRequest,
            models::CreateProductResponse,
            models::MenuEntryRequest,
            models::CreateRestaurantRequest,
            models::CreateRestaurantResponse,
            models::MenuEntryResponse,
            models::RestaurantResponse,
            models::ListRestaurantsResponse,
            models::SetAvailabilityRequest,
            models::OrderItemRequest,
            models::RegisterOrderRequest,
            models::OrderItemResponse,
            models::OrderResponse,
            models::ListOrdersResponse,
            models::AssignRestaurantRequest,
            models::UpdateOrderRequest,
            models::RestaurantOption,
            models::OrderRestaurantsResponse,
            models::ApiErrorResponse
        )
    ),
    tags(
        (name = "storefront", description = "Public storefront endpoints"),
        (name = "catalog", description = "Product catalog management endpoints"),
        (name = "restaurants", description = "Restaurant management endpoints"),
        (name = "orders", description = "Order management endpoints")
    ),
    info(
        title = "Foodcart Service",
        description = "Food ordering backend with restaurant dispatch",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;
