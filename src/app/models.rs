use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Banner {
    /// Banner headline
    pub title: String,
    /// URL of the banner image
    pub src: String,
    /// Banner caption
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    /// Unique identifier for the category
    pub id: Uuid,
    /// Name of the category
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    /// Name of the category
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCategoryResponse {
    /// Unique identifier for the category
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListCategoriesResponse {
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    /// Unique identifier for the product
    pub id: Uuid,
    /// Name of the product
    pub name: String,
    /// Price of the product (as string)
    pub price: String,
    /// URL of the product image
    pub image: String,
    /// Whether the product is promoted as a special offer
    pub special_offer: bool,
    /// Description of the product
    pub description: String,
    /// Category of the product, if assigned
    pub category: Option<CategoryResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    /// Name of the product
    pub name: String,
    /// Category to file the product under
    pub category_id: Option<Uuid>,
    /// Price of the product (as string)
    pub price: String,
    /// URL of the product image
    #[serde(default)]
    pub image: String,
    /// Whether the product is promoted as a special offer
    #[serde(default)]
    pub special_offer: bool,
    /// Description of the product
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateProductResponse {
    /// Unique identifier for the product
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuEntryRequest {
    /// Product to put on the menu
    pub product: Uuid,
    /// Whether the product is currently available at this restaurant
    #[serde(default = "default_true")]
    pub availability: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    /// Name of the restaurant
    pub name: String,
    /// Address of the restaurant
    pub address: String,
    /// Contact phone of the restaurant
    #[serde(default)]
    pub contact_phone: String,
    /// Initial menu of the restaurant
    #[serde(default)]
    pub menu: Vec<MenuEntryRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateRestaurantResponse {
    /// Unique identifier for the restaurant
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuEntryResponse {
    /// Product on the menu
    pub product: Uuid,
    /// Name of the product
    pub name: String,
    /// Price of the product (as string)
    pub price: String,
    /// Whether the product is currently available at this restaurant
    pub availability: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantResponse {
    /// Unique identifier for the restaurant
    pub id: Uuid,
    /// Name of the restaurant
    pub name: String,
    /// Address of the restaurant
    pub address: String,
    /// Contact phone of the restaurant
    pub contact_phone: String,
    /// Menu of the restaurant
    pub menu: Vec<MenuEntryResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRestaurantsResponse {
    pub restaurants: Vec<RestaurantResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetAvailabilityRequest {
    /// Whether the product is currently available at this restaurant
    pub availability: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    /// Product being ordered
    pub product: Uuid,
    /// Number of units ordered
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterOrderRequest {
    /// First name of the customer
    pub firstname: String,
    /// Last name of the customer
    pub lastname: String,
    /// Contact phone of the customer
    pub phonenumber: String,
    /// Delivery address
    pub address: String,
    /// Free-form comment left by the customer
    #[serde(default)]
    pub comments: String,
    /// Payment method, either "ONLINE" or "CASH"; defaults to "CASH"
    pub payment_method: Option<String>,
    /// Ordered products
    pub products: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    /// Product being ordered
    pub product: Uuid,
    /// Name of the product
    pub name: String,
    /// Number of units ordered
    pub quantity: i32,
    /// Price per unit at registration time (as string)
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    /// Unique identifier for the order
    pub id: Uuid,
    /// Processing status of the order
    pub status: String,
    /// Payment method of the order
    pub payment_method: String,
    /// First name of the customer
    pub firstname: String,
    /// Last name of the customer
    pub lastname: String,
    /// Contact phone of the customer
    pub phonenumber: String,
    /// Delivery address
    pub address: String,
    /// Free-form comment left by the customer
    pub comments: String,
    /// When the order was registered
    pub order_date: DateTime<Utc>,
    /// When the manager called the customer back
    pub call_date: Option<DateTime<Utc>>,
    /// When the order was delivered
    pub delivery_date: Option<DateTime<Utc>>,
    /// Restaurant assigned to prepare the order
    pub assigned_restaurant_id: Option<Uuid>,
    /// Ordered products
    pub products: Vec<OrderItemResponse>,
    /// Total cost of the order (as string)
    pub total_cost: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignRestaurantRequest {
    /// Restaurant that will prepare the order
    pub restaurant_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    /// New processing status of the order
    pub status: Option<String>,
    /// When the manager called the customer back
    pub call_date: Option<DateTime<Utc>>,
    /// When the order was delivered
    pub delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantOption {
    /// Unique identifier for the restaurant
    pub id: Uuid,
    /// Name of the restaurant
    pub name: String,
    /// Address of the restaurant
    pub address: String,
    /// Whether the restaurant offers every product of the order
    pub can_prepare: bool,
    /// Distance from the restaurant to the customer in kilometers,
    /// absent when an address could not be geocoded
    pub distance_km: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderRestaurantsResponse {
    pub restaurants: Vec<RestaurantOption>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}
