use std::io::Write;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
};
use uuid::Uuid;

use crate::schema::{
    order_products, order_restaurant_infos, orders, product_categories, products,
    restaurant_menu_items, restaurants,
};

#[derive(FromSqlRow, AsExpression, PartialEq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::OrderStatus)]
pub enum OrderStatus {
    New,
    ManagerReview,
    RestaurantProcessing,
    CourierDelivery,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::ManagerReview => "MANAGER_REVIEW",
            OrderStatus::RestaurantProcessing => "RESTAURANT_PROCESSING",
            OrderStatus::CourierDelivery => "COURIER_DELIVERY",
            OrderStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NEW" => Some(OrderStatus::New),
            "MANAGER_REVIEW" => Some(OrderStatus::ManagerReview),
            "RESTAURANT_PROCESSING" => Some(OrderStatus::RestaurantProcessing),
            "COURIER_DELIVERY" => Some(OrderStatus::CourierDelivery),
            "COMPLETED" => Some(OrderStatus::Completed),
            _ => None,
        }
    }
}

impl ToSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"NEW" => Ok(OrderStatus::New),
            b"MANAGER_REVIEW" => Ok(OrderStatus::ManagerReview),
            b"RESTAURANT_PROCESSING" => Ok(OrderStatus::RestaurantProcessing),
            b"COURIER_DELIVERY" => Ok(OrderStatus::CourierDelivery),
            b"COMPLETED" => Ok(OrderStatus::Completed),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(FromSqlRow, AsExpression, PartialEq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::PaymentMethod)]
pub enum PaymentMethod {
    Online,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "ONLINE",
            PaymentMethod::Cash => "CASH",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ONLINE" => Some(PaymentMethod::Online),
            "CASH" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }
}

impl ToSql<crate::schema::sql_types::PaymentMethod, Pg> for PaymentMethod {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::PaymentMethod, Pg> for PaymentMethod {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"ONLINE" => Ok(PaymentMethod::Online),
            b"CASH" => Ok(PaymentMethod::Cash),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub contact_phone: String,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = product_categories)]
pub struct ProductCategory {
    pub id: Uuid,
    pub name: String,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(ProductCategory, foreign_key = category_id))]
#[diesel(table_name = products)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub price: BigDecimal,
    pub image: String,
    pub special_offer: bool,
    pub description: String,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(belongs_to(Product))]
#[diesel(table_name = restaurant_menu_items)]
#[diesel(primary_key(restaurant_id, product_id))]
pub struct RestaurantMenuItem {
    pub restaurant_id: Uuid,
    pub product_id: Uuid,
    pub availability: bool,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq)]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: Uuid,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub customer_firstname: String,
    pub customer_lastname: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub comments: String,
    pub order_date: DateTime<Utc>,
    pub call_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub assigned_restaurant_id: Option<Uuid>,
}

/// Partial update applied by the order management endpoints. `None` fields
/// are left untouched.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = orders)]
pub struct OrderChangeset {
    pub status: Option<OrderStatus>,
    pub call_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub assigned_restaurant_id: Option<Uuid>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(belongs_to(Product))]
#[diesel(table_name = order_products)]
#[diesel(primary_key(order_id, product_id))]
pub struct OrderProduct {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = order_restaurant_infos)]
#[diesel(primary_key(order_id, restaurant_id))]
pub struct OrderRestaurantInfo {
    pub order_id: Uuid,
    pub restaurant_id: Uuid,
    pub can_prepare: bool,
    pub distance_km: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_round_trips_through_text() {
        for status in [
            OrderStatus::New,
            OrderStatus::ManagerReview,
            OrderStatus::RestaurantProcessing,
            OrderStatus::CourierDelivery,
            OrderStatus::Completed,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("CANCELLED"), None);
    }

    #[test]
    fn payment_method_round_trips_through_text() {
        for method in [PaymentMethod::Online, PaymentMethod::Cash] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::parse("CARD"), None);
    }
}
