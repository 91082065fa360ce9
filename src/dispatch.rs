use std::collections::HashSet;

use diesel::prelude::*;
use tracing::warn;
use uuid::Uuid;

use crate::geo::{haversine_distance, Geocoder, Point};
use crate::models::{Order, OrderRestaurantInfo, Restaurant, RestaurantMenuItem};

/// Restaurants able to prepare the whole order: a restaurant qualifies only
/// if every ordered product is on its menu and currently available.
pub fn eligible_restaurant_ids(
    product_ids: &[Uuid],
    menu_items: &[RestaurantMenuItem],
) -> HashSet<Uuid> {
    let mut eligible: Option<HashSet<Uuid>> = None;
    for product_id in product_ids {
        let offering: HashSet<Uuid> = menu_items
            .iter()
            .filter(|item| item.availability && item.product_id == *product_id)
            .map(|item| item.restaurant_id)
            .collect();
        let next = match eligible {
            Some(current) => current.intersection(&offering).copied().collect(),
            None => offering,
        };
        if next.is_empty() {
            return next;
        }
        eligible = Some(next);
    }
    eligible.unwrap_or_default()
}

pub fn load_eligible_restaurant_ids(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
) -> QueryResult<HashSet<Uuid>> {
    use crate::schema::restaurant_menu_items::dsl;

    let menu_items: Vec<RestaurantMenuItem> = dsl::restaurant_menu_items
        .filter(dsl::product_id.eq_any(product_ids))
        .filter(dsl::availability.eq(true))
        .select(RestaurantMenuItem::as_select())
        .load(conn)?;
    Ok(eligible_restaurant_ids(product_ids, &menu_items))
}

/// Builds and stores the dispatch report for a freshly registered order:
/// one row per known restaurant with its eligibility and the distance from
/// the restaurant to the customer. Distances stay `None` when either
/// address cannot be geocoded.
pub async fn create_order_restaurant_info(
    conn: &mut PgConnection,
    geocoder: &Geocoder,
    order: &Order,
) -> QueryResult<Vec<OrderRestaurantInfo>> {
    use crate::schema::{order_products, order_restaurant_infos, restaurants};

    let product_ids: Vec<Uuid> = order_products::table
        .filter(order_products::order_id.eq(order.id))
        .select(order_products::product_id)
        .load(conn)?;
    let eligible = load_eligible_restaurant_ids(conn, &product_ids)?;
    let all_restaurants: Vec<Restaurant> = restaurants::table
        .select(Restaurant::as_select())
        .load(conn)?;

    let customer_point = resolve_location(geocoder, &order.customer_address).await;

    let mut report = Vec::with_capacity(all_restaurants.len());
    for restaurant in &all_restaurants {
        let distance_km = match customer_point {
            Some(customer) => resolve_location(geocoder, &restaurant.address)
                .await
                .map(|location| round_km(haversine_distance(customer, location))),
            None => None,
        };
        report.push(OrderRestaurantInfo {
            order_id: order.id,
            restaurant_id: restaurant.id,
            can_prepare: eligible.contains(&restaurant.id),
            distance_km,
        });
    }

    diesel::insert_into(order_restaurant_infos::table)
        .values(&report)
        .execute(conn)?;
    Ok(report)
}

/// Orders a dispatch report for display: restaurants that can prepare the
/// order first, nearest first within each group, unknown distances last.
pub fn rank_dispatch_report(report: &mut [OrderRestaurantInfo]) {
    report.sort_by(|a, b| {
        b.can_prepare
            .cmp(&a.can_prepare)
            .then_with(|| match (a.distance_km, b.distance_km) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
    });
}

async fn resolve_location(geocoder: &Geocoder, address: &str) -> Option<Point> {
    match geocoder.fetch_coordinates(address).await {
        Ok(point) => point,
        Err(error) => {
            warn!(address, error = %error, "failed to geocode address");
            None
        }
    }
}

fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu_item(restaurant: u128, product: u128, availability: bool) -> RestaurantMenuItem {
        RestaurantMenuItem {
            restaurant_id: Uuid::from_u128(restaurant),
            product_id: Uuid::from_u128(product),
            availability,
        }
    }

    fn info(restaurant: u128, can_prepare: bool, distance_km: Option<f64>) -> OrderRestaurantInfo {
        OrderRestaurantInfo {
            order_id: Uuid::from_u128(100),
            restaurant_id: Uuid::from_u128(restaurant),
            can_prepare,
            distance_km,
        }
    }

    #[test]
    fn intersects_restaurants_across_products() {
        let menu = vec![
            menu_item(1, 10, true),
            menu_item(1, 11, true),
            menu_item(2, 10, true),
            menu_item(3, 11, true),
        ];
        let products = [Uuid::from_u128(10), Uuid::from_u128(11)];

        let eligible = eligible_restaurant_ids(&products, &menu);
        assert_eq!(eligible, HashSet::from([Uuid::from_u128(1)]));
    }

    #[test]
    fn unavailable_items_do_not_count() {
        let menu = vec![menu_item(1, 10, false), menu_item(2, 10, true)];
        let products = [Uuid::from_u128(10)];

        let eligible = eligible_restaurant_ids(&products, &menu);
        assert_eq!(eligible, HashSet::from([Uuid::from_u128(2)]));
    }

    #[test]
    fn product_nobody_offers_empties_the_set() {
        let menu = vec![
            menu_item(1, 10, true),
            menu_item(2, 10, true),
            menu_item(1, 11, true),
        ];
        let products = [
            Uuid::from_u128(10),
            Uuid::from_u128(99),
            Uuid::from_u128(11),
        ];

        assert!(eligible_restaurant_ids(&products, &menu).is_empty());
    }

    #[test]
    fn order_without_products_matches_no_restaurant() {
        let menu = vec![menu_item(1, 10, true)];
        assert!(eligible_restaurant_ids(&[], &menu).is_empty());
    }

    #[test]
    fn ranking_prefers_eligible_then_nearest() {
        let mut report = vec![
            info(1, false, Some(0.5)),
            info(2, true, None),
            info(3, true, Some(4.2)),
            info(4, true, Some(1.1)),
            info(5, false, None),
        ];
        rank_dispatch_report(&mut report);

        let ids: Vec<u128> = report
            .iter()
            .map(|row| row.restaurant_id.as_u128())
            .collect();
        assert_eq!(ids, vec![4, 3, 2, 1, 5]);
    }

    #[test]
    fn ranking_keeps_zero_distance_first() {
        let mut report = vec![info(1, true, Some(2.0)), info(2, true, Some(0.0))];
        rank_dispatch_report(&mut report);
        assert_eq!(report[0].restaurant_id, Uuid::from_u128(2));
    }

    #[test]
    fn rounds_distance_to_centimeters_of_a_kilometer() {
        assert_eq!(round_km(1.23456), 1.23);
        assert_eq!(round_km(1.239), 1.24);
        assert_eq!(round_km(0.0), 0.0);
    }
}
