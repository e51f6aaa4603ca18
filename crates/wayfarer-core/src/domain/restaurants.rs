//! Restaurant search.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Domain, default_location, location_default};
use crate::extract::{self, ExtractionError, FromItem, FromRecord, ItemView, Record};
use crate::prompt::{self, FieldHints, Prompt};
use crate::schema::{DomainKind, RESTAURANTS};

fn default_cuisines() -> Vec<String> {
    ["italian", "japanese", "american"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_price_range() -> String {
    "$$".to_string()
}

fn default_party_size() -> Option<u32> {
    Some(2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRequest {
    #[serde(default = "default_location")]
    pub location: String,
    pub date: NaiveDate,
    #[serde(default = "default_cuisines")]
    pub cuisine_preferences: Vec<String>,
    /// One of `$`, `$$`, `$$$`, `$$$$`.
    #[serde(default = "default_price_range")]
    pub price_range: String,
    #[serde(default = "default_party_size")]
    pub party_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    pub cuisine: String,
    /// Rating out of 5.
    pub rating: f64,
    pub price_range: String,
    pub address: String,
    pub reservation_available: bool,
    pub opening_hours: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantResponse {
    pub restaurants: Vec<Restaurant>,
}

impl FromItem for Restaurant {
    fn from_item(item: &ItemView<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            name: item.text("name")?,
            cuisine: item.text("cuisine")?,
            rating: item.number("rating")?,
            price_range: item.text("price_range")?,
            address: item.text("address")?,
            reservation_available: item.flag("reservation_available")?,
            opening_hours: item.optional_text("opening_hours")?,
        })
    }
}

impl FromRecord for RestaurantResponse {
    fn from_record(record: &Record) -> Result<Self, ExtractionError> {
        Ok(Self {
            restaurants: extract::construct::items(record, &RESTAURANTS.root)?,
        })
    }
}

const HINTS: FieldHints = &[
    ("rating", "4.5"),
    ("price_range", "\"$ | $$ | $$$ | $$$$\""),
    ("reservation_available", "true"),
    ("opening_hours", "\"11:00 AM - 10:00 PM\""),
];

/// Restaurants domain wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestaurantsDomain;

impl Domain for RestaurantsDomain {
    type Request = RestaurantRequest;
    type Response = RestaurantResponse;

    const KIND: DomainKind = DomainKind::Restaurants;
    const REQUIRED_INPUT: &'static [&'static str] =
        &["location", "date", "cuisine_preferences", "price_range"];

    fn prompt(request: &RestaurantRequest) -> Prompt {
        let role = "You are a restaurant critic and dining concierge with deep knowledge of \
                    local food scenes. Recommend restaurants that match the diner's cuisine \
                    preferences and price range.";

        let mut user = format!(
            "Recommend restaurants in {location} for {date}.\n\
             Preferred cuisines: {cuisines}\n\
             Price range: {price}\n",
            location = request.location,
            date = request.date.format("%Y-%m-%d"),
            cuisines = prompt::join_list(&request.cuisine_preferences),
            price = request.price_range,
        );
        if let Some(size) = request.party_size {
            user.push_str(&format!("Party size: {size}\n"));
        }
        user.push_str("Say whether each restaurant takes reservations.");

        Prompt {
            system: prompt::system_prompt(role, &RESTAURANTS, HINTS),
            user,
        }
    }

    fn describe(request: &RestaurantRequest) -> String {
        format!("{} on {}", request.location, request.date)
    }

    fn item_count(response: &RestaurantResponse) -> usize {
        response.restaurants.len()
    }

    fn input_defaults() -> Record {
        let mut defaults = location_default();
        defaults.insert("cuisine_preferences".into(), default_cuisines().into());
        defaults.insert("price_range".into(), default_price_range().into());
        defaults.insert("party_size".into(), default_party_size().into());
        defaults
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_applies_defaults() {
        let req: RestaurantRequest =
            serde_json::from_value(json!({ "date": "2024-04-01" })).unwrap();
        assert_eq!(req.location, "Seattle");
        assert_eq!(req.cuisine_preferences, vec!["italian", "japanese", "american"]);
        assert_eq!(req.price_range, "$$");
        assert_eq!(req.party_size, Some(2));
    }

    #[test]
    fn input_defaults_match_serde_defaults() {
        let merged = crate::domain::with_defaults::<RestaurantsDomain>(
            json!({ "date": "2024-04-01", "price_range": "$" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        for field in RestaurantsDomain::REQUIRED_INPUT {
            assert!(merged.contains_key(*field), "{field}");
        }
        assert_eq!(merged["price_range"], "$");

        let from_merged: RestaurantRequest =
            serde_json::from_value(serde_json::Value::Object(merged)).unwrap();
        let from_serde: RestaurantRequest =
            serde_json::from_value(json!({ "date": "2024-04-01", "price_range": "$" })).unwrap();
        assert_eq!(from_merged, from_serde);
    }

    #[test]
    fn prompt_mentions_request_details() {
        let req: RestaurantRequest = serde_json::from_value(json!({
            "location": "Portland",
            "date": "2024-04-01",
            "cuisine_preferences": ["thai"],
            "price_range": "$$$",
            "party_size": 4
        }))
        .unwrap();
        let prompt = RestaurantsDomain::prompt(&req);
        assert!(prompt.user.contains("restaurants in Portland for 2024-04-01"));
        assert!(prompt.user.contains("Preferred cuisines: thai"));
        assert!(prompt.user.contains("Party size: 4"));
        assert!(prompt.system.contains("(optional)"));
    }

    #[test]
    fn opening_hours_is_optional() {
        let record = json!({
            "restaurants": [{
                "name": "Canlis",
                "cuisine": "american",
                "rating": 4.8,
                "price_range": "$$$$",
                "address": "2576 Aurora Ave N",
                "reservation_available": true
            }]
        });
        let response = RestaurantResponse::from_record(record.as_object().unwrap()).unwrap();
        assert!(response.restaurants[0].opening_hours.is_none());
        assert!(response.restaurants[0].reservation_available);
    }
}
