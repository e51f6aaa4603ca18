//! Trip itinerary: a day-by-day plan of activities.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Domain, default_location};
use crate::extract::{self, ExtractionError, FromItem, FromRecord, ItemView, Record};
use crate::prompt::{self, FieldHints, Prompt};
use crate::schema::{DomainKind, ITINERARY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryRequest {
    /// City or destination name.
    #[serde(default = "default_location")]
    pub destination: String,
    pub start_date: NaiveDate,
    /// Number of days to plan.
    pub days: u32,
    /// Travel interests, e.g. `["culture", "food"]`.
    pub preferences: Vec<String>,
    /// Optional total budget in USD.
    #[serde(default)]
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// `YYYY-MM-DD`, as reported by the generator.
    pub date: String,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub days: Vec<DayPlan>,
}

impl FromItem for Activity {
    fn from_item(item: &ItemView<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            name: item.text("name")?,
            description: item.text("description")?,
            start_time: item.text("start_time")?,
            end_time: item.text("end_time")?,
            location: item.text("location")?,
            category: item.text("category")?,
        })
    }
}

impl FromItem for DayPlan {
    fn from_item(item: &ItemView<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            date: item.text("date")?,
            activities: item.children()?,
        })
    }
}

impl FromRecord for ItineraryResponse {
    fn from_record(record: &Record) -> Result<Self, ExtractionError> {
        Ok(Self {
            days: extract::construct::items(record, &ITINERARY.root)?,
        })
    }
}

const HINTS: FieldHints = &[
    ("date", "\"YYYY-MM-DD\""),
    ("start_time", "\"HH:MM\""),
    ("end_time", "\"HH:MM\""),
    ("category", "\"culture | food | nature | shopping | ...\""),
];

/// Itinerary domain wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItineraryDomain;

impl Domain for ItineraryDomain {
    type Request = ItineraryRequest;
    type Response = ItineraryResponse;

    const KIND: DomainKind = DomainKind::Itinerary;
    const REQUIRED_INPUT: &'static [&'static str] =
        &["destination", "start_date", "days", "preferences"];

    fn prompt(request: &ItineraryRequest) -> Prompt {
        let role = format!(
            "You are an expert travel planner with deep knowledge of destinations worldwide. \
             Create a detailed {days}-day itinerary that maximizes the traveler's experience \
             based on their interests. Consider timing, location proximity, and local customs.",
            days = request.days
        );

        let mut user = format!(
            "Create a {days}-day itinerary for {city} starting on {start}.\n\
             The traveler is interested in: {interests}\n",
            days = request.days,
            city = request.destination,
            start = request.start_date.format("%Y-%m-%d"),
            interests = prompt::join_list(&request.preferences),
        );
        if let Some(budget) = request.budget {
            user.push_str(&format!("The total budget is {budget:.2} USD.\n"));
        }
        user.push_str(
            "Please ensure activities are well-timed and logically ordered. \
             Include a mix of activities based on the interests provided.",
        );

        Prompt {
            system: prompt::system_prompt(&role, &ITINERARY, HINTS),
            user,
        }
    }

    fn describe(request: &ItineraryRequest) -> String {
        format!("{} ({} days from {})", request.destination, request.days, request.start_date)
    }

    fn item_count(response: &ItineraryResponse) -> usize {
        response.days.len()
    }

    fn input_defaults() -> Record {
        let mut defaults = Record::new();
        defaults.insert("destination".into(), default_location().into());
        defaults
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request() -> ItineraryRequest {
        serde_json::from_value(json!({
            "destination": "Seattle",
            "start_date": "2024-04-01",
            "days": 2,
            "preferences": ["culture", "food"]
        }))
        .unwrap()
    }

    #[test]
    fn request_defaults_destination_and_budget() {
        let req: ItineraryRequest = serde_json::from_value(json!({
            "start_date": "2024-04-01",
            "days": 3,
            "preferences": []
        }))
        .unwrap();
        assert_eq!(req.destination, "Seattle");
        assert!(req.budget.is_none());
    }

    #[test]
    fn request_rejects_bad_date() {
        let result = serde_json::from_value::<ItineraryRequest>(json!({
            "start_date": "April 1st",
            "days": 3,
            "preferences": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn prompt_mentions_request_details() {
        let prompt = ItineraryDomain::prompt(&request());
        assert!(prompt.user.contains("2-day itinerary for Seattle"));
        assert!(prompt.user.contains("2024-04-01"));
        assert!(prompt.user.contains("culture, food"));
        assert!(!prompt.user.contains("budget"));
        assert!(prompt.system.contains("\"activities\": ["));
        assert!(prompt.system.contains("\"start_time\": \"HH:MM\""));
    }

    #[test]
    fn prompt_includes_budget_when_present() {
        let req = ItineraryRequest {
            budget: Some(500.0),
            ..request()
        };
        assert!(ItineraryDomain::prompt(&req).user.contains("500.00 USD"));
    }

    #[test]
    fn builds_nested_response() {
        let record = json!({
            "days": [{
                "date": "2024-04-01",
                "activities": [{
                    "name": "Space Needle",
                    "description": "Observation deck",
                    "start_time": "09:00",
                    "end_time": "11:00",
                    "location": "Seattle Center",
                    "category": "landmarks"
                }]
            }]
        });
        let response = ItineraryResponse::from_record(record.as_object().unwrap()).unwrap();
        assert_eq!(ItineraryDomain::item_count(&response), 1);
        assert_eq!(response.days[0].activities[0].category, "landmarks");
    }
}
