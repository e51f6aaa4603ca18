//! Local events recommendations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Domain, default_location, location_default};
use crate::extract::{self, ExtractionError, FromItem, FromRecord, ItemView, Record};
use crate::prompt::{self, FieldHints, Prompt};
use crate::schema::{DomainKind, EVENTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    #[serde(default = "default_location")]
    pub location: String,
    pub event_date: NaiveDate,
    /// Event interests, e.g. `["music", "sports"]`.
    pub preferences: Vec<String>,
    /// Budget for events in USD.
    pub budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub description: String,
    pub date: String,
    pub location: String,
    /// Price in USD.
    pub price: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub events: Vec<Event>,
}

impl FromItem for Event {
    fn from_item(item: &ItemView<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            name: item.text("name")?,
            description: item.text("description")?,
            date: item.text("date")?,
            location: item.text("location")?,
            price: item.number("price")?,
            category: item.text("category")?,
        })
    }
}

impl FromRecord for EventResponse {
    fn from_record(record: &Record) -> Result<Self, ExtractionError> {
        Ok(Self {
            events: extract::construct::items(record, &EVENTS.root)?,
        })
    }
}

const HINTS: FieldHints = &[
    ("date", "\"YYYY-MM-DD\""),
    ("price", "0.0"),
    ("category", "\"music | sports | culture | ...\""),
];

/// Events domain wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventsDomain;

impl Domain for EventsDomain {
    type Request = EventRequest;
    type Response = EventResponse;

    const KIND: DomainKind = DomainKind::Events;
    const REQUIRED_INPUT: &'static [&'static str] =
        &["location", "event_date", "preferences", "budget"];

    fn prompt(request: &EventRequest) -> Prompt {
        let role = "You are a local events expert who knows what is happening in cities \
                    worldwide. Recommend real-sounding, specific events that match the \
                    traveler's interests and fit within their budget.";

        let user = format!(
            "Find events in {location} on {date}.\n\
             The traveler is interested in: {interests}\n\
             The budget per event is {budget:.2} USD.\n\
             Prefer a variety of categories and include the ticket price for each event.",
            location = request.location,
            date = request.event_date.format("%Y-%m-%d"),
            interests = prompt::join_list(&request.preferences),
            budget = request.budget,
        );

        Prompt {
            system: prompt::system_prompt(role, &EVENTS, HINTS),
            user,
        }
    }

    fn describe(request: &EventRequest) -> String {
        format!("{} on {}", request.location, request.event_date)
    }

    fn item_count(response: &EventResponse) -> usize {
        response.events.len()
    }

    fn input_defaults() -> Record {
        location_default()
    }
}
