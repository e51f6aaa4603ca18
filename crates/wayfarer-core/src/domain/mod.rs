//! Domain definitions: request/response models and per-domain wiring.
//!
//! The three domains differ only in their inbound request shape, the fields
//! that request must carry, the [`DomainSchema`] their result is validated
//! against, and how the generator prompt is phrased. [`Domain`] captures
//! exactly those differences so a single agent implementation serves all
//! three.

pub mod events;
pub mod itinerary;
pub mod restaurants;

use serde::Serialize;
use serde_json::Value;
use serde::de::DeserializeOwned;

use crate::extract::{FromRecord, Record};
use crate::prompt::Prompt;
use crate::schema::{DomainKind, DomainSchema};

pub use events::{Event, EventRequest, EventResponse, EventsDomain};
pub use itinerary::{Activity, DayPlan, ItineraryDomain, ItineraryRequest, ItineraryResponse};
pub use restaurants::{Restaurant, RestaurantRequest, RestaurantResponse, RestaurantsDomain};

/// Per-domain wiring consumed by [`crate::agent::DomainAgent`].
pub trait Domain: Send + Sync + 'static {
    /// Inbound request model.
    type Request: DeserializeOwned + Serialize + Send + Sync;
    /// Typed result built from validated generator output.
    type Response: FromRecord + Serialize + DeserializeOwned + Send;

    const KIND: DomainKind;

    /// Fields the inbound request must carry. Checked for presence only.
    const REQUIRED_INPUT: &'static [&'static str];

    fn schema() -> &'static DomainSchema {
        Self::KIND.schema()
    }

    /// Phrase the generator prompt for `request`.
    fn prompt(request: &Self::Request) -> Prompt;

    /// Short description of the request for log lines.
    fn describe(request: &Self::Request) -> String;

    /// Number of top-level items in a result, for log lines.
    fn item_count(response: &Self::Response) -> usize;

    /// Values for request fields the caller may omit. Merged into the
    /// inbound body before the presence check.
    fn input_defaults() -> Record {
        Record::new()
    }
}

/// Fill in absent keys of `input` from [`Domain::input_defaults`]. Keys the
/// caller sent, including explicit nulls, are left alone.
pub fn with_defaults<D: Domain>(mut input: Record) -> Record {
    for (key, value) in D::input_defaults() {
        input.entry(key).or_insert(value);
    }
    input
}

fn default_location() -> String {
    "Seattle".to_string()
}

fn location_default() -> Record {
    let mut defaults = Record::new();
    defaults.insert("location".into(), Value::String(default_location()));
    defaults
}
