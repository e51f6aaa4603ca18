//! Shared test utilities for wayfarer integration tests.
//!
//! Provides generator doubles that never touch the network and the canned
//! generator outputs and request bodies the tests run through the pipeline.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use wayfarer_core::extract::Record;
use wayfarer_core::generator::{GenerationRequest, Generator, GeneratorError};

// ---------------------------------------------------------------------------
// Generator doubles
// ---------------------------------------------------------------------------

/// Replays a fixed list of completions, one per call, then repeats the last.
///
/// Every request is recorded so tests can inspect the rendered prompts.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A generator that always answers `reply`.
    pub fn always(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new([reply]))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.replies.lock().unwrap().pop_front() {
            *last = Some(next);
        }
        last.clone().ok_or(GeneratorError::EmptyResponse)
    }
}

/// Never completes. Used to exercise timeouts and cancellation.
#[derive(Debug, Default)]
pub struct PendingGenerator {
    calls: AtomicUsize,
}

impl PendingGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for PendingGenerator {
    fn name(&self) -> &str {
        "pending"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Fails every call with an HTTP status error.
#[derive(Debug)]
pub struct FailingGenerator {
    status: u16,
    body: String,
}

impl FailingGenerator {
    pub fn new(status: u16, body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            status,
            body: body.into(),
        })
    }
}

#[async_trait]
impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
        Err(GeneratorError::Status {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Generator output fixtures
// ---------------------------------------------------------------------------

/// A single well-formed event.
pub const ONE_EVENT: &str = r#"{"events":[{"name":"A","description":"d","date":"2024-04-01","location":"L","price":10.0,"category":"music"}]}"#;

/// Events output without the container key.
pub const WRONG_CONTAINER: &str = r#"{"stuff":[]}"#;

/// Event 0 lacks `category`.
pub const EVENT_MISSING_CATEGORY: &str = r#"{"events":[{"name":"A","description":"d","date":"2024-04-01","location":"L","price":10.0}]}"#;

/// Day 0 lacks its `activities` container.
pub const DAY_WITHOUT_ACTIVITIES: &str = r#"{"days":[{"date":"2024-04-01"}]}"#;

/// Generator chatter with no structured data.
pub const PROSE: &str = "Sure! Here are some events you might like.";

/// A two-day itinerary with two activities on the first day.
pub fn itinerary_output() -> String {
    json!({
        "days": [
            {
                "date": "2024-04-01",
                "activities": [
                    activity("Pike Place Market", "09:00", "11:00", "food"),
                    activity("Seattle Art Museum", "12:00", "14:00", "culture"),
                ]
            },
            {
                "date": "2024-04-02",
                "activities": [activity("Discovery Park", "10:00", "13:00", "nature")]
            }
        ]
    })
    .to_string()
}

/// Two restaurants, one with `opening_hours` and one without.
pub fn restaurants_output() -> String {
    json!({
        "restaurants": [
            {
                "name": "Canlis",
                "cuisine": "american",
                "rating": 4.8,
                "price_range": "$$$$",
                "address": "2576 Aurora Ave N",
                "reservation_available": true,
                "opening_hours": "17:00-22:00"
            },
            {
                "name": "Il Corvo",
                "cuisine": "italian",
                "rating": "4.6",
                "price_range": "$$",
                "address": "217 James St",
                "reservation_available": false
            }
        ]
    })
    .to_string()
}

/// Wrap `body` in a markdown code fence the way chat models often do.
pub fn fenced(body: &str) -> String {
    format!("```json\n{body}\n```")
}

fn activity(name: &str, start: &str, end: &str, category: &str) -> Value {
    json!({
        "name": name,
        "description": format!("Visit {name}"),
        "start_time": start,
        "end_time": end,
        "location": "Seattle",
        "category": category,
    })
}

// ---------------------------------------------------------------------------
// Request fixtures
// ---------------------------------------------------------------------------

pub fn itinerary_input() -> Record {
    record(json!({
        "destination": "Seattle",
        "start_date": "2024-04-01",
        "days": 2,
        "preferences": ["food", "culture"]
    }))
}

pub fn events_input() -> Record {
    record(json!({
        "location": "Seattle",
        "event_date": "2024-04-01",
        "preferences": ["music"],
        "budget": 100.0
    }))
}

pub fn restaurants_input() -> Record {
    record(json!({
        "location": "Seattle",
        "date": "2024-04-01",
        "cuisine_preferences": ["italian", "american"],
        "price_range": "$$",
        "party_size": 4
    }))
}

/// Convert a JSON object literal into a [`Record`].
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
