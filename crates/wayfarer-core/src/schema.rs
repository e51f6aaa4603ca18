//! Domain schema registry.
//!
//! Each domain (itinerary, events, restaurants) has exactly one
//! [`DomainSchema`] describing the shape the generator output must have:
//! a top-level container key holding a sequence of items, the fields every
//! item must carry, and optionally a nested child container inside each item.
//!
//! The schemas are `static` values: built at compile time, shared read-only
//! by every request, never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DomainKind
// ---------------------------------------------------------------------------

/// The three request domains served by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    Itinerary,
    Events,
    Restaurants,
}

impl DomainKind {
    /// Every domain, in a stable order.
    pub const ALL: [DomainKind; 3] = [Self::Itinerary, Self::Events, Self::Restaurants];

    /// The schema registered for this domain.
    pub fn schema(self) -> &'static DomainSchema {
        match self {
            Self::Itinerary => &ITINERARY,
            Self::Events => &EVENTS,
            Self::Restaurants => &RESTAURANTS,
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Itinerary => "itinerary",
            Self::Events => "events",
            Self::Restaurants => "restaurants",
        };
        f.write_str(s)
    }
}

impl FromStr for DomainKind {
    type Err = DomainKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "itinerary" => Ok(Self::Itinerary),
            "events" => Ok(Self::Events),
            "restaurants" => Ok(Self::Restaurants),
            other => Err(DomainKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`DomainKind`] string.
#[derive(Debug, Clone)]
pub struct DomainKindParseError(pub String);

impl fmt::Display for DomainKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid domain: {:?} (expected itinerary, events, or restaurants)",
            self.0
        )
    }
}

impl std::error::Error for DomainKindParseError {}

// ---------------------------------------------------------------------------
// Schema types
// ---------------------------------------------------------------------------

/// A container key, the fields each of its items must carry, and an optional
/// child container nested inside every item.
#[derive(Debug, PartialEq, Eq)]
pub struct ContainerSchema {
    /// Key under which the sequence of items is stored.
    pub key: &'static str,
    /// Field names every item must have. Presence only, not type.
    pub required: &'static [&'static str],
    /// Child container that every item must itself contain.
    pub child: Option<&'static ContainerSchema>,
}

/// The two schema shapes a domain can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaShape {
    /// One container of flat items.
    Flat,
    /// A container whose items each hold a child container.
    Nested,
}

/// Declarative description of the result shape for one domain.
#[derive(Debug, PartialEq, Eq)]
pub struct DomainSchema {
    pub domain: DomainKind,
    pub root: ContainerSchema,
}

impl DomainSchema {
    /// Top-level container key (e.g. `"events"`).
    pub fn container_key(&self) -> &'static str {
        self.root.key
    }

    pub fn shape(&self) -> SchemaShape {
        if self.root.child.is_some() {
            SchemaShape::Nested
        } else {
            SchemaShape::Flat
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

static ACTIVITIES: ContainerSchema = ContainerSchema {
    key: "activities",
    required: &[
        "name",
        "description",
        "start_time",
        "end_time",
        "location",
        "category",
    ],
    child: None,
};

/// Itinerary: `days[]`, each day holding `activities[]`.
pub static ITINERARY: DomainSchema = DomainSchema {
    domain: DomainKind::Itinerary,
    root: ContainerSchema {
        key: "days",
        required: &["date"],
        child: Some(&ACTIVITIES),
    },
};

/// Local events: flat `events[]`.
pub static EVENTS: DomainSchema = DomainSchema {
    domain: DomainKind::Events,
    root: ContainerSchema {
        key: "events",
        required: &["name", "description", "date", "location", "price", "category"],
        child: None,
    },
};

/// Restaurant search: flat `restaurants[]`. `opening_hours` is optional.
pub static RESTAURANTS: DomainSchema = DomainSchema {
    domain: DomainKind::Restaurants,
    root: ContainerSchema {
        key: "restaurants",
        required: &[
            "name",
            "cuisine",
            "rating",
            "price_range",
            "address",
            "reservation_available",
        ],
        child: None,
    },
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_kind_round_trips_through_strings() {
        for kind in DomainKind::ALL {
            let parsed: DomainKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn domain_kind_rejects_unknown() {
        let err = "hotels".parse::<DomainKind>().unwrap_err();
        assert!(err.to_string().contains("hotels"));
    }

    #[test]
    fn each_kind_maps_to_its_own_schema() {
        for kind in DomainKind::ALL {
            assert_eq!(kind.schema().domain, kind);
        }
    }

    #[test]
    fn itinerary_is_the_only_nested_schema() {
        assert_eq!(ITINERARY.shape(), SchemaShape::Nested);
        assert_eq!(EVENTS.shape(), SchemaShape::Flat);
        assert_eq!(RESTAURANTS.shape(), SchemaShape::Flat);

        let child = ITINERARY.root.child.unwrap();
        assert_eq!(child.key, "activities");
        assert!(child.required.contains(&"category"));
    }

    #[test]
    fn restaurants_do_not_require_opening_hours() {
        assert!(!RESTAURANTS.root.required.contains(&"opening_hours"));
    }
}
