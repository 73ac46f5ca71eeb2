// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Geo-tagged records the engine operates on.
//!
//! Four collections are supported:
//! - [`Resort`] - ski resorts with optional pass-network affiliation
//! - [`Clinic`] - dialysis clinics classified by provider chain
//! - [`Hospital`] - hospitals with emergency department and trauma data
//! - [`Facility`] - urgent care and other walk-in facilities
//!
//! Records are immutable once loaded. Everything the filter pipeline and
//! nearest-neighbor lookup need from them goes through [`GeoEntity`].

mod clinic;
mod facility;
mod hospital;
mod resort;

pub use clinic::{Clinic, Provider};
pub use facility::{Facility, FacilityKind};
pub use hospital::{EmergencyCare, Hospital, TraumaLevel};
pub use resort::{PassAffiliation, PassNetwork, Resort};

use std::hash::Hash;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// How an entity relates to the category tags of its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMembership<C> {
    /// No category value. Never excluded by category filters.
    Unaffiliated,
    /// Exactly one category.
    Single(C),
    /// Two categories at once (e.g. a resort on both pass networks).
    Dual(C, C),
}

impl<C: PartialEq> CategoryMembership<C> {
    /// Check whether the entity carries the given category.
    pub fn contains(&self, category: &C) -> bool {
        match self {
            Self::Unaffiliated => false,
            Self::Single(c) => c == category,
            Self::Dual(a, b) => a == category || b == category,
        }
    }
}

/// Common view over every geo-tagged record type.
pub trait GeoEntity {
    /// Category tag used by inclusion filters.
    type Category: Copy + Eq + Hash;

    /// Stable identifier, unique within the collection.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Location of the entity. Always present for loaded records.
    fn coordinates(&self) -> Coordinates;

    /// Two-letter state code.
    fn state(&self) -> &str;

    /// Text fields matched by free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Category membership for inclusion filtering.
    fn categories(&self) -> CategoryMembership<Self::Category>;

    /// Case-insensitive substring match against [`GeoEntity::search_fields`].
    ///
    /// `needle` must already be lowercased.
    fn matches_text(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Provenance for hand-curated fields (phone numbers, patrol locations).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Date the data was last checked against its source.
    pub last_verified: Option<NaiveDate>,
    /// Where the data came from.
    pub source_url: Option<String>,
}

impl Verification {
    /// Days elapsed since the last verification, if known.
    #[must_use]
    pub fn age_days(&self, today: NaiveDate) -> Option<i64> {
        self.last_verified.map(|date| (today - date).num_days())
    }

    /// Check if verification is missing or older than `max_age_days`.
    #[must_use]
    pub fn is_stale(&self, today: NaiveDate, max_age_days: i64) -> bool {
        self.age_days(today).map_or(true, |age| age > max_age_days)
    }

    /// Check if neither a date nor a source is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_verified.is_none() && self.source_url.is_none()
    }
}

/// Mailing address shared by the care facility types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// Single-line rendering, skipping empty parts.
    #[must_use]
    pub fn one_line(&self) -> String {
        let state_zip = [self.state.as_str(), self.zip.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        [self.street.as_str(), self.city.as_str(), state_zip.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
