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

use serde::{Deserialize, Serialize};

use super::{Address, CategoryMembership, GeoEntity, Verification};
use crate::geo::Coordinates;

/// Type tag of a walk-in facility (`"urgent_care"`, `"emergency"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    UrgentCare,
    Emergency,
    Clinic,
    #[serde(other)]
    Other,
}

impl FacilityKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UrgentCare => "Urgent Care",
            Self::Emergency => "Emergency",
            Self::Clinic => "Clinic",
            Self::Other => "Other",
        }
    }
}

/// An urgent care or other walk-in facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FacilityKind,
    pub address: Address,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "is24Hour")]
    pub is_24_hour: bool,
    #[serde(flatten)]
    pub verification: Verification,
}

impl Facility {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: FacilityKind,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            address: Address::default(),
            coordinates,
            phone: None,
            website: None,
            is_24_hour: false,
            verification: Verification::default(),
        }
    }

    /// Identifier used when the data does not provide one.
    #[must_use]
    pub fn derive_id(name: &str, city: &str, state: &str) -> String {
        format!("{name}|{city}|{state}")
    }
}

impl GeoEntity for Facility {
    type Category = FacilityKind;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    fn state(&self) -> &str {
        &self.address.state
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.address.city.as_str(),
            self.address.state.as_str(),
            self.kind.label(),
        ]
    }

    fn categories(&self) -> CategoryMembership<FacilityKind> {
        CategoryMembership::Single(self.kind)
    }
}
