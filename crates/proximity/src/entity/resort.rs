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

use super::{CategoryMembership, GeoEntity, Verification};
use crate::geo::Coordinates;

/// Season pass network a resort may honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassNetwork {
    Epic,
    Ikon,
}

impl PassNetwork {
    pub const ALL: [Self; 2] = [Self::Epic, Self::Ikon];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Epic => "Epic",
            Self::Ikon => "Ikon",
        }
    }
}

/// Pass affiliation as recorded in the resort data (`"epic"`, `"ikon"`, `"both"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassAffiliation {
    Epic,
    Ikon,
    Both,
}

impl PassAffiliation {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Epic => "Epic",
            Self::Ikon => "Ikon",
            Self::Both => "Epic + Ikon",
        }
    }
}

/// A ski resort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resort {
    pub id: String,
    pub name: String,
    pub state: String,
    /// Geographic region slug (e.g. "rockies", "northeast").
    pub region: Option<String>,
    /// Size category (e.g. "major", "regional", "local").
    pub size: Option<String>,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub pass_network: Option<PassAffiliation>,
    pub ski_patrol_phone: Option<String>,
    pub ski_patrol_location: Option<String>,
    pub resort_phone: Option<String>,
    pub website: Option<String>,
    #[serde(flatten)]
    pub verification: Verification,
}

impl Resort {
    /// Create a resort with only the required fields set.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        state: impl Into<String>,
        coordinates: Coordinates,
    ) -> Self {
        let name = name.into();
        let state = state.into();
        Self {
            id: Self::derive_id(&name, &state),
            name,
            state,
            region: None,
            size: None,
            coordinates,
            pass_network: None,
            ski_patrol_phone: None,
            ski_patrol_location: None,
            resort_phone: None,
            website: None,
            verification: Verification::default(),
        }
    }

    /// Identifier used when the data does not provide one.
    #[must_use]
    pub fn derive_id(name: &str, state: &str) -> String {
        format!("{name}|{state}")
    }

    /// Builder method to override the identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder method to set the pass affiliation
    #[must_use]
    pub fn with_pass(mut self, pass: PassAffiliation) -> Self {
        self.pass_network = Some(pass);
        self
    }

    /// Check if the resort is on neither pass network.
    #[must_use]
    pub fn is_independent(&self) -> bool {
        self.pass_network.is_none()
    }

    /// Check if any emergency contact is on file.
    #[must_use]
    pub fn has_emergency_contact(&self) -> bool {
        self.ski_patrol_phone.is_some() || self.resort_phone.is_some()
    }
}

impl GeoEntity for Resort {
    type Category = PassNetwork;

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
        &self.state
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.state.as_str()];
        if let Some(region) = &self.region {
            fields.push(region);
        }
        fields
    }

    fn categories(&self) -> CategoryMembership<PassNetwork> {
        match self.pass_network {
            None => CategoryMembership::Unaffiliated,
            Some(PassAffiliation::Epic) => CategoryMembership::Single(PassNetwork::Epic),
            Some(PassAffiliation::Ikon) => CategoryMembership::Single(PassNetwork::Ikon),
            Some(PassAffiliation::Both) => {
                CategoryMembership::Dual(PassNetwork::Epic, PassNetwork::Ikon)
            }
        }
    }
}
