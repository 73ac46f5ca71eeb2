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

use super::{Address, CategoryMembership, GeoEntity};
use crate::geo::Coordinates;

/// Dialysis provider chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provider {
    DaVita,
    Fresenius,
    #[serde(rename = "US Renal Care")]
    UsRenalCare,
    #[serde(rename = "American Renal")]
    AmericanRenal,
    #[serde(rename = "DCI")]
    Dci,
    Independent,
    #[serde(other)]
    Other,
}

impl Provider {
    pub const ALL: [Self; 7] = [
        Self::DaVita,
        Self::Fresenius,
        Self::UsRenalCare,
        Self::AmericanRenal,
        Self::Dci,
        Self::Independent,
        Self::Other,
    ];

    /// Classify a chain organization name from the CMS facility listing.
    #[must_use]
    pub fn classify(chain: &str) -> Self {
        let chain = chain.trim().to_lowercase();
        if chain.is_empty() || chain == "independent" {
            Self::Independent
        } else if chain.contains("davita") {
            Self::DaVita
        } else if chain.contains("fresenius") {
            Self::Fresenius
        } else if chain.contains("u.s. renal") || chain.contains("us renal") {
            Self::UsRenalCare
        } else if chain.contains("american renal") {
            Self::AmericanRenal
        } else if chain.contains("dialysis clinic") || chain == "dci" {
            Self::Dci
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::DaVita => "DaVita",
            Self::Fresenius => "Fresenius",
            Self::UsRenalCare => "US Renal Care",
            Self::AmericanRenal => "American Renal",
            Self::Dci => "DCI",
            Self::Independent => "Independent",
            Self::Other => "Other",
        }
    }
}

/// A dialysis clinic, keyed by its CMS certification number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub ccn: String,
    pub facility: String,
    pub provider: Option<Provider>,
    pub address: Address,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub phone: Option<String>,
}

impl Clinic {
    #[must_use]
    pub fn new(
        ccn: impl Into<String>,
        facility: impl Into<String>,
        provider: Option<Provider>,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            ccn: ccn.into(),
            facility: facility.into(),
            provider,
            address: Address::default(),
            coordinates,
            phone: None,
        }
    }
}

impl GeoEntity for Clinic {
    type Category = Provider;

    fn id(&self) -> &str {
        &self.ccn
    }

    fn name(&self) -> &str {
        &self.facility
    }

    fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    fn state(&self) -> &str {
        &self.address.state
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.facility.as_str(),
            self.address.city.as_str(),
            self.address.state.as_str(),
        ];
        if let Some(provider) = self.provider {
            fields.push(provider.label());
        }
        fields
    }

    /// Clinics without a chain, blank or `Independent`, are unaffiliated.
    fn categories(&self) -> CategoryMembership<Provider> {
        match self.provider {
            None | Some(Provider::Independent) => CategoryMembership::Unaffiliated,
            Some(provider) => CategoryMembership::Single(provider),
        }
    }
}
