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

/// Trauma center designation, 1 (highest acuity) through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TraumaLevel(u8);

impl TraumaLevel {
    /// Create a trauma level, returning `None` outside 1..=4.
    #[must_use]
    pub fn new(level: u8) -> Option<Self> {
        (1..=4).contains(&level).then_some(Self(level))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Roman-numeral label as used on hospital signage ("Level II").
    #[must_use]
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Level I",
            2 => "Level II",
            3 => "Level III",
            _ => "Level IV",
        }
    }
}

impl TryFrom<u8> for TraumaLevel {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).ok_or_else(|| format!("trauma level {level} is outside 1..=4"))
    }
}

impl From<TraumaLevel> for u8 {
    fn from(level: TraumaLevel) -> Self {
        level.0
    }
}

/// Hospital category used by care-type filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmergencyCare {
    EmergencyDepartment,
    NoEmergencyDepartment,
}

/// A hospital, keyed by its CMS provider number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub provider_number: String,
    pub name: String,
    pub address: Address,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub has_emergency: bool,
    pub trauma_level: Option<TraumaLevel>,
    pub phone: Option<String>,
}

impl Hospital {
    #[must_use]
    pub fn new(
        provider_number: impl Into<String>,
        name: impl Into<String>,
        coordinates: Coordinates,
        has_emergency: bool,
    ) -> Self {
        Self {
            provider_number: provider_number.into(),
            name: name.into(),
            address: Address::default(),
            coordinates,
            has_emergency,
            trauma_level: None,
            phone: None,
        }
    }

    #[must_use]
    pub fn is_trauma_center(&self) -> bool {
        self.trauma_level.is_some()
    }
}

impl GeoEntity for Hospital {
    type Category = EmergencyCare;

    fn id(&self) -> &str {
        &self.provider_number
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
        ]
    }

    fn categories(&self) -> CategoryMembership<EmergencyCare> {
        if self.has_emergency {
            CategoryMembership::Single(EmergencyCare::EmergencyDepartment)
        } else {
            CategoryMembership::Single(EmergencyCare::NoEmergencyDepartment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trauma_level_range() {
        assert!(TraumaLevel::new(0).is_none());
        assert_eq!(TraumaLevel::new(2).map(TraumaLevel::label), Some("Level II"));
        assert!(TraumaLevel::new(5).is_none());
        assert!(TraumaLevel::new(1) < TraumaLevel::new(3));
    }

    #[test]
    fn test_trauma_level_serde() {
        let level: TraumaLevel = serde_json::from_str("1").unwrap();
        assert_eq!(level.get(), 1);
        assert!(serde_json::from_str::<TraumaLevel>("7").is_err());
    }

    #[test]
    fn test_emergency_category() {
        let hospital = Hospital::new("060001", "St. Anthony", Coordinates::new(39.7, -105.1), true);
        assert_eq!(
            hospital.categories(),
            CategoryMembership::Single(EmergencyCare::EmergencyDepartment)
        );
        assert!(!hospital.is_trauma_center());
    }
}
