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

//! Dataset statistics, broken down the way the data build reports them.

use std::collections::{BTreeMap, BTreeSet};

use proximity::{GeoEntity, Provider};
use serde::Serialize;

use super::Dataset;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub resorts: usize,
    pub clinics: usize,
    pub hospitals: usize,
    pub facilities: usize,
    pub states: usize,
    pub resorts_by_pass: BTreeMap<String, usize>,
    pub resorts_by_region: BTreeMap<String, usize>,
    pub resorts_with_emergency_contact: usize,
    pub clinics_by_provider: BTreeMap<String, usize>,
    pub hospitals_with_emergency: usize,
    pub trauma_centers: usize,
    pub facilities_24_hour: usize,
}

impl DatasetSummary {
    pub fn from_dataset(data: &Dataset) -> Self {
        let mut summary = Self {
            resorts: data.resorts.len(),
            clinics: data.clinics.len(),
            hospitals: data.hospitals.len(),
            facilities: data.facilities.len(),
            ..Self::default()
        };

        for resort in &data.resorts {
            let pass = resort
                .pass_network
                .map_or("Independent", |p| p.label());
            *summary.resorts_by_pass.entry(pass.to_string()).or_default() += 1;

            let region = resort.region.as_deref().unwrap_or("other");
            *summary.resorts_by_region.entry(region.to_string()).or_default() += 1;

            if resort.has_emergency_contact() {
                summary.resorts_with_emergency_contact += 1;
            }
        }

        for clinic in &data.clinics {
            let provider = clinic.provider.map_or("Unknown", Provider::label);
            *summary.clinics_by_provider.entry(provider.to_string()).or_default() += 1;
        }

        summary.hospitals_with_emergency = data.hospitals.iter().filter(|h| h.has_emergency).count();
        summary.trauma_centers = data.hospitals.iter().filter(|h| h.is_trauma_center()).count();
        summary.facilities_24_hour = data.facilities.iter().filter(|f| f.is_24_hour).count();

        let states: BTreeSet<&str> = data
            .resorts
            .iter()
            .map(GeoEntity::state)
            .chain(data.clinics.iter().map(GeoEntity::state))
            .chain(data.hospitals.iter().map(GeoEntity::state))
            .chain(data.facilities.iter().map(GeoEntity::state))
            .filter(|s| !s.is_empty())
            .collect();
        summary.states = states.len();

        summary
    }
}
