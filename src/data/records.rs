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

//! On-disk record shapes and their conversion into engine entities.
//!
//! Records mirror the JSON files produced by the data build scripts. Fields
//! the engine requires (coordinates, names) are optional here so that one bad
//! row can be skipped instead of failing the whole file.

use chrono::NaiveDate;
use log::warn;
use proximity::{
    Address, Clinic, CoordinateError, Coordinates, Facility, FacilityKind, Hospital,
    PassAffiliation, Provider, Resort, TraumaLevel, Verification,
};
use serde::Deserialize;
use thiserror::Error;

/// Reasons a single record is rejected during load.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record '{0}' has no coordinates")]
    MissingCoordinates(String),

    #[error("record '{id}' has invalid coordinates: {source}")]
    InvalidCoordinates {
        id: String,
        #[source]
        source: CoordinateError,
    },

    #[error("record has no name")]
    MissingName,
}

/// Treat blank strings as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Identifier for care records that arrive without one.
fn fallback_id(name: &str, state: &str) -> String {
    format!("{name}|{state}")
}

fn coordinates(id: &str, lat: Option<f64>, lon: Option<f64>) -> Result<Coordinates, RecordError> {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Err(RecordError::MissingCoordinates(id.to_string()));
    };
    Coordinates::try_new(lat, lon).map_err(|source| RecordError::InvalidCoordinates {
        id: id.to_string(),
        source,
    })
}

fn address(street: String, city: String, state: String, zip: String) -> Address {
    Address {
        street: street.trim().to_string(),
        city: city.trim().to_string(),
        state: state.trim().to_string(),
        zip: zip.trim().to_string(),
    }
}

/// Resort row from resorts.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResortRecord {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude")]
    pub lon: Option<f64>,
    pub region: Option<String>,
    pub size: Option<String>,
    pub pass_network: Option<PassAffiliation>,
    pub ski_patrol_phone: Option<String>,
    pub ski_patrol_location: Option<String>,
    pub resort_phone: Option<String>,
    pub website: Option<String>,
    pub source_url: Option<String>,
    pub last_verified: Option<NaiveDate>,
}

impl TryFrom<ResortRecord> for Resort {
    type Error = RecordError;

    fn try_from(record: ResortRecord) -> Result<Self, Self::Error> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(RecordError::MissingName);
        }
        let state = record.state.trim().to_string();
        let id = non_empty(record.id).unwrap_or_else(|| Resort::derive_id(&name, &state));
        let coordinates = coordinates(&id, record.lat, record.lon)?;

        Ok(Resort {
            id,
            name,
            state,
            region: non_empty(record.region),
            size: non_empty(record.size),
            coordinates,
            pass_network: record.pass_network,
            ski_patrol_phone: non_empty(record.ski_patrol_phone),
            ski_patrol_location: non_empty(record.ski_patrol_location),
            resort_phone: non_empty(record.resort_phone),
            website: non_empty(record.website),
            verification: Verification {
                last_verified: record.last_verified,
                source_url: non_empty(record.source_url),
            },
        })
    }
}

/// Dialysis clinic row from clinics.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicRecord {
    #[serde(default)]
    pub ccn: String,
    #[serde(default)]
    pub facility: String,
    pub provider: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude")]
    pub lon: Option<f64>,
    pub phone: Option<String>,
}

impl TryFrom<ClinicRecord> for Clinic {
    type Error = RecordError;

    fn try_from(record: ClinicRecord) -> Result<Self, Self::Error> {
        let facility = record.facility.trim().to_string();
        if facility.is_empty() {
            return Err(RecordError::MissingName);
        }
        let ccn = non_empty(Some(record.ccn))
            .unwrap_or_else(|| fallback_id(&facility, &record.state));
        let coordinates = coordinates(&ccn, record.lat, record.lon)?;

        Ok(Clinic {
            ccn,
            facility,
            provider: non_empty(record.provider).map(|chain| Provider::classify(&chain)),
            address: address(record.address, record.city, record.state, record.zip),
            coordinates,
            phone: non_empty(record.phone),
        })
    }
}

/// Hospital row from hospitals.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRecord {
    #[serde(default, alias = "ccn", alias = "id")]
    pub provider_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude")]
    pub lon: Option<f64>,
    #[serde(default, alias = "hasEmergencyDepartment")]
    pub has_emergency: bool,
    pub trauma_level: Option<u8>,
    pub phone: Option<String>,
}

impl TryFrom<HospitalRecord> for Hospital {
    type Error = RecordError;

    fn try_from(record: HospitalRecord) -> Result<Self, Self::Error> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(RecordError::MissingName);
        }
        let provider_number = non_empty(Some(record.provider_number))
            .unwrap_or_else(|| fallback_id(&name, &record.state));
        let coordinates = coordinates(&provider_number, record.lat, record.lon)?;

        let trauma_level = record.trauma_level.and_then(|level| {
            let parsed = TraumaLevel::new(level);
            if parsed.is_none() {
                warn!("Ignoring trauma level {level} for hospital {provider_number}");
            }
            parsed
        });

        Ok(Hospital {
            provider_number,
            name,
            address: address(record.address, record.city, record.state, record.zip),
            coordinates,
            has_emergency: record.has_emergency,
            trauma_level,
            phone: non_empty(record.phone),
        })
    }
}

fn default_facility_kind() -> FacilityKind {
    FacilityKind::UrgentCare
}

/// Urgent care row from facilities.json
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityRecord {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_facility_kind")]
    pub kind: FacilityKind,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude")]
    pub lon: Option<f64>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "is24Hour", default)]
    pub is_24_hour: bool,
    pub source_url: Option<String>,
    pub last_verified: Option<NaiveDate>,
}

impl TryFrom<FacilityRecord> for Facility {
    type Error = RecordError;

    fn try_from(record: FacilityRecord) -> Result<Self, Self::Error> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(RecordError::MissingName);
        }
        let id = non_empty(record.id)
            .unwrap_or_else(|| Facility::derive_id(&name, &record.city, &record.state));
        let coordinates = coordinates(&id, record.lat, record.lon)?;

        Ok(Facility {
            id,
            name,
            kind: record.kind,
            address: address(record.address, record.city, record.state, record.zip),
            coordinates,
            phone: non_empty(record.phone),
            website: non_empty(record.website),
            is_24_hour: record.is_24_hour,
            verification: Verification {
                last_verified: record.last_verified,
                source_url: non_empty(record.source_url),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resort_record(json: &str) -> ResortRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resort_from_data_file_shape() {
        let record = resort_record(
            r#"{
                "id": "Vail|CO", "name": "Vail", "state": "CO",
                "lat": 39.6403, "lon": -106.3742, "region": "rockies",
                "size": "major", "passNetwork": "epic",
                "skiPatrolPhone": "970-479-2288", "resortPhone": "",
                "lastVerified": "2025-01-15"
            }"#,
        );
        let resort = Resort::try_from(record).unwrap();
        assert_eq!(resort.id, "Vail|CO");
        assert_eq!(resort.pass_network, Some(PassAffiliation::Epic));
        assert_eq!(resort.ski_patrol_phone.as_deref(), Some("970-479-2288"));
        assert_eq!(resort.resort_phone, None);
        assert_eq!(
            resort.verification.last_verified,
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
    }

    #[test]
    fn test_resort_id_derived_when_missing() {
        let record = resort_record(r#"{"name": "Alta", "state": "UT", "lat": 40.58, "lon": -111.63}"#);
        assert_eq!(Resort::try_from(record).unwrap().id, "Alta|UT");
    }

    #[test]
    fn test_missing_coordinates_rejected() {
        let record = resort_record(r#"{"name": "Nowhere", "state": "CO", "lat": 40.0}"#);
        assert!(matches!(
            Resort::try_from(record),
            Err(RecordError::MissingCoordinates(id)) if id == "Nowhere|CO"
        ));
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let record = resort_record(r#"{"name": "Bad", "state": "CO", "lat": 140.0, "lon": -105.0}"#);
        assert!(matches!(
            Resort::try_from(record),
            Err(RecordError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_clinic_provider_classified() {
        let record: ClinicRecord = serde_json::from_str(
            r#"{"ccn": "062505", "facility": "Frisco Dialysis", "provider": "DaVita Inc.",
                "city": "Frisco", "state": "CO", "zip": "80443",
                "lat": 39.57, "lon": -106.09, "nearestResort": "Copper Mountain"}"#,
        )
        .unwrap();
        let clinic = Clinic::try_from(record).unwrap();
        assert_eq!(clinic.provider, Some(Provider::DaVita));
        assert_eq!(clinic.address.city, "Frisco");
    }

    #[test]
    fn test_clinic_blank_provider_is_unaffiliated() {
        let record: ClinicRecord = serde_json::from_str(
            r#"{"ccn": "1", "facility": "X", "provider": " ", "lat": 39.0, "lon": -105.0}"#,
        )
        .unwrap();
        assert_eq!(Clinic::try_from(record).unwrap().provider, None);
    }

    #[test]
    fn test_hospital_trauma_level_validated() {
        let record: HospitalRecord = serde_json::from_str(
            r#"{"providerNumber": "060001", "name": "Denver Health", "state": "CO",
                "lat": 39.73, "lon": -104.99, "hasEmergency": true, "traumaLevel": 9}"#,
        )
        .unwrap();
        let hospital = Hospital::try_from(record).unwrap();
        assert!(hospital.has_emergency);
        assert_eq!(hospital.trauma_level, None);
    }

    #[test]
    fn test_facility_defaults() {
        let record: FacilityRecord = serde_json::from_str(
            r#"{"id": "osm-123", "name": "Vail Urgent Care", "type": "urgent_care",
                "lat": 39.64, "lon": -106.37, "phone": "", "is24Hour": true,
                "sourceUrl": "https://www.openstreetmap.org/node/123"}"#,
        )
        .unwrap();
        let facility = Facility::try_from(record).unwrap();
        assert_eq!(facility.kind, FacilityKind::UrgentCare);
        assert!(facility.is_24_hour);
        assert_eq!(facility.phone, None);
        assert!(!facility.verification.is_empty());
    }
}
