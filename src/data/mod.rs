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

//! Static data loading.
//!
//! The dashboard ships four JSON files built offline from public sources:
//! - `resorts.json`: curated US ski resorts with pass affiliation and patrol contacts
//! - `clinics.json`: CMS-certified dialysis facilities near resorts
//! - `hospitals.json`: hospitals with emergency department and trauma data
//! - `facilities.json`: urgent care facilities from OpenStreetMap
//!
//! Rows without usable coordinates are skipped, missing identifiers are
//! derived, and duplicate identifiers keep the first occurrence.

pub mod records;
pub mod summary;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use proximity::{Clinic, Facility, GeoEntity, Hospital, Resort};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use records::{ClinicRecord, FacilityRecord, HospitalRecord, RecordError, ResortRecord};
pub use summary::DatasetSummary;

pub const RESORTS_FILE: &str = "resorts.json";
pub const CLINICS_FILE: &str = "clinics.json";
pub const HOSPITALS_FILE: &str = "hospitals.json";
pub const FACILITIES_FILE: &str = "facilities.json";

/// Errors that can occur while loading a data file.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of parsing one collection.
#[derive(Debug)]
pub struct LoadOutcome<T> {
    pub entities: Vec<T>,
    /// Rows dropped for missing or invalid fields.
    pub rejected: usize,
    /// Rows dropped because their identifier was already taken.
    pub duplicates: usize,
}

/// Parse a JSON array of records and convert them into entities.
///
/// Conversion failures are logged and counted, not returned as errors.
pub fn parse_collection<R, T, S>(reader: S, label: &str) -> Result<LoadOutcome<T>, serde_json::Error>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = RecordError> + GeoEntity,
    S: Read,
{
    let records: Vec<R> = serde_json::from_reader(reader)?;

    let mut entities = Vec::with_capacity(records.len());
    let mut seen = HashSet::with_capacity(records.len());
    let mut rejected = 0;
    let mut duplicates = 0;

    for record in records {
        match T::try_from(record) {
            Ok(entity) => {
                if seen.insert(entity.id().to_lowercase()) {
                    entities.push(entity);
                } else {
                    debug!("Skipping duplicate {} '{}'", label, entity.id());
                    duplicates += 1;
                }
            }
            Err(e) => {
                warn!("Skipping {}: {}", label, e);
                rejected += 1;
            }
        }
    }

    Ok(LoadOutcome {
        entities,
        rejected,
        duplicates,
    })
}

fn load_file<R, T>(path: &Path, label: &str) -> Result<Vec<T>, DataError>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = RecordError> + GeoEntity,
{
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let outcome = parse_collection::<R, T, _>(BufReader::new(file), label).map_err(|source| {
        DataError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!(
        "Loaded {} {}s ({} rejected, {} duplicates)",
        outcome.entities.len(),
        label,
        outcome.rejected,
        outcome.duplicates
    );
    Ok(outcome.entities)
}

/// Container for all loaded collections
#[derive(Debug, Default)]
pub struct Dataset {
    pub resorts: Vec<Resort>,
    pub clinics: Vec<Clinic>,
    pub hospitals: Vec<Hospital>,
    pub facilities: Vec<Facility>,
}

impl Dataset {
    /// Create a new empty Dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Load resorts from a JSON file
    pub fn load_resorts<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, DataError> {
        self.resorts = load_file::<ResortRecord, Resort>(path.as_ref(), "resort")?;
        Ok(self.resorts.len())
    }

    /// Load dialysis clinics from a JSON file
    pub fn load_clinics<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, DataError> {
        self.clinics = load_file::<ClinicRecord, Clinic>(path.as_ref(), "clinic")?;
        Ok(self.clinics.len())
    }

    /// Load hospitals from a JSON file
    pub fn load_hospitals<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, DataError> {
        self.hospitals = load_file::<HospitalRecord, Hospital>(path.as_ref(), "hospital")?;
        Ok(self.hospitals.len())
    }

    /// Load urgent care facilities from a JSON file
    pub fn load_facilities<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, DataError> {
        self.facilities = load_file::<FacilityRecord, Facility>(path.as_ref(), "facility")?;
        Ok(self.facilities.len())
    }

    /// Load every collection from a directory.
    ///
    /// Missing files leave that collection empty; unreadable or malformed
    /// files are errors.
    pub fn load_from_directory<P: AsRef<Path>>(directory: P) -> Result<Self, DataError> {
        let mut data = Self::new();
        let dir = directory.as_ref();

        let resorts_path = dir.join(RESORTS_FILE);
        if resorts_path.exists() {
            data.load_resorts(&resorts_path)?;
        } else {
            warn!("{} not found at {:?}", RESORTS_FILE, resorts_path);
        }

        let clinics_path = dir.join(CLINICS_FILE);
        if clinics_path.exists() {
            data.load_clinics(&clinics_path)?;
        } else {
            warn!("{} not found at {:?}", CLINICS_FILE, clinics_path);
        }

        let hospitals_path = dir.join(HOSPITALS_FILE);
        if hospitals_path.exists() {
            data.load_hospitals(&hospitals_path)?;
        } else {
            warn!("{} not found at {:?}", HOSPITALS_FILE, hospitals_path);
        }

        let facilities_path = dir.join(FACILITIES_FILE);
        if facilities_path.exists() {
            data.load_facilities(&facilities_path)?;
        } else {
            warn!("{} not found at {:?}", FACILITIES_FILE, facilities_path);
        }

        Ok(data)
    }

    /// Look up a resort by identifier (case-insensitive) or exact name.
    pub fn find_resort(&self, key: &str) -> Option<&Resort> {
        self.resorts
            .iter()
            .find(|r| r.id.eq_ignore_ascii_case(key))
            .or_else(|| self.resorts.iter().find(|r| r.name.eq_ignore_ascii_case(key)))
    }

    pub fn is_empty(&self) -> bool {
        self.resorts.is_empty()
            && self.clinics.is_empty()
            && self.hospitals.is_empty()
            && self.facilities.is_empty()
    }
}
