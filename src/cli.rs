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

//! Command-line interface definitions.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use proximity::{CoordinateError, Coordinates, EmergencyCare, FacilityKind, PassNetwork, Provider};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "skiwithcare",
    version,
    about = "Find ski resorts and the dialysis, hospital, and urgent care options near them"
)]
pub struct Cli {
    /// Directory containing the JSON data files (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Report distances in kilometers
    #[arg(long, global = true)]
    pub km: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List a collection, filtered and sorted by distance
    List(ListArgs),
    /// Rank the care facilities nearest to a resort
    Nearest(NearestArgs),
    /// Show every field of one record
    Show {
        #[arg(value_enum)]
        collection: Collection,
        /// Record identifier (resorts also match by name)
        id: String,
    },
    /// Print dataset statistics
    Stats,
    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file location
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Resorts,
    Clinics,
    Hospitals,
    UrgentCare,
}

/// Where distances are measured from.
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Your latitude
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Your longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Map view center latitude (used when no location is given)
    #[arg(long, requires = "center_lon", allow_negative_numbers = true)]
    pub center_lat: Option<f64>,

    /// Map view center longitude
    #[arg(long, requires = "center_lat", allow_negative_numbers = true)]
    pub center_lon: Option<f64>,
}

impl LocationArgs {
    pub fn user_location(&self) -> Result<Option<Coordinates>, CoordinateError> {
        validated(self.lat, self.lon)
    }

    pub fn map_center(&self) -> Result<Option<Coordinates>, CoordinateError> {
        validated(self.center_lat, self.center_lon)
    }
}

fn validated(lat: Option<f64>, lon: Option<f64>) -> Result<Option<Coordinates>, CoordinateError> {
    lat.zip(lon)
        .map(|(lat, lon)| Coordinates::try_new(lat, lon))
        .transpose()
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub collection: Collection,

    /// Case-insensitive text search over name, city, state, and type
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Two-letter state code
    #[arg(long)]
    pub state: Option<String>,

    /// Distance ceiling in miles (200 = unlimited; needs --lat/--lon)
    #[arg(long)]
    pub max_distance: Option<f64>,

    /// Enabled pass networks for resorts (repeatable)
    #[arg(long = "pass", value_parser = parse_pass_network)]
    pub pass_networks: Vec<PassNetwork>,

    /// Enabled dialysis providers for clinics (repeatable)
    #[arg(long = "provider", value_parser = parse_provider)]
    pub providers: Vec<Provider>,

    /// Enabled hospital care types: er, no-er (repeatable)
    #[arg(long = "care", value_parser = parse_emergency_care)]
    pub care: Vec<EmergencyCare>,

    /// Enabled facility types for urgent care (repeatable)
    #[arg(long = "kind", value_parser = parse_facility_kind)]
    pub kinds: Vec<FacilityKind>,

    /// Maximum rows to print
    #[arg(short, long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub location: LocationArgs,
}

#[derive(Args, Debug, Clone)]
pub struct NearestArgs {
    /// Resort identifier ("Vail|CO") or name
    pub resort: String,

    /// Collection to search
    #[arg(long, value_enum, default_value_t = Collection::Clinics)]
    pub target: Collection,

    /// Maximum results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Soft distance ceiling in miles
    #[arg(long)]
    pub ceiling: Option<f64>,

    /// Minimum results, honored past the ceiling
    #[arg(long)]
    pub floor: Option<usize>,

    /// Rank of the neighbor to highlight (1 = nearest)
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub highlight: Option<usize>,
}

fn parse_pass_network(value: &str) -> Result<PassNetwork, String> {
    match value.to_ascii_lowercase().as_str() {
        "epic" => Ok(PassNetwork::Epic),
        "ikon" => Ok(PassNetwork::Ikon),
        other => Err(format!("unknown pass network '{other}' (expected epic or ikon)")),
    }
}

fn parse_provider(value: &str) -> Result<Provider, String> {
    let normalized = value.to_ascii_lowercase().replace(['-', '_', ' '], "");
    Provider::ALL
        .into_iter()
        .find(|p| p.label().to_ascii_lowercase().replace(' ', "") == normalized)
        .ok_or_else(|| format!("unknown provider '{value}'"))
}

fn parse_emergency_care(value: &str) -> Result<EmergencyCare, String> {
    match value.to_ascii_lowercase().as_str() {
        "er" | "emergency" => Ok(EmergencyCare::EmergencyDepartment),
        "no-er" | "none" => Ok(EmergencyCare::NoEmergencyDepartment),
        other => Err(format!("unknown care type '{other}' (expected er or no-er)")),
    }
}

fn parse_facility_kind(value: &str) -> Result<FacilityKind, String> {
    match value.to_ascii_lowercase().replace('-', "_").as_str() {
        "urgent_care" => Ok(FacilityKind::UrgentCare),
        "emergency" => Ok(FacilityKind::Emergency),
        "clinic" => Ok(FacilityKind::Clinic),
        "other" => Ok(FacilityKind::Other),
        other => Err(format!("unknown facility type '{other}'")),
    }
}
