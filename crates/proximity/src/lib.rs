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

//! Proximity engine for resort and care-facility lookups.
//!
//! This library does the distance math behind a map-and-list dashboard of
//! ski resorts, dialysis clinics, hospitals, and urgent care facilities. It
//! is pure and synchronous: callers hand it in-memory collections and get
//! back borrowed, distance-annotated views. It never performs I/O.
//!
//! - **Geo layer**: [`Coordinates`] and the haversine distance primitive
//! - **Entity layer**: [`Resort`], [`Clinic`], [`Hospital`], [`Facility`] behind
//!   the [`GeoEntity`] trait
//! - **Filter layer**: text/state/category/radius filtering and nearest-first
//!   ordering via [`filter_entities`]
//! - **Nearest layer**: ranked cross-collection neighbors via [`nearest_k`]
//! - **View state**: a reducer for selection/expansion state
//!
//! # Preconditions
//!
//! Every record must carry a valid coordinate pair. The engine does not
//! re-validate; loaders should build coordinates with
//! [`Coordinates::try_new`] and drop records that fail.
//!
//! # Quick Start
//!
//! ```
//! use proximity::{filter_entities, Coordinates, FilterCriteria, ReferencePoint, Resort};
//!
//! let resorts = vec![
//!     Resort::new("Eldora", "CO", Coordinates::new(39.9372, -105.5827)),
//!     Resort::new("Vail", "CO", Coordinates::new(39.6403, -106.3742)),
//! ];
//!
//! let boulder = Coordinates::new(40.0150, -105.2705);
//! let view = filter_entities(
//!     &resorts,
//!     &FilterCriteria::default().with_max_distance(50.0),
//!     ReferencePoint::resolve(Some(boulder), None),
//! );
//!
//! assert_eq!(view.len(), 1);
//! assert_eq!(view.items[0].entity.name, "Eldora");
//! ```
//!
//! ## Nearest care for a resort
//!
//! ```
//! use proximity::{nearest_to, Clinic, Coordinates, NearestQuery, Provider, Resort};
//!
//! let vail = Resort::new("Vail", "CO", Coordinates::new(39.6403, -106.3742));
//! let clinics = vec![
//!     Clinic::new("062001", "Denver Dialysis", Some(Provider::DaVita), Coordinates::new(39.74, -104.99)),
//!     Clinic::new("062002", "Frisco Dialysis", Some(Provider::Fresenius), Coordinates::new(39.57, -106.09)),
//! ];
//!
//! let neighbors = nearest_to(&vail, &clinics, &NearestQuery::default());
//! assert_eq!(neighbors[0].entity.facility, "Frisco Dialysis");
//! assert_eq!(neighbors.len(), 2);
//! ```

pub mod entity;
pub mod filter;
pub mod geo;
pub mod nearest;
pub mod view_state;

pub use entity::{
    Address, CategoryMembership, Clinic, EmergencyCare, Facility, FacilityKind, GeoEntity,
    Hospital, PassAffiliation, PassNetwork, Provider, Resort, TraumaLevel, Verification,
};
pub use filter::{
    filter_entities, FilterCriteria, FilteredView, ReferencePoint, WithDistance,
    MAX_DISTANCE_SLIDER_MILES,
};
pub use geo::{haversine_distance, haversine_miles, CoordinateError, Coordinates, DistanceUnit};
pub use nearest::{nearest_k, nearest_one, nearest_to, Neighbor, NearestQuery};
pub use view_state::{reduce, ViewAction, ViewMode, ViewState};
