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

//! Cross-category nearest-neighbor lookup.
//!
//! Given one selected record (say a resort) and another collection (say
//! dialysis clinics), [`nearest_k`] ranks the closest members of that
//! collection. A soft distance ceiling keeps dense areas from returning
//! far-away results, while a minimum floor guarantees sparse areas still get
//! a usable set of alternatives.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::entity::GeoEntity;
use crate::geo::{haversine_miles, Coordinates};

/// Default number of neighbors returned.
pub const DEFAULT_LIMIT: usize = 5;
/// Default soft ceiling in miles.
pub const DEFAULT_CEILING_MILES: f64 = 100.0;
/// Default minimum result count, honored even past the ceiling.
pub const DEFAULT_FLOOR: usize = 3;

/// Parameters for a nearest-neighbor lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestQuery {
    pub limit: usize,
    pub ceiling_miles: f64,
    pub floor: usize,
}

impl Default for NearestQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            ceiling_miles: DEFAULT_CEILING_MILES,
            floor: DEFAULT_FLOOR,
        }
    }
}

/// A ranked neighbor. Rank 0 is the nearest.
#[derive(Debug, Serialize)]
pub struct Neighbor<'a, T> {
    pub rank: usize,
    #[serde(flatten)]
    pub entity: &'a T,
    /// Distance in miles.
    pub distance: f64,
}

impl<T> Clone for Neighbor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Neighbor<'_, T> {}

/// Rank the members of `targets` nearest to `origin`.
///
/// If at least `floor` targets lie within the ceiling, the first `limit` of
/// those are returned. Otherwise the ceiling is relaxed and the first
/// `max(floor, min(limit, within_ceiling))` targets overall are returned.
pub fn nearest_k<'a, T: GeoEntity>(
    origin: Coordinates,
    targets: &'a [T],
    query: &NearestQuery,
) -> Vec<Neighbor<'a, T>> {
    let mut scored: Vec<(&'a T, f64)> = targets
        .iter()
        .map(|target| (target, haversine_miles(origin, target.coordinates())))
        .collect();
    scored.sort_by(|a, b| nan_last(a.1).total_cmp(&nan_last(b.1)));

    let within_ceiling = scored
        .iter()
        .take_while(|(_, d)| *d <= query.ceiling_miles)
        .count();

    let take = if within_ceiling >= query.floor {
        within_ceiling.min(query.limit)
    } else {
        query.floor.max(query.limit.min(within_ceiling))
    };

    debug!(
        "Nearest lookup: {} targets, {} within {} mi, returning {}",
        targets.len(),
        within_ceiling,
        query.ceiling_miles,
        take.min(scored.len())
    );

    scored
        .into_iter()
        .take(take)
        .enumerate()
        .map(|(rank, (entity, distance))| Neighbor {
            rank,
            entity,
            distance,
        })
        .collect()
}

/// [`nearest_k`] using another record's location as the origin.
pub fn nearest_to<'a, O: GeoEntity, T: GeoEntity>(
    origin: &O,
    targets: &'a [T],
    query: &NearestQuery,
) -> Vec<Neighbor<'a, T>> {
    nearest_k(origin.coordinates(), targets, query)
}

/// The single nearest target regardless of distance.
pub fn nearest_one<T: GeoEntity>(origin: Coordinates, targets: &[T]) -> Option<Neighbor<'_, T>> {
    let query = NearestQuery {
        limit: 1,
        ceiling_miles: f64::INFINITY,
        floor: 1,
    };
    nearest_k(origin, targets, &query).into_iter().next()
}

fn nan_last(distance: f64) -> f64 {
    if distance.is_nan() {
        f64::INFINITY
    } else {
        distance
    }
}
