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

//! Filter/sort pipeline for list views.
//!
//! [`filter_entities`] turns a loaded collection into a display-ready view:
//! every record is annotated with its distance from the resolved
//! [`ReferencePoint`], then text, state, category, and distance filters are
//! applied, and the result is ordered nearest-first. The source slice is
//! never modified; the view borrows from it.
//!
//! Category inclusion has two deliberate special cases:
//! - unaffiliated records (no category value) always pass
//! - dual-category records pass when either of their categories is enabled

use std::cmp::Ordering;
use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::entity::{CategoryMembership, GeoEntity};
use crate::geo::{haversine_distance, Coordinates, DistanceUnit, KM_PER_MILE};

/// Top of the distance slider. A ceiling at or above this means "unlimited".
pub const MAX_DISTANCE_SLIDER_MILES: f64 = 200.0;

/// Point that distances are measured from, tagged by where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ReferencePoint {
    /// The user's own location (GPS or an entered address).
    UserLocation(Coordinates),
    /// The center of the current map view.
    MapCenter(Coordinates),
}

impl ReferencePoint {
    /// Pick the reference point: user location first, then map center.
    #[must_use]
    pub fn resolve(user: Option<Coordinates>, map_center: Option<Coordinates>) -> Option<Self> {
        user.map(Self::UserLocation)
            .or_else(|| map_center.map(Self::MapCenter))
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        match self {
            Self::UserLocation(c) | Self::MapCenter(c) => *c,
        }
    }

    #[must_use]
    pub fn is_user_location(&self) -> bool {
        matches!(self, Self::UserLocation(_))
    }

    /// Human-readable description of the sort basis.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::UserLocation(_) => "sorted by your location",
            Self::MapCenter(_) => "sorted by map center",
        }
    }
}

/// Filter settings for one list view.
#[derive(Debug, Clone)]
pub struct FilterCriteria<C> {
    /// Free-text query, matched case-insensitively. Blank matches everything.
    pub query: String,
    /// Exact state code to keep, if any.
    pub state: Option<String>,
    /// Distance ceiling in miles. Only applied against a user location.
    pub max_distance_miles: f64,
    /// Enabled categories. `None` disables category filtering.
    pub categories: Option<HashSet<C>>,
    /// Unit for the annotated distances.
    pub unit: DistanceUnit,
}

impl<C> Default for FilterCriteria<C> {
    fn default() -> Self {
        Self {
            query: String::new(),
            state: None,
            max_distance_miles: MAX_DISTANCE_SLIDER_MILES,
            categories: None,
            unit: DistanceUnit::Miles,
        }
    }
}

impl<C> FilterCriteria<C> {
    /// Builder method to set the text query
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Builder method to set the state filter
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Builder method to set the distance ceiling
    #[must_use]
    pub fn with_max_distance(mut self, miles: f64) -> Self {
        self.max_distance_miles = miles;
        self
    }

    /// Builder method to set the enabled categories
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = C>) -> Self
    where
        C: Eq + std::hash::Hash,
    {
        self.categories = Some(categories.into_iter().collect());
        self
    }

    /// Builder method to set the distance unit
    #[must_use]
    pub fn with_unit(mut self, unit: DistanceUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Check if the ceiling is below the slider maximum.
    #[must_use]
    pub fn has_distance_ceiling(&self) -> bool {
        self.max_distance_miles < MAX_DISTANCE_SLIDER_MILES
    }
}

/// A borrowed record paired with its distance from the reference point.
#[derive(Debug, Serialize)]
pub struct WithDistance<'a, T> {
    #[serde(flatten)]
    pub entity: &'a T,
    /// Distance in the criteria's unit; `None` without a reference point.
    pub distance: Option<f64>,
}

impl<T> Clone for WithDistance<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WithDistance<'_, T> {}

impl<T> WithDistance<'_, T> {
    /// Sort key: undefined and NaN distances order after every real distance.
    #[must_use]
    pub fn sort_key(&self) -> f64 {
        match self.distance {
            Some(d) if !d.is_nan() => d,
            _ => f64::INFINITY,
        }
    }
}

/// Output of [`filter_entities`].
#[derive(Debug, Clone, Serialize)]
pub struct FilteredView<'a, T> {
    pub items: Vec<WithDistance<'a, T>>,
    pub reference: Option<ReferencePoint>,
}

impl<'a, T> FilteredView<'a, T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Underlying records, in view order.
    pub fn entities(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.items.iter().map(|item| item.entity)
    }
}

/// Check category inclusion for one record.
pub fn passes_category_filter<C: Eq + std::hash::Hash>(
    membership: &CategoryMembership<C>,
    enabled: Option<&HashSet<C>>,
) -> bool {
    let Some(enabled) = enabled else {
        return true;
    };
    match membership {
        CategoryMembership::Unaffiliated => true,
        CategoryMembership::Single(c) => enabled.contains(c),
        CategoryMembership::Dual(a, b) => enabled.contains(a) || enabled.contains(b),
    }
}

/// Order two annotated records nearest-first. Undefined distances go last.
fn compare_by_distance<T>(a: &WithDistance<'_, T>, b: &WithDistance<'_, T>) -> Ordering {
    a.sort_key().total_cmp(&b.sort_key())
}

/// Annotate, filter, and sort a collection for display.
///
/// With no reference point the records keep their source order and carry no
/// distance; text, state, and category filters still apply.
pub fn filter_entities<'a, T: GeoEntity>(
    entities: &'a [T],
    criteria: &FilterCriteria<T::Category>,
    reference: Option<ReferencePoint>,
) -> FilteredView<'a, T> {
    let needle = criteria.query.trim().to_lowercase();
    let origin = reference.map(|r| r.coordinates());
    let apply_ceiling = reference.is_some_and(|r| r.is_user_location())
        && criteria.has_distance_ceiling();
    let ceiling = match criteria.unit {
        DistanceUnit::Miles => criteria.max_distance_miles,
        DistanceUnit::Kilometers => criteria.max_distance_miles * KM_PER_MILE,
    };

    let mut items: Vec<WithDistance<'a, T>> = entities
        .iter()
        .map(|entity| WithDistance {
            entity,
            distance: origin
                .map(|o| haversine_distance(o, entity.coordinates(), criteria.unit)),
        })
        .filter(|item| needle.is_empty() || item.entity.matches_text(&needle))
        .filter(|item| {
            criteria
                .state
                .as_deref()
                .map_or(true, |state| item.entity.state() == state)
        })
        .filter(|item| {
            passes_category_filter(&item.entity.categories(), criteria.categories.as_ref())
        })
        .filter(|item| !apply_ceiling || item.distance.is_some_and(|d| d <= ceiling))
        .collect();

    if reference.is_some() {
        // Stable, so equidistant records keep source order.
        items.sort_by(compare_by_distance);
    }

    debug!(
        "Filtered {} of {} records ({})",
        items.len(),
        entities.len(),
        reference.map_or("unsorted", |r| r.description())
    );

    FilteredView { items, reference }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Clinic, PassAffiliation, PassNetwork, Provider, Resort};

    fn resort(id: &str, lat: f64, lon: f64) -> Resort {
        Resort::new(id, "CO", Coordinates::new(lat, lon)).with_id(id)
    }

    fn scenario() -> Vec<Resort> {
        vec![resort("A", 40.0, -105.0), resort("B", 40.5, -105.5)]
    }

    fn ids<T: GeoEntity>(view: &FilteredView<'_, T>) -> Vec<String> {
        view.entities().map(|e| e.id().to_string()).collect()
    }

    #[test]
    fn test_resolve_prefers_user_location() {
        let user = Coordinates::new(1.0, 2.0);
        let center = Coordinates::new(3.0, 4.0);
        assert_eq!(
            ReferencePoint::resolve(Some(user), Some(center)),
            Some(ReferencePoint::UserLocation(user))
        );
        assert_eq!(
            ReferencePoint::resolve(None, Some(center)),
            Some(ReferencePoint::MapCenter(center))
        );
        assert_eq!(ReferencePoint::resolve(None, None), None);
    }

    #[test]
    fn test_sorted_by_distance_from_reference() {
        let resorts = scenario();
        let reference = ReferencePoint::UserLocation(Coordinates::new(40.0, -105.0));
        let view = filter_entities(&resorts, &FilterCriteria::default(), Some(reference));

        assert_eq!(ids(&view), ["A", "B"]);
        assert_eq!(view.items[0].distance, Some(0.0));
        let b = view.items[1].distance.unwrap();
        assert!((b - 43.5).abs() < 0.5, "got {b}");
        assert_eq!(view.reference, Some(reference));
    }

    #[test]
    fn test_ceiling_applies_to_user_location() {
        let resorts = scenario();
        let reference = ReferencePoint::UserLocation(Coordinates::new(40.0, -105.0));
        let criteria = FilterCriteria::default().with_max_distance(20.0);
        let view = filter_entities(&resorts, &criteria, Some(reference));
        assert_eq!(ids(&view), ["A"]);
    }

    #[test]
    fn test_ceiling_inert_for_map_center() {
        let resorts = scenario();
        let reference = ReferencePoint::MapCenter(Coordinates::new(40.0, -105.0));
        let criteria = FilterCriteria::default().with_max_distance(20.0);
        let view = filter_entities(&resorts, &criteria, Some(reference));
        assert_eq!(ids(&view), ["A", "B"]);
    }

    #[test]
    fn test_slider_maximum_means_unlimited() {
        let resorts = vec![resort("A", 40.0, -105.0), resort("Far", 45.0, -75.0)];
        let reference = ReferencePoint::UserLocation(Coordinates::new(40.0, -105.0));
        let criteria = FilterCriteria::default().with_max_distance(MAX_DISTANCE_SLIDER_MILES);
        let view = filter_entities(&resorts, &criteria, Some(reference));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_ceiling_in_kilometers_view() {
        let resorts = scenario();
        let reference = ReferencePoint::UserLocation(Coordinates::new(40.0, -105.0));
        // B is ~43.5 mi (~70 km) away; a 50 mi ceiling must keep it even in km.
        let criteria = FilterCriteria::default()
            .with_max_distance(50.0)
            .with_unit(DistanceUnit::Kilometers);
        let view = filter_entities(&resorts, &criteria, Some(reference));
        assert_eq!(ids(&view), ["A", "B"]);
        assert!(view.items[1].distance.unwrap() > 60.0);
    }

    #[test]
    fn test_no_reference_keeps_source_order() {
        let resorts = vec![resort("Z", 10.0, 10.0), resort("A", 40.0, -105.0)];
        let criteria = FilterCriteria::default().with_max_distance(1.0);
        let view = filter_entities(&resorts, &criteria, None);
        assert_eq!(ids(&view), ["Z", "A"]);
        assert!(view.items.iter().all(|item| item.distance.is_none()));
        assert!(view.reference.is_none());
    }

    #[test]
    fn test_text_query_case_insensitive() {
        let mut resorts = scenario();
        resorts.push(Resort::new("Steamboat", "CO", Coordinates::new(40.45, -106.8)));
        let criteria = FilterCriteria::default().with_query("  STEAM ");
        let view = filter_entities(&resorts, &criteria, None);
        assert_eq!(ids(&view), ["Steamboat|CO"]);

        let blank = FilterCriteria::default().with_query("   ");
        assert_eq!(filter_entities(&resorts, &blank, None).len(), 3);
    }

    #[test]
    fn test_state_filter_exact() {
        let resorts = vec![
            Resort::new("Vail", "CO", Coordinates::new(39.6, -106.3)),
            Resort::new("Alta", "UT", Coordinates::new(40.58, -111.63)),
        ];
        let criteria = FilterCriteria::default().with_state("UT");
        let view = filter_entities(&resorts, &criteria, None);
        assert_eq!(ids(&view), ["Alta|UT"]);
    }

    #[test]
    fn test_category_inclusion_policy() {
        let coords = Coordinates::new(40.0, -105.0);
        let resorts = vec![
            Resort::new("Epic Only", "CO", coords).with_pass(PassAffiliation::Epic),
            Resort::new("Ikon Only", "CO", coords).with_pass(PassAffiliation::Ikon),
            Resort::new("Both", "CO", coords).with_pass(PassAffiliation::Both),
            Resort::new("Indie", "CO", coords),
        ];

        let ikon = FilterCriteria::default().with_categories([PassNetwork::Ikon]);
        let view = filter_entities(&resorts, &ikon, None);
        assert_eq!(ids(&view), ["Ikon Only|CO", "Both|CO", "Indie|CO"]);

        let none = FilterCriteria::default().with_categories([]);
        let view = filter_entities(&resorts, &none, None);
        assert_eq!(ids(&view), ["Indie|CO"]);

        let all = FilterCriteria::default().with_categories(PassNetwork::ALL);
        assert_eq!(filter_entities(&resorts, &all, None).len(), 4);
    }

    #[test]
    fn test_independent_clinics_pass_provider_filter() {
        let coords = Coordinates::new(39.57, -106.09);
        let clinics = vec![
            Clinic::new("1", "Blank Chain", None, coords),
            Clinic::new("2", "Independent Chain", Some(Provider::Independent), coords),
            Clinic::new("3", "Fresenius Frisco", Some(Provider::Fresenius), coords),
            Clinic::new("4", "DaVita Frisco", Some(Provider::DaVita), coords),
        ];
        let davita = FilterCriteria::default().with_categories([Provider::DaVita]);
        let view = filter_entities(&clinics, &davita, None);
        assert_eq!(ids(&view), ["1", "2", "4"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let resorts = vec![
            resort("C", 41.0, -106.0),
            resort("A", 40.0, -105.0),
            resort("B", 40.5, -105.5),
            resort("D", 40.5, -105.5),
        ];
        let criteria = FilterCriteria::default().with_query("");
        let reference = Some(ReferencePoint::MapCenter(Coordinates::new(40.1, -105.1)));
        let first = filter_entities(&resorts, &criteria, reference);
        let second = filter_entities(&resorts, &criteria, reference);
        assert_eq!(ids(&first), ids(&second));
        // Ties keep source order.
        assert_eq!(ids(&first), ["A", "B", "D", "C"]);
    }

    #[test]
    fn test_nan_distances_sort_last() {
        let resorts = vec![
            resort("Bad", f64::NAN, -105.0),
            resort("Far", 45.0, -105.0),
            resort("Near", 40.1, -105.0),
        ];
        let reference = Some(ReferencePoint::MapCenter(Coordinates::new(40.0, -105.0)));
        let view = filter_entities(&resorts, &FilterCriteria::default(), reference);
        assert_eq!(ids(&view), ["Near", "Far", "Bad"]);

        let keys: Vec<f64> = view.items.iter().map(WithDistance::sort_key).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_source_untouched() {
        let resorts = scenario();
        let before = resorts.clone();
        let reference = Some(ReferencePoint::UserLocation(Coordinates::new(40.5, -105.5)));
        let view = filter_entities(&resorts, &FilterCriteria::default(), reference);
        assert_eq!(ids(&view), ["B", "A"]);
        assert_eq!(resorts, before);
    }

    #[test]
    fn test_empty_collection() {
        let resorts: Vec<Resort> = Vec::new();
        let reference = Some(ReferencePoint::UserLocation(Coordinates::new(0.0, 0.0)));
        assert!(filter_entities(&resorts, &FilterCriteria::default(), reference).is_empty());
    }
}
