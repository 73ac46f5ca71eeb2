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

//! Result rendering for the command line.
//!
//! Lists and neighbor lookups are flattened into [`Row`]s for the table and
//! CSV formats. JSON output serializes the engine's views directly, so it
//! carries every record field.

use std::io::Write;

use clap::ValueEnum;
use chrono::NaiveDate;
use proximity::geo::KM_PER_MILE;
use proximity::{
    Address, Clinic, DistanceUnit, Facility, FilteredView, GeoEntity, Hospital, Neighbor, Resort,
    Verification,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Presentation tier for a neighbor rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankTier {
    Nearest,
    Closer,
    Other,
}

impl RankTier {
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => Self::Nearest,
            1 | 2 => Self::Closer,
            _ => Self::Other,
        }
    }
}

/// Per-type columns for tabular output.
pub trait Describe: GeoEntity {
    /// Short category label (pass network, provider, care type).
    fn category_label(&self) -> String;

    /// Most useful contact detail, if any.
    fn contact(&self) -> Option<&str>;

    /// Labeled fields for the detail view.
    fn details(&self) -> Vec<(&'static str, String)>;

    fn verification(&self) -> Option<&Verification> {
        None
    }
}

fn push_some(details: &mut Vec<(&'static str, String)>, label: &'static str, value: Option<&str>) {
    if let Some(value) = value {
        details.push((label, value.to_string()));
    }
}

fn push_address(details: &mut Vec<(&'static str, String)>, address: &Address) {
    let line = address.one_line();
    if !line.is_empty() {
        details.push(("Address", line));
    }
}

impl Describe for Resort {
    fn category_label(&self) -> String {
        self.pass_network
            .map_or_else(|| "Independent".to_string(), |p| p.label().to_string())
    }

    fn contact(&self) -> Option<&str> {
        self.ski_patrol_phone
            .as_deref()
            .or(self.resort_phone.as_deref())
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details = vec![("Pass", self.category_label())];
        push_some(&mut details, "Region", self.region.as_deref());
        push_some(&mut details, "Size", self.size.as_deref());
        push_some(&mut details, "Ski patrol", self.ski_patrol_phone.as_deref());
        push_some(&mut details, "Patrol location", self.ski_patrol_location.as_deref());
        push_some(&mut details, "Resort phone", self.resort_phone.as_deref());
        push_some(&mut details, "Website", self.website.as_deref());
        details
    }

    fn verification(&self) -> Option<&Verification> {
        Some(&self.verification)
    }
}

impl Describe for Clinic {
    fn category_label(&self) -> String {
        self.provider
            .map_or_else(|| "Unknown".to_string(), |p| p.label().to_string())
    }

    fn contact(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details = vec![("Provider", self.category_label())];
        push_address(&mut details, &self.address);
        push_some(&mut details, "Phone", self.phone.as_deref());
        details
    }
}

impl Describe for Hospital {
    fn category_label(&self) -> String {
        match (self.has_emergency, self.trauma_level) {
            (_, Some(level)) => format!("Trauma {}", level.label()),
            (true, None) => "ER".to_string(),
            (false, None) => "No ER".to_string(),
        }
    }

    fn contact(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let emergency = if self.has_emergency { "yes" } else { "no" };
        let mut details = vec![("Emergency department", emergency.to_string())];
        if let Some(level) = self.trauma_level {
            details.push(("Trauma center", level.label().to_string()));
        }
        push_address(&mut details, &self.address);
        push_some(&mut details, "Phone", self.phone.as_deref());
        details
    }
}

impl Describe for Facility {
    fn category_label(&self) -> String {
        if self.is_24_hour {
            format!("{} (24h)", self.kind.label())
        } else {
            self.kind.label().to_string()
        }
    }

    fn contact(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details = vec![("Type", self.category_label())];
        push_address(&mut details, &self.address);
        push_some(&mut details, "Phone", self.phone.as_deref());
        push_some(&mut details, "Website", self.website.as_deref());
        details
    }

    fn verification(&self) -> Option<&Verification> {
        Some(&self.verification)
    }
}

/// One flattened output line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub state: String,
    pub category: String,
    pub distance: Option<f64>,
    pub tier: Option<RankTier>,
    pub contact: String,
}

impl Row {
    fn new<T: Describe>(rank: usize, entity: &T, distance: Option<f64>) -> Self {
        Self {
            rank,
            id: entity.id().to_string(),
            name: entity.name().to_string(),
            state: entity.state().to_string(),
            category: entity.category_label(),
            distance: distance.map(round_tenth),
            tier: None,
            contact: entity.contact().unwrap_or_default().to_string(),
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Convert an engine distance in miles to the display unit.
pub fn miles_in(unit: DistanceUnit, miles: f64) -> f64 {
    match unit {
        DistanceUnit::Miles => miles,
        DistanceUnit::Kilometers => miles * KM_PER_MILE,
    }
}

/// Closest resort to a care record, distance in the display unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestResort {
    pub id: String,
    pub name: String,
    pub distance: f64,
}

impl NearestResort {
    pub fn from_neighbor(neighbor: &Neighbor<'_, Resort>, unit: DistanceUnit) -> Self {
        Self {
            id: neighbor.entity.id.clone(),
            name: neighbor.entity.name.clone(),
            distance: round_tenth(miles_in(unit, neighbor.distance)),
        }
    }
}

/// One record with the context shown by the detail view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detail<'a, T> {
    #[serde(flatten)]
    pub record: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_resort: Option<NearestResort>,
}

pub fn list_rows<T: Describe>(view: &FilteredView<'_, T>, limit: Option<usize>) -> Vec<Row> {
    view.items
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, item)| Row::new(i + 1, item.entity, item.distance))
        .collect()
}

/// Neighbor distances are in miles; `unit` converts them for display.
pub fn neighbor_rows<T: Describe>(neighbors: &[Neighbor<'_, T>], unit: DistanceUnit) -> Vec<Row> {
    neighbors
        .iter()
        .map(|n| Row {
            tier: Some(RankTier::from_rank(n.rank)),
            ..Row::new(n.rank + 1, n.entity, Some(miles_in(unit, n.distance)))
        })
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

/// Write rows as an aligned text table.
pub fn write_table<W: Write>(out: &mut W, rows: &[Row], unit: DistanceUnit) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>4}  {:<40} {:<5} {:<18} {:>10}  {}",
        "#", "NAME", "STATE", "CATEGORY", "DISTANCE", "CONTACT"
    )?;
    for row in rows {
        let distance = row
            .distance
            .map_or_else(|| "-".to_string(), |d| format!("{d:.1} {}", unit.abbreviation()));
        let category = match row.tier {
            Some(RankTier::Nearest) => format!("{} *", row.category),
            _ => row.category.clone(),
        };
        writeln!(
            out,
            "{:>4}  {:<40} {:<5} {:<18} {:>10}  {}",
            row.rank,
            truncate(&row.name, 40),
            row.state,
            truncate(&category, 18),
            distance,
            row.contact
        )?;
    }
    Ok(())
}

/// Write the detail view of one record.
pub fn write_details<W: Write, T: Describe>(
    out: &mut W,
    detail: &Detail<'_, T>,
    unit: DistanceUnit,
    today: NaiveDate,
    stale_after_days: i64,
) -> std::io::Result<()> {
    let entity = detail.record;
    let coords = entity.coordinates();
    writeln!(out, "{}", entity.name())?;
    writeln!(out, "  {:<20} {}", "ID", entity.id())?;
    writeln!(out, "  {:<20} {}", "State", entity.state())?;
    writeln!(
        out,
        "  {:<20} {:.5}, {:.5}",
        "Location", coords.latitude, coords.longitude
    )?;
    for (label, value) in entity.details() {
        writeln!(out, "  {label:<20} {value}")?;
    }
    if let Some(resort) = &detail.nearest_resort {
        writeln!(
            out,
            "  {:<20} {} ({:.1} {})",
            "Nearest resort",
            resort.name,
            resort.distance,
            unit.abbreviation()
        )?;
    }

    if let Some(verification) = entity.verification().filter(|v| !v.is_empty()) {
        match (verification.last_verified, verification.age_days(today)) {
            (Some(date), Some(age)) => {
                let flag = if verification.is_stale(today, stale_after_days) {
                    " (stale, verify before relying on it)"
                } else {
                    ""
                };
                writeln!(out, "  {:<20} {date} ({age} days ago){flag}", "Last verified")?;
            }
            _ => writeln!(out, "  {:<20} never", "Last verified")?,
        }
        if let Some(url) = &verification.source_url {
            writeln!(out, "  {:<20} {url}", "Source")?;
        }
    }
    Ok(())
}

/// Write rows as CSV with a header line.
pub fn write_csv<W: Write>(out: W, rows: &[Row]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write any serializable value as pretty JSON followed by a newline.
pub fn write_json<W: Write, S: Serialize + ?Sized>(
    mut out: W,
    value: &S,
) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out).map_err(serde_json::Error::io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proximity::{
        filter_entities, nearest_k, nearest_one, Coordinates, FilterCriteria, NearestQuery,
        PassAffiliation, Provider, ReferencePoint,
    };

    fn resorts() -> Vec<Resort> {
        vec![
            Resort::new("A", "CO", Coordinates::new(40.0, -105.0)).with_pass(PassAffiliation::Both),
            Resort::new("B", "CO", Coordinates::new(40.5, -105.5)),
        ]
    }

    #[test]
    fn test_rank_tiers() {
        assert_eq!(RankTier::from_rank(0), RankTier::Nearest);
        assert_eq!(RankTier::from_rank(1), RankTier::Closer);
        assert_eq!(RankTier::from_rank(2), RankTier::Closer);
        assert_eq!(RankTier::from_rank(3), RankTier::Other);
    }

    #[test]
    fn test_list_rows_respect_limit() {
        let resorts = resorts();
        let reference = Some(ReferencePoint::UserLocation(Coordinates::new(40.0, -105.0)));
        let view = filter_entities(&resorts, &FilterCriteria::default(), reference);
        let rows = list_rows(&view, Some(1));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[0].category, "Epic + Ikon");
        assert_eq!(rows[0].distance, Some(0.0));
    }

    #[test]
    fn test_neighbor_rows_carry_tier() {
        let resorts = resorts();
        let neighbors = nearest_k(Coordinates::new(40.5, -105.5), &resorts, &NearestQuery::default());
        let rows = neighbor_rows(&neighbors, DistanceUnit::Miles);
        assert_eq!(rows[0].name, "B");
        assert_eq!(rows[0].tier, Some(RankTier::Nearest));
        assert_eq!(rows[1].tier, Some(RankTier::Closer));
        assert_eq!(rows[1].distance, Some(43.5));
    }

    #[test]
    fn test_table_and_csv_output() {
        let resorts = resorts();
        let view = filter_entities(&resorts, &FilterCriteria::default(), None);
        let rows = list_rows(&view, None);

        let mut table = Vec::new();
        write_table(&mut table, &rows, DistanceUnit::Miles).unwrap();
        let table = String::from_utf8(table).unwrap();
        assert!(table.starts_with("   #  NAME"));
        assert_eq!(table.lines().count(), 3);

        let mut csv_out = Vec::new();
        write_csv(&mut csv_out, &rows).unwrap();
        let csv_out = String::from_utf8(csv_out).unwrap();
        assert!(csv_out.starts_with("rank,id,name,state,category,distance,tier,contact"));
        assert!(csv_out.contains("B|CO"));
    }

    #[test]
    fn test_details_flag_stale_verification() {
        let mut resort = Resort::new("Vail", "CO", Coordinates::new(39.6403, -106.3742));
        resort.ski_patrol_phone = Some("970-479-2288".to_string());
        resort.verification.last_verified = NaiveDate::from_ymd_opt(2024, 1, 1);

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let detail = Detail {
            record: &resort,
            nearest_resort: None,
        };
        let mut out = Vec::new();
        write_details(&mut out, &detail, DistanceUnit::Miles, today, 365).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Vail\n"));
        assert!(text.contains("970-479-2288"));
        assert!(text.contains("(517 days ago) (stale"));
        assert!(!text.contains("Nearest resort"));
    }

    #[test]
    fn test_details_show_nearest_resort() {
        let resorts = vec![
            Resort::new("Vail", "CO", Coordinates::new(39.6403, -106.3742)),
            Resort::new("Eldora", "CO", Coordinates::new(39.9372, -105.5827)),
        ];
        let clinic = Clinic::new(
            "062505",
            "Frisco Dialysis",
            Some(Provider::DaVita),
            Coordinates::new(39.57, -106.09),
        );
        let neighbor = nearest_one(clinic.coordinates(), &resorts).unwrap();
        let detail = Detail {
            record: &clinic,
            nearest_resort: Some(NearestResort::from_neighbor(&neighbor, DistanceUnit::Miles)),
        };

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut out = Vec::new();
        write_details(&mut out, &detail, DistanceUnit::Miles, today, 365).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Nearest resort       Vail (15.9 mi)"), "{text}");

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["ccn"], "062505");
        assert_eq!(json["nearestResort"]["id"], "Vail|CO");
        assert_eq!(json["nearestResort"]["distance"], 15.9);
    }

    #[test]
    fn test_nearest_resort_in_kilometers() {
        let resorts = vec![Resort::new("Vail", "CO", Coordinates::new(39.6403, -106.3742))];
        let neighbor = nearest_one(Coordinates::new(39.57, -106.09), &resorts).unwrap();
        let nearest = NearestResort::from_neighbor(&neighbor, DistanceUnit::Kilometers);
        assert!((nearest.distance - 25.6).abs() < 0.2, "got {}", nearest.distance);
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("Arapahoe Basin Ski Area", 10), "Arapahoe …");
    }
}
