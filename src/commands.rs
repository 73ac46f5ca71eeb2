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

//! Command execution: wires the loaded data, configuration, and CLI
//! arguments into the proximity engine and renders the results.

use std::error::Error;
use std::io::{self, Write};

use chrono::Local;
use log::{debug, info};
use proximity::{
    filter_entities, nearest_one, nearest_to, reduce, CoordinateError, Coordinates, DistanceUnit,
    FilterCriteria, GeoEntity, NearestQuery, ReferencePoint, Resort, ViewAction, ViewState,
};
use serde::Serialize;

use crate::cli::{Cli, Collection, Command, ConfigAction, ListArgs, NearestArgs};
use crate::config::AppConfig;
use crate::data::{Dataset, DatasetSummary};
use crate::output::{self, Describe, Detail, NearestResort, OutputFormat, Row};

type CommandResult = Result<(), Box<dyn Error>>;

/// Settings resolved from the config file and global flags.
#[derive(Debug)]
struct Context {
    config: AppConfig,
    unit: DistanceUnit,
    format: OutputFormat,
}

pub fn run(cli: Cli, mut config: AppConfig) -> CommandResult {
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let unit = if cli.km {
        DistanceUnit::Kilometers
    } else {
        config.units
    };
    let ctx = Context {
        config,
        unit,
        format: cli.format,
    };

    // Config commands must work without any data on disk.
    let command = match cli.command {
        Command::Config { action } => return run_config(&ctx, action),
        command => command,
    };

    let data = Dataset::load_from_directory(&ctx.config.data_dir)?;
    if data.is_empty() {
        return Err(format!("no data found in {}", ctx.config.data_dir.display()).into());
    }

    match command {
        Command::List(args) => run_list(&ctx, &data, &args),
        Command::Nearest(args) => run_nearest(&ctx, &data, &args),
        Command::Show { collection, id } => run_show(&ctx, &data, collection, &id),
        Command::Stats => run_stats(&ctx, &data),
        Command::Config { action } => run_config(&ctx, action),
    }
}

fn run_config(ctx: &Context, action: ConfigAction) -> CommandResult {
    let mut stdout = io::stdout().lock();
    match action {
        ConfigAction::Path => writeln!(stdout, "{}", AppConfig::get_config_path()?.display())?,
        ConfigAction::Show => output::write_json(&mut stdout, &ctx.config)?,
    }
    Ok(())
}

fn reference_point(
    ctx: &Context,
    args: &ListArgs,
) -> Result<Option<ReferencePoint>, CoordinateError> {
    let user = match args.location.user_location()? {
        Some(location) => Some(location),
        None => ctx
            .config
            .override_location()
            .map(|(lat, lon)| Coordinates::try_new(lat, lon))
            .transpose()?,
    };
    Ok(ReferencePoint::resolve(user, args.location.map_center()?))
}

fn base_criteria<C>(ctx: &Context, args: &ListArgs) -> FilterCriteria<C> {
    let mut criteria = FilterCriteria::default()
        .with_query(args.query.clone())
        .with_max_distance(args.max_distance.unwrap_or(ctx.config.max_distance_miles))
        .with_unit(ctx.unit);
    if let Some(state) = &args.state {
        criteria = criteria.with_state(state.to_ascii_uppercase());
    }
    criteria
}

fn run_list(ctx: &Context, data: &Dataset, args: &ListArgs) -> CommandResult {
    let reference = reference_point(ctx, args)?;
    if let Some(reference) = reference {
        info!("Listing {:?}, {}", args.collection, reference.description());
    }

    match args.collection {
        Collection::Resorts => {
            let networks = if args.pass_networks.is_empty() {
                ctx.config.enabled_pass_networks.clone()
            } else {
                args.pass_networks.clone()
            };
            let criteria = base_criteria(ctx, args).with_categories(networks);
            print_list(ctx, &data.resorts, &criteria, reference, args.limit)
        }
        Collection::Clinics => {
            let mut criteria = base_criteria(ctx, args);
            if !args.providers.is_empty() {
                criteria = criteria.with_categories(args.providers.iter().copied());
            }
            print_list(ctx, &data.clinics, &criteria, reference, args.limit)
        }
        Collection::Hospitals => {
            let mut criteria = base_criteria(ctx, args);
            if !args.care.is_empty() {
                criteria = criteria.with_categories(args.care.iter().copied());
            }
            print_list(ctx, &data.hospitals, &criteria, reference, args.limit)
        }
        Collection::UrgentCare => {
            let mut criteria = base_criteria(ctx, args);
            if !args.kinds.is_empty() {
                criteria = criteria.with_categories(args.kinds.iter().copied());
            }
            print_list(ctx, &data.facilities, &criteria, reference, args.limit)
        }
    }
}

fn print_list<T: Describe + Serialize>(
    ctx: &Context,
    entities: &[T],
    criteria: &FilterCriteria<T::Category>,
    reference: Option<ReferencePoint>,
    limit: Option<usize>,
) -> CommandResult {
    let mut view = filter_entities(entities, criteria, reference);
    let total = view.len();
    let mut stdout = io::stdout().lock();

    match ctx.format {
        OutputFormat::Json => {
            if let Some(limit) = limit {
                view.items.truncate(limit);
            }
            output::write_json(&mut stdout, &view)?;
        }
        OutputFormat::Csv => output::write_csv(&mut stdout, &output::list_rows(&view, limit))?,
        OutputFormat::Table => {
            let rows = output::list_rows(&view, limit);
            output::write_table(&mut stdout, &rows, ctx.unit)?;
            let basis = view.reference.map_or("unsorted", |r| r.description());
            writeln!(stdout, "\n{} of {} shown, {}", rows.len(), total, basis)?;
        }
    }
    Ok(())
}

fn run_nearest(ctx: &Context, data: &Dataset, args: &NearestArgs) -> CommandResult {
    let resort = data
        .find_resort(&args.resort)
        .ok_or_else(|| format!("no resort matches '{}'", args.resort))?;

    let defaults = ctx.config.nearest;
    let query = NearestQuery {
        limit: args.limit.unwrap_or(defaults.limit),
        ceiling_miles: args.ceiling.unwrap_or(defaults.ceiling_miles),
        floor: args.floor.unwrap_or(defaults.floor),
    };

    let mut state = reduce(&ViewState::default(), ViewAction::Select(resort.id.clone()));
    if let Some(rank) = args.highlight {
        // Ranks start at 1 on the command line.
        state = reduce(&state, ViewAction::HighlightNeighbor(rank - 1));
    }
    debug!("View state: {:?}", state);

    match args.target {
        Collection::Clinics => print_neighbors(ctx, resort, &data.clinics, &query, &state),
        Collection::Hospitals => print_neighbors(ctx, resort, &data.hospitals, &query, &state),
        Collection::UrgentCare => print_neighbors(ctx, resort, &data.facilities, &query, &state),
        Collection::Resorts => print_neighbors(
            ctx,
            resort,
            &data
                .resorts
                .iter()
                .filter(|r| r.id != resort.id)
                .cloned()
                .collect::<Vec<_>>(),
            &query,
            &state,
        ),
    }
}

fn print_neighbors<O: GeoEntity, T: Describe + Serialize>(
    ctx: &Context,
    origin: &O,
    targets: &[T],
    query: &NearestQuery,
    state: &ViewState,
) -> CommandResult {
    let neighbors = nearest_to(origin, targets, query);
    let rows = output::neighbor_rows(&neighbors, ctx.unit);
    let mut stdout = io::stdout().lock();

    match ctx.format {
        OutputFormat::Json => output::write_json(&mut stdout, &neighbors)?,
        OutputFormat::Csv => output::write_csv(&mut stdout, &rows)?,
        OutputFormat::Table => {
            writeln!(stdout, "Nearest to {} ({})\n", origin.name(), origin.id())?;
            output::write_table(&mut stdout, &rows, ctx.unit)?;
            if let Some(row) = highlighted_row(&rows, state) {
                writeln!(stdout, "\nHighlighted: {} ({})", row.name, row.id)?;
            }
        }
    }
    Ok(())
}

fn highlighted_row<'a>(rows: &'a [Row], state: &ViewState) -> Option<&'a Row> {
    state
        .highlighted_neighbor
        .and_then(|rank| rows.iter().find(|row| row.rank == rank + 1))
}

fn run_show(ctx: &Context, data: &Dataset, collection: Collection, id: &str) -> CommandResult {
    match collection {
        Collection::Resorts => {
            let resort = data
                .find_resort(id)
                .ok_or_else(|| format!("no resort matches '{id}'"))?;
            let detail = Detail {
                record: resort,
                nearest_resort: None,
            };
            print_one(ctx, &detail)
        }
        Collection::Clinics => {
            print_one(ctx, &care_detail(ctx, find_by_id(&data.clinics, id)?, &data.resorts))
        }
        Collection::Hospitals => {
            print_one(ctx, &care_detail(ctx, find_by_id(&data.hospitals, id)?, &data.resorts))
        }
        Collection::UrgentCare => {
            print_one(ctx, &care_detail(ctx, find_by_id(&data.facilities, id)?, &data.resorts))
        }
    }
}

/// Detail view of a care record, annotated with the closest resort.
fn care_detail<'a, T: GeoEntity>(
    ctx: &Context,
    entity: &'a T,
    resorts: &[Resort],
) -> Detail<'a, T> {
    let nearest_resort = nearest_one(entity.coordinates(), resorts)
        .map(|neighbor| NearestResort::from_neighbor(&neighbor, ctx.unit));
    Detail {
        record: entity,
        nearest_resort,
    }
}

fn find_by_id<'a, T: GeoEntity>(entities: &'a [T], id: &str) -> Result<&'a T, String> {
    entities
        .iter()
        .find(|e| e.id().eq_ignore_ascii_case(id))
        .ok_or_else(|| format!("no record with id '{id}'"))
}

fn print_one<T: Describe + Serialize>(ctx: &Context, detail: &Detail<'_, T>) -> CommandResult {
    let mut stdout = io::stdout().lock();
    match ctx.format {
        OutputFormat::Json => output::write_json(&mut stdout, detail)?,
        OutputFormat::Csv => {
            let row = output::list_rows(
                &filter_entities(
                    std::slice::from_ref(detail.record),
                    &FilterCriteria::default(),
                    None,
                ),
                None,
            );
            output::write_csv(&mut stdout, &row)?;
        }
        OutputFormat::Table => {
            let today = Local::now().date_naive();
            output::write_details(
                &mut stdout,
                detail,
                ctx.unit,
                today,
                ctx.config.stale_after_days,
            )?;
        }
    }
    Ok(())
}

fn run_stats(ctx: &Context, data: &Dataset) -> CommandResult {
    let summary = DatasetSummary::from_dataset(data);
    let mut stdout = io::stdout().lock();

    if ctx.format == OutputFormat::Json {
        output::write_json(&mut stdout, &summary)?;
        return Ok(());
    }

    writeln!(stdout, "Resorts:    {:>6}", summary.resorts)?;
    writeln!(stdout, "Clinics:    {:>6}", summary.clinics)?;
    writeln!(stdout, "Hospitals:  {:>6}", summary.hospitals)?;
    writeln!(stdout, "Facilities: {:>6}", summary.facilities)?;
    writeln!(stdout, "States:     {:>6}", summary.states)?;

    writeln!(stdout, "\nBy pass network:")?;
    for (pass, count) in &summary.resorts_by_pass {
        writeln!(stdout, "  {pass:<16} {count:>5}")?;
    }
    writeln!(stdout, "\nBy region:")?;
    for (region, count) in &summary.resorts_by_region {
        writeln!(stdout, "  {region:<16} {count:>5}")?;
    }
    writeln!(stdout, "\nClinics by provider:")?;
    for (provider, count) in &summary.clinics_by_provider {
        writeln!(stdout, "  {provider:<16} {count:>5}")?;
    }
    writeln!(
        stdout,
        "\nEmergency contacts: {}  ER hospitals: {}  Trauma centers: {}  24h urgent care: {}",
        summary.resorts_with_emergency_contact,
        summary.hospitals_with_emergency,
        summary.trauma_centers,
        summary.facilities_24_hour
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use proximity::{Clinic, Provider};

    fn context(config: AppConfig) -> Context {
        Context {
            config,
            unit: DistanceUnit::Miles,
            format: OutputFormat::Table,
        }
    }

    fn list_args(flags: &[&str]) -> ListArgs {
        let mut argv = vec!["skiwithcare", "list", "resorts"];
        argv.extend_from_slice(flags);
        let Command::List(args) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected list command");
        };
        args
    }

    fn row(rank: usize, name: &str) -> Row {
        let resort = Resort::new(name, "CO", Coordinates::new(40.0, -105.0));
        let view = filter_entities(std::slice::from_ref(&resort), &FilterCriteria::default(), None);
        Row {
            rank,
            ..output::list_rows(&view, None).remove(0)
        }
    }

    #[test]
    fn test_highlighted_row_matches_rank() {
        let rows = vec![row(1, "First"), row(2, "Second")];
        let state = reduce(&ViewState::default(), ViewAction::Select("x".to_string()));
        let state = reduce(&state, ViewAction::HighlightNeighbor(1));
        assert_eq!(highlighted_row(&rows, &state).map(|r| r.name.as_str()), Some("Second"));
        assert!(highlighted_row(&rows, &ViewState::default()).is_none());
    }

    #[test]
    fn test_reference_point_prefers_flags_over_override() {
        let ctx = context(AppConfig {
            override_latitude: Some(39.6),
            override_longitude: Some(-106.3),
            ..AppConfig::default()
        });

        let flags = list_args(&["--lat", "40.0", "--lon", "-105.0"]);
        assert_eq!(
            reference_point(&ctx, &flags),
            Ok(Some(ReferencePoint::UserLocation(Coordinates::new(40.0, -105.0))))
        );

        let none = list_args(&[]);
        assert_eq!(
            reference_point(&ctx, &none),
            Ok(Some(ReferencePoint::UserLocation(Coordinates::new(39.6, -106.3))))
        );
    }

    #[test]
    fn test_reference_point_rejects_invalid_coordinates() {
        let ctx = context(AppConfig::default());
        let args = list_args(&["--lat", "95.0", "--lon", "-105.0"]);
        assert_eq!(
            reference_point(&ctx, &args),
            Err(CoordinateError::InvalidLatitude(95.0))
        );

        let args = list_args(&["--center-lat", "40.0", "--center-lon", "-200.0"]);
        assert_eq!(
            reference_point(&ctx, &args),
            Err(CoordinateError::InvalidLongitude(-200.0))
        );

        let bad_override = context(AppConfig {
            override_latitude: Some(f64::NAN),
            override_longitude: Some(-105.0),
            ..AppConfig::default()
        });
        assert!(reference_point(&bad_override, &list_args(&[])).is_err());
    }

    #[test]
    fn test_care_detail_names_nearest_resort() {
        let ctx = context(AppConfig::default());
        let resorts = vec![
            Resort::new("Eldora", "CO", Coordinates::new(39.9372, -105.5827)),
            Resort::new("Vail", "CO", Coordinates::new(39.6403, -106.3742)),
        ];
        let clinic = Clinic::new(
            "062505",
            "Frisco Dialysis",
            Some(Provider::DaVita),
            Coordinates::new(39.57, -106.09),
        );

        let detail = care_detail(&ctx, &clinic, &resorts);
        let nearest = detail.nearest_resort.unwrap();
        assert_eq!(nearest.name, "Vail");
        assert_eq!(nearest.distance, 15.9);

        assert!(care_detail(&ctx, &clinic, &[]).nearest_resort.is_none());
    }
}
