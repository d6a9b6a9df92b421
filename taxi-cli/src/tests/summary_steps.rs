//! Behaviour-driven step definitions for the summary CLI scenarios.

use super::helpers::{SAMPLE_TRIPS, Workspace, number_field};
use super::*;
use crate::summary::run_summary_with;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

#[derive(Debug)]
struct SummaryWorld {
    workspace: Workspace,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SummaryWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn run(&self, extra: &[&str]) {
        let mut argv = vec![
            "taxi-rank".to_owned(),
            "summary".to_owned(),
            format!("--{ARG_DATASET}"),
            self.workspace.dataset.as_str().to_owned(),
        ];
        argv.extend(extra.iter().map(|arg| (*arg).to_owned()));

        let parsed = Cli::try_parse_from(argv).map_err(CliError::from);
        let outcome = parsed.and_then(|cli| match cli.command {
            Command::Summary(args) => {
                let mut buffer = self.stdout.borrow_mut();
                run_summary_with(args, &JsonTripSourceBuilder, &mut *buffer)
            }
            other => panic!("expected summary command, found {other:?}"),
        });
        self.result.replace(Some(outcome));
    }

    fn printed_summary(&self) -> serde_json::Value {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("result recorded");
        result.as_ref().expect("expected success");
        let stdout = self.stdout.borrow();
        assert!(stdout.ends_with(b"\n"), "output should end with a newline");
        serde_json::from_slice(&stdout).expect("output should be a JSON object")
    }

    fn assert_summary(&self, trips: f64, revenue: f64, hours: usize) {
        let summary = self.printed_summary();
        assert_eq!(number_field(&summary, "total_trips"), trips);
        assert_eq!(number_field(&summary, "total_revenue"), revenue);
        let per_hour = summary
            .get("trips_per_hour")
            .and_then(serde_json::Value::as_array)
            .expect("hourly profile");
        assert_eq!(per_hour.len(), hours);
    }
}

#[fixture]
fn world() -> SummaryWorld {
    SummaryWorld::new()
}

#[given("the sample trips are ready to summarise")]
fn sample_dataset_exists(#[from(world)] world: &SummaryWorld) {
    world.workspace.write_dataset(SAMPLE_TRIPS);
}

#[when("I run summary")]
fn run_summary(#[from(world)] world: &SummaryWorld) {
    world.run(&[]);
}

#[when("I run summary for 2 March 2016")]
fn run_summary_for_one_day(#[from(world)] world: &SummaryWorld) {
    world.run(&["--start", "2016-03-02", "--end", "2016-03-02"]);
}

#[when("I run summary with end date 2016-03-32")]
fn run_summary_with_bad_end(#[from(world)] world: &SummaryWorld) {
    world.run(&["--end", "2016-03-32"]);
}

#[then("the summary reports 4 trips with 97 in revenue over 4 pickup hours")]
fn reports_every_trip(#[from(world)] world: &SummaryWorld) {
    world.assert_summary(4.0, 97.0, 4);
    let summary = world.printed_summary();
    assert_eq!(number_field(&summary, "avg_distance_km"), 2.0);
    assert_eq!(summary.get("avg_duration_min"), Some(&serde_json::Value::Null));
}

#[then("the summary reports 2 trips with 82 in revenue over 2 pickup hours")]
fn reports_one_day(#[from(world)] world: &SummaryWorld) {
    world.assert_summary(2.0, 82.0, 2);
}

#[then("the command fails because the end date is invalid")]
fn fails_invalid_end(#[from(world)] world: &SummaryWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::InvalidDate { field, value, .. } => {
            assert_eq!(*field, ARG_END);
            assert_eq!(value, "2016-03-32");
        }
        other => panic!("expected InvalidDate, found {other:?}"),
    }
}

macro_rules! register_summary_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/summary_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SummaryWorld) {
            let _ = world;
        }
    };
}

register_summary_scenario!(summary_every_trip, "summarising every trip");
register_summary_scenario!(summary_single_day, "summarising a single pickup day");
register_summary_scenario!(summary_invalid_end, "rejecting a malformed end date");
