//! Focused unit tests covering CLI configuration validation.

use super::helpers::{workspace, write_utf8};
use super::*;
use crate::filter::{FilterArgs, FilterConfig};
use crate::replace::{DEFAULT_CAPACITY, ReplaceArgs, ReplaceConfig};
use crate::tag::{TagBuildingsArgs, TagBuildingsConfig};
use camino::Utf8PathBuf;
use rstest::rstest;

fn complete_replace_args() -> ReplaceArgs {
    ReplaceArgs {
        input: Some(Utf8PathBuf::from("ours.osm")),
        similarity: Some(90),
        candidates: Some(vec![Utf8PathBuf::from("candidates.osm")]),
        ..ReplaceArgs::default()
    }
}

#[rstest]
#[case::input(ReplaceArgs { input: None, ..complete_replace_args() }, ARG_INPUT, ENV_REPLACE_INPUT)]
#[case::similarity(
    ReplaceArgs { similarity: None, ..complete_replace_args() },
    ARG_SIMILARITY,
    ENV_REPLACE_SIMILARITY
)]
#[case::candidates(
    ReplaceArgs { candidates: Some(Vec::new()), ..complete_replace_args() },
    ARG_CANDIDATES,
    ENV_REPLACE_CANDIDATES
)]
fn converting_replace_without_required_fields_errors(
    #[case] args: ReplaceArgs,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let err = ReplaceConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn replace_config_applies_defaults() {
    let config = ReplaceConfig::try_from(complete_replace_args()).expect("config should build");
    assert_eq!(config.capacity, DEFAULT_CAPACITY);
    assert_eq!(config.options.threshold.percent(), 90);
    assert_eq!(config.options.subdivide.min_extent(), 1e-4);
    assert_eq!(config.output, None);
}

#[rstest]
fn similarity_above_one_hundred_is_rejected() {
    let args = ReplaceArgs {
        similarity: Some(101),
        ..complete_replace_args()
    };
    let err = ReplaceConfig::try_from(args).expect_err("out of range");
    match err {
        CliError::InvalidThreshold(inner) => assert_eq!(inner.value, 101),
        other => panic!("expected InvalidThreshold, found {other:?}"),
    }
}

#[rstest]
#[case::zero_capacity(Some(0), None, ARG_CAPACITY)]
#[case::zero_extent(None, Some(0.0), ARG_MIN_EXTENT)]
#[case::negative_extent(None, Some(-0.5), ARG_MIN_EXTENT)]
#[case::nan_extent(None, Some(f64::NAN), ARG_MIN_EXTENT)]
fn non_positive_limits_are_rejected(
    #[case] capacity: Option<usize>,
    #[case] min_extent: Option<f64>,
    #[case] expected: &'static str,
) {
    let args = ReplaceArgs {
        capacity,
        min_extent,
        ..complete_replace_args()
    };
    match ReplaceConfig::try_from(args).expect_err("limit should be rejected") {
        CliError::NotPositive { field } => assert_eq!(field, expected),
        other => panic!("expected NotPositive, found {other:?}"),
    }
}

#[rstest]
fn filter_requires_a_region() {
    let args = FilterArgs {
        diff: Some(Utf8PathBuf::from("campus.osc")),
        ..FilterArgs::default()
    };
    match FilterConfig::try_from(args).expect_err("region required") {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_REGION);
            assert_eq!(env, ENV_FILTER_REGION);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn filter_context_defaults_to_empty() {
    let args = FilterArgs {
        diff: Some(Utf8PathBuf::from("campus.osc")),
        region: Some(vec![Utf8PathBuf::from("campus.wkt")]),
        ..FilterArgs::default()
    };
    let config = FilterConfig::try_from(args).expect("config should build");
    assert!(config.contexts.is_empty());
}

#[rstest]
fn tag_buildings_requires_an_input() {
    match TagBuildingsConfig::try_from(TagBuildingsArgs::default()).expect_err("input required") {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_INPUT);
            assert_eq!(env, ENV_TAG_INPUT);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_candidates() {
    let (_tmp, root) = workspace();
    let input = root.join("ours.osm");
    write_utf8(&input, "<osm/>");
    let config = ReplaceConfig::try_from(ReplaceArgs {
        input: Some(input),
        candidates: Some(vec![root.join("missing.osm")]),
        ..complete_replace_args()
    })
    .expect("config should build");
    match config.validate_sources().expect_err("candidate is missing") {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_CANDIDATES);
            assert_eq!(path, root.join("missing.osm"));
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories() {
    let (_tmp, root) = workspace();
    let region = root.join("campus.wkt");
    write_utf8(&region, "POINT(0 0)");
    let config = FilterConfig {
        diff: root.clone(),
        contexts: Vec::new(),
        regions: vec![region],
        output: None,
    };
    match config.validate_sources().expect_err("directory rejected") {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_DIFF),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn replace_arguments_parse_from_the_command_line() {
    let cli = Cli::try_parse_from([
        "osm-merge",
        "replace",
        "ours.osm",
        "--similarity",
        "95",
        "--candidates",
        "north.osm",
        "--candidates",
        "south.osm",
        "--min-extent",
        "0.001",
    ])
    .expect("arguments parse");
    match cli.command {
        Command::Replace(args) => {
            assert_eq!(args.input, Some(Utf8PathBuf::from("ours.osm")));
            assert_eq!(args.similarity, Some(95));
            assert_eq!(
                args.candidates,
                Some(vec![
                    Utf8PathBuf::from("north.osm"),
                    Utf8PathBuf::from("south.osm")
                ])
            );
            assert_eq!(args.min_extent, Some(0.001));
        }
        other => panic!("expected the replace command, found {other:?}"),
    }
}

#[rstest]
fn tag_buildings_subcommand_uses_kebab_case() {
    let cli = Cli::try_parse_from(["osm-merge", "tag-buildings", "municipal.osm"])
        .expect("arguments parse");
    assert!(matches!(cli.command, Command::TagBuildings(_)));
}
