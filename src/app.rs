use crate::handler::HandlerRegistry;
use crate::model::loader::{load_instances, load_path, Loaded};
use crate::model::StudyTree;
use crate::partition::{PartitionOptions, SplitRule};
use crate::study::Study;
use crate::views::write_study_tree;
use clap::{Parser, ValueEnum};
use snafu::{Report, ResultExt, Whatever};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

/// Exit code for fatal errors.
pub const ERROR_FATAL: i32 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Group DICOM series into display sets
#[derive(Debug, Parser)]
#[command(version)]
pub struct App {
    /// The DICOM files to read (`.json` files hold instance records)
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Only group the series with this number
    #[arg(long = "series-number", allow_negative_numbers = true)]
    series_number: Option<i32>,
    /// Split stacks by this attribute,
    /// as `KEYWORD` or `KEYWORD=presence|value` (replaces the defaults)
    #[arg(long = "split-rule", value_parser = parse_split_rule)]
    split_rules: Vec<SplitRule>,
    /// Do not split stacks at all
    #[arg(long = "no-split", conflicts_with = "split_rules")]
    no_split: bool,
    /// Treat instances of non-image SOP classes as not viewable
    #[arg(long = "require-image-sop-class")]
    require_image_sop_class: bool,
    /// Sort derived objects (SEG, KO, PR, SR, RTSTRUCT) last
    #[arg(long = "low-priority-last")]
    low_priority_last: bool,
    /// The output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Stop at the first file which cannot be read
    #[arg(long = "fail-first")]
    fail_first: bool,
}

fn parse_split_rule(value: &str) -> Result<SplitRule, String> {
    value.parse().map_err(|err| Report::from_error(err).to_string())
}

impl App {
    pub fn options(&self) -> PartitionOptions {
        let rules = if self.no_split {
            Vec::new()
        } else if self.split_rules.is_empty() {
            SplitRule::defaults()
        } else {
            self.split_rules.clone()
        };

        let mut options = PartitionOptions::new();
        options
            .series_number(self.series_number)
            .split_rules(rules)
            .require_image_sop_class(self.require_image_sop_class)
            .low_priority_last(self.low_priority_last);
        options
    }
}

/// Builds one [`Study`] per study UID in the tree.
///
/// A study found under more than one patient is grouped once, keeping
/// the first patient ID.
pub fn group_studies(
    tree: &StudyTree,
    registry: &HandlerRegistry,
    options: &PartitionOptions,
) -> Vec<Study> {
    let mut studies: Vec<Study> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    for (patient_id, study_map) in tree.patients() {
        for (study_uid, series_map) in study_map {
            let position = *index.entry(study_uid.as_str()).or_insert_with(|| {
                studies.push(
                    Study::new(study_uid.as_str()).with_patient_id(Some(patient_id.to_string())),
                );
                studies.len() - 1
            });
            let study = &mut studies[position];
            if study.patient_id() != Some(patient_id) {
                log::warn!(
                    "study {study_uid} also appears under patient {patient_id}, merging into {}",
                    study.patient_id().unwrap_or_default()
                );
            }
            for instances in series_map.values() {
                study.add_series(registry, instances, options);
            }
        }
    }
    studies
}

pub fn run() -> i32 {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    let app = App::parse();
    match run_app(&app) {
        Ok(failures) => failures,
        Err(err) => {
            eprintln!("{}", Report::from_error(err));
            ERROR_FATAL
        }
    }
}

/// Returns the number of files and records which could not be read.
fn run_app(app: &App) -> Result<i32, Whatever> {
    let options = app.options();

    let loaded = if app.fail_first {
        let mut loaded = Loaded::default();
        for path in &app.files {
            let mut partial = load_path(path, options.rules())
                .whatever_context("stopping at the first unreadable file")?;
            if !partial.failures.is_empty() {
                let failure = partial.failures.swap_remove(0);
                return Err(failure).whatever_context("stopping at the first unreadable record");
            }
            loaded.extend(partial);
        }
        loaded
    } else {
        load_instances(&app.files, options.rules())
    };

    for failure in &loaded.failures {
        eprintln!("[ERROR] {}", Report::from_error(failure));
    }
    let failures = loaded.failures.len() as i32;

    let tree = StudyTree::from_instances(loaded.instances);
    log::info!(
        "{} instances in {} series",
        tree.instance_count(),
        tree.series().count()
    );
    let registry = HandlerRegistry::with_defaults();
    let studies = group_studies(&tree, &registry, &options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let written = match app.format {
        OutputFormat::Text => write_study_tree(&mut out, &studies),
        OutputFormat::Json => serde_json::to_writer_pretty(&mut out, &studies)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(out)),
    };
    match written {
        // a closed pipe is not an error
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
        other => other.whatever_context("could not write output")?,
    }

    Ok(failures)
}
