use super::Instance;
use std::collections::BTreeMap;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeriesKey {
    pub patient: String,
    pub study: String,
    pub series: String,
}

impl SeriesKey {
    pub fn new(patient: &str, study: &str, series: &str) -> Self {
        Self {
            patient: patient.to_string(),
            study: study.to_string(),
            series: series.to_string(),
        }
    }
}

pub type SeriesMap = BTreeMap<String, Vec<Instance>>;
pub type StudyMap = BTreeMap<String, SeriesMap>;

/// Loaded instances grouped by patient, study and series.
///
/// Instances keep their arrival order inside each series.
#[derive(Debug, Clone, Default)]
pub struct StudyTree {
    patients: BTreeMap<String, StudyMap>,
}

impl StudyTree {
    pub fn from_instances<I>(instances: I) -> Self
    where
        I: IntoIterator<Item = Instance>,
    {
        let mut tree = StudyTree::default();
        for instance in instances {
            tree.insert(instance);
        }
        tree
    }

    pub fn insert(&mut self, instance: Instance) {
        let patient = instance.patient_id.as_deref().unwrap_or(UNKNOWN).to_string();
        self.patients
            .entry(patient)
            .or_default()
            .entry(instance.study_instance_uid.clone())
            .or_default()
            .entry(instance.series_instance_uid.clone())
            .or_default()
            .push(instance);
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn patients(&self) -> impl Iterator<Item = (&str, &StudyMap)> {
        self.patients
            .iter()
            .map(|(patient, studies)| (patient.as_str(), studies))
    }

    /// Iterates over every series as `(key, instances)`,
    /// in patient, study and series UID order.
    pub fn series(&self) -> impl Iterator<Item = (SeriesKey, &[Instance])> {
        self.patients.iter().flat_map(|(patient, studies)| {
            studies.iter().flat_map(move |(study, series_map)| {
                series_map.iter().map(move |(series, instances)| {
                    (
                        SeriesKey::new(patient, study, series),
                        instances.as_slice(),
                    )
                })
            })
        })
    }

    pub fn instance_count(&self) -> usize {
        self.series().map(|(_, instances)| instances.len()).sum()
    }
}
