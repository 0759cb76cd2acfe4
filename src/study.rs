//! Display sets of one study, with change notifications.

use crate::event::{ListenerId, StudyEvent};
use crate::handler::HandlerRegistry;
use crate::model::{DisplaySet, Instance};
use crate::partition::{sort_display_sets, PartitionOptions};
use serde::Serialize;
use uuid::Uuid;

type Listener = Box<dyn FnMut(&StudyEvent)>;

/// The grouped state of one study.
///
/// Listeners are called synchronously, in subscription order, once the
/// change they describe is complete.
#[derive(Serialize)]
pub struct Study {
    #[serde(rename = "StudyInstanceUID")]
    study_instance_uid: String,
    #[serde(rename = "PatientID", skip_serializing_if = "Option::is_none")]
    patient_id: Option<String>,
    display_sets: Vec<DisplaySet>,
    non_viewable: Vec<Instance>,
    #[serde(skip)]
    listeners: Vec<(ListenerId, Listener)>,
    #[serde(skip)]
    next_listener: u64,
}

impl std::fmt::Debug for Study {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Study")
            .field("study_instance_uid", &self.study_instance_uid)
            .field("patient_id", &self.patient_id)
            .field("display_sets", &self.display_sets.len())
            .field("non_viewable", &self.non_viewable.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Study {
    pub fn new(study_instance_uid: impl Into<String>) -> Self {
        Study {
            study_instance_uid: study_instance_uid.into(),
            patient_id: None,
            display_sets: Vec::new(),
            non_viewable: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn with_patient_id(mut self, patient_id: Option<String>) -> Self {
        self.patient_id = patient_id;
        self
    }

    pub fn study_instance_uid(&self) -> &str {
        &self.study_instance_uid
    }

    pub fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StudyEvent) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the listener was subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(known, _)| *known != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: StudyEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    /// Groups one series and merges the result into the study.
    ///
    /// Display sets and non-viewable instances from an earlier grouping
    /// of the same series are replaced.
    pub fn add_series(
        &mut self,
        registry: &HandlerRegistry,
        instances: &[Instance],
        options: &PartitionOptions,
    ) {
        let Some(series_instance_uid) = instances
            .first()
            .map(|instance| instance.series_instance_uid.clone())
        else {
            return;
        };

        let removed = self.remove_series(&series_instance_uid);
        if !removed.is_empty() {
            self.notify(StudyEvent::DisplaySetsRemoved {
                series_instance_uid: series_instance_uid.clone(),
                ids: removed,
            });
        }

        let partition = registry.display_sets_from_series(instances, options);
        let non_viewable: Vec<String> = partition
            .non_viewable
            .iter()
            .map(|instance| instance.sop_instance_uid.clone())
            .collect();
        self.display_sets.extend(partition.image_sets);
        self.non_viewable.extend(partition.non_viewable);
        sort_display_sets(&mut self.display_sets, options.is_low_priority_last());

        // in display order
        let ids: Vec<Uuid> = self
            .display_sets
            .iter()
            .filter(|set| set.series_instance_uid == series_instance_uid)
            .map(|set| set.id)
            .collect();
        log::info!(
            "series {series_instance_uid}: {} display sets, {} not viewable",
            ids.len(),
            non_viewable.len()
        );

        if !ids.is_empty() {
            self.notify(StudyEvent::DisplaySetsAdded {
                series_instance_uid: series_instance_uid.clone(),
                ids,
            });
        }
        if !non_viewable.is_empty() {
            self.notify(StudyEvent::NonViewableReported {
                series_instance_uid,
                sop_instance_uids: non_viewable,
            });
        }
        self.notify(StudyEvent::DisplaySetsSorted);
    }

    fn remove_series(&mut self, series_instance_uid: &str) -> Vec<Uuid> {
        let mut removed = Vec::new();
        self.display_sets.retain(|set| {
            let keep = set.series_instance_uid != series_instance_uid;
            if !keep {
                removed.push(set.id);
            }
            keep
        });
        self.non_viewable
            .retain(|instance| instance.series_instance_uid != series_instance_uid);
        removed
    }

    pub fn display_sets(&self) -> &[DisplaySet] {
        &self.display_sets
    }

    pub fn non_viewable(&self) -> &[Instance] {
        &self.non_viewable
    }

    pub fn find_display_set(&self, id: Uuid) -> Option<&DisplaySet> {
        self.display_sets.iter().find(|set| set.id == id)
    }

    pub fn display_set_count(&self) -> usize {
        self.display_sets.len()
    }

    /// Instances held by display sets plus non-viewable ones.
    pub fn instance_count(&self) -> usize {
        self.display_sets.iter().map(DisplaySet::len).sum::<usize>() + self.non_viewable.len()
    }
}
