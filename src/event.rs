use uuid::Uuid;

/// Changes of a [`Study`](crate::study::Study), in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum StudyEvent {
    /// Display sets of a series which is being grouped again were dropped.
    DisplaySetsRemoved {
        series_instance_uid: String,
        ids: Vec<Uuid>,
    },
    DisplaySetsAdded {
        series_instance_uid: String,
        ids: Vec<Uuid>,
    },
    /// The display set list was put back in display order.
    DisplaySetsSorted,
    NonViewableReported {
        series_instance_uid: String,
        sop_instance_uids: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);
