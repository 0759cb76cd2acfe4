use super::Instance;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A group of instances displayed and scrolled as a single stack.
///
/// Display sets are views over the loaded instances. They are rebuilt from
/// scratch whenever a series is grouped again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySet {
    pub id: Uuid,
    #[serde(rename = "StudyInstanceUID")]
    pub study_instance_uid: String,
    #[serde(rename = "SeriesInstanceUID")]
    pub series_instance_uid: String,
    #[serde(rename = "SeriesNumber", skip_serializing_if = "Option::is_none")]
    pub series_number: Option<i32>,
    #[serde(rename = "SeriesDescription", skip_serializing_if = "Option::is_none")]
    pub series_description: Option<String>,
    #[serde(rename = "SeriesDate", skip_serializing_if = "Option::is_none")]
    pub series_date: Option<String>,
    #[serde(rename = "SeriesTime", skip_serializing_if = "Option::is_none")]
    pub series_time: Option<String>,
    #[serde(rename = "Modality", skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    pub num_image_frames: u32,
    pub is_multi_frame: bool,
    pub is_clip: bool,
    #[serde(rename = "InstanceNumber", skip_serializing_if = "Option::is_none")]
    pub instance_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition_date_time: Option<String>,
    pub sop_class_uids: Vec<String>,
    pub handler: String,
    pub instances: Vec<Instance>,
}

impl DisplaySet {
    /// Builds a display set over already sorted instances.
    ///
    /// Series level attributes come from the first instance.
    /// Returns `None` for an empty group.
    pub(crate) fn from_sorted(
        instances: Vec<Instance>,
        sop_class_uids: &[String],
        handler: &str,
    ) -> Option<Self> {
        let first = instances.first()?;
        let is_multi_frame = first.is_multi_frame();
        let num_image_frames = if instances.len() == 1 && is_multi_frame {
            first.number_of_frames.unwrap_or(1)
        } else {
            instances.len() as u32
        };

        Some(DisplaySet {
            id: Uuid::new_v4(),
            study_instance_uid: first.study_instance_uid.clone(),
            series_instance_uid: first.series_instance_uid.clone(),
            series_number: first.series_number,
            series_description: first.series_description.clone(),
            series_date: first.series_date.clone(),
            series_time: first.series_time.clone(),
            modality: first.modality.clone(),
            frame_rate: first.frame_time,
            num_image_frames,
            is_multi_frame,
            is_clip: is_multi_frame,
            instance_number: first.instance_number,
            acquisition_date_time: first.acquisition_date_time(),
            sop_class_uids: sop_class_uids.to_vec(),
            handler: handler.to_string(),
            instances,
        })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn sop_instance_uids(&self) -> impl Iterator<Item = &str> {
        self.instances
            .iter()
            .map(|instance| instance.sop_instance_uid.as_str())
    }
}
