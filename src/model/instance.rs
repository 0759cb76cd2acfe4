use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One DICOM object as seen by the partitioner.
///
/// Attributes are decoded once when the instance is loaded and never
/// change afterwards. Identity is the SOP Instance UID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(rename = "SOPInstanceUID")]
    pub sop_instance_uid: String,
    #[serde(rename = "SOPClassUID", default, skip_serializing_if = "Option::is_none")]
    pub sop_class_uid: Option<String>,
    #[serde(rename = "PatientID", default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(rename = "StudyInstanceUID")]
    pub study_instance_uid: String,
    #[serde(rename = "SeriesInstanceUID")]
    pub series_instance_uid: String,
    #[serde(rename = "SeriesNumber", default, skip_serializing_if = "Option::is_none")]
    pub series_number: Option<i32>,
    #[serde(rename = "SeriesDescription", default, skip_serializing_if = "Option::is_none")]
    pub series_description: Option<String>,
    #[serde(rename = "SeriesDate", default, skip_serializing_if = "Option::is_none")]
    pub series_date: Option<String>,
    #[serde(rename = "SeriesTime", default, skip_serializing_if = "Option::is_none")]
    pub series_time: Option<String>,
    #[serde(rename = "Modality", default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(rename = "InstanceNumber", default, skip_serializing_if = "Option::is_none")]
    pub instance_number: Option<i32>,
    #[serde(rename = "AcquisitionNumber", default, skip_serializing_if = "Option::is_none")]
    pub acquisition_number: Option<i32>,
    #[serde(rename = "NumberOfFrames", default, skip_serializing_if = "Option::is_none")]
    pub number_of_frames: Option<u32>,
    #[serde(rename = "Rows", default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u16>,
    #[serde(rename = "FrameTime", default, skip_serializing_if = "Option::is_none")]
    pub frame_time: Option<f64>,
    #[serde(rename = "AcquisitionDate", default, skip_serializing_if = "Option::is_none")]
    pub acquisition_date: Option<String>,
    #[serde(rename = "AcquisitionTime", default, skip_serializing_if = "Option::is_none")]
    pub acquisition_time: Option<String>,
    #[serde(rename = "AcquisitionDateTime", default, skip_serializing_if = "Option::is_none")]
    pub acquisition_date_time: Option<String>,
    /// Values of the series-splitting attributes, keyed by DICOM keyword.
    #[serde(rename = "SplitAttributes", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub split_attributes: BTreeMap<String, String>,
    #[serde(rename = "FilePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
}

impl Instance {
    pub fn is_multi_frame(&self) -> bool {
        self.number_of_frames.is_some_and(|frames| frames > 1)
    }

    pub fn has_pixel_rows(&self) -> bool {
        self.rows.is_some()
    }

    /// The acquisition date-time, falling back to the concatenation of the
    /// separate date and time attributes.
    pub fn acquisition_date_time(&self) -> Option<String> {
        if let Some(date_time) = &self.acquisition_date_time {
            return Some(date_time.clone());
        }
        match (&self.acquisition_date, &self.acquisition_time) {
            (None, None) => None,
            (date, time) => Some(format!(
                "{}{}",
                date.as_deref().unwrap_or_default(),
                time.as_deref().unwrap_or_default()
            )),
        }
    }

    pub fn split_attribute(&self, keyword: &str) -> Option<&str> {
        self.split_attributes.get(keyword).map(String::as_str)
    }
}
