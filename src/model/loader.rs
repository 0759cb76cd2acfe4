use super::Instance;
use crate::error::{
    Error, InvalidRecordSnafu, OpenFileSnafu, ParseRecordsSnafu, ReadRecordsSnafu, Result,
};
use crate::partition::SplitRule;
use crate::utils::{format_tag, value_to_string};
use dicom::core::header::Header;
use dicom::core::value::{PrimitiveValue, Value};
use dicom::object::mem::InMemElement;
use dicom::object::{open_file, InMemDicomObject};
use snafu::ResultExt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Instances which could be loaded, and the files or records which could not.
#[derive(Debug, Default)]
pub struct Loaded {
    pub instances: Vec<Instance>,
    pub failures: Vec<Error>,
}

impl Loaded {
    pub fn extend(&mut self, other: Loaded) {
        self.instances.extend(other.instances);
        self.failures.extend(other.failures);
    }
}

pub fn load_instance(path: &Path, rules: &[SplitRule]) -> Result<Instance> {
    log::info!("Loading DICOM file: {}", path.display());
    let object = open_file(path).context(OpenFileSnafu { path })?;
    let mut instance = instance_from_object(&object, rules);
    instance.file_path = Some(path.to_path_buf());
    Ok(instance)
}

/// Loads every path, collecting failures instead of stopping at them.
///
/// Files with a `.json` extension are read as instance records.
pub fn load_instances<I, P>(paths: I, rules: &[SplitRule]) -> Loaded
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut loaded = Loaded::default();
    for path in paths {
        match load_path(path.as_ref(), rules) {
            Ok(partial) => loaded.extend(partial),
            Err(err) => {
                log::error!("{}", snafu::Report::from_error(&err));
                loaded.failures.push(err);
            }
        }
    }
    loaded
}

/// Loads one path. Malformed records of a JSON file are reported in the
/// returned failures, a file which cannot be read at all is an error.
pub fn load_path(path: &Path, rules: &[SplitRule]) -> Result<Loaded> {
    if is_json(path) {
        read_instances_json_file(path)
    } else {
        let instance = load_instance(path, rules)?;
        Ok(Loaded {
            instances: vec![instance],
            failures: Vec::new(),
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

pub fn read_instances_json_file(path: &Path) -> Result<Loaded> {
    log::info!("Reading instance records: {}", path.display());
    let file = File::open(path).context(ReadRecordsSnafu { path })?;
    read_instances_json(BufReader::new(file), path)
}

/// Reads a JSON array of instance records. `origin` names the source in
/// error messages.
///
/// Records which do not describe an instance are skipped and reported,
/// the others are kept.
pub fn read_instances_json<R: Read>(reader: R, origin: &Path) -> Result<Loaded> {
    let records: Vec<serde_json::Value> =
        serde_json::from_reader(reader).context(ParseRecordsSnafu {
            path: PathBuf::from(origin),
        })?;

    let mut loaded = Loaded::default();
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Instance>(record).context(InvalidRecordSnafu {
            path: PathBuf::from(origin),
            index,
        }) {
            Ok(instance) => loaded.instances.push(instance),
            Err(err) => {
                log::warn!("{}", snafu::Report::from_error(&err));
                loaded.failures.push(err);
            }
        }
    }
    Ok(loaded)
}

/// Reads the attributes the partitioner needs, plus one attribute per
/// split rule.
pub fn instance_from_object(object: &InMemDicomObject, rules: &[SplitRule]) -> Instance {
    let mut instance = Instance {
        sop_instance_uid: attribute_text(object, "SOPInstanceUID")
            .unwrap_or_else(|| "Unknown".to_string()),
        sop_class_uid: attribute_text(object, "SOPClassUID"),
        patient_id: attribute_text(object, "PatientID"),
        study_instance_uid: attribute_text(object, "StudyInstanceUID")
            .unwrap_or_else(|| "Unknown".to_string()),
        series_instance_uid: attribute_text(object, "SeriesInstanceUID")
            .unwrap_or_else(|| "Unknown".to_string()),
        series_number: attribute_number(object, "SeriesNumber"),
        series_description: attribute_text(object, "SeriesDescription"),
        series_date: attribute_text(object, "SeriesDate"),
        series_time: attribute_text(object, "SeriesTime"),
        modality: attribute_text(object, "Modality"),
        instance_number: attribute_number(object, "InstanceNumber"),
        acquisition_number: attribute_number(object, "AcquisitionNumber"),
        number_of_frames: attribute_number(object, "NumberOfFrames"),
        rows: attribute_number(object, "Rows"),
        frame_time: attribute_number(object, "FrameTime"),
        acquisition_date: attribute_text(object, "AcquisitionDate"),
        acquisition_time: attribute_text(object, "AcquisitionTime"),
        acquisition_date_time: attribute_text(object, "AcquisitionDateTime"),
        ..Default::default()
    };

    for rule in rules {
        if let Some(value) = split_attribute(object, &rule.keyword) {
            instance.split_attributes.insert(rule.keyword.clone(), value);
        }
    }
    instance
}

fn attribute_text(object: &InMemDicomObject, name: &str) -> Option<String> {
    object
        .element_by_name(name)
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|value| value.trim_end_matches('\0').trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Numeric attributes stored as text (IS, DS) or binary (US, UL).
/// Only the first value of a multi-valued attribute is read. Values which
/// do not parse are treated as absent.
fn attribute_number<T: FromStr>(object: &InMemDicomObject, name: &str) -> Option<T> {
    let text = attribute_text(object, name)?;
    let first = text.split('\\').next().unwrap_or_default().trim();
    match first.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparsable {name} value `{text}`");
            None
        }
    }
}

/// Any attribute, including sequences, as a key which keeps the whole
/// value. Empty values are absent.
fn split_attribute(object: &InMemDicomObject, keyword: &str) -> Option<String> {
    let element = object.element_by_name(keyword).ok()?;
    if let Value::Primitive(PrimitiveValue::Empty) = element.value() {
        return None;
    }
    log::trace!(
        "{keyword} ({}) = {}",
        format_tag(element.tag()),
        value_to_string(element.value(), element.vr())
    );
    let key = element_key(element);
    (!key.is_empty()).then_some(key)
}

/// Sequence items are rendered as `[{(gggg,eeee)=value;...}...]`, so an
/// empty sequence is still a non-empty key.
fn element_key(element: &InMemElement) -> String {
    match element.value() {
        Value::Primitive(primitive) => primitive
            .to_str()
            .trim_end_matches(['\0', ' '])
            .trim_start()
            .to_string(),
        Value::Sequence(sequence) => {
            let items: String = sequence
                .items()
                .iter()
                .map(|item| {
                    let fields: Vec<String> = item
                        .into_iter()
                        .map(|field| format!("({})={}", format_tag(field.tag()), element_key(field)))
                        .collect();
                    format!("{{{}}}", fields.join(";"))
                })
                .collect();
            format!("[{items}]")
        }
        Value::PixelSequence(sequence) => sequence
            .fragments()
            .iter()
            .map(|fragment| fragment.iter().map(|byte| format!("{byte:02x}")).collect::<String>())
            .collect::<Vec<_>>()
            .join("|"),
    }
}

#[cfg(test)]
mod tests {
    use super::{instance_from_object, read_instances_json};
    use crate::error::Error;
    use crate::partition::{partition, PartitionOptions, SplitRule};
    use dicom::core::value::{DataSetSequence, PrimitiveValue};
    use dicom::core::{DataElement, Length, VR};
    use dicom::dictionary_std::tags;
    use dicom::object::InMemDicomObject;
    use std::path::Path;

    fn object(elements: Vec<DataElement<InMemDicomObject>>) -> InMemDicomObject {
        InMemDicomObject::from_element_iter(elements)
    }

    #[test]
    fn reads_partitioning_attributes() {
        let object = object(vec![
            DataElement::new(tags::SOP_CLASS_UID, VR::UI, PrimitiveValue::from("1.2.840.10008.5.1.4.1.1.4\0")),
            DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from("1.2.3.4.5")),
            DataElement::new(tags::STUDY_INSTANCE_UID, VR::UI, PrimitiveValue::from("1.2.3")),
            DataElement::new(tags::SERIES_INSTANCE_UID, VR::UI, PrimitiveValue::from("1.2.3.4")),
            DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("MR")),
            DataElement::new(tags::SERIES_NUMBER, VR::IS, PrimitiveValue::from(" 7")),
            DataElement::new(tags::INSTANCE_NUMBER, VR::IS, PrimitiveValue::from("12 ")),
            DataElement::new(tags::NUMBER_OF_FRAMES, VR::IS, PrimitiveValue::from("1")),
            DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(256_u16)),
            DataElement::new(tags::ECHO_NUMBERS, VR::IS, PrimitiveValue::from("2")),
            DataElement::new(tags::CONTRAST_BOLUS_AGENT, VR::LO, PrimitiveValue::Empty),
        ]);

        let instance = instance_from_object(&object, &SplitRule::defaults());
        assert_eq!(instance.sop_instance_uid, "1.2.3.4.5");
        assert_eq!(instance.sop_class_uid.as_deref(), Some("1.2.840.10008.5.1.4.1.1.4"));
        assert_eq!(instance.modality.as_deref(), Some("MR"));
        assert_eq!(instance.series_number, Some(7));
        assert_eq!(instance.instance_number, Some(12));
        assert_eq!(instance.rows, Some(256));
        assert!(!instance.is_multi_frame());
        assert_eq!(instance.split_attribute("EchoNumbers"), Some("2"));
        assert_eq!(instance.split_attribute("ContrastBolusAgent"), None);
        assert_eq!(instance.acquisition_number, None);
    }

    #[test]
    fn unparsable_numbers_are_absent() {
        let object = object(vec![DataElement::new(
            tags::INSTANCE_NUMBER,
            VR::IS,
            PrimitiveValue::from("twelve"),
        )]);
        let instance = instance_from_object(&object, &[]);
        assert_eq!(instance.instance_number, None);
        assert_eq!(instance.sop_instance_uid, "Unknown");
    }

    #[test]
    fn sequence_counts_as_present() {
        let item = InMemDicomObject::from_element_iter([DataElement::new(
            tags::CONTRAST_BOLUS_AGENT,
            VR::LO,
            PrimitiveValue::from("IODINE"),
        )]);
        let object = object(vec![DataElement::new(
            tags::CONTRAST_BOLUS_AGENT_SEQUENCE,
            VR::SQ,
            DataSetSequence::new(vec![item], Length::UNDEFINED),
        )]);
        let rules = vec!["ContrastBolusAgentSequence=presence".parse::<SplitRule>().unwrap()];

        let instance = instance_from_object(&object, &rules);
        assert!(instance
            .split_attribute("ContrastBolusAgentSequence")
            .is_some());
    }

    fn contrast_sequence(agent: &str) -> InMemDicomObject {
        let item = InMemDicomObject::from_element_iter([DataElement::new(
            tags::CONTRAST_BOLUS_AGENT,
            VR::LO,
            PrimitiveValue::from(agent),
        )]);
        object(vec![
            DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(256_u16)),
            DataElement::new(
                tags::CONTRAST_BOLUS_AGENT_SEQUENCE,
                VR::SQ,
                DataSetSequence::new(vec![item], Length::UNDEFINED),
            ),
        ])
    }

    #[test]
    fn sequence_values_keep_item_contents() {
        let rules = vec!["ContrastBolusAgentSequence=value".parse::<SplitRule>().unwrap()];
        let iodine = instance_from_object(&contrast_sequence("IODINE"), &rules);
        let gadolinium = instance_from_object(&contrast_sequence("GADOLINIUM"), &rules);

        let key = iodine.split_attribute("ContrastBolusAgentSequence").unwrap();
        assert!(key.contains("IODINE"), "{key}");
        assert_ne!(
            iodine.split_attribute("ContrastBolusAgentSequence"),
            gadolinium.split_attribute("ContrastBolusAgentSequence")
        );

        let mut options = PartitionOptions::new();
        options.split_rules(rules);
        let output = partition(&[iodine, gadolinium], &options);
        assert_eq!(output.image_sets.len(), 2);
    }

    #[test]
    fn empty_sequence_is_present() {
        let object = object(vec![DataElement::new(
            tags::CONTRAST_BOLUS_AGENT_SEQUENCE,
            VR::SQ,
            DataSetSequence::new(Vec::<InMemDicomObject>::new(), Length::UNDEFINED),
        )]);
        let rules = vec!["ContrastBolusAgentSequence=value".parse::<SplitRule>().unwrap()];
        let instance = instance_from_object(&object, &rules);
        assert_eq!(instance.split_attribute("ContrastBolusAgentSequence"), Some("[]"));
    }

    #[test]
    fn long_multi_valued_attributes_are_not_cut() {
        let agents = |last: &str| {
            let mut values: Vec<String> = (0..8).map(|n| format!("CONTRAST_AGENT_{n:02}_ABCDEFGH")).collect();
            values.push(last.to_string());
            object(vec![
                DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(256_u16)),
                DataElement::new(
                    tags::CONTRAST_BOLUS_AGENT,
                    VR::LO,
                    PrimitiveValue::Strs(values.into_iter().collect()),
                ),
            ])
        };
        let rules = vec!["ContrastBolusAgent=value".parse::<SplitRule>().unwrap()];
        let first = instance_from_object(&agents("IODINE"), &rules);
        let second = instance_from_object(&agents("GADOLINIUM"), &rules);

        let key = first.split_attribute("ContrastBolusAgent").unwrap();
        assert!(key.len() > 120);
        assert!(key.ends_with("\\IODINE"), "{key}");

        let mut options = PartitionOptions::new();
        options.split_rules(rules);
        let output = partition(&[first, second], &options);
        assert_eq!(output.image_sets.len(), 2);
    }

    #[test]
    fn reads_json_records() {
        let json = br#"[
            {"SOPInstanceUID": "a", "StudyInstanceUID": "s", "SeriesInstanceUID": "r", "Rows": 64},
            {"SOPInstanceUID": "b", "StudyInstanceUID": "s", "SeriesInstanceUID": "r"}
        ]"#;
        let loaded = read_instances_json(&json[..], Path::new("inline.json")).unwrap();
        assert!(loaded.failures.is_empty());
        assert_eq!(loaded.instances.len(), 2);
        assert!(loaded.instances[0].has_pixel_rows());
        assert!(!loaded.instances[1].has_pixel_rows());

        let err = read_instances_json(&b"{"[..], Path::new("broken.json")).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn bad_json_records_are_skipped() {
        let json = br#"[
            {"SOPInstanceUID": "a", "StudyInstanceUID": "s", "SeriesInstanceUID": "r", "Rows": 64},
            {"SOPInstanceUID": "b", "SeriesInstanceUID": "r"},
            {"SOPInstanceUID": "c", "StudyInstanceUID": "s", "SeriesInstanceUID": "r", "Rows": 70000}
        ]"#;
        let loaded = read_instances_json(&json[..], Path::new("mixed.json")).unwrap();

        assert_eq!(loaded.instances.len(), 1);
        assert_eq!(loaded.instances[0].sop_instance_uid, "a");
        assert_eq!(loaded.failures.len(), 2);
        assert!(matches!(
            loaded.failures[0],
            Error::InvalidRecord { index: 1, .. }
        ));
        assert!(loaded.failures[1].to_string().contains("#2 in mixed.json"));
    }
}
