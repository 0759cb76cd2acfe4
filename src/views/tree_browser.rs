use super::display_set_table::write_display_set_table;
use crate::study::Study;
use std::collections::BTreeMap;
use std::io::{self, Write};

const INDENT: &str = "    ";
const UNKNOWN: &str = "Unknown";

/// Prints studies grouped by patient, with the display set table of each
/// study and its non-viewable instances.
pub fn write_study_tree<W: Write>(out: &mut W, studies: &[Study]) -> io::Result<()> {
    if studies.is_empty() {
        return writeln!(out, "No instances loaded");
    }

    let mut grouped: BTreeMap<&str, Vec<&Study>> = BTreeMap::new();
    for study in studies {
        grouped
            .entry(study.patient_id().unwrap_or(UNKNOWN))
            .or_default()
            .push(study);
    }

    for (patient_id, studies) in grouped {
        writeln!(out, "▼ PatientID: {patient_id}")?;
        for study in studies {
            writeln!(
                out,
                "{INDENT}▼ StudyInstanceUID: {} ({} display sets, {} instances)",
                study.study_instance_uid(),
                study.display_set_count(),
                study.instance_count()
            )?;

            let mut table = Vec::new();
            write_display_set_table(&mut table, study.display_sets())?;
            for line in String::from_utf8_lossy(&table).lines() {
                writeln!(out, "{INDENT}{INDENT}{line}")?;
            }

            for instance in study.non_viewable() {
                writeln!(
                    out,
                    "{INDENT}{INDENT}not viewable: {} ({})",
                    instance.sop_instance_uid,
                    instance.modality.as_deref().unwrap_or(UNKNOWN)
                )?;
            }
        }
    }
    Ok(())
}
