use crate::model::DisplaySet;
use crate::utils::truncate;
use std::io::{self, Write};

const DESCRIPTION_WIDTH: usize = 32;

fn kind(display_set: &DisplaySet) -> &'static str {
    if display_set.is_clip {
        "clip"
    } else if display_set.len() == 1 {
        "single"
    } else {
        "stack"
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

/// One row per display set, in the order given.
pub fn write_display_set_table<W: Write>(out: &mut W, display_sets: &[DisplaySet]) -> io::Result<()> {
    writeln!(
        out,
        "{:>6}  {:<8}  {:<6}  {:>6}  {:>6}  Description",
        "Series", "Modality", "Kind", "Frames", "First"
    )?;
    for display_set in display_sets {
        let description = display_set
            .series_description
            .clone()
            .map(|description| truncate(description, DESCRIPTION_WIDTH));
        writeln!(
            out,
            "{:>6}  {:<8}  {:<6}  {:>6}  {:>6}  {}",
            or_dash(display_set.series_number),
            or_dash(display_set.modality.as_deref()),
            kind(display_set),
            display_set.num_image_frames,
            or_dash(display_set.instance_number),
            or_dash(description),
        )?;
    }
    Ok(())
}
