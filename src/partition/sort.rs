//! Orderings for instances and display sets.
//!
//! Absent numbers compare as 0 and absent dates and times compare as the
//! empty string, so both orderings are total.

use crate::model::{DisplaySet, Instance};
use std::cmp::Ordering;

/// Modalities of derived objects which reference other series.
pub const LOW_PRIORITY_MODALITIES: &[&str] = &["SEG", "KO", "PR", "SR", "RTSTRUCT"];

pub fn is_low_priority_modality(modality: Option<&str>) -> bool {
    modality.is_some_and(|modality| LOW_PRIORITY_MODALITIES.contains(&modality))
}

fn acquisition_stamp(instance: &Instance) -> String {
    format!(
        "{}{}",
        instance.acquisition_date.as_deref().unwrap_or_default(),
        instance.acquisition_time.as_deref().unwrap_or_default()
    )
}

/// Instance number, then acquisition number, then acquisition date and time.
pub fn compare_instances(a: &Instance, b: &Instance) -> Ordering {
    a.instance_number
        .unwrap_or(0)
        .cmp(&b.instance_number.unwrap_or(0))
        .then_with(|| {
            a.acquisition_number
                .unwrap_or(0)
                .cmp(&b.acquisition_number.unwrap_or(0))
        })
        .then_with(|| acquisition_stamp(a).cmp(&acquisition_stamp(b)))
}

/// Series number, then acquisition date-time.
pub fn compare_display_sets(a: &DisplaySet, b: &DisplaySet) -> Ordering {
    a.series_number
        .unwrap_or(0)
        .cmp(&b.series_number.unwrap_or(0))
        .then_with(|| {
            let a = a.acquisition_date_time.as_deref().unwrap_or_default();
            let b = b.acquisition_date_time.as_deref().unwrap_or_default();
            a.cmp(b)
        })
}

pub fn sort_instances(instances: &mut [Instance]) {
    instances.sort_by(compare_instances);
}

/// Stable sort of display sets, optionally moving low priority
/// modalities behind every other display set.
pub fn sort_display_sets(display_sets: &mut [DisplaySet], low_priority_last: bool) {
    display_sets.sort_by(|a, b| {
        let priority = if low_priority_last {
            is_low_priority_modality(a.modality.as_deref())
                .cmp(&is_low_priority_modality(b.modality.as_deref()))
        } else {
            Ordering::Equal
        };
        priority.then_with(|| compare_display_sets(a, b))
    });
}
