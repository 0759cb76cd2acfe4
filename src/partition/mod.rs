//! Turning the instances of one series into display sets.
//!
//! Multi-frame instances and instances of single image modalities each
//! get a display set of their own. The remaining instances are stacked,
//! split by the configured [`SplitRule`]s. Instances without pixel rows
//! are not viewable and are reported apart.

pub mod sort;
pub mod split;

use crate::model::{DisplaySet, Instance};
use crate::sop_class;
use serde::{Deserialize, Serialize};

pub use sort::{compare_display_sets, compare_instances, sort_display_sets, sort_instances};
pub use split::{SplitCriterion, SplitKey, SplitRule};

/// Modalities whose instances are never stacked together.
pub const SINGLE_IMAGE_MODALITIES: &[&str] = &["CR", "MG", "DX"];

pub(crate) const STACK_HANDLER_NAME: &str = "stack";

pub fn is_single_image_modality(modality: Option<&str>) -> bool {
    modality.is_some_and(|modality| SINGLE_IMAGE_MODALITIES.contains(&modality))
}

/// Options of the partitioner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionOptions {
    series_number: Option<i32>,
    split_rules: Vec<SplitRule>,
    require_image_sop_class: bool,
    low_priority_last: bool,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        PartitionOptions {
            series_number: None,
            split_rules: SplitRule::defaults(),
            require_image_sop_class: false,
            low_priority_last: false,
        }
    }
}

impl PartitionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only consider instances of the series with this number.
    pub fn series_number(&mut self, series_number: Option<i32>) -> &mut Self {
        self.series_number = series_number;
        self
    }

    /// Replace the split rules. No rules means no splitting.
    pub fn split_rules(&mut self, rules: Vec<SplitRule>) -> &mut Self {
        self.split_rules = rules;
        self
    }

    /// Also treat instances of non-image SOP classes as not viewable.
    pub fn require_image_sop_class(&mut self, require: bool) -> &mut Self {
        self.require_image_sop_class = require;
        self
    }

    /// Sort display sets of derived modalities after all others.
    pub fn low_priority_last(&mut self, low_priority_last: bool) -> &mut Self {
        self.low_priority_last = low_priority_last;
        self
    }

    pub fn rules(&self) -> &[SplitRule] {
        &self.split_rules
    }

    pub fn is_low_priority_last(&self) -> bool {
        self.low_priority_last
    }

    fn is_viewable(&self, instance: &Instance) -> bool {
        if !instance.has_pixel_rows() {
            return false;
        }
        if self.require_image_sop_class {
            return instance
                .sop_class_uid
                .as_deref()
                .is_some_and(sop_class::is_image);
        }
        true
    }
}

/// Result of grouping one series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub image_sets: Vec<DisplaySet>,
    pub non_viewable: Vec<Instance>,
}

impl Partition {
    pub fn instance_count(&self) -> usize {
        self.image_sets.iter().map(DisplaySet::len).sum::<usize>() + self.non_viewable.len()
    }
}

/// Distinct SOP class UIDs of a series, in order of first appearance.
pub fn sop_class_uids(instances: &[Instance]) -> Vec<String> {
    let mut uids: Vec<String> = Vec::new();
    for uid in instances.iter().filter_map(|i| i.sop_class_uid.as_deref()) {
        if !uids.iter().any(|known| known == uid) {
            uids.push(uid.to_string());
        }
    }
    uids
}

/// Groups the instances of one series into display sets.
pub fn partition(instances: &[Instance], options: &PartitionOptions) -> Partition {
    partition_with_handler(instances, options, STACK_HANDLER_NAME)
}

pub(crate) fn partition_with_handler(
    instances: &[Instance],
    options: &PartitionOptions,
    handler: &str,
) -> Partition {
    let sop_class_uids = sop_class_uids(instances);
    let mut builder = Builder {
        rules: &options.split_rules,
        sop_class_uids: &sop_class_uids,
        handler,
        stackable: Vec::new(),
        output: Partition::default(),
    };

    for instance in instances {
        if let Some(wanted) = options.series_number {
            if instance.series_number != Some(wanted) {
                log::trace!(
                    "{}: series number {:?} filtered out",
                    instance.sop_instance_uid,
                    instance.series_number
                );
                continue;
            }
        }

        if !options.is_viewable(instance) {
            log::debug!("{}: not viewable", instance.sop_instance_uid);
            builder.output.non_viewable.push(instance.clone());
        } else if instance.is_multi_frame() {
            builder.flush();
            builder.emit(vec![instance.clone()]);
        } else if is_single_image_modality(instance.modality.as_deref()) {
            builder.emit(vec![instance.clone()]);
        } else {
            builder.stackable.push(instance.clone());
        }
    }
    builder.flush();

    let mut output = builder.output;
    sort_display_sets(&mut output.image_sets, options.low_priority_last);
    sort_instances(&mut output.non_viewable);
    log::debug!(
        "{} instances grouped into {} display sets, {} not viewable",
        instances.len(),
        output.image_sets.len(),
        output.non_viewable.len()
    );
    output
}

struct Builder<'a> {
    rules: &'a [SplitRule],
    sop_class_uids: &'a [String],
    handler: &'a str,
    stackable: Vec<Instance>,
    output: Partition,
}

impl Builder<'_> {
    fn emit(&mut self, mut instances: Vec<Instance>) {
        sort_instances(&mut instances);
        if let Some(display_set) =
            DisplaySet::from_sorted(instances, self.sop_class_uids, self.handler)
        {
            self.output.image_sets.push(display_set);
        }
    }

    /// Splits the pending stackable instances and emits one display set
    /// per split key, in order of first appearance of the key.
    fn flush(&mut self) {
        let mut groups: Vec<(SplitKey, Vec<Instance>)> = Vec::new();
        for instance in self.stackable.drain(..) {
            let key = SplitKey::of(&instance, self.rules);
            match groups.iter_mut().find(|(known, _)| *known == key) {
                Some((_, group)) => group.push(instance),
                None => groups.push((key, vec![instance])),
            }
        }
        if groups.len() > 1 {
            log::debug!("stack split into {} groups", groups.len());
        }
        for (key, group) in groups {
            log::trace!("split key {key}: {} instances", group.len());
            self.emit(group);
        }
    }
}
