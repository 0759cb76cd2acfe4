//! SOP class handlers and their registry.
//!
//! A handler turns the instances of a series into display sets. Handlers
//! declare the SOP classes they understand, and the registry checks each
//! handler when it is registered.

use crate::error::{DuplicateHandlerSnafu, NoSopClassesSnafu, Result, UnnamedHandlerSnafu};
use crate::model::Instance;
use crate::partition::{self, Partition, PartitionOptions, STACK_HANDLER_NAME};
use crate::sop_class::IMAGE_SOP_CLASSES;
use snafu::ensure;

pub trait SopClassHandler {
    fn name(&self) -> &str;

    fn sop_class_uids(&self) -> &[&str];

    fn display_sets_from_series(
        &self,
        instances: &[Instance],
        options: &PartitionOptions,
    ) -> Partition;
}

/// Stacks images with the default partitioner.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackHandler;

impl SopClassHandler for StackHandler {
    fn name(&self) -> &str {
        STACK_HANDLER_NAME
    }

    fn sop_class_uids(&self) -> &[&str] {
        IMAGE_SOP_CLASSES
    }

    fn display_sets_from_series(
        &self,
        instances: &[Instance],
        options: &PartitionOptions,
    ) -> Partition {
        partition::partition_with_handler(instances, options, self.name())
    }
}

/// Ordered set of handlers, with the stack handler as fallback.
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn SopClassHandler>>,
    fallback: StackHandler,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        HandlerRegistry {
            handlers: Vec::new(),
            fallback: StackHandler,
        }
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|handler| handler.name()))
            .finish()
    }
}

impl HandlerRegistry {
    /// An empty registry. Every series goes to the stack handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the stack handler for the image SOP classes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.handlers.push(Box::new(StackHandler));
        registry
    }

    pub fn register<H>(&mut self, handler: H) -> Result<()>
    where
        H: SopClassHandler + 'static,
    {
        let name = handler.name();
        ensure!(!name.trim().is_empty(), UnnamedHandlerSnafu);
        ensure!(
            !self.handlers.iter().any(|known| known.name() == name),
            DuplicateHandlerSnafu { name }
        );
        ensure!(
            !handler.sop_class_uids().is_empty(),
            NoSopClassesSnafu { name }
        );
        log::debug!(
            "registered SOP class handler `{name}` for {} SOP classes",
            handler.sop_class_uids().len()
        );
        self.handlers.push(Box::new(handler));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Picks the handler for a series.
    ///
    /// Registered handlers only apply when the whole series shares one SOP
    /// class. The first handler declaring it wins. Anything else goes to
    /// the stack handler.
    pub fn handler_for(&self, instances: &[Instance]) -> &dyn SopClassHandler {
        let uids = partition::sop_class_uids(instances);
        match uids.as_slice() {
            [uid] => self
                .handlers
                .iter()
                .find(|handler| handler.sop_class_uids().contains(&uid.as_str()))
                .map(|handler| &**handler)
                .unwrap_or(&self.fallback),
            [] => &self.fallback,
            _ => {
                log::debug!(
                    "series with {} SOP classes goes to the stack handler",
                    uids.len()
                );
                &self.fallback
            }
        }
    }

    pub fn display_sets_from_series(
        &self,
        instances: &[Instance],
        options: &PartitionOptions,
    ) -> Partition {
        self.handler_for(instances)
            .display_sets_from_series(instances, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::DisplaySet;
    use dicom::dictionary_std::uids;

    struct ReportHandler {
        name: &'static str,
        sop_classes: &'static [&'static str],
    }

    impl SopClassHandler for ReportHandler {
        fn name(&self) -> &str {
            self.name
        }

        fn sop_class_uids(&self) -> &[&str] {
            self.sop_classes
        }

        fn display_sets_from_series(
            &self,
            instances: &[Instance],
            _options: &PartitionOptions,
        ) -> Partition {
            let sop_class_uids = partition::sop_class_uids(instances);
            Partition {
                image_sets: DisplaySet::from_sorted(instances.to_vec(), &sop_class_uids, self.name)
                    .into_iter()
                    .collect(),
                non_viewable: Vec::new(),
            }
        }
    }

    const SR: &[&str] = &[uids::COMPREHENSIVE_SR_STORAGE];

    fn instance(uid: &str, sop_class: &str) -> Instance {
        Instance {
            sop_instance_uid: uid.to_string(),
            sop_class_uid: Some(sop_class.to_string()),
            rows: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn registration_is_validated() {
        let mut registry = HandlerRegistry::with_defaults();
        assert_eq!(registry.len(), 1);

        let unnamed = ReportHandler { name: " ", sop_classes: SR };
        assert!(matches!(
            registry.register(unnamed),
            Err(Error::UnnamedHandler)
        ));

        let duplicate = ReportHandler { name: "stack", sop_classes: SR };
        assert!(matches!(
            registry.register(duplicate),
            Err(Error::DuplicateHandler { .. })
        ));

        let empty = ReportHandler { name: "empty", sop_classes: &[] };
        assert!(matches!(
            registry.register(empty),
            Err(Error::NoSopClasses { .. })
        ));

        registry
            .register(ReportHandler { name: "sr", sop_classes: SR })
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn dispatch_by_single_sop_class() {
        let mut registry = HandlerRegistry::with_defaults();
        registry
            .register(ReportHandler { name: "sr", sop_classes: SR })
            .unwrap();

        let reports = vec![
            instance("r1", uids::COMPREHENSIVE_SR_STORAGE),
            instance("r2", uids::COMPREHENSIVE_SR_STORAGE),
        ];
        assert_eq!(registry.handler_for(&reports).name(), "sr");
        let output = registry.display_sets_from_series(&reports, &PartitionOptions::default());
        assert_eq!(output.image_sets.len(), 1);
        assert_eq!(output.image_sets[0].handler, "sr");

        let images = vec![instance("i1", uids::CT_IMAGE_STORAGE)];
        assert_eq!(registry.handler_for(&images).name(), "stack");

        let mixed = vec![
            instance("r1", uids::COMPREHENSIVE_SR_STORAGE),
            instance("i1", uids::CT_IMAGE_STORAGE),
        ];
        assert_eq!(registry.handler_for(&mixed).name(), "stack");
    }

    #[test]
    fn empty_registry_falls_back_to_stack() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        let images = vec![instance("i1", uids::MR_IMAGE_STORAGE)];
        assert_eq!(registry.handler_for(&images).name(), "stack");
    }
}
