use anyhow::Result;
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{
    models::{ImageName, ProjectPath, PublishSettings, StageStatus, Tag},
    services::BuildBackend,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedStage {
    Publish {
        project_path: ProjectPath,
        settings: PublishSettings,
    },
    BuildImage {
        image_name: ImageName,
        tag: Tag,
        project_path: ProjectPath,
    },
}

/// Remembers which stages were asked for instead of running anything.
/// Clones share the same log, so a test can keep one while the controller
/// owns the other.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    stages: Rc<RefCell<Vec<RecordedStage>>>,
    statuses: Rc<RefCell<VecDeque<StageStatus>>>,
}

impl RecordingBackend {
    pub fn new() -> RecordingBackend {
        Default::default()
    }

    /// Statuses handed out to the following stages in order. Stages past
    /// the end succeed.
    pub fn with_statuses(statuses: Vec<StageStatus>) -> RecordingBackend {
        let backend = RecordingBackend::new();
        backend.statuses.borrow_mut().extend(statuses);
        backend
    }

    pub fn stages(&self) -> Vec<RecordedStage> {
        self.stages.borrow().clone()
    }

    fn record(&mut self, stage: RecordedStage) -> StageStatus {
        self.stages.borrow_mut().push(stage);
        self.statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(StageStatus::Success)
    }
}

impl BuildBackend for RecordingBackend {
    fn publish(
        &mut self,
        project_path: &ProjectPath,
        settings: &PublishSettings,
    ) -> Result<StageStatus> {
        Ok(self.record(RecordedStage::Publish {
            project_path: project_path.clone(),
            settings: settings.clone(),
        }))
    }

    fn build_image(
        &mut self,
        image_name: &ImageName,
        tag: &Tag,
        project_path: &ProjectPath,
    ) -> Result<StageStatus> {
        Ok(self.record(RecordedStage::BuildImage {
            image_name: image_name.clone(),
            tag: tag.clone(),
            project_path: project_path.clone(),
        }))
    }
}
