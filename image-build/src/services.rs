use anyhow::Result;

use crate::models::{BuildConfiguration, ImageName, ProjectPath, PublishSettings, StageStatus, Tag};

pub trait ComponentFrontend {
    fn configuration(&mut self) -> Result<BuildConfiguration>;
}

pub trait BuildBackend {
    fn publish(
        &mut self,
        project_path: &ProjectPath,
        settings: &PublishSettings,
    ) -> Result<StageStatus>;

    fn build_image(
        &mut self,
        image_name: &ImageName,
        tag: &Tag,
        project_path: &ProjectPath,
    ) -> Result<StageStatus>;
}
