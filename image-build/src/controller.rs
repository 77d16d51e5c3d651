use anyhow::Result;
use crossterm::{
    style::{self, Colorize, Styler},
    QueueableCommand,
};
use log::{info, warn};
use std::io::Write;

use crate::{
    models::{
        BuildConfiguration, BuildRequest, Component, ComponentKey, PublishSettings, Stage,
        StagePolicy, StageStatus, Tag,
    },
    registry::ComponentRegistry,
    services::BuildBackend,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every stage ran. Under `StagePolicy::Unchecked` some may have failed.
    Completed,
    /// A stage failed and the stages after it were skipped.
    Failed { stage: Stage, status: StageStatus },
}

pub struct Controller {
    backend: Box<dyn BuildBackend>,
    registry: ComponentRegistry,
    publish: PublishSettings,
    policy: StagePolicy,
}

impl Controller {
    pub fn init<B>(
        backend: B,
        configuration: BuildConfiguration,
        policy: StagePolicy,
    ) -> Result<Controller>
    where
        B: 'static + BuildBackend,
    {
        let registry = ComponentRegistry::from_table(configuration.components)?;

        Ok(Controller {
            backend: Box::new(backend),
            registry,
            publish: configuration.publish,
            policy,
        })
    }

    /// Looks up every key in the order given, the last one wins. Returns
    /// `None` when there is nothing to build.
    pub fn request(&self, keys: &[ComponentKey], tag: Tag) -> Result<Option<BuildRequest>> {
        let mut resolved: Option<(&ComponentKey, &Component)> = None;

        for key in keys {
            let component = self.registry.resolve(key)?;
            info!("resolved {:?} to {:?}", key.0, component);
            resolved = Some((key, component));
        }

        let request = match resolved {
            Some((key, component))
                if !component.image_name.0.is_empty()
                    && !component.project_path.0.as_os_str().is_empty() =>
            {
                Some(BuildRequest {
                    component_key: key.clone(),
                    tag,
                })
            }
            _ => None,
        };

        Ok(request)
    }

    /// Publishes the project, then builds its image. Each stage blocks until
    /// its process exits.
    pub fn build(
        &mut self,
        stdout: &mut impl Write,
        request: &BuildRequest,
    ) -> Result<PipelineOutcome> {
        let component = self.registry.resolve(&request.component_key)?.clone();
        let image = format!("{}:{}", component.image_name.0, request.tag.0);
        let project = component.project_path.to_string();

        stage_started(stdout, Stage::Publish, &project)?;
        let status = self
            .backend
            .publish(&component.project_path, &self.publish)?;
        stage_finished(stdout, Stage::Publish, &project, status)?;

        if let Some(outcome) = self.check(Stage::Publish, status) {
            return Ok(outcome);
        }

        stage_started(stdout, Stage::BuildImage, &image)?;
        let status = self.backend.build_image(
            &component.image_name,
            &request.tag,
            &component.project_path,
        )?;
        stage_finished(stdout, Stage::BuildImage, &image, status)?;

        if let Some(outcome) = self.check(Stage::BuildImage, status) {
            return Ok(outcome);
        }

        Ok(PipelineOutcome::Completed)
    }

    fn check(&self, stage: Stage, status: StageStatus) -> Option<PipelineOutcome> {
        if status.success() {
            return None;
        }

        match self.policy {
            StagePolicy::Checked => Some(PipelineOutcome::Failed { stage, status }),
            StagePolicy::Unchecked => {
                warn!("{:?} failed with {:?}, continuing", stage, status);
                None
            }
        }
    }
}

fn stage_verb(stage: Stage) -> &'static str {
    match stage {
        Stage::Publish => "Publishing",
        Stage::BuildImage => "Building image",
    }
}

fn stage_started(stdout: &mut impl Write, stage: Stage, subject: &str) -> Result<()> {
    stdout
        .queue(style::Print(format!("{} {}...\n", stage_verb(stage), subject)))?
        .flush()?;

    Ok(())
}

fn stage_finished(
    stdout: &mut impl Write,
    stage: Stage,
    subject: &str,
    status: StageStatus,
) -> Result<()> {
    stdout.queue(style::Print(format!("{} {} ", stage_verb(stage), subject)))?;

    match status {
        StageStatus::Success => {
            stdout.queue(style::PrintStyledContent("done".green().bold()))?;
        }
        StageStatus::Failed(Some(code)) => {
            stdout
                .queue(style::PrintStyledContent("failed".red().bold()))?
                .queue(style::Print(format!(" (exit code {})", code)))?;
        }
        StageStatus::Failed(None) => {
            stdout.queue(style::PrintStyledContent("failed".red().bold()))?;
        }
    }

    stdout.queue(style::Print("\n"))?.flush()?;

    Ok(())
}
