use anyhow::{Context, Result};
use log::info;
use std::process::Command;

use crate::{
    models::{ImageName, ProjectPath, PublishSettings, StageStatus, Tag},
    services::BuildBackend,
};

/// Runs the stages as child processes in the current directory, inheriting
/// stdio. Child output is never captured.
pub struct ShellBackend;

impl ShellBackend {
    pub fn new() -> ShellBackend {
        ShellBackend
    }

    pub fn publish_command(project_path: &ProjectPath, settings: &PublishSettings) -> Command {
        let self_contained = if settings.self_contained {
            "--self-contained"
        } else {
            "--no-self-contained"
        };

        let mut command = Command::new("dotnet");
        command
            .arg("publish")
            .args(&["-r", settings.runtime.as_str()])
            .arg(project_path.project_file())
            .args(&["-c", settings.configuration.as_str()])
            .arg(self_contained);
        command
    }

    pub fn build_image_command(
        image_name: &ImageName,
        tag: &Tag,
        project_path: &ProjectPath,
    ) -> Command {
        let mut command = Command::new("make");
        command
            .arg("run")
            .arg(format!("image={}", image_name.0))
            .arg(format!("tag={}", tag.0))
            .arg(format!("path={}", project_path));
        command
    }

    fn run(mut command: Command) -> Result<StageStatus> {
        info!("running {:?}", command);

        let status = command
            .status()
            .with_context(|| format!("couldn't start {:?}", command.get_program()))?;

        info!("{:?} exited with {}", command.get_program(), status);

        if status.success() {
            Ok(StageStatus::Success)
        } else {
            Ok(StageStatus::Failed(status.code()))
        }
    }
}

impl BuildBackend for ShellBackend {
    fn publish(
        &mut self,
        project_path: &ProjectPath,
        settings: &PublishSettings,
    ) -> Result<StageStatus> {
        ShellBackend::run(ShellBackend::publish_command(project_path, settings))
    }

    fn build_image(
        &mut self,
        image_name: &ImageName,
        tag: &Tag,
        project_path: &ProjectPath,
    ) -> Result<StageStatus> {
        ShellBackend::run(ShellBackend::build_image_command(
            image_name,
            tag,
            project_path,
        ))
    }
}
