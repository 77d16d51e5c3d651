use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::{
    env,
    ffi::OsString,
    io::{stdout, Write},
    path::{Path, PathBuf},
    process,
};
use structopt::{clap::AppSettings, StructOpt};

use backends::ShellBackend;
use controller::{Controller, PipelineOutcome};
use frontends::{BuiltinFrontend, ComponentsFileFrontend};
use models::{ComponentKey, StagePolicy, StageStatus, Tag};
use services::{BuildBackend, ComponentFrontend};

mod backends;
mod controller;
mod frontends;
mod models;
mod registry;
mod services;

const HELP: &[&str] = &[
    "--help 或者 -h 显示帮助",
    "--name 或者 -n 镜像名称",
    "--tag 或者 -t 标签，默认值：latest",
    "",
    "-n web-api -t latest #构建 WebAPI",
];

#[derive(Debug, StructOpt)]
#[structopt(
    name = "image-build",
    about = "Publishes a dotnet project and builds its container image."
)]
#[structopt(setting = AppSettings::DisableHelpFlags)]
#[structopt(setting = AppSettings::DisableVersion)]
#[structopt(setting = AppSettings::TrailingVarArg)]
struct Opt {
    #[structopt(short = "h", long = "help", parse(from_occurrences))]
    /// Print the usage text. Other options are still processed.
    help: u64,

    #[structopt(short = "n", long = "name", number_of_values = 1, allow_hyphen_values = true)]
    /// Component to build, repeated names are all looked up and the last one is built.
    names: Vec<String>,

    #[structopt(short = "t", long = "tag", number_of_values = 1, allow_hyphen_values = true)]
    /// Image tag, defaults to latest.
    tags: Vec<String>,

    #[structopt(short = "f", long = "file", parse(from_os_str))]
    /// Components file to use instead of searching for components.yml.
    file: Option<PathBuf>,

    #[structopt(long)]
    /// Build the image even if publishing failed, and always exit 0.
    keep_going: bool,

    /// Option parsing stops at the first of these, everything from there on is ignored.
    #[structopt(hidden = true)]
    rest: Vec<String>,
}

impl Opt {
    fn keys(&self) -> Vec<ComponentKey> {
        self.names.iter().cloned().map(ComponentKey).collect()
    }

    fn tag(&self) -> Tag {
        self.tags.last().cloned().map(Tag).unwrap_or_default()
    }

    fn policy(&self) -> StagePolicy {
        if self.keep_going {
            StagePolicy::Unchecked
        } else {
            StagePolicy::Checked
        }
    }
}

/// Malformed arguments end the run quietly, only the log hears about them.
fn parse_args<I>(args: I) -> Option<Opt>
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
{
    match Opt::from_iter_safe(args) {
        Ok(opt) => {
            if !opt.rest.is_empty() {
                debug!("ignoring trailing arguments: {:?}", opt.rest);
            }
            Some(opt)
        }
        Err(err) => {
            warn!("ignoring malformed arguments: {}", err);
            None
        }
    }
}

fn find_components_file<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    for path in path.as_ref().ancestors() {
        let components_file_path = path.join("components.yml");
        if components_file_path.exists() {
            return Some(components_file_path);
        }

        let components_file_path = path.join("components.yaml");
        if components_file_path.exists() {
            return Some(components_file_path);
        }
    }

    None
}

fn print_help(stdout: &mut impl Write) -> Result<()> {
    for line in HELP {
        writeln!(stdout, "{}", line)?;
    }
    stdout.flush()?;

    Ok(())
}

fn main() -> Result<()> {
    pretty_env_logger::init_custom_env("LOG");

    let opt = match parse_args(env::args_os()) {
        Some(opt) => opt,
        None => return Ok(()),
    };

    let current_dir = env::current_dir()?;
    let components_file_path = opt
        .file
        .clone()
        .or_else(|| find_components_file(&current_dir));

    let mut frontend: Box<dyn ComponentFrontend> = match components_file_path {
        Some(components_file_path) => {
            info!("found components file {:?}", components_file_path);

            let work_directory = components_file_path
                .parent()
                .ok_or_else(|| anyhow!("Components file has no parent."))?;

            // Project paths in the file are relative to it.
            if !work_directory.as_os_str().is_empty() {
                info!("found work directory {:?}", work_directory);
                env::set_current_dir(work_directory)?;
            }

            let file_name = components_file_path
                .file_name()
                .ok_or_else(|| anyhow!("Components file has no file name."))?;

            Box::new(ComponentsFileFrontend::new(file_name))
        }
        None => {
            info!("no components file, using the built-in components");
            Box::new(BuiltinFrontend::new())
        }
    };

    let outcome = dispatch(&opt, frontend.as_mut(), ShellBackend::new(), &mut stdout())?;

    match outcome {
        Some(PipelineOutcome::Failed { stage, status }) => {
            let code = match status {
                StageStatus::Failed(Some(code)) => code,
                _ => 1,
            };
            info!("{:?} failed, exiting with {}", stage, code);
            process::exit(code);
        }
        Some(PipelineOutcome::Completed) | None => Ok(()),
    }
}

/// Runs everything after argument parsing. `None` means no build was
/// attempted.
fn dispatch<B>(
    opt: &Opt,
    frontend: &mut dyn ComponentFrontend,
    backend: B,
    stdout: &mut impl Write,
) -> Result<Option<PipelineOutcome>>
where
    B: 'static + BuildBackend,
{
    if opt.help > 0 {
        print_help(stdout)?;
    }

    let configuration = frontend.configuration()?;
    info!("parsed components");

    let mut controller = Controller::init(backend, configuration, opt.policy())?;
    info!("created controller");

    let request = match controller.request(&opt.keys(), opt.tag())? {
        Some(request) => request,
        None => {
            info!("no component to build");
            return Ok(None);
        }
    };

    let outcome = controller.build(stdout, &request)?;
    Ok(Some(outcome))
}
