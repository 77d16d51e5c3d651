use anyhow::Result;
use std::path::PathBuf;

use super::{prefixed_image, IMAGE_PREFIX};
use crate::{
    models::{BuildConfiguration, ComponentTable, ProjectPath},
    services::ComponentFrontend,
};

const IMAGES: &[(&str, &str)] = &[("web-api", "basic-platform-web-api")];

const PATHS: &[(&str, &str)] = &[("web-api", "BasicPlatform.WebAPI")];

/// The table compiled into the binary, used when no components file is found.
pub struct BuiltinFrontend;

impl BuiltinFrontend {
    pub fn new() -> BuiltinFrontend {
        BuiltinFrontend
    }
}

impl ComponentFrontend for BuiltinFrontend {
    fn configuration(&mut self) -> Result<BuildConfiguration> {
        let images = IMAGES
            .iter()
            .map(|(key, image)| (key.to_string(), prefixed_image(IMAGE_PREFIX, image)))
            .collect();

        let paths = PATHS
            .iter()
            .map(|(key, path)| (key.to_string(), ProjectPath(PathBuf::from(path))))
            .collect();

        Ok(BuildConfiguration {
            components: ComponentTable { images, paths },
            publish: Default::default(),
        })
    }
}
