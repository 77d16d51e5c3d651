use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml;
use std::{
    collections::BTreeMap as Map,
    fs::File,
    path::PathBuf,
};

use super::{prefixed_image, IMAGE_PREFIX};
use crate::{
    models::{BuildConfiguration, ComponentTable, ProjectPath, PublishSettings},
    services::ComponentFrontend,
};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentsFile {
    prefix: Option<String>,

    #[serde(default)]
    images: Map<String, String>,

    #[serde(default)]
    paths: Map<String, String>,

    #[serde(default)]
    publish: PublishSettings,
}

/// Reads a `components.yml`:
///
/// ```yaml
/// prefix: registry.cn-shenzhen.aliyuncs.com/lrmtc/
/// images:
///   web-api: basic-platform-web-api
/// paths:
///   web-api: BasicPlatform.WebAPI
/// publish:
///   runtime: linux-x64
/// ```
pub struct ComponentsFileFrontend {
    path: PathBuf,
}

impl ComponentsFileFrontend {
    pub fn new<P: Into<PathBuf>>(path: P) -> ComponentsFileFrontend {
        ComponentsFileFrontend { path: path.into() }
    }
}

impl ComponentFrontend for ComponentsFileFrontend {
    fn configuration(&mut self) -> Result<BuildConfiguration> {
        let components_file = File::open(&self.path)
            .with_context(|| format!("couldn't open components file {:?}", self.path))?;

        let file: ComponentsFile = serde_yaml::from_reader(components_file)
            .with_context(|| format!("couldn't parse components file {:?}", self.path))?;

        let prefix = file.prefix.as_deref().unwrap_or(IMAGE_PREFIX);

        let images = file
            .images
            .into_iter()
            .map(|(key, image)| {
                let image_name = prefixed_image(prefix, &image);
                (key, image_name)
            })
            .collect();

        let paths = file
            .paths
            .into_iter()
            .map(|(key, path)| (key, ProjectPath(PathBuf::from(path))))
            .collect();

        Ok(BuildConfiguration {
            components: ComponentTable { images, paths },
            publish: file.publish,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageName;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn components_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_images_and_paths() {
        let file = components_file(
            "images:\n  cms: cms-web-api\npaths:\n  cms: Apps/CMS/CMS.WebAPI\n",
        );

        let configuration = ComponentsFileFrontend::new(file.path())
            .configuration()
            .unwrap();

        assert_eq!(
            configuration.components.images.get("cms"),
            Some(&ImageName(
                "registry.cn-shenzhen.aliyuncs.com/lrmtc/cms-web-api".into()
            ))
        );
        assert_eq!(
            configuration.components.paths.get("cms"),
            Some(&ProjectPath(PathBuf::from("Apps/CMS/CMS.WebAPI")))
        );
        assert_eq!(configuration.publish, PublishSettings::default());
    }

    #[test]
    fn prefix_and_publish_settings_can_be_overridden() {
        let file = components_file(
            "prefix: localhost:5000/\n\
             images:\n  web-api: web\n\
             paths:\n  web-api: BasicPlatform.WebAPI\n\
             publish:\n  runtime: linux-arm64\n  self-contained: true\n",
        );

        let configuration = ComponentsFileFrontend::new(file.path())
            .configuration()
            .unwrap();

        assert_eq!(
            configuration.components.images.get("web-api"),
            Some(&ImageName("localhost:5000/web".into()))
        );
        assert_eq!(configuration.publish.runtime, "linux-arm64");
        assert_eq!(configuration.publish.configuration, "Release");
        assert!(configuration.publish.self_contained);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = components_file("image:\n  web-api: web\n");

        let result = ComponentsFileFrontend::new(file.path()).configuration();
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ComponentsFileFrontend::new(dir.path().join("components.yml")).configuration();
        assert!(result.is_err());
    }
}
