use std::{
    collections::BTreeMap as Map,
    fmt,
    path::{Path, PathBuf},
};

use serde::Deserialize;

pub const DEFAULT_TAG: &str = "latest";

#[derive(Clone, Debug, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct ComponentKey(pub String);

#[derive(Clone, Debug, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct ImageName(pub String);

#[derive(Clone, Debug, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct ProjectPath(pub PathBuf);

impl ProjectPath {
    /// The project file dotnet publishes, `./<path>/<leaf>.csproj`.
    pub fn project_file(&self) -> PathBuf {
        // Project names carry dots of their own, so append rather than
        // set_extension.
        let mut leaf = self
            .0
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| self.0.as_os_str().to_os_string());
        leaf.push(".csproj");

        Path::new(".").join(&self.0).join(leaf)
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Tag(pub String);

impl Default for Tag {
    fn default() -> Self {
        Tag(DEFAULT_TAG.into())
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Component {
    pub image_name: ImageName,
    pub project_path: ProjectPath,
}

/// What a single invocation asks for. Lives only as long as the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildRequest {
    pub component_key: ComponentKey,
    pub tag: Tag,
}

/// The two sides of a component table, kept separately the way they are
/// written down. `ComponentRegistry` joins them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentTable {
    pub images: Map<String, ImageName>,
    pub paths: Map<String, ProjectPath>,
}

/// Everything a frontend hands over: the component table and how to publish.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub components: ComponentTable,
    pub publish: PublishSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PublishSettings {
    #[serde(default = "PublishSettings::default_runtime")]
    pub runtime: String,

    #[serde(default = "PublishSettings::default_configuration")]
    pub configuration: String,

    #[serde(default)]
    pub self_contained: bool,
}

impl PublishSettings {
    fn default_runtime() -> String {
        "linux-x64".into()
    }

    fn default_configuration() -> String {
        "Release".into()
    }
}

impl Default for PublishSettings {
    fn default() -> Self {
        PublishSettings {
            runtime: PublishSettings::default_runtime(),
            configuration: PublishSettings::default_configuration(),
            self_contained: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StagePolicy {
    /// Stop at the first stage that exits unsuccessfully.
    Checked,
    /// Run every stage and ignore how they exit.
    Unchecked,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Publish,
    BuildImage,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageStatus {
    Success,
    Failed(Option<i32>),
}

impl StageStatus {
    pub fn success(&self) -> bool {
        *self == StageStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_file_for_flat_layout() {
        let path = ProjectPath(PathBuf::from("BasicPlatform.WebAPI"));
        assert_eq!(
            path.project_file(),
            PathBuf::from("./BasicPlatform.WebAPI/BasicPlatform.WebAPI.csproj")
        );
    }

    #[test]
    fn project_file_uses_last_path_component() {
        let path = ProjectPath(PathBuf::from("Apps/CMS/CMS.WebAPI"));
        assert_eq!(
            path.project_file(),
            PathBuf::from("./Apps/CMS/CMS.WebAPI/CMS.WebAPI.csproj")
        );
    }

    #[test]
    fn tag_defaults_to_latest() {
        assert_eq!(Tag::default(), Tag("latest".into()));
    }
}
