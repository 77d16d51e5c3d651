use anyhow::{anyhow, bail, Result};
use log::info;
use std::collections::{BTreeMap as Map, BTreeSet as Set};

use crate::models::{Component, ComponentKey, ComponentTable};

/// Component keys joined with their image name and project path. Built once
/// at startup, never changed afterwards.
#[derive(Clone, Debug)]
pub struct ComponentRegistry {
    components: Map<ComponentKey, Component>,
}

impl ComponentRegistry {
    /// Joins the image and path sides of `table`. Fails if a key is present
    /// on one side only.
    pub fn from_table(table: ComponentTable) -> Result<ComponentRegistry> {
        let image_keys = table.images.keys().collect::<Set<_>>();
        let path_keys = table.paths.keys().collect::<Set<_>>();

        let without_path = image_keys.difference(&path_keys).collect::<Vec<_>>();
        if !without_path.is_empty() {
            bail!("components without a project path: {:?}", without_path);
        }

        let without_image = path_keys.difference(&image_keys).collect::<Vec<_>>();
        if !without_image.is_empty() {
            bail!("components without an image name: {:?}", without_image);
        }

        let ComponentTable { images, mut paths } = table;
        let components = images
            .into_iter()
            .filter_map(|(key, image_name)| {
                let project_path = paths.remove(&key)?;
                let component = Component {
                    image_name,
                    project_path,
                };
                Some((ComponentKey(key), component))
            })
            .collect::<Map<_, _>>();

        info!(
            "registered components: {:?}",
            components.keys().map(|key| &key.0).collect::<Vec<_>>()
        );

        Ok(ComponentRegistry { components })
    }

    pub fn resolve(&self, key: &ComponentKey) -> Result<&Component> {
        self.components.get(key).ok_or_else(|| {
            let known = self.keys().map(|key| key.0.as_str()).collect::<Vec<_>>();
            anyhow!("unknown component: {:?}, expected one of {:?}", key.0, known)
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &ComponentKey> {
        self.components.keys()
    }
}
