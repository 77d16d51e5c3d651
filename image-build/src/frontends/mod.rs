pub use builtin::BuiltinFrontend;
pub use components_file::ComponentsFileFrontend;

mod builtin;
mod components_file;

use crate::models::ImageName;

/// Registry every image is pushed to unless a components file says otherwise.
pub const IMAGE_PREFIX: &str = "registry.cn-shenzhen.aliyuncs.com/lrmtc/";

fn prefixed_image(prefix: &str, short_name: &str) -> ImageName {
    ImageName(format!("{}{}", prefix, short_name))
}
