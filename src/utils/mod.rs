pub mod constants;
pub mod fs_utils;
pub mod url_utils;

pub use constants::*;
pub use fs_utils::write_atomic;
pub use url_utils::{is_valid_url, sanitize_package_name, url_to_filename};
