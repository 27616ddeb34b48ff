use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

/// Directory name under `~/.config` where AutoDocOps keeps its records.
const APP_DIR: &str = "autodocops";

/// Variables naming the home directory, in lookup order (Unix, then Windows).
const HOME_VARS: [&str; 2] = ["HOME", "USERPROFILE"];

/// Default data directory: `~/.config/autodocops`.
pub fn default_data_dir() -> Result<PathBuf, String> {
    data_dir_from(|name| env::var_os(name))
}

fn home_dir_from<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    HOME_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn data_dir_from<F>(lookup: F) -> Result<PathBuf, String>
where
    F: Fn(&str) -> Option<OsString>,
{
    home_dir_from(lookup)
        .map(|home| home.join(".config").join(APP_DIR))
        .ok_or_else(|| format!("none of {} is set", HOME_VARS.join(", ")))
}
