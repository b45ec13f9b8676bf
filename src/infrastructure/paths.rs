//! Filesystem locations.
//!
//! The crate only writes trace files; everything else lives in memory.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "plasmid-browser";

/// Directory for trace output.
///
/// `$XDG_DATA_HOME/plasmid-browser`, else `~/.local/share/plasmid-browser`,
/// else a directory under the system temp dir.
#[must_use]
pub fn data_dir() -> PathBuf {
    data_dir_from(env::var("XDG_DATA_HOME").ok().as_deref(), env::var("HOME").ok().as_deref())
}

fn data_dir_from(xdg_data_home: Option<&str>, home: Option<&str>) -> PathBuf {
    match (xdg_data_home.filter(|p| !p.is_empty()), home.filter(|p| !p.is_empty())) {
        (Some(xdg), _) => PathBuf::from(xdg).join(APP_DIR),
        (None, Some(home)) => PathBuf::from(home).join(".local").join("share").join(APP_DIR),
        (None, None) => env::temp_dir().join(APP_DIR),
    }
}

/// Expands a leading `~` to the home directory.
///
/// Paths without a leading `~`, or a missing `HOME`, are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    expand_tilde_with(path, env::var("HOME").ok().as_deref())
}

fn expand_tilde_with(path: &str, home: Option<&str>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => PathBuf::from(home),
        (_, Some(home)) if path.starts_with("~/") => PathBuf::from(home).join(&path[2..]),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_prefers_xdg() {
        assert_eq!(
            data_dir_from(Some("/xdg"), Some("/home/ada")),
            PathBuf::from("/xdg/plasmid-browser")
        );
        assert_eq!(
            data_dir_from(Some(""), Some("/home/ada")),
            PathBuf::from("/home/ada/.local/share/plasmid-browser")
        );
        assert!(data_dir_from(None, None).ends_with(APP_DIR));
    }

    #[test]
    fn tilde_expansion() {
        assert_eq!(expand_tilde_with("~/t.json", Some("/home/ada")), PathBuf::from("/home/ada/t.json"));
        assert_eq!(expand_tilde_with("~", Some("/home/ada")), PathBuf::from("/home/ada"));
        assert_eq!(expand_tilde_with("~/t.json", None), PathBuf::from("~/t.json"));
        assert_eq!(expand_tilde_with("/abs/~x", Some("/h")), PathBuf::from("/abs/~x"));
    }
}
