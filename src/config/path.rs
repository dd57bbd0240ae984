//! Module for searching for imurecorder config files

use std::path::PathBuf;

/// Name of the config file inside the system and XDG directories
const CONFIG_FILE: &str = "config.yaml";

/// Returns a list of config file paths in load order.
/// E.g. ["./imurecorder.yaml", "/etc/imurecorder/config.yaml", "/usr/share/imurecorder/config.yaml"]
pub fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("./imurecorder.yaml"),
        PathBuf::from("/etc/imurecorder").join(CONFIG_FILE),
    ];

    match xdg::BaseDirectories::with_prefix("imurecorder") {
        Ok(base_dirs) => {
            // Data directories in preference order
            paths.extend(
                base_dirs
                    .get_data_dirs()
                    .into_iter()
                    .map(|dir| dir.join(CONFIG_FILE)),
            );
        }
        Err(e) => log::warn!("Unable to determine XDG directories: {e}"),
    }

    paths
}

/// Returns the first config file that exists
pub fn find_config_file() -> Option<PathBuf> {
    get_config_paths().into_iter().find(|path| {
        log::trace!("Checking {path:?} for config");
        path.is_file()
    })
}
