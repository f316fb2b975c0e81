//! Filesystem layout of an emulator install.
//!
//! # Examples
//!
//! ```ignore
//! use yuzu_manager::services::paths::PathResolver;
//!
//! let resolver = PathResolver::new(&ctx.config);
//! let exe = resolver.exe_path();          // D:/Yuzu/eden.exe
//! let nand = resolver.nand_path();        // honours qt-config.ini overrides
//! ```

use crate::models::AppConfig;
use crate::services::qt_config::{self, DataStorageConfig};
use camino::{Utf8Path, Utf8PathBuf};

/// Name the emulator executable is looked up under by default.
pub const PRIMARY_EXE: &str = "yuzu.exe";

/// Name the executable is renamed to when `rename_yuzu_to_cemu` is set.
pub const ALTERNATE_EXE: &str = "cemu.exe";

/// Executable names probed, in order.
pub const DETECT_EXE_LIST: &[&str] = &["yuzu.exe", "eden.exe", "suzu.exe", "cemu.exe"];

/// Roaming-data folder names, primary brand first.
const ROAMING_BRANDS: &[&str] = &["yuzu", "eden"];

/// Marker whose presence makes the load directory get decoded.
const LOAD_DECODE_MARKER: &str = "\\u";

/// Resolves executable and user-data paths for one install directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    install_dir: Utf8PathBuf,
    prefer_alternate: bool,
    roaming_dir: Option<Utf8PathBuf>,
}

impl PathResolver {
    /// Resolver for the install recorded in `config`, using the OS roaming dir.
    pub fn new(config: &AppConfig) -> Self {
        let roaming_dir = dirs::config_dir().and_then(|p| Utf8PathBuf::from_path_buf(p).ok());
        Self {
            install_dir: config.yuzu.yuzu_path.clone(),
            prefer_alternate: config.setting.other.rename_yuzu_to_cemu,
            roaming_dir,
        }
    }

    /// Replace the roaming-data root (`%APPDATA%` on Windows).
    pub fn with_roaming_dir(mut self, roaming_dir: Option<Utf8PathBuf>) -> Self {
        self.roaming_dir = roaming_dir;
        self
    }

    pub fn install_dir(&self) -> &Utf8Path {
        &self.install_dir
    }

    /// Path of the emulator executable inside the install dir.
    ///
    /// Always under the install dir; falls back to [`PRIMARY_EXE`] when nothing exists.
    pub fn exe_path(&self) -> Utf8PathBuf {
        let alternate = self.install_dir.join(ALTERNATE_EXE);
        if (self.prefer_alternate || !self.install_dir.join(PRIMARY_EXE).exists())
            && alternate.exists()
        {
            return alternate;
        }

        DETECT_EXE_LIST
            .iter()
            .map(|name| self.install_dir.join(name))
            .find(|candidate| candidate.exists())
            .unwrap_or_else(|| self.install_dir.join(PRIMARY_EXE))
    }

    /// The emulator's user-data directory.
    pub fn user_path(&self) -> Utf8PathBuf {
        let portable = self.install_dir.join("user");
        if portable.exists() {
            return portable;
        }

        if let Some(roaming) = &self.roaming_dir {
            for brand in ROAMING_BRANDS {
                let candidate = roaming.join(brand);
                if candidate.exists() {
                    return candidate;
                }
            }
        }

        portable
    }

    pub fn keys_path(&self) -> Utf8PathBuf {
        self.user_path().join("keys")
    }

    pub fn qt_config_path(&self) -> Utf8PathBuf {
        self.user_path().join("config").join("qt-config.ini")
    }

    /// NAND root, honouring `nand_directory` from the Qt config.
    pub fn nand_path(&self) -> Utf8PathBuf {
        let user_path = self.user_path();
        let default = user_path.join("nand");

        match self.data_storage(&user_path).and_then(|s| s.nand_directory) {
            Some(raw) => {
                let path = Utf8PathBuf::from(qt_config::decode_qt_value(&raw));
                tracing::info!("use nand path from qt config: {}", path);
                path
            }
            None => default,
        }
    }

    /// Mod/patch load directory, honouring `load_directory` from the Qt config.
    ///
    /// The raw value is only decoded when it contains a `\u` escape.
    pub fn load_path(&self) -> Utf8PathBuf {
        let user_path = self.user_path();
        let default = user_path.join("load");

        match self.data_storage(&user_path).and_then(|s| s.load_directory) {
            Some(raw) => {
                let path = if raw.contains(LOAD_DECODE_MARKER) {
                    Utf8PathBuf::from(qt_config::decode_qt_value(&raw))
                } else {
                    Utf8PathBuf::from(raw)
                };
                tracing::info!("use load path from qt config: {}", path);
                path
            }
            None => default,
        }
    }

    /// Where firmware NCAs are installed.
    pub fn firmware_path(&self) -> Utf8PathBuf {
        self.nand_path().join("system").join("Contents").join("registered")
    }

    /// `Data Storage` section of the Qt config, if readable. Failures are logged.
    fn data_storage(&self, user_path: &Utf8Path) -> Option<DataStorageConfig> {
        let config_path = user_path.join("config").join("qt-config.ini");
        if !config_path.exists() {
            return None;
        }

        match qt_config::read_data_storage(&config_path) {
            Ok(section) => section,
            Err(e) => {
                tracing::warn!("fail in parse qt-config, error msg: {:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        (temp, root)
    }

    fn resolver(install: &Utf8Path, rename: bool) -> PathResolver {
        let mut config = AppConfig::default();
        config.yuzu.yuzu_path = install.to_path_buf();
        config.setting.other.rename_yuzu_to_cemu = rename;
        PathResolver::new(&config).with_roaming_dir(None)
    }

    #[test]
    fn test_exe_defaults_to_primary_name() {
        let (_temp, root) = setup();
        assert_eq!(resolver(&root, false).exe_path(), root.join("yuzu.exe"));
    }

    #[test]
    fn test_exe_scans_known_names_in_order() {
        let (_temp, root) = setup();
        fs::write(root.join("suzu.exe"), b"").unwrap();
        fs::write(root.join("eden.exe"), b"").unwrap();
        assert_eq!(resolver(&root, false).exe_path(), root.join("eden.exe"));
    }

    #[test]
    fn test_exe_prefers_alternate_when_renamed() {
        let (_temp, root) = setup();
        fs::write(root.join("yuzu.exe"), b"").unwrap();
        fs::write(root.join("cemu.exe"), b"").unwrap();
        assert_eq!(resolver(&root, false).exe_path(), root.join("yuzu.exe"));
        assert_eq!(resolver(&root, true).exe_path(), root.join("cemu.exe"));
    }

    #[test]
    fn test_exe_alternate_when_primary_missing() {
        let (_temp, root) = setup();
        fs::write(root.join("eden.exe"), b"").unwrap();
        fs::write(root.join("cemu.exe"), b"").unwrap();
        assert_eq!(resolver(&root, false).exe_path(), root.join("cemu.exe"));
    }

    #[test]
    fn test_user_path_fallbacks() {
        let (_temp, root) = setup();
        let install = root.join("install");
        let roaming = root.join("roaming");
        fs::create_dir_all(&install).unwrap();

        let r = resolver(&install, false).with_roaming_dir(Some(roaming.clone()));
        assert_eq!(r.user_path(), install.join("user"));

        fs::create_dir_all(roaming.join("eden")).unwrap();
        assert_eq!(r.user_path(), roaming.join("eden"));

        fs::create_dir_all(roaming.join("yuzu")).unwrap();
        assert_eq!(r.user_path(), roaming.join("yuzu"));

        fs::create_dir_all(install.join("user")).unwrap();
        assert_eq!(r.user_path(), install.join("user"));
    }

    #[test]
    fn test_nand_and_load_from_qt_config() {
        let (_temp, root) = setup();
        let config_dir = root.join("user/config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("qt-config.ini"),
            "[Data%20Storage]\n\
             nand_directory=E:/\\x65b0/nand/\n\
             load_directory=E:/\\x65b0/load/\n",
        )
        .unwrap();

        let r = resolver(&root, false);
        assert_eq!(r.nand_path(), Utf8PathBuf::from("E:/新/nand/"));
        // no \u marker: kept verbatim
        assert_eq!(r.load_path(), Utf8PathBuf::from("E:/\\x65b0/load/"));
        assert_eq!(
            r.firmware_path(),
            Utf8PathBuf::from("E:/新/nand/").join("system/Contents/registered")
        );
    }

    #[test]
    fn test_load_decoded_with_u_marker() {
        let (_temp, root) = setup();
        let config_dir = root.join("user/config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("qt-config.ini"),
            "[Data%20Storage]\nload_directory=E:/\\u6e38/load/\n",
        )
        .unwrap();

        assert_eq!(resolver(&root, false).load_path(), Utf8PathBuf::from("E:/游/load/"));
    }

    #[test]
    fn test_unreadable_qt_config_keeps_defaults() {
        let (_temp, root) = setup();
        // a directory where the file should be makes the read fail
        fs::create_dir_all(root.join("user/config/qt-config.ini")).unwrap();

        let r = resolver(&root, false);
        assert_eq!(r.nand_path(), root.join("user").join("nand"));
        assert_eq!(r.load_path(), root.join("user").join("load"));
    }
}
