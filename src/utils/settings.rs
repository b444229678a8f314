//! Tool-level settings: where signature files live and which one to load.

use std::path::{Path, PathBuf};

/// Environment variable overriding the home directory
pub const HOME_ENV: &str = "SIGID_HOME";

/// Name of the home directory created under the user's home
pub const HOME_DIR_NAME: &str = ".sigid";

/// Default compiled signature file name
pub const DEFAULT_SIGNATURE_FILE: &str = "default.sig";

/// Resolved settings for one invocation.
///
/// A value built once and passed down; nothing here is global or mutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding signature files
    pub home: PathBuf,
    /// Signature file, either a bare file name (resolved against `home`) or a path
    pub signature: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home: default_home(),
            signature: PathBuf::from(DEFAULT_SIGNATURE_FILE),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<PathBuf>) -> Self {
        self.signature = signature.into();
        self
    }

    /// Full path of the signature file.
    ///
    /// A bare file name is looked up in the home directory; anything with a
    /// directory component is used as given.
    #[must_use]
    pub fn signature_path(&self) -> PathBuf {
        let bare = self
            .signature
            .parent()
            .map_or(true, |parent| parent.as_os_str().is_empty());
        if bare {
            self.home.join(&self.signature)
        } else {
            self.signature.clone()
        }
    }

    /// True when the signature file name was left at its default
    #[must_use]
    pub fn uses_default_signature(&self) -> bool {
        self.signature == Path::new(DEFAULT_SIGNATURE_FILE)
    }
}

/// `$SIGID_HOME`, else `$HOME/.sigid`, else `./.sigid`
fn default_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from(HOME_DIR_NAME), |home| {
            PathBuf::from(home).join(HOME_DIR_NAME)
        })
}
