//! Target platform identity.
//!
//! The platform is resolved once and consumed everywhere a data-mapping
//! separator or an artifact extension is needed.
//!
//! | Platform | `--add-data` separator | single-file artifact |
//! |----------|------------------------|----------------------|
//! | Unix     | `:`                    | `dist/<name>`        |
//! | Windows  | `;`                    | `dist/<name>.exe`    |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform the packaged executable targets.
///
/// # Examples
///
/// ```
/// use kodegen_bundler_pyinstaller::bundler::Platform;
///
/// assert_eq!(Platform::Windows.data_separator(), ';');
/// assert_eq!(Platform::Unix.executable_suffix(), "");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Linux, macOS and other Unix-likes.
    Unix,
    /// Microsoft Windows.
    Windows,
}

impl Platform {
    /// Returns the platform of the running host.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Separator joining source and destination of a data mapping.
    pub fn data_separator(&self) -> char {
        match self {
            Platform::Unix => ':',
            Platform::Windows => ';',
        }
    }

    /// Extension appended to a single-file executable.
    pub fn executable_suffix(&self) -> &'static str {
        match self {
            Platform::Unix => "",
            Platform::Windows => ".exe",
        }
    }

    /// Lowercase identifier used in CLI output.
    pub fn short_name(&self) -> &'static str {
        match self {
            Platform::Unix => "unix",
            Platform::Windows => "windows",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
