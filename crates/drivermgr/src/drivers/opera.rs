//! operadriver releases (`operasoftware/operachromiumdriver`)

use crate::cache::LastUpdateCache;
use crate::drivers::DriverError;
use crate::http::Transport;
use crate::platform::{Arch, Os, detect_arch, detect_os};
use crate::source::AssetNaming;
use crate::source::github::{GitHubProject, GitHubSource};

/// Repository owner
pub const ORGANIZATION: &str = "operasoftware";

/// Repository name
pub const PROJECT: &str = "operachromiumdriver";

/// Naming policy for operadriver release assets
///
/// Asset names carry no version at all: `operadriver_linux64.zip`,
/// `operadriver_mac64.zip`, `operadriver_win64.zip`. Only x86_64 builds are
/// published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperaDriverNaming {
    os: Os,
}

impl OperaDriverNaming {
    /// Policy for an explicit platform
    ///
    /// # Errors
    ///
    /// Returns error for architectures without a published build
    pub fn new(os: Os, arch: Arch) -> Result<Self, DriverError> {
        match arch {
            Arch::X86_64 => Ok(Self { os }),
            Arch::Aarch64 => Err(DriverError::UnsupportedTarget {
                driver: "operadriver",
                os,
                arch,
            }),
        }
    }

    /// Policy for the host platform
    ///
    /// # Errors
    ///
    /// Returns error if the host platform is unsupported or has no
    /// published build
    pub fn for_host() -> Result<Self, DriverError> {
        Self::new(detect_os()?, detect_arch()?)
    }

    fn platform_label(&self) -> &'static str {
        match self.os {
            Os::Linux => "linux64",
            Os::MacOS => "mac64",
            Os::Windows => "win64",
        }
    }
}

impl AssetNaming for OperaDriverNaming {
    fn asset_name_regex(&self, _version: &str) -> String {
        format!(r"operadriver_{}\.zip", self.platform_label())
    }
}

/// Builds an operadriver source for the host platform
///
/// # Errors
///
/// Returns error if the host platform has no published build or the source
/// cannot be constructed
pub fn source(
    transport: Box<dyn Transport>,
    cache: LastUpdateCache,
) -> Result<GitHubSource, DriverError> {
    let naming = OperaDriverNaming::for_host()?;
    Ok(GitHubSource::new(
        GitHubProject::new(ORGANIZATION, PROJECT),
        transport,
        cache,
        Box::new(naming),
    )?)
}
