//! geckodriver releases (`mozilla/geckodriver`)

use crate::cache::LastUpdateCache;
use crate::drivers::DriverError;
use crate::http::Transport;
use crate::platform::{Arch, Os, detect_arch, detect_os};
use crate::source::AssetNaming;
use crate::source::github::{GitHubProject, GitHubSource};

/// Repository owner
pub const ORGANIZATION: &str = "mozilla";

/// Repository name
pub const PROJECT: &str = "geckodriver";

/// Naming policy for geckodriver release assets
///
/// Asset names embed the version and a platform label, e.g.
/// `geckodriver-v0.36.0-linux64.tar.gz`. The archive extension varies
/// (`.tar.gz` on Unix, `.zip` on Windows), so the pattern leaves it open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeckoDriverNaming {
    os: Os,
    arch: Arch,
}

impl GeckoDriverNaming {
    /// Policy for an explicit platform
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Policy for the host platform
    ///
    /// # Errors
    ///
    /// Returns error if the host platform is unsupported
    pub fn for_host() -> Result<Self, DriverError> {
        Ok(Self::new(detect_os()?, detect_arch()?))
    }

    fn platform_label(&self) -> &'static str {
        match (self.os, self.arch) {
            (Os::Linux, Arch::X86_64) => "linux64",
            (Os::Linux, Arch::Aarch64) => "linux-aarch64",
            (Os::MacOS, Arch::X86_64) => "macos",
            (Os::MacOS, Arch::Aarch64) => "macos-aarch64",
            (Os::Windows, Arch::X86_64) => "win64",
            (Os::Windows, Arch::Aarch64) => "win-aarch64",
        }
    }
}

impl AssetNaming for GeckoDriverNaming {
    fn asset_name_regex(&self, version: &str) -> String {
        format!(
            r"geckodriver-{}-{}\..*",
            regex::escape(version),
            self.platform_label()
        )
    }
}

/// Builds a geckodriver source for the host platform
///
/// # Errors
///
/// Returns error if the host platform is unsupported or the source cannot
/// be constructed
pub fn source(
    transport: Box<dyn Transport>,
    cache: LastUpdateCache,
) -> Result<GitHubSource, DriverError> {
    let naming = GeckoDriverNaming::for_host()?;
    Ok(GitHubSource::new(
        GitHubProject::new(ORGANIZATION, PROJECT),
        transport,
        cache,
        Box::new(naming),
    )?)
}
