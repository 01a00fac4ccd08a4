use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    MacOS,
    Linux,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Os::MacOS => "macos",
            Os::Linux => "linux",
            Os::Windows => "windows",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        };
        write!(f, "{name}")
    }
}

pub fn detect_os() -> Result<Os, PlatformError> {
    #[cfg(target_os = "macos")]
    return Ok(Os::MacOS);

    #[cfg(target_os = "linux")]
    return Ok(Os::Linux);

    #[cfg(target_os = "windows")]
    return Ok(Os::Windows);

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    Err(PlatformError::UnsupportedOs(
        std::env::consts::OS.to_string(),
    ))
}

pub fn detect_arch() -> Result<Arch, PlatformError> {
    #[cfg(target_arch = "x86_64")]
    return Ok(Arch::X86_64);

    #[cfg(target_arch = "aarch64")]
    return Ok(Arch::Aarch64);

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    Err(PlatformError::UnsupportedArch(
        std::env::consts::ARCH.to_string(),
    ))
}

/// Platform detection error types
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Host operating system is not supported
    #[error("Unsupported operating system: {0}")]
    UnsupportedOs(String),

    /// Host architecture is not supported
    #[error("Unsupported architecture: {0}")]
    UnsupportedArch(String),
}
