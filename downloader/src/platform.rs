//! Operating system and architecture aliases used in release asset names.

/// An operating system as it appears in release asset names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS.
    MacOs,
    /// Windows.
    Windows,
    /// Anything else; never matches.
    Other,
}

/// A CPU architecture as it appears in release asset names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arch {
    /// 64-bit x86.
    Amd64,
    /// 32-bit x86.
    X86,
    /// 64-bit ARM.
    Arm64,
    /// Anything else; never matches.
    Other,
}

impl Os {
    /// The operating system this binary was built for.
    #[must_use]
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            _ => Self::Other,
        }
    }

    /// Substrings that identify this OS in a lower-cased asset name.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Linux => &["_linux", "-linux-"],
            Self::MacOs => &["_darwin", "_macos", "_osx", "-darwin-", "-osx-"],
            Self::Windows => &["_windows", "-windows"],
            Self::Other => &[],
        }
    }
}

impl Arch {
    /// The architecture this binary was built for.
    #[must_use]
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "x86_64" => Self::Amd64,
            "x86" => Self::X86,
            "aarch64" => Self::Arm64,
            _ => Self::Other,
        }
    }

    /// Substrings that identify this architecture in a lower-cased asset
    /// name.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Amd64 => &["_amd64", "_x86_64", "-64bit", "-amd64"],
            Self::X86 => &["_386", "_x86", "_i386", "-32bit"],
            Self::Arm64 => &["_arm64", "_aarch64", "-arm64"],
            Self::Other => &[],
        }
    }
}

/// The operating system and architecture an asset must match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// Architecture.
    pub arch: Arch,
}

impl Platform {
    /// The platform this binary was built for.
    #[must_use]
    pub fn current() -> Self {
        Self {
            os: Os::current(),
            arch: Arch::current(),
        }
    }

    /// Returns `true` when `asset` names both this OS and this architecture.
    ///
    /// # Examples
    ///
    /// ```
    /// use iacscan_downloader::platform::{Arch, Os, Platform};
    ///
    /// let linux = Platform { os: Os::Linux, arch: Arch::Amd64 };
    /// assert!(linux.matches("tool_1.2.3_Linux-64bit.tar.gz"));
    /// assert!(!linux.matches("tool_1.2.3_Darwin-64bit.tar.gz"));
    /// ```
    #[must_use]
    pub fn matches(self, asset: &str) -> bool {
        let name = asset.to_lowercase();
        let contains_any = |aliases: &[&str]| aliases.iter().any(|alias| name.contains(alias));
        contains_any(self.arch.aliases()) && contains_any(self.os.aliases())
    }
}
