//! Platform detection for the bundled SDK runtime.
//!
//! The SDK ships its runtime under `lib/<platform>` inside every install
//! directory; the directory name follows Ren'Py's own conventions.

/// Platforms the SDK ships runtime binaries for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    /// x86_64 Linux
    LinuxX86_64,
    /// 32-bit x86 Linux
    LinuxI686,
    /// Other Linux architectures, named by machine string.
    LinuxOther(String),
    /// macOS (the SDK ships a single x86_64 runtime)
    DarwinX86_64,
    /// 32-bit Windows (the SDK ships i686 binaries on all Windows)
    WindowsI686,
}

impl Platform {
    /// Detect the current platform.
    pub fn current() -> Option<Self> {
        let arch = std::env::consts::ARCH;
        let os = std::env::consts::OS;

        match (os, arch) {
            ("macos", _) => Some(Self::DarwinX86_64),
            ("windows", _) => Some(Self::WindowsI686),
            ("linux", "x86_64") => Some(Self::LinuxX86_64),
            ("linux", "x86") => Some(Self::LinuxI686),
            ("linux", other) => Some(Self::LinuxOther(other.to_string())),
            _ => None,
        }
    }

    /// The runtime directory name under `lib/`.
    pub fn dir_name(&self) -> String {
        match self {
            Self::LinuxX86_64 => "linux-x86_64".into(),
            Self::LinuxI686 => "linux-i686".into(),
            Self::LinuxOther(machine) => format!("linux-{}", machine),
            Self::DarwinX86_64 => "darwin-x86_64".into(),
            Self::WindowsI686 => "windows-i686".into(),
        }
    }

    /// Whether this platform uses Unix conventions (permission bits,
    /// extension-less binaries).
    pub fn is_unix(&self) -> bool {
        !matches!(self, Self::WindowsI686)
    }

    /// Name of the bundled python interpreter binary.
    pub fn python_binary(&self) -> &'static str {
        if self.is_unix() { "python" } else { "python.exe" }
    }

    /// Name of the engine entry-point binary.
    pub fn renpy_binary(&self) -> &'static str {
        if self.is_unix() { "renpy" } else { "renpy.exe" }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_is_supported() {
        if cfg!(target_os = "linux") || cfg!(target_os = "macos") || cfg!(target_os = "windows") {
            assert!(Platform::current().is_some());
        }
    }

    #[test]
    fn test_dir_names() {
        assert_eq!(Platform::LinuxX86_64.dir_name(), "linux-x86_64");
        assert_eq!(Platform::DarwinX86_64.dir_name(), "darwin-x86_64");
        assert_eq!(Platform::WindowsI686.dir_name(), "windows-i686");
        assert_eq!(Platform::LinuxOther("armv7l".into()).dir_name(), "linux-armv7l");
    }

    #[test]
    fn test_binary_names() {
        assert_eq!(Platform::LinuxX86_64.python_binary(), "python");
        assert_eq!(Platform::WindowsI686.python_binary(), "python.exe");
        assert_eq!(Platform::WindowsI686.renpy_binary(), "renpy.exe");
    }
}
