use std::fmt;

/// Architectures a system architecture can run, besides itself and noarch.
const ARCH_COMPAT: &[(&str, &[&str])] = &[
    ("x86_64", &["i686", "i586", "i486", "i386"]),
    ("i686", &["i586", "i486", "i386"]),
    ("i586", &["i486", "i386"]),
    ("i486", &["i386"]),
    ("ppc64le", &[]),
    ("ppc64", &["ppc"]),
    ("s390x", &["s390"]),
    ("aarch64", &[]),
    ("armv7hl", &["armv6hl"]),
];

const NOARCH: &str = "noarch";

/// An item or system architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Arch(String);

impl Arch {
    pub fn new(arch: &str) -> Self {
        Arch(arch.trim().to_lowercase())
    }

    pub fn noarch() -> Self {
        Arch(NOARCH.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_noarch(&self) -> bool {
        self.0 == NOARCH
    }

    /// Whether an item built for `self` can be installed on `system`.
    pub fn compatible_with(&self, system: &Arch) -> bool {
        if self.is_noarch() || self == system {
            return true;
        }

        ARCH_COMPAT
            .iter()
            .find(|(sys, _)| *sys == system.as_str())
            .map(|(_, compat)| compat.contains(&self.as_str()))
            .unwrap_or(false)
    }
}

impl Default for Arch {
    fn default() -> Self {
        Arch::noarch()
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noarch_is_compatible_everywhere() {
        assert!(Arch::noarch().compatible_with(&Arch::new("x86_64")));
        assert!(Arch::noarch().compatible_with(&Arch::new("s390x")));
    }

    #[test]
    fn test_x86_family() {
        let system = Arch::new("x86_64");
        assert!(Arch::new("i586").compatible_with(&system));
        assert!(Arch::new("x86_64").compatible_with(&system));
        assert!(!Arch::new("x86_64").compatible_with(&Arch::new("i686")));
        assert!(!Arch::new("ppc").compatible_with(&system));
    }

    #[test]
    fn test_normalized() {
        assert_eq!(Arch::new(" X86_64 "), Arch::new("x86_64"));
    }
}
