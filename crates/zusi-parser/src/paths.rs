//! Domain-path conventions and process-wide data root discovery
//!.
//!
//! Zusi schema paths (`RollingStock\BR111\info.txt`) always use a backslash
//! separator regardless of the host OS, and are resolved one of two ways:
//! relative to the *directory* of some other, already-resolved path (an
//! "enclosing" file), or rooted at the Zusi installation's data directory
//! when the path itself contains a backslash.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A path in Zusi's own `\`-separated convention, normalised so it never
/// carries more than one leading separator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainPath(String);

impl DomainPath {
    /// Normalises a bare domain path: strips exactly one leading backslash,
    /// if present. (`zusi_pfad_test.cpp`'s `ZusiPfad_vonZusiPfad_ohneUebergeordnet`.)
    pub fn new(path: &str) -> Self {
        Self(path.strip_prefix('\\').unwrap_or(path).to_string())
    }

    /// Resolves `child` against `parent`, the way a reference inside one
    /// Zusi file is resolved against the file that references it.
    ///
    /// - An empty `child` resolves to the empty path regardless of `parent`.
    /// - A `child` that itself contains a backslash is rooted: it's
    ///   normalised on its own and `parent` is ignored entirely.
    /// - Otherwise `child` is a bare name relative to `parent`'s directory
    ///   (the substring of `parent` up to its last backslash, or the whole
    ///   path is itself childless and `child` stands alone).
    ///
    /// (`zusi_pfad_test.cpp`'s `ZusiPfad_vonZusiPfad_mitUebergeordnet`.)
    pub fn resolve(child: &str, parent: &DomainPath) -> Self {
        if child.is_empty() {
            return Self::default();
        }
        if child.contains('\\') {
            return Self::new(child);
        }
        match parent.0.rfind('\\') {
            Some(idx) => Self(format!("{}\\{child}", &parent.0[..idx])),
            None => Self(child.to_string()),
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Converts to a filesystem path rooted at `data_root`, translating `\`
    /// separators to the host's own.
    pub fn to_os_path(&self, data_root: &Path) -> PathBuf {
        let mut out = data_root.to_path_buf();
        for component in self.0.split('\\').filter(|c| !c.is_empty()) {
            out.push(component);
        }
        out
    }
}

/// Extension point for platforms (Windows, chiefly) whose data root is
/// discovered from a registry rather than an environment variable. This
/// crate ships no implementation of its own, but a consumer embedding
/// Windows registry lookups can supply one.
pub trait DataRootProvider {
    fn official_data_root(&self) -> Option<PathBuf>;
    fn user_data_root(&self) -> Option<PathBuf>;
}

/// The two process-wide data roots: the official Zusi installation's data
/// directory, and an optional user-content directory layered on top of it.
#[derive(Debug, Clone, Default)]
pub struct ZusiDataPaths {
    pub official: Option<PathBuf>,
    pub user: Option<PathBuf>,
}

impl ZusiDataPaths {
    /// Reads `ZUSI3_DATAPATH` and `ZUSI3_USERDATAPATH`, the way
    /// `bestimmeZusiDatenpfad()` reads `ZUSI3_DATAPATH` on non-Windows
    /// targets. There is no registry fallback on any target; on Windows both
    /// fields are `None` unless the environment variables happen to be set.
    fn from_env() -> Self {
        Self {
            official: env::var_os("ZUSI3_DATAPATH").map(PathBuf::from),
            user: env::var_os("ZUSI3_USERDATAPATH").map(PathBuf::from),
        }
    }

    /// Prefers the user data root, falling back to the official one, the way
    /// Zusi itself overlays user content over the base installation.
    pub fn preferred_root(&self) -> Option<&Path> {
        self.user.as_deref().or(self.official.as_deref())
    }
}

static DATA_PATHS: OnceLock<ZusiDataPaths> = OnceLock::new();

/// The process-wide data roots, discovered once and cached.
pub fn data_paths() -> &'static ZusiDataPaths {
    DATA_PATHS.get_or_init(ZusiDataPaths::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_parent_strips_single_leading_backslash() {
        assert_eq!(DomainPath::new("RollingStock\\Test").as_str(), "RollingStock\\Test");
        assert_eq!(DomainPath::new("RollingStock\\Test\\").as_str(), "RollingStock\\Test\\");
        assert_eq!(
            DomainPath::new("RollingStock\\Test\\test.ls3").as_str(),
            "RollingStock\\Test\\test.ls3"
        );
        assert_eq!(
            DomainPath::new("\\RollingStock\\Test\\test.ls3").as_str(),
            "RollingStock\\Test\\test.ls3"
        );
        assert_eq!(DomainPath::new("").as_str(), "");
        assert_eq!(DomainPath::new("\\").as_str(), "");
    }

    #[test]
    fn with_parent_joins_relative_to_parent_directory() {
        let parent = DomainPath::new("RollingStock\\Test");
        assert_eq!(DomainPath::resolve("test2.ls3", &parent).as_str(), "RollingStock\\test2.ls3");

        let parent = DomainPath::new("RollingStock\\Test\\");
        assert_eq!(
            DomainPath::resolve("test2.ls3", &parent).as_str(),
            "RollingStock\\Test\\test2.ls3"
        );

        let parent = DomainPath::new("RollingStock\\Test\\test.ls3");
        assert_eq!(
            DomainPath::resolve("test2.ls3", &parent).as_str(),
            "RollingStock\\Test\\test2.ls3"
        );

        let parent = DomainPath::new("");
        assert_eq!(DomainPath::resolve("test2.ls3", &parent).as_str(), "test2.ls3");

        let parent = DomainPath::new("\\");
        assert_eq!(DomainPath::resolve("test2.ls3", &parent).as_str(), "test2.ls3");
    }

    #[test]
    fn a_child_containing_a_backslash_is_rooted_and_ignores_the_parent() {
        let parent = DomainPath::new("RollingStock\\Test\\test.ls3");
        assert_eq!(
            DomainPath::resolve("Test2\\test2.ls3", &parent).as_str(),
            "Test2\\test2.ls3"
        );
        assert_eq!(
            DomainPath::resolve("\\Test2\\test2.ls3", &parent).as_str(),
            "Test2\\test2.ls3"
        );
        assert_eq!(DomainPath::resolve("Test2\\", &parent).as_str(), "Test2\\");
        assert_eq!(DomainPath::resolve("\\", &parent).as_str(), "");
    }

    #[test]
    fn an_empty_child_always_resolves_to_empty() {
        let parent = DomainPath::new("RollingStock\\Test\\test.ls3");
        assert_eq!(DomainPath::resolve("", &parent).as_str(), "");
    }

    #[test]
    fn os_path_translates_separators_under_the_data_root() {
        let path = DomainPath::new("RollingStock\\BR111\\info.txt");
        let os_path = path.to_os_path(Path::new("/data/zusi3"));
        assert_eq!(os_path, Path::new("/data/zusi3/RollingStock/BR111/info.txt"));
    }
}
