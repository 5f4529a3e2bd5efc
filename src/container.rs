//! Physical destinations an export writes into.

use std::path::{Path, PathBuf};

/// The role a container plays within an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRole {
    /// The main archive holding table XML and archive metadata.
    Primary,
    /// A sibling folder holding externalized large objects, referenced from
    /// the primary archive by relative path.
    Auxiliary,
}

/// Identifies one physical destination: a path and the role it plays.
///
/// Once an auxiliary container is finalized it is immutable; the engine only
/// ever holds one *current* auxiliary container at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveContainer {
    path: PathBuf,
    role: ContainerRole,
}

impl ArchiveContainer {
    /// Create a container identity.
    pub fn new<P: Into<PathBuf>>(path: P, role: ContainerRole) -> Self {
        Self {
            path: path.into(),
            role,
        }
    }

    /// The container's filesystem path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The container's role.
    pub fn role(&self) -> ContainerRole {
        self.role
    }

    /// The final path component, as referenced from sibling containers.
    /// Empty when the path has no file name (e.g. `/`).
    pub fn folder_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_name() {
        let c = ArchiveContainer::new("/tmp/out/personnel-lobs-0001", ContainerRole::Auxiliary);
        assert_eq!(c.folder_name(), "personnel-lobs-0001");
        assert_eq!(c.role(), ContainerRole::Auxiliary);
    }
}
