use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachKind {
    /// Regular database file (`.db` / `.duckdb`), attached by plain path.
    Plain,
    /// Lake-format file (`.ducklake`), attached under the `ducklake:` scheme
    /// so the storage extension picks it up.
    Lake,
}

/// A sibling database file eligible for attachment, discovered at
/// session-open time. The alias is the file name without its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachTarget {
    pub alias: String,
    pub file_name: String,
    pub path: PathBuf,
    pub kind: AttachKind,
}

impl AttachTarget {
    /// Render the ATTACH statement. `OR REPLACE` makes alias collisions
    /// resolve to the last candidate in discovery order instead of erroring.
    /// The full path is used so attachment does not depend on the process
    /// working directory.
    pub fn attach_sql(&self) -> String {
        let path = self.path.display().to_string().replace('\'', "''");
        match self.kind {
            AttachKind::Plain => {
                format!("ATTACH OR REPLACE '{path}' AS \"{alias}\"", alias = self.alias)
            }
            AttachKind::Lake => {
                format!(
                    "ATTACH OR REPLACE 'ducklake:{path}' AS \"{alias}\"",
                    alias = self.alias
                )
            }
        }
    }
}

/// Enumerate attachable sibling files in `root`.
///
/// Returns plain targets first, then lake targets, each class sorted
/// lexicographically by file name so attach order (and therefore alias
/// collision resolution) is reproducible. The primary database file is
/// excluded by exact file-name match; it must never be attached twice.
pub fn discover(root: &Path, primary: &str) -> io::Result<Vec<AttachTarget>> {
    let mut plain = Vec::new();
    let mut lake = Vec::new();

    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let kind = match path.extension().and_then(|s| s.to_str()) {
            Some("db" | "duckdb") => AttachKind::Plain,
            Some("ducklake") => AttachKind::Lake,
            _ => continue,
        };
        let Some(file_name) = path.file_name().and_then(|s| s.to_str()).map(str::to_owned)
        else {
            continue;
        };
        let Some(alias) = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned) else {
            continue;
        };
        if kind == AttachKind::Plain && file_name == primary {
            continue;
        }
        let target = AttachTarget {
            alias,
            file_name,
            path,
            kind,
        };
        match kind {
            AttachKind::Plain => plain.push(target),
            AttachKind::Lake => lake.push(target),
        }
    }

    plain.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    lake.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    plain.extend(lake);
    Ok(plain)
}
