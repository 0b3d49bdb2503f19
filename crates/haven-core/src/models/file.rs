use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ext;

/// A stored upload row (`files` table).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredFile {
    pub id: i64,
    /// Unique on-disk name, `<identifier>.<ext>`.
    pub name: String,
    pub userid: i64,
    pub albumid: Option<i64>,
}

impl StoredFile {
    /// The stable key linking this file to its thumbnail and cache entry.
    pub fn identifier(&self) -> &str {
        ext::identifier(&self.name)
    }

    pub fn extension(&self) -> String {
        ext::extname(&self.name)
    }
}

/// A reference to a stored file by one of the two addressable columns.
///
/// Bulk deletion reports its failures in these terms: the caller gets back
/// exactly the values it asked for, whether or not a row ever existed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FileRef {
    Id(i64),
    Name(String),
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRef::Id(id) => write!(f, "{id}"),
            FileRef::Name(name) => f.write_str(name),
        }
    }
}

/// Which column a bulk deletion addresses, and the requested values.
#[derive(Debug, Clone)]
pub enum DeleteSelector {
    Ids(Vec<i64>),
    Names(Vec<String>),
}

impl DeleteSelector {
    pub fn is_empty(&self) -> bool {
        match self {
            DeleteSelector::Ids(ids) => ids.is_empty(),
            DeleteSelector::Names(names) => names.is_empty(),
        }
    }

    /// The reference form of `file` under this selector's column.
    pub fn file_ref(&self, file: &StoredFile) -> FileRef {
        match self {
            DeleteSelector::Ids(_) => FileRef::Id(file.id),
            DeleteSelector::Names(_) => FileRef::Name(file.name.clone()),
        }
    }

    /// Requested values with no counterpart in `files` — "not found" and
    /// "found but not authorized" are indistinguishable here on purpose.
    pub fn missing_from(&self, files: &[StoredFile]) -> Vec<FileRef> {
        match self {
            DeleteSelector::Ids(ids) => ids
                .iter()
                .filter(|id| !files.iter().any(|f| f.id == **id))
                .map(|id| FileRef::Id(*id))
                .collect(),
            DeleteSelector::Names(names) => names
                .iter()
                .filter(|name| !files.iter().any(|f| f.name == **name))
                .map(|name| FileRef::Name(name.clone()))
                .collect(),
        }
    }
}
