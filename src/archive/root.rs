use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use strum::IntoEnumIterator;

use super::{Archive, Collection};

use crate::errors::KeoDataErr;

/// The default location of the archive, `${HOME}/keogram_project`.
pub fn default_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(Archive::DEFAULT_DIR))
}

impl Archive {
    const DEFAULT_DIR: &'static str = "keogram_project";

    /// Initialize a new archive, or fill in the missing directories of an existing one.
    pub fn create(root: &dyn AsRef<Path>) -> Result<Self, KeoDataErr> {
        let root = root.as_ref().to_path_buf();

        for collection in Collection::iter() {
            std::fs::create_dir_all(root.join(collection.dir_name()))?;
        }

        Ok(Archive { root })
    }

    /// Open an existing archive.
    pub fn connect(root: &dyn AsRef<Path>) -> Result<Self, KeoDataErr> {
        let root = root.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(KeoDataErr::NotFound(format!(
                "archive root {}",
                root.display()
            )));
        }

        Ok(Archive { root })
    }

    /// Retrieve a path to the root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Top level directory of a collection.
    pub fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.dir_name())
    }

    /// The `YYYY/MM` directory of a collection for the month `date` falls in.
    pub fn month_dir(&self, collection: Collection, date: NaiveDate) -> PathBuf {
        month_dir_under(&self.collection_dir(collection), date)
    }

    /// Where to write an output file for `date`, creating the month directory if needed.
    pub fn output_path(
        &self,
        collection: Collection,
        date: NaiveDate,
        file_name: &str,
    ) -> Result<PathBuf, KeoDataErr> {
        let dir = self.month_dir(collection, date);
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join(file_name))
    }
}

/// The `YYYY/MM` sub-directory of `base` for the month `date` falls in.
pub(crate) fn month_dir_under(base: &Path, date: NaiveDate) -> PathBuf {
    base.join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
