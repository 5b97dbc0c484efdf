//! Purpose: Find a data file among conventional locations when no path is given.
//! Exports: `DEFAULT_FILE_NAME`, `DATA_DIR_ENV`, `common_locations`, `find_first_existing`, `locate`.
//! Role: Discovery helper for the CLI; the table never depends on it.
//! Invariants: Candidate order is fixed: working dir, `$ROWTABLE_DATA_DIR`, `/content`.
//! Invariants: Lookups only stat paths; nothing is opened or created.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{Error, ErrorKind};

pub const DEFAULT_FILE_NAME: &str = "Cities.csv";
pub const DATA_DIR_ENV: &str = "ROWTABLE_DATA_DIR";

pub fn common_locations(file_name: &str) -> Vec<PathBuf> {
    let mut candidates = vec![Path::new(".").join(file_name), PathBuf::from(file_name)];
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
        candidates.push(PathBuf::from(dir).join(file_name));
    }
    candidates.push(Path::new("/content").join(file_name));
    candidates
}

pub fn find_first_existing<I, P>(paths: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(|path| path.as_ref().to_path_buf())
        .find(|path| path.exists())
}

pub fn locate(file_name: &str) -> Result<PathBuf, Error> {
    let candidates = common_locations(file_name);
    match find_first_existing(&candidates) {
        Some(path) => {
            debug!(path = %path.display(), "located data file");
            Ok(path)
        }
        None => Err(Error::new(ErrorKind::NotFound)
            .with_message(format!("could not find {file_name} in common locations"))
            .with_hint(format!(
                "Put {file_name} next to where you run rowtable, set {DATA_DIR_ENV}, or pass --file PATH."
            ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{common_locations, find_first_existing};
    use std::path::PathBuf;

    #[test]
    fn first_existing_wins_in_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("missing.csv");
        let first = temp.path().join("first.csv");
        let second = temp.path().join("second.csv");
        std::fs::write(&first, "a\n").unwrap();
        std::fs::write(&second, "a\n").unwrap();

        let found = find_first_existing([&missing, &second, &first]);
        assert_eq!(found, Some(second));
    }

    #[test]
    fn nothing_existing_yields_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let found = find_first_existing([temp.path().join("a"), temp.path().join("b")]);
        assert_eq!(found, None);
    }

    #[test]
    fn candidates_start_local_and_end_at_content() {
        let candidates = common_locations("Cities.csv");
        assert_eq!(candidates.first(), Some(&PathBuf::from("./Cities.csv")));
        assert_eq!(candidates.last(), Some(&PathBuf::from("/content/Cities.csv")));
    }
}
