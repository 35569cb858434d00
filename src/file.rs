//! Media file lookup.

use crate::{common::url_encode, title::Title};
use std::path::PathBuf;

/// An existing media file.
pub trait File {
    /// Returns the URL of a thumbnail of this file that fits within the given
    /// bounding box. The URL may be relative to the server.
    fn create_thumb(&self, width: u32, height: u32) -> String;
}

/// A media file repository.
pub trait FileRepo {
    /// Finds the file with the given title, if it exists. The namespace of
    /// the title is ignored.
    ///
    /// In MediaWiki, this is like `wfFindFile`.
    fn find_file(&self, title: &Title) -> Option<Box<dyn File + '_>>;
}

/// A repository with no files.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyRepo;

impl FileRepo for EmptyRepo {
    fn find_file(&self, _: &Title) -> Option<Box<dyn File + '_>> {
        None
    }
}

/// A repository backed by a flat directory of files named by DB key.
#[derive(Clone, Debug)]
pub struct LocalRepo {
    /// The directory containing the files.
    root: PathBuf,
    /// The URL path corresponding to the directory.
    url_path: String,
}

impl LocalRepo {
    /// Creates a new repository for the files in `root`, served at
    /// `url_path`.
    pub fn new(root: impl Into<PathBuf>, url_path: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_path: url_path.into(),
        }
    }
}

impl FileRepo for LocalRepo {
    fn find_file(&self, title: &Title) -> Option<Box<dyn File + '_>> {
        let key = title.db_key();
        let path = self.root.join(&key);
        if path.is_file() {
            Some(Box::new(LocalFile {
                key,
                url_path: &self.url_path,
            }))
        } else {
            log::debug!("No such file {}", path.display());
            None
        }
    }
}

/// A file in a [`LocalRepo`].
#[derive(Debug)]
struct LocalFile<'a> {
    /// The DB key of the file.
    key: String,
    /// The URL path of the repository.
    url_path: &'a str,
}

impl File for LocalFile<'_> {
    fn create_thumb(&self, width: u32, _height: u32) -> String {
        // Without image dimensions, the box width is the only constraint that
        // can be honoured.
        let key = url_encode(&self.key);
        format!("{}/thumb/{key}/{width}px-{key}", self.url_path)
    }
}
