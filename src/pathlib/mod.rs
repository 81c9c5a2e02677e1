use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The path of a source unit. Parsers only use it to label diagnostics; the
/// CLI also uses it to read the source and to locate `vireo.toml`.
#[derive(Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct FilePath {
    buf: PathBuf,
}

impl FilePath {
    /// Returns the filepath of the parent directory
    ///
    /// If the path is already a directory, the path is cloned. A bare file
    /// name resolves to the current directory.
    pub fn dir(&self) -> FilePath {
        if self.buf.is_dir() {
            return self.clone();
        }

        match self.buf.parent() {
            Some(parent) if parent.components().count() != 0 => FilePath::from(parent),
            _ => FilePath::from("."),
        }
    }

    pub fn read_to_string(&self) -> io::Result<String> {
        fs::read_to_string(&self.buf)
    }
}

impl Default for FilePath {
    fn default() -> FilePath {
        FilePath::from("<input>")
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.buf.display())
    }
}

impl<T: Into<PathBuf>> From<T> for FilePath {
    fn from(s: T) -> FilePath {
        FilePath { buf: s.into() }
    }
}

impl FromStr for FilePath {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<FilePath, &'static str> {
        Ok(FilePath { buf: s.into() })
    }
}

impl AsRef<Path> for FilePath {
    fn as_ref(&self) -> &Path {
        self.buf.as_path()
    }
}
