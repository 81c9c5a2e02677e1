use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies the source unit a span was produced from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub lineno: usize,
    pub col: usize,
    pub offset: usize,
}

/// A half-open `[start, end)` range of the source, optionally tagged with
/// the file it came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
    pub file: Option<FileId>,
}

impl Span {
    pub fn new(start: Pos, end: Pos) -> Span {
        Span {
            start,
            end,
            file: None,
        }
    }

    pub fn point(pos: Pos) -> Span {
        Span::new(pos, pos)
    }

    pub fn with_file(mut self, file: Option<FileId>) -> Span {
        self.file = file;
        self
    }

    pub fn lines(&self) -> usize {
        (self.end.lineno - self.start.lineno) + 1
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    /// Returns the smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        let start = if other.start.offset < self.start.offset {
            other.start
        } else {
            self.start
        };
        let end = if other.end.offset > self.end.offset {
            other.end
        } else {
            self.end
        };
        Span {
            start,
            end,
            file: self.file.or(other.file),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

impl From<Pos> for Span {
    fn from(p: Pos) -> Span {
        Span::point(p)
    }
}

impl Pos {
    pub fn new() -> Pos {
        Pos::default()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.lineno + 1, self.col + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::{FileId, Pos, Span};

    fn pos(offset: usize) -> Pos {
        Pos {
            lineno: 0,
            col: offset,
            offset,
        }
    }

    #[test]
    fn merge_takes_min_start_and_max_end() {
        let a = Span::new(pos(4), pos(9));
        let b = Span::new(pos(2), pos(6));
        let merged = a.merge(&b);
        assert_eq!(merged.start.offset, 2);
        assert_eq!(merged.end.offset, 9);
        assert_eq!(b.merge(&a), merged);
    }

    #[test]
    fn merge_never_shrinks() {
        let outer = Span::new(pos(0), pos(20));
        let inner = Span::new(pos(5), pos(7));
        assert_eq!(outer.merge(&inner), outer);
        assert!(outer.merge(&inner).contains(&inner));
    }

    #[test]
    fn merge_keeps_file_tag() {
        let tagged = Span::new(pos(0), pos(1)).with_file(Some(FileId(3)));
        let untagged = Span::new(pos(1), pos(2));
        assert_eq!(untagged.merge(&tagged).file, Some(FileId(3)));
    }

    #[test]
    fn displays_one_based_position() {
        let span = Span::new(
            Pos {
                lineno: 2,
                col: 4,
                offset: 30,
            },
            pos(31),
        );
        assert_eq!(span.to_string(), "3:5");
    }
}
