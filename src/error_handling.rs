use std::path::{Path, PathBuf};
use std::fmt::{Debug, Display};

pub trait ErrorType: Display + Debug + PartialEq {}

// Where in an input file an error was found. Line 0 means the whole file.
#[derive(Debug, PartialEq, Clone)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize
}

impl Location {
    pub fn whole_file(file: &Path) -> Self {
        Location {
            file: file.to_path_buf(),
            line: 0,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file.display())
        } else {
            write!(f, "{}:{}", self.file.display(), self.line)
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T
}

impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", self.location, self.error)
    }
}

impl<T: ErrorType> std::error::Error for Error<T> {}

pub type Errors<T> = Vec<Error<T>>;

// Renders every error on its own line
pub fn report<T: ErrorType>(errors: &Errors<T>) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}
