use std::fmt;
use std::path::PathBuf;

/// Where to look for a configuration file.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// A subdirectory under the user's home directory. `Home("")` is the home
    /// directory itself.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit directory.
    Path(PathBuf),
}

/// Syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Xml,
    Toml,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Yaml => "YAML",
            FileFormat::Xml => "XML",
            FileFormat::Toml => "TOML",
        };
        f.write_str(name)
    }
}
