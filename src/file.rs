//! Configuration files as a source of choices.
//!
//! # Discovery
//!
//! Each [`SearchPath`] resolves to a directory, and each directory is checked
//! for `{dir}/{file_name}` in the order given. The first file that exists is
//! the one read; later candidates are never opened. A missing file is not an
//! error: with no candidate present the source is simply empty.
//!
//! A file that exists but cannot be read (permissions, a directory in its
//! place) is logged and also treated as empty. Search stops there, since a
//! lower-priority file silently taking over would be more surprising.
//!
//! # Shape
//!
//! YAML, TOML and XML documents all go through [`flatten`](crate::flatten):
//! top-level keys become choice keys (dashes normalized to underscores), nested
//! mappings become dotted keys, scalars become strings and lists of scalars
//! become lists.
//!
//! XML has no native lists or maps, so the root element's children are read the
//! usual way: one `<home>Mars</home>` is the value `"Mars"`, two `<home>`
//! elements are the list `["Mars", "Venus"]`, an element with children is a
//! mapping. Attributes are keys too, and an element that has both attributes
//! and text keeps its text under `content`.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::error::{ChoicesError, FormatError};
use crate::flatten::flatten;
use crate::source::{RawChoices, Source, SourceKind};
use crate::types::{FileFormat, SearchPath};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct FileSource {
    format: FileFormat,
    file_name: String,
    search_paths: Vec<SearchPath>,
    path: Option<PathBuf>,
    raw: RawChoices,
}

impl FileSource {
    pub fn new(format: FileFormat, file_name: &str) -> Self {
        Self {
            format,
            file_name: file_name.to_string(),
            search_paths: vec![SearchPath::Home("")],
            path: None,
            raw: RawChoices::new(),
        }
    }

    /// `file_name` in the home directory, parsed as YAML.
    pub fn yaml(file_name: &str) -> Self {
        Self::new(FileFormat::Yaml, file_name)
    }

    pub fn xml(file_name: &str) -> Self {
        Self::new(FileFormat::Xml, file_name)
    }

    pub fn toml(file_name: &str) -> Self {
        Self::new(FileFormat::Toml, file_name)
    }

    /// Directories to search, highest priority first. Replaces the default
    /// `[SearchPath::Home("")]`.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// The file that was read, or the first candidate when none was found.
    pub fn path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| candidate_paths(&self.search_paths, &self.file_name).into_iter().next())
    }
}

impl Source for FileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn source_name(&self) -> String {
        match self.path() {
            Some(path) => format!("configuration file {}", path.display()),
            None => format!("configuration file {}", self.file_name),
        }
    }

    fn raw(&self) -> &RawChoices {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawChoices {
        &mut self.raw
    }

    fn fill(&mut self) -> Result<(), ChoicesError> {
        let candidates = candidate_paths(&self.search_paths, &self.file_name);
        let Some((path, content)) = load_first(&candidates) else {
            return Ok(());
        };
        self.path = Some(path);

        let pairs = parse_document(self.format, &content).map_err(|source| {
            ChoicesError::BadlyFormatted {
                source_name: self.source_name(),
                source,
            }
        })?;
        for (external, value) in pairs {
            self.raw.insert(&external.replace('-', "_"), &external, value);
        }
        Ok(())
    }
}

/// Resolve a [`SearchPath`] to a directory. `None` when the home directory
/// cannot be determined.
pub fn resolve_search_path(sp: &SearchPath) -> Option<PathBuf> {
    match sp {
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Every `{dir}/{file_name}` to try, in search order.
pub fn candidate_paths(search_paths: &[SearchPath], file_name: &str) -> Vec<PathBuf> {
    search_paths
        .iter()
        .filter_map(resolve_search_path)
        .map(|dir| dir.join(file_name))
        .collect()
}

/// Read the first candidate that exists.
fn load_first(candidates: &[PathBuf]) -> Option<(PathBuf, String)> {
    for path in candidates {
        match std::fs::read_to_string(path) {
            Ok(content) => return Some((path.clone(), content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file");
                continue;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "configuration file unreadable, ignoring it");
                return None;
            }
        }
    }
    None
}

/// Parse `content` and flatten it into (external name, raw value) pairs.
pub fn parse_document(format: FileFormat, content: &str) -> Result<Vec<(String, Value)>, FormatError> {
    let flattened = match format {
        FileFormat::Yaml if content.trim().is_empty() => return Ok(Vec::new()),
        FileFormat::Yaml => {
            let doc: serde_yaml::Value = serde_yaml::from_str(content)?;
            flatten(&doc)
        }
        FileFormat::Toml => {
            let doc: toml::Table = toml::from_str(content)?;
            flatten(&doc)
        }
        FileFormat::Xml => {
            let doc = roxmltree::Document::parse(content)?;
            flatten(&xml_root_to_json(doc.root_element()))
        }
    };
    flattened.map_err(|e| FormatError::Shape(e.to_string()))
}

fn xml_root_to_json(root: roxmltree::Node<'_, '_>) -> Json {
    let mut map = Map::new();
    for attr in root.attributes() {
        map.insert(attr.name().to_string(), Json::String(attr.value().to_string()));
    }
    for child in root.children().filter(roxmltree::Node::is_element) {
        insert_repeated(&mut map, child.tag_name().name(), xml_element_to_json(child));
    }
    Json::Object(map)
}

fn xml_element_to_json(node: roxmltree::Node<'_, '_>) -> Json {
    let text: String = node
        .children()
        .filter(roxmltree::Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    let text = text.trim();

    let has_children = node.children().any(|n| n.is_element());
    if !has_children && node.attributes().next().is_none() {
        return Json::String(text.to_string());
    }

    let mut map = Map::new();
    for attr in node.attributes() {
        map.insert(attr.name().to_string(), Json::String(attr.value().to_string()));
    }
    for child in node.children().filter(roxmltree::Node::is_element) {
        insert_repeated(&mut map, child.tag_name().name(), xml_element_to_json(child));
    }
    if !text.is_empty() {
        map.insert("content".to_string(), Json::String(text.to_string()));
    }
    Json::Object(map)
}

/// A second element with the same name turns the entry into a list.
fn insert_repeated(map: &mut Map<String, Json>, name: &str, value: Json) {
    match map.get_mut(name) {
        None => {
            map.insert(name.to_string(), value);
        }
        Some(Json::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Json::Array(vec![first, value]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn in_dir(dir: &TempDir, format: FileFormat, name: &str) -> FileSource {
        FileSource::new(format, name).search_paths(vec![SearchPath::Path(dir.path().to_path_buf())])
    }

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    fn list(items: &[&str]) -> Value {
        Value::List(items.iter().map(|i| i.to_string()).collect())
    }

    #[test]
    fn resolve_explicit_path() {
        let p = PathBuf::from("/tmp/myprog");
        assert_eq!(resolve_search_path(&SearchPath::Path(p.clone())), Some(p));
    }

    #[test]
    fn missing_file_is_empty_source() {
        let dir = TempDir::new().unwrap();
        let mut source = in_dir(&dir, FileFormat::Yaml, "nonexistent.yml");
        source.fill().unwrap();
        assert!(source.raw().is_empty());
    }

    #[test]
    fn yaml_file_fills_choices() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".myprog.yml"), "connections: 19\nfiles:\n  - a\n  - b\n").unwrap();
        let mut source = in_dir(&dir, FileFormat::Yaml, ".myprog.yml");
        source.fill().unwrap();
        assert_eq!(source.raw().get("connections"), Some(&s("19")));
        assert_eq!(source.raw().get("files"), Some(&list(&["a", "b"])));
        assert_eq!(
            source.source_name(),
            format!("configuration file {}", dir.path().join(".myprog.yml").display())
        );
    }

    #[test]
    fn dashed_keys_normalized_external_name_kept() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("c.yml"), "dry-run: true\n").unwrap();
        let mut source = in_dir(&dir, FileFormat::Yaml, "c.yml");
        source.fill().unwrap();
        assert_eq!(source.raw().get("dry_run"), Some(&s("true")));
        assert_eq!(source.raw().external_name("dry_run"), "dry-run");
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir1 = TempDir::new().unwrap();
        let dir2 = TempDir::new().unwrap();
        let dir3 = TempDir::new().unwrap();
        fs::write(dir2.path().join("c.toml"), "host = \"second\"\n").unwrap();
        fs::write(dir3.path().join("c.toml"), "host = \"third\"\n").unwrap();

        let mut source = FileSource::toml("c.toml").search_paths(vec![
            SearchPath::Path(dir1.path().to_path_buf()),
            SearchPath::Path(dir2.path().to_path_buf()),
            SearchPath::Path(dir3.path().to_path_buf()),
        ]);
        source.fill().unwrap();
        assert_eq!(source.raw().get("host"), Some(&s("second")));
        assert_eq!(source.path(), Some(dir2.path().join("c.toml")));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_empty_source() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be cannot be read as a string.
        fs::create_dir(dir.path().join("c.yml")).unwrap();
        let mut source = in_dir(&dir, FileFormat::Yaml, "c.yml");
        source.fill().unwrap();
        assert!(source.raw().is_empty());
    }

    #[test]
    fn malformed_yaml_is_badly_formatted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("c.yml"), "connections: [19\n").unwrap();
        let mut source = in_dir(&dir, FileFormat::Yaml, "c.yml");
        let err = source.fill().unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Badly formatted configuration file "), "{msg}");
        assert!(msg.contains("c.yml"));
        assert!(matches!(
            err,
            ChoicesError::BadlyFormatted {
                source: FormatError::Yaml(_),
                ..
            }
        ));
    }

    #[test]
    fn malformed_xml_is_badly_formatted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("c.xml"), "<config><connections>19</config>").unwrap();
        let mut source = in_dir(&dir, FileFormat::Xml, "c.xml");
        let err = source.fill().unwrap_err();
        assert!(err.to_string().starts_with("Badly formatted configuration file "));
        assert!(matches!(
            err,
            ChoicesError::BadlyFormatted {
                source: FormatError::Xml(_),
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_badly_formatted() {
        let err = parse_document(FileFormat::Toml, "port = = 3").unwrap_err();
        assert!(matches!(err, FormatError::Toml(_)));
    }

    #[test]
    fn float_values_keep_their_written_form() {
        let yaml = parse_document(FileFormat::Yaml, "version: 1.0\nratio: 2.50\n").unwrap();
        assert_eq!(
            yaml,
            vec![("version".to_string(), s("1.0")), ("ratio".to_string(), s("2.5"))]
        );
        let toml = parse_document(FileFormat::Toml, "version = 1.0").unwrap();
        assert_eq!(toml, vec![("version".to_string(), s("1.0"))]);
    }

    #[test]
    fn nested_yaml_flattens_to_dotted_keys() {
        let pairs = parse_document(FileFormat::Yaml, "database:\n  url: pg://\n").unwrap();
        assert_eq!(pairs, vec![("database.url".to_string(), s("pg://"))]);
    }

    #[test]
    fn list_of_mappings_is_shape_error() {
        let err = parse_document(FileFormat::Yaml, "files:\n  - name: a\n").unwrap_err();
        assert!(matches!(err, FormatError::Shape(_)));
    }

    #[test]
    fn xml_single_element_is_string() {
        let pairs =
            parse_document(FileFormat::Xml, "<config><home>Mars</home></config>").unwrap();
        assert_eq!(pairs, vec![("home".to_string(), s("Mars"))]);
    }

    #[test]
    fn xml_repeated_elements_are_list() {
        let pairs = parse_document(
            FileFormat::Xml,
            "<config><home>Mars</home><home>Venus</home></config>",
        )
        .unwrap();
        assert_eq!(pairs, vec![("home".to_string(), list(&["Mars", "Venus"]))]);
    }

    #[test]
    fn xml_root_attributes_are_keys() {
        let pairs = parse_document(
            FileFormat::Xml,
            "<config connections=\"19\"><ssh>true</ssh></config>",
        )
        .unwrap();
        assert!(pairs.contains(&("connections".to_string(), s("19"))));
        assert!(pairs.contains(&("ssh".to_string(), s("true"))));
    }

    #[test]
    fn xml_nested_elements_flatten() {
        let pairs = parse_document(
            FileFormat::Xml,
            "<config><database><url>pg://</url></database></config>",
        )
        .unwrap();
        assert_eq!(pairs, vec![("database.url".to_string(), s("pg://"))]);
    }

    #[test]
    fn xml_attribute_and_text_keep_content() {
        let pairs = parse_document(
            FileFormat::Xml,
            "<config><home planet=\"yes\">Mars</home></config>",
        )
        .unwrap();
        assert!(pairs.contains(&("home.planet".to_string(), s("yes"))));
        assert!(pairs.contains(&("home.content".to_string(), s("Mars"))));
    }

    #[test]
    fn toml_values_become_strings() {
        let pairs = parse_document(FileFormat::Toml, "port = 3000\ndebug = true\n").unwrap();
        assert!(pairs.contains(&("port".to_string(), s("3000"))));
        assert!(pairs.contains(&("debug".to_string(), s("true"))));
    }

    #[test]
    fn empty_yaml_file_is_empty() {
        assert!(parse_document(FileFormat::Yaml, "\n").unwrap().is_empty());
    }

    #[test]
    fn default_search_path_is_home() {
        let source = FileSource::yaml(".myprog.yml");
        assert_eq!(source.search_paths, vec![SearchPath::Home("")]);
        assert_eq!(source.format(), FileFormat::Yaml);
    }
}
