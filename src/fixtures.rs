#[cfg(test)]
pub mod test {
    use std::fs;

    use tempfile::TempDir;

    use crate::choice::{Choice, CliOption};
    use crate::cli::CommandLineSource;
    use crate::env::EnvironmentSource;
    use crate::file::FileSource;
    use crate::types::SearchPath;

    pub const YAML_NAME: &str = ".myprog-config.yml";
    pub const XML_NAME: &str = ".myprog-config.xml";

    /// The tutorial's choices: an integer option, a switch and a list of files.
    pub fn tutorial_choices() -> Vec<Choice> {
        vec![
            Choice::new("connections")
                .integer()
                .default("0")
                .option(CliOption::long("connections").short('c').value_name("COUNT")),
            Choice::new("ssh")
                .boolean()
                .default("false")
                .switch(CliOption::long("ssh").help("Use ssh to open connection.")),
            Choice::new("files").arglist(),
        ]
    }

    /// Command line over `argv`, with a program name in front.
    pub fn command_line(argv: &[&str]) -> CommandLineSource {
        CommandLineSource::new().args(std::iter::once("prog").chain(argv.iter().copied()))
    }

    pub fn environment(vars: &[(&str, &str)]) -> EnvironmentSource {
        EnvironmentSource::with_prefix("myprog_").vars(vars.iter().copied())
    }

    /// A YAML file holding `content`, found in `dir`.
    pub fn yaml_in(dir: &TempDir, content: &str) -> FileSource {
        fs::write(dir.path().join(YAML_NAME), content).unwrap();
        FileSource::yaml(YAML_NAME).search_paths(vec![SearchPath::Path(dir.path().to_path_buf())])
    }

    pub fn xml_in(dir: &TempDir, content: &str) -> FileSource {
        fs::write(dir.path().join(XML_NAME), content).unwrap();
        FileSource::xml(XML_NAME).search_paths(vec![SearchPath::Path(dir.path().to_path_buf())])
    }

    /// A YAML source whose file was never written.
    pub fn missing_yaml(dir: &TempDir) -> FileSource {
        FileSource::yaml(YAML_NAME).search_paths(vec![SearchPath::Path(dir.path().to_path_buf())])
    }
}
