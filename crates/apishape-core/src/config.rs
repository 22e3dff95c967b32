use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ir::{GroupingStrategy, Serialization};

/// Top-level project configuration loaded from `.apishape.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApishapeConfig {
    pub input: String,
    pub output: String,
    pub format: OutputFormat,
    pub generator: GeneratorSettings,
}

impl Default for ApishapeConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "shaped.yaml".to_string(),
            format: OutputFormat::Yaml,
            generator: GeneratorSettings::default(),
        }
    }
}

/// Serialization format of the shaped description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Generator knobs as written by the user. Enumerated values stay strings
/// here so an unknown value degrades to a default instead of failing the
/// whole file; [`GeneratorSettings::resolve`] validates them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub library: Option<String>,
    pub grouping: Option<String>,
    pub naming: Option<String>,
    pub date_library: Option<String>,
    pub media_types: Option<String>,
    pub use_rx_java: bool,
    pub use_rx_java2: bool,
    pub validation: bool,
    pub serializable_model: bool,
    /// Overrides the short application name taken from the description.
    pub service_name: Option<String>,
    /// Map from resolved operation name (operationId or route-derived) to custom alias.
    pub aliases: IndexMap<String, String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            library: None,
            grouping: None,
            naming: None,
            date_library: None,
            media_types: None,
            use_rx_java: false,
            use_rx_java2: false,
            validation: true,
            serializable_model: false,
            service_name: None,
            aliases: IndexMap::new(),
        }
    }
}

/// Target library variant. Selects serialization flavour, default grouping
/// and a few per-library adjustments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Library {
    #[default]
    JaxRs,
    Spring,
    ResteasyClient,
    Jersey1,
    Jersey2,
    Feign,
    OkhttpGson,
    Retrofit,
    Retrofit2,
}

impl Library {
    pub const ALL: [Library; 9] = [
        Library::JaxRs,
        Library::Spring,
        Library::ResteasyClient,
        Library::Jersey1,
        Library::Jersey2,
        Library::Feign,
        Library::OkhttpGson,
        Library::Retrofit,
        Library::Retrofit2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Library::JaxRs => "jax-rs",
            Library::Spring => "spring",
            Library::ResteasyClient => "resteasy-client",
            Library::Jersey1 => "jersey1",
            Library::Jersey2 => "jersey2",
            Library::Feign => "feign",
            Library::OkhttpGson => "okhttp-gson",
            Library::Retrofit => "retrofit",
            Library::Retrofit2 => "retrofit2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == name)
    }

    /// Server-side variants generate interfaces to implement.
    pub fn is_server(&self) -> bool {
        matches!(self, Library::JaxRs | Library::Spring)
    }

    pub fn default_grouping(&self) -> GroupingStrategy {
        match self {
            _ if self.is_server() => GroupingStrategy::OperationId,
            Library::ResteasyClient => GroupingStrategy::Single,
            _ => GroupingStrategy::BasePath,
        }
    }

    pub fn serialization(&self) -> Serialization {
        match self {
            Library::OkhttpGson | Library::Retrofit | Library::Retrofit2 => Serialization::Gson,
            _ => Serialization::Jackson,
        }
    }

    /// JAX-RS resources carry an explicit HTTP method annotation per operation.
    pub fn needs_http_method(&self) -> bool {
        *self == Library::JaxRs
    }

    /// Retrofit 2 resolves relative paths against the base URL, so paths
    /// must not start with `/`.
    pub fn strips_leading_slash(&self) -> bool {
        *self == Library::Retrofit2
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How operation names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// `operationId` when present, otherwise derived from the route.
    #[default]
    Auto,
    /// Always derived from the route.
    Path,
}

/// Date and time representation of the generated code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateLibrary {
    #[default]
    Java8,
    Java8LocalDateTime,
    Joda,
    Legacy,
    Threetenbp,
}

impl DateLibrary {
    pub const ALL: [DateLibrary; 5] = [
        DateLibrary::Java8,
        DateLibrary::Java8LocalDateTime,
        DateLibrary::Joda,
        DateLibrary::Legacy,
        DateLibrary::Threetenbp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateLibrary::Java8 => "java8",
            DateLibrary::Java8LocalDateTime => "java8-localdatetime",
            DateLibrary::Joda => "joda",
            DateLibrary::Legacy => "legacy",
            DateLibrary::Threetenbp => "threetenbp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }

    /// Local date-times carry no zone.
    pub fn omits_time_zone(&self) -> bool {
        *self == DateLibrary::Java8LocalDateTime
    }
}

/// How an operation's consumed media types are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaTypeStrategy {
    /// Vendor JSON, then plain JSON, then the rest.
    #[default]
    JsonFirst,
    /// Keep the declaration order.
    Declared,
}

/// Reactive wrapper for client return types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reactive {
    #[default]
    None,
    RxJava,
    RxJava2,
}

/// Fully validated options for one shaping run.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeOptions {
    pub library: Library,
    pub grouping: GroupingStrategy,
    pub naming: NamingStrategy,
    pub date_library: DateLibrary,
    pub media_types: MediaTypeStrategy,
    pub reactive: Reactive,
    pub validation: bool,
    pub serializable_model: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub aliases: IndexMap<String, String>,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self::for_library(Library::default())
    }
}

impl ShapeOptions {
    /// Defaults for a library variant.
    pub fn for_library(library: Library) -> Self {
        Self {
            library,
            grouping: library.default_grouping(),
            naming: NamingStrategy::Auto,
            date_library: DateLibrary::Java8,
            media_types: MediaTypeStrategy::JsonFirst,
            reactive: Reactive::None,
            validation: true,
            serializable_model: false,
            service_name: None,
            aliases: IndexMap::new(),
        }
    }

    pub fn serialization(&self) -> Serialization {
        self.library.serialization()
    }
}

/// A non-fatal configuration problem. The run continues with the value in
/// `fallback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub setting: String,
    pub message: String,
    pub fallback: String,
}

impl Diagnostic {
    fn new(setting: &str, message: String, fallback: impl fmt::Display) -> Self {
        Self {
            setting: setting.to_string(),
            message,
            fallback: fallback.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (using {})", self.setting, self.message, self.fallback)
    }
}

fn grouping_from_name(name: &str) -> Option<GroupingStrategy> {
    match name {
        "base_path" => Some(GroupingStrategy::BasePath),
        "client_group" => Some(GroupingStrategy::ClientGroup),
        "operation_id" => Some(GroupingStrategy::OperationId),
        "single" => Some(GroupingStrategy::Single),
        _ => None,
    }
}

fn grouping_name(grouping: GroupingStrategy) -> &'static str {
    match grouping {
        GroupingStrategy::BasePath => "base_path",
        GroupingStrategy::ClientGroup => "client_group",
        GroupingStrategy::OperationId => "operation_id",
        GroupingStrategy::Single => "single",
    }
}

impl GeneratorSettings {
    /// Validate the raw settings. Unknown values and conflicting flags fall
    /// back to defaults; each fallback is returned as a diagnostic and
    /// logged as a warning.
    pub fn resolve(&self) -> (ShapeOptions, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        let library = match self.library.as_deref() {
            None => Library::default(),
            Some(name) => Library::from_name(name).unwrap_or_else(|| {
                diagnostics.push(Diagnostic::new(
                    "library",
                    format!("unknown library '{name}'"),
                    Library::default(),
                ));
                Library::default()
            }),
        };
        let mut options = ShapeOptions::for_library(library);

        if let Some(name) = self.grouping.as_deref() {
            match grouping_from_name(name) {
                Some(grouping) => options.grouping = grouping,
                None => diagnostics.push(Diagnostic::new(
                    "grouping",
                    format!("unknown grouping strategy '{name}'"),
                    grouping_name(options.grouping),
                )),
            }
        }

        if let Some(name) = self.naming.as_deref() {
            match name.to_ascii_lowercase().as_str() {
                "auto" => options.naming = NamingStrategy::Auto,
                "path" => options.naming = NamingStrategy::Path,
                _ => diagnostics.push(Diagnostic::new(
                    "naming",
                    format!("unknown operation naming strategy '{name}'"),
                    "auto",
                )),
            }
        }

        if let Some(name) = self.date_library.as_deref() {
            match DateLibrary::from_name(name) {
                Some(date_library) => options.date_library = date_library,
                None => diagnostics.push(Diagnostic::new(
                    "date_library",
                    format!("unknown date library '{name}'"),
                    DateLibrary::default().as_str(),
                )),
            }
        }

        if let Some(name) = self.media_types.as_deref() {
            match name {
                "json_first" => options.media_types = MediaTypeStrategy::JsonFirst,
                "declared" => options.media_types = MediaTypeStrategy::Declared,
                _ => diagnostics.push(Diagnostic::new(
                    "media_types",
                    format!("unknown media type strategy '{name}'"),
                    "json_first",
                )),
            }
        }

        options.reactive = match (self.use_rx_java, self.use_rx_java2) {
            (true, true) => {
                diagnostics.push(Diagnostic::new(
                    "use_rx_java",
                    "use_rx_java and use_rx_java2 are mutually exclusive".to_string(),
                    "use_rx_java2",
                ));
                Reactive::RxJava2
            }
            (true, false) => Reactive::RxJava,
            (false, true) => Reactive::RxJava2,
            (false, false) => Reactive::None,
        };

        options.validation = self.validation;
        options.serializable_model = self.serializable_model;
        options.service_name = self.service_name.clone();
        options.aliases = self.aliases.clone();

        for diagnostic in &diagnostics {
            log::warn!("{diagnostic}");
        }
        (options, diagnostics)
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apishape.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApishapeConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: ApishapeConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apishape configuration
input: openapi.yaml
output: shaped.yaml
format: yaml            # yaml | json

generator:
  library: jax-rs       # jax-rs | spring | resteasy-client | jersey1 | jersey2 | feign | okhttp-gson | retrofit | retrofit2
  # grouping: operation_id   # base_path | client_group | operation_id | single (default depends on library)
  naming: auto          # auto | path
  date_library: java8   # java8 | java8-localdatetime | joda | legacy | threetenbp
  media_types: json_first    # json_first | declared
  validation: true
  serializable_model: false
  use_rx_java: false
  use_rx_java2: false
  # service_name: Petstore
  aliases: {}
    # findPetsByStatus: listPets     # operation name → custom name
"#
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApishapeConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.output, "shaped.yaml");
        assert_eq!(config.format, OutputFormat::Yaml);
        assert!(config.generator.validation);
        assert!(config.generator.library.is_none());
    }

    #[test]
    fn test_default_content_parses() {
        let config: ApishapeConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        let (options, diagnostics) = config.generator.resolve();
        assert!(diagnostics.is_empty());
        assert_eq!(options.library, Library::JaxRs);
        assert_eq!(options.grouping, GroupingStrategy::OperationId);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: spec.yaml
output: out.json
format: json
generator:
  library: retrofit2
  grouping: client_group
  naming: PATH
  date_library: java8-localdatetime
  validation: false
  service_name: Orders
  aliases:
    listPets: pets
"#;
        let config: ApishapeConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "spec.yaml");
        assert_eq!(config.format, OutputFormat::Json);

        let (options, diagnostics) = config.generator.resolve();
        assert!(diagnostics.is_empty());
        assert_eq!(options.library, Library::Retrofit2);
        assert_eq!(options.serialization(), Serialization::Gson);
        assert_eq!(options.grouping, GroupingStrategy::ClientGroup);
        assert_eq!(options.naming, NamingStrategy::Path);
        assert!(options.date_library.omits_time_zone());
        assert!(!options.validation);
        assert_eq!(options.service_name.as_deref(), Some("Orders"));
        assert_eq!(options.aliases["listPets"], "pets");
    }

    #[test]
    fn test_library_default_grouping() {
        assert_eq!(Library::Spring.default_grouping(), GroupingStrategy::OperationId);
        assert_eq!(Library::ResteasyClient.default_grouping(), GroupingStrategy::Single);
        assert_eq!(Library::Feign.default_grouping(), GroupingStrategy::BasePath);
        assert_eq!(Library::JaxRs.default_grouping(), GroupingStrategy::OperationId);
        assert!(Library::JaxRs.is_server());
        assert!(!Library::Retrofit2.is_server());
        assert_eq!(Library::Jersey2.serialization(), Serialization::Jackson);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let settings = GeneratorSettings {
            library: Some("axis".to_string()),
            grouping: Some("by_tag".to_string()),
            naming: Some("fancy".to_string()),
            date_library: Some("moment".to_string()),
            media_types: Some("xml_first".to_string()),
            ..GeneratorSettings::default()
        };
        let (options, diagnostics) = settings.resolve();
        assert_eq!(options.library, Library::JaxRs);
        assert_eq!(options.grouping, GroupingStrategy::OperationId);
        assert_eq!(options.naming, NamingStrategy::Auto);
        assert_eq!(options.date_library, DateLibrary::Java8);
        assert_eq!(options.media_types, MediaTypeStrategy::JsonFirst);
        let settings: Vec<_> = diagnostics.iter().map(|d| d.setting.as_str()).collect();
        assert_eq!(
            settings,
            vec!["library", "grouping", "naming", "date_library", "media_types"]
        );
        assert_eq!(
            diagnostics[0].to_string(),
            "library: unknown library 'axis' (using jax-rs)"
        );
    }

    #[test]
    fn test_both_rx_flags_prefer_rx_java2() {
        let settings = GeneratorSettings {
            use_rx_java: true,
            use_rx_java2: true,
            ..GeneratorSettings::default()
        };
        let (options, diagnostics) = settings.resolve();
        assert_eq!(options.reactive, Reactive::RxJava2);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(load_config(&path).unwrap().is_none());

        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "input: api.yaml\ngenerator:\n  library: feign").unwrap();
        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.input, "api.yaml");
        // Defaults applied
        assert_eq!(config.output, "shaped.yaml");
        assert_eq!(config.generator.library.as_deref(), Some("feign"));
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "format: [not, a, format]\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }
}
