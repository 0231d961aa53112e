//! Output and base option bags.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adapter::Destination;
use crate::format::FormatKind;

pub const DEFAULT_OUTPUT: &str = "return";
pub const DEFAULT_FORMAT: FormatKind = FormatKind::Json;
pub const DEFAULT_SPACING: usize = 2;
pub const DEFAULT_LIMIT: usize = 1000;
pub const DEFAULT_SERVER: &str = "127.0.0.1";

/// The merged output settings.
///
/// Caller overrides are laid over a fixed default set, key by key. Values are
/// kept as loose JSON so the validator can report wrongly typed options
/// instead of rejecting them at parse time; typed accessors fall back to the
/// defaults when a value has the wrong shape. Unknown keys are carried along
/// untouched.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct OutputOptions {
    values: Map<String, Value>,
}

impl OutputOptions {
    /// Options holding only the defaults.
    pub fn new() -> Self {
        Self {
            values: Self::defaults(),
        }
    }

    /// The default option set.
    pub fn defaults() -> Map<String, Value> {
        let mut values = Map::new();
        values.insert("output".into(), DEFAULT_OUTPUT.into());
        values.insert("format".into(), DEFAULT_FORMAT.to_string().into());
        values.insert("spacing".into(), DEFAULT_SPACING.into());
        values.insert("limit".into(), DEFAULT_LIMIT.into());
        values.insert("archive".into(), "".into());
        values.insert("server".into(), DEFAULT_SERVER.into());
        values.insert("bucket".into(), "".into());
        values.insert("username".into(), "".into());
        values.insert("password".into(), "".into());
        values
    }

    /// Lay `overrides` over the defaults.
    pub fn merged(overrides: Map<String, Value>) -> Self {
        let mut options = Self::new();
        options.values.extend(overrides);
        options
    }

    /// Set a single option (builder pattern).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set the `output` option.
    pub fn with_output(self, output: impl Into<String>) -> Self {
        self.set("output", output.into())
    }

    /// Set the `format` option.
    pub fn with_format(self, format: impl Into<String>) -> Self {
        self.set("format", format.into())
    }

    /// Set the `spacing` option.
    pub fn with_spacing(self, spacing: usize) -> Self {
        self.set("spacing", spacing)
    }

    /// Set the `limit` option.
    pub fn with_limit(self, limit: usize) -> Self {
        self.set("limit", limit)
    }

    /// Set the `archive` option.
    pub fn with_archive(self, archive: impl Into<String>) -> Self {
        self.set("archive", archive.into())
    }

    /// Set the `server` and `bucket` options.
    pub fn with_server(self, server: impl Into<String>, bucket: impl Into<String>) -> Self {
        self.set("server", server.into()).set("bucket", bucket.into())
    }

    /// Set the `username` and `password` options.
    pub fn with_credentials(
        self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.set("username", username.into())
            .set("password", password.into())
    }

    /// Raw value of an option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Iterate over every option, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// The raw option map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// The `output` option, when it is a string.
    pub fn output(&self) -> Option<&str> {
        self.str_value("output")
    }

    /// Destination the `output` option resolves to.
    pub fn destination(&self) -> Destination {
        Destination::resolve(self.output())
    }

    /// The `format` option, or the default when it is not a known format.
    pub fn format(&self) -> FormatKind {
        self.str_value("format")
            .and_then(FormatKind::from_str)
            .unwrap_or(DEFAULT_FORMAT)
    }

    /// The `spacing` option, or the default when it is not a whole number.
    pub fn spacing(&self) -> usize {
        self.usize_value("spacing").unwrap_or(DEFAULT_SPACING)
    }

    /// The `limit` option, or the default when it is not a whole number.
    ///
    /// Zero means no limit.
    pub fn limit(&self) -> usize {
        self.usize_value("limit").unwrap_or(DEFAULT_LIMIT)
    }

    /// The `archive` option when it names a file.
    pub fn archive(&self) -> Option<&str> {
        self.str_value("archive").filter(|s| !s.is_empty())
    }

    pub fn server(&self) -> &str {
        self.str_value("server").unwrap_or_default()
    }

    pub fn bucket(&self) -> &str {
        self.str_value("bucket").unwrap_or_default()
    }

    pub fn username(&self) -> &str {
        self.str_value("username").unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.str_value("password").unwrap_or_default()
    }

    fn str_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    fn usize_value(&self, key: &str) -> Option<usize> {
        self.values
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Map<String, Value>> for OutputOptions {
    fn from(overrides: Map<String, Value>) -> Self {
        Self::merged(overrides)
    }
}

impl From<OutputOptions> for Map<String, Value> {
    fn from(options: OutputOptions) -> Self {
        options.values
    }
}

impl fmt::Debug for OutputOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.values {
            if key == "password" && value.as_str().is_some_and(|p| !p.is_empty()) {
                map.entry(key, &"<redacted>");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

/// Settings shared by every adapter, independent of the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseOptions {
    /// Directory that relative folder outputs are resolved against
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Any other settings, passed through to adapters unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for BaseOptions {
    fn default() -> Self {
        Self {
            root: default_root(),
            extra: Map::new(),
        }
    }
}

impl BaseOptions {
    /// Create base options rooted at the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Resolve `path` against the root; absolute paths are kept as is.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
