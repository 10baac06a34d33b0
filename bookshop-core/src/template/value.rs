//! Values and variable bindings visible to templates

use crate::types::{BookConfig, BuildContext, Chapter, OutputFormat};
use std::collections::BTreeMap;

/// A template value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Only `nil` and `false` are falsy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Short type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "mapping",
        }
    }

    /// Field access on a mapping
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(name),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<&serde_yaml::Value> for Value {
    fn from(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;
        match value {
            Yaml::Null => Value::Nil,
            Yaml::Bool(b) => Value::Bool(*b),
            Yaml::Number(n) => Value::Str(n.to_string()),
            Yaml::String(s) => Value::Str(s.clone()),
            Yaml::Sequence(items) => Value::List(items.iter().map(Value::from).collect()),
            Yaml::Mapping(mapping) => Value::Map(
                mapping
                    .iter()
                    .filter_map(|(k, v)| yaml_key(k).map(|k| (k, Value::from(v))))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => Value::from(&tagged.value),
        }
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<&Chapter> for Value {
    fn from(chapter: &Chapter) -> Self {
        let mut map: BTreeMap<String, Value> = chapter
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v)))
            .collect();
        map.insert("title".to_string(), Value::from(chapter.title.as_str()));
        map.insert(
            "file".to_string(),
            chapter.file.as_deref().map(Value::from).unwrap_or(Value::Nil),
        );
        Value::Map(map)
    }
}

/// Global variables for one build
///
/// Built from the [`BuildContext`]; the current output format is just
/// another variable here, never process-wide state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    vars: BTreeMap<String, Value>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binding for rendering templates during a build
    pub fn for_build(ctx: &BuildContext) -> Self {
        let build_date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        Self::for_book(ctx.config(), ctx.format()).with("build_date", build_date)
    }

    /// Binding with the book variables and the output format only
    pub fn for_book(config: &BookConfig, format: OutputFormat) -> Self {
        let chapters = Value::List(config.chapters.iter().map(Value::from).collect());
        let metadata: BTreeMap<String, Value> = config
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v)))
            .collect();

        let mut book = metadata.clone();
        book.insert("title".to_string(), Value::from(config.title.as_str()));
        book.insert("author".to_string(), Value::from(config.author.as_str()));
        book.insert("language".to_string(), Value::from(config.language.as_str()));
        book.insert("identifier".to_string(), Value::from(config.identifier.as_str()));
        book.insert("chapters".to_string(), chapters.clone());

        Self::new()
            .with("output", format.name())
            .with("title", config.title.as_str())
            .with("author", config.author.as_str())
            .with("language", config.language.as_str())
            .with("identifier", config.identifier.as_str())
            .with("chapters", chapters)
            .with("metadata", Value::Map(metadata))
            .with("book", Value::Map(book))
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::List(vec![]).is_truthy());
    }

    #[test]
    fn test_yaml_conversion() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("a: 1\nb: [x, true]\nc: ~\n").unwrap();
        let value = Value::from(&yaml);
        assert_eq!(value.field("a"), Some(&Value::from("1")));
        assert_eq!(
            value.field("b"),
            Some(&Value::List(vec![Value::from("x"), Value::Bool(true)]))
        );
        assert_eq!(value.field("c"), Some(&Value::Nil));
    }

    #[test]
    fn test_book_binding() {
        let config = BookConfig::new("Title", "Author")
            .with_chapter(Chapter::new("One").with_file("chapters/one.html.erb"))
            .with_metadata("publisher", "Press");
        let binding = Binding::for_book(&config, OutputFormat::Epub);

        assert_eq!(binding.get("output"), Some(&Value::from("epub")));
        assert_eq!(binding.get("title"), Some(&Value::from("Title")));

        let book = binding.get("book").unwrap();
        assert_eq!(book.field("publisher"), Some(&Value::from("Press")));
        assert_eq!(book.field("author"), Some(&Value::from("Author")));

        let Some(Value::List(chapters)) = binding.get("chapters") else {
            panic!("chapters should be a list");
        };
        assert_eq!(chapters[0].field("file"), Some(&Value::from("chapters/one.html.erb")));
    }
}
