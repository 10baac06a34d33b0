//! Template engine
//!
//! Resolves a template under the book-source root to its final text.
//! Templates use a restricted ERB-style dialect: `<%= expr %>` output tags,
//! `if`/`elsif`/`else`/`unless`/`for`/`each` blocks and the `import(path)`
//! helper, which inlines the fully resolved text of another template.
//!
//! Every resolved template has exactly one trailing newline removed, so
//! imported fragments do not accumulate blank lines.

mod parser;
mod value;

pub use parser::{Expr, Node};
pub use value::{Binding, Value};

use crate::error::{TemplateError, TemplateErrorKind};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Default limit on nested imports
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Resolves templates relative to a fixed source root
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    source_root: PathBuf,
    max_depth: usize,
}

impl TemplateEngine {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum import nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Resolve the template at `path` (relative to the source root)
    pub fn resolve(&self, path: impl AsRef<Path>, binding: &Binding) -> Result<String, TemplateError> {
        let mut stack = Vec::new();
        self.resolve_nested(path.as_ref(), binding, &mut stack)
    }

    /// Resolve template text that does not live on disk; `name` labels errors
    pub fn resolve_source(
        &self,
        name: impl AsRef<Path>,
        source: &str,
        binding: &Binding,
    ) -> Result<String, TemplateError> {
        let mut stack = vec![name.as_ref().to_path_buf()];
        self.render(name.as_ref(), source, binding, &mut stack)
    }

    fn resolve_nested(
        &self,
        path: &Path,
        binding: &Binding,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String, TemplateError> {
        let rel = normalize(path)?;

        if stack.contains(&rel) {
            let chain: Vec<String> = stack
                .iter()
                .chain(std::iter::once(&rel))
                .map(|p| p.display().to_string())
                .collect();
            return Err(TemplateError::new(
                TemplateErrorKind::ImportCycle,
                rel,
                format!("import chain loops: {}", chain.join(" -> ")),
            ));
        }
        if stack.len() >= self.max_depth {
            return Err(TemplateError::new(
                TemplateErrorKind::DepthExceeded,
                rel,
                format!("more than {} nested imports", self.max_depth),
            ));
        }

        let full_path = self.source_root.join(&rel);
        let source = std::fs::read_to_string(&full_path).map_err(|e| {
            let cause = format!("{}: {}", full_path.display(), e);
            match e.kind() {
                std::io::ErrorKind::NotFound => TemplateError::not_found(&rel, cause),
                _ => TemplateError::evaluation(&rel, cause),
            }
        })?;
        tracing::trace!("Resolving template {}", rel.display());

        stack.push(rel.clone());
        let result = self.render(&rel, &source, binding, stack);
        stack.pop();
        result
    }

    fn render(
        &self,
        path: &Path,
        source: &str,
        binding: &Binding,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String, TemplateError> {
        let nodes = parser::parse(source).map_err(|e| TemplateError::syntax(path, e.to_string()))?;

        let mut renderer = Renderer {
            engine: self,
            binding,
            path,
            stack,
            scopes: Vec::new(),
        };
        let mut out = String::with_capacity(source.len());
        renderer.render_nodes(&nodes, &mut out)?;
        Ok(strip_trailing_newline(out))
    }
}

/// Remove exactly one trailing `\n`, if present
pub fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Turn an import path into a clean relative path under the source root
fn normalize(path: &Path) -> Result<PathBuf, TemplateError> {
    let mut rel = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(c) => rel.push(c),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(TemplateError::not_found(
                    path,
                    "template paths must stay inside the book source directory",
                ));
            }
        }
    }
    if rel.as_os_str().is_empty() {
        return Err(TemplateError::not_found(path, "empty template path"));
    }
    Ok(rel)
}

/// Evaluates a parsed template against a binding
struct Renderer<'a> {
    engine: &'a TemplateEngine,
    binding: &'a Binding,
    path: &'a Path,
    stack: &'a mut Vec<PathBuf>,
    /// Loop variables, innermost last
    scopes: Vec<BTreeMap<String, Value>>,
}

impl Renderer<'_> {
    fn render_nodes(&mut self, nodes: &[Node], out: &mut String) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Output(expr) => {
                    let value = self.eval(expr)?;
                    self.write_value(&value, out)?;
                }
                Node::If { branches, otherwise } => {
                    let mut taken = false;
                    for (cond, body) in branches {
                        if self.eval(cond)?.is_truthy() {
                            self.render_nodes(body, out)?;
                            taken = true;
                            break;
                        }
                    }
                    if !taken {
                        self.render_nodes(otherwise, out)?;
                    }
                }
                Node::For { var, iter, body } => {
                    let items = match self.eval(iter)? {
                        Value::List(items) => items,
                        Value::Nil => Vec::new(),
                        other => {
                            return Err(self.error(format!(
                                "cannot iterate over a {}",
                                other.type_name()
                            )))
                        }
                    };
                    for (i, item) in items.into_iter().enumerate() {
                        let mut scope = BTreeMap::new();
                        scope.insert(format!("{}_index", var), Value::Str((i + 1).to_string()));
                        scope.insert(var.clone(), item);
                        self.scopes.push(scope);
                        let result = self.render_nodes(body, out);
                        self.scopes.pop();
                        result?;
                    }
                }
            }
        }
        Ok(())
    }

    fn write_value(&self, value: &Value, out: &mut String) -> Result<(), TemplateError> {
        match value {
            Value::Nil => {}
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Str(s) => out.push_str(s),
            other => {
                return Err(self.error(format!("cannot render a {} as text", other.type_name())))
            }
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, TemplateError> {
        Ok(match expr {
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Nil => Value::Nil,
            Expr::Var(segments) => self.lookup(segments)?,
            Expr::Not(inner) => Value::Bool(!self.eval(inner)?.is_truthy()),
            Expr::Eq(lhs, rhs) => Value::Bool(self.eval(lhs)? == self.eval(rhs)?),
            Expr::Ne(lhs, rhs) => Value::Bool(self.eval(lhs)? != self.eval(rhs)?),
            Expr::And(lhs, rhs) => {
                let left = self.eval(lhs)?;
                if left.is_truthy() {
                    self.eval(rhs)?
                } else {
                    left
                }
            }
            Expr::Or(lhs, rhs) => {
                let left = self.eval(lhs)?;
                if left.is_truthy() {
                    left
                } else {
                    self.eval(rhs)?
                }
            }
            Expr::Import(arg) => {
                let target = match self.eval(arg)? {
                    Value::Str(s) => s,
                    other => {
                        return Err(self.error(format!(
                            "import expects a path string, got a {}",
                            other.type_name()
                        )))
                    }
                };
                let text = self
                    .engine
                    .resolve_nested(Path::new(&target), self.binding, self.stack)?;
                Value::Str(text)
            }
        })
    }

    fn lookup(&self, segments: &[String]) -> Result<Value, TemplateError> {
        let (head, fields) = segments
            .split_first()
            .ok_or_else(|| self.error("empty variable path"))?;

        let root = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(head))
            .or_else(|| self.binding.get(head))
            .ok_or_else(|| self.error(format!("undefined variable '{}'", head)))?;

        let mut current = root;
        for field in fields {
            current = match current {
                Value::Map(map) => match map.get(field) {
                    Some(v) => v,
                    None => return Ok(Value::Nil),
                },
                Value::Nil => return Ok(Value::Nil),
                other => {
                    return Err(self.error(format!(
                        "cannot read field '{}' of a {}",
                        field,
                        other.type_name()
                    )))
                }
            };
        }
        Ok(current.clone())
    }

    fn error(&self, cause: impl Into<String>) -> TemplateError {
        TemplateError::evaluation(self.path, cause)
    }
}
