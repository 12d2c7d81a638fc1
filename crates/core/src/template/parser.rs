//! Logic-less template compilation and rendering
//!
//! Supported tags:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `{{name}}` | XML-escaped value |
//! | `{{{name}}}`, `{{&name}}` | raw value |
//! | `{{#name}}…{{/name}}` | section: once for truthy scalars, once per array element |
//! | `{{^name}}…{{/name}}` | inverted section: only when falsy |
//! | `{{! text }}` | comment |
//! | `{{.}}` | current section element |
//!
//! Lookups are strict: a name missing from every context frame is an error
//! rather than an empty string. Section, inverted and comment tags that sit
//! alone on a line do not leave blank lines behind.

use serde_json::Value;

use super::engine::TemplateError;

/// Compiled template node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Text(String),
    Variable { name: String, escape: bool },
    Section { name: String, inverted: bool, children: Vec<Node> },
}

/// A template compiled once and rendered many times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    name: String,
    nodes: Vec<Node>,
}

impl CompiledTemplate {
    /// Compile `source`; `name` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::RenderFailed`] for unclosed tags, empty
    /// names and unbalanced sections.
    pub fn compile(name: &str, source: &str) -> Result<Self, TemplateError> {
        let fail = |reason: String| TemplateError::RenderFailed {
            template: name.to_string(),
            reason,
        };

        let mut builder = Builder::default();
        let mut pos = 0;

        while let Some(offset) = source[pos..].find("{{") {
            let start = pos + offset;
            let triple = source[start..].starts_with("{{{");
            let (open_len, close) = if triple { (3, "}}}") } else { (2, "}}") };

            let inner_start = start + open_len;
            let inner_len = source[inner_start..]
                .find(close)
                .ok_or_else(|| fail(format!("unclosed tag at byte {start}")))?;
            let inner = source[inner_start..inner_start + inner_len].trim();
            let end = inner_start + inner_len + close.len();

            let sigil = if triple { None } else { inner.chars().next() };
            let standalone_capable = matches!(sigil, Some('#' | '^' | '/' | '!'));
            let (text_end, next_pos) = if standalone_capable {
                standalone_bounds(source, pos, start, end).unwrap_or((start, end))
            } else {
                (start, end)
            };

            builder.push_text(&source[pos..text_end]);
            pos = next_pos;

            match sigil {
                Some('!') => {}
                Some('#' | '^') => {
                    let section = inner[1..].trim();
                    if section.is_empty() {
                        return Err(fail(format!("empty section name at byte {start}")));
                    }
                    builder.open.push(OpenSection {
                        name: section.to_string(),
                        inverted: sigil == Some('^'),
                        children: Vec::new(),
                    });
                }
                Some('/') => {
                    let closing = inner[1..].trim();
                    let section = builder
                        .open
                        .pop()
                        .ok_or_else(|| fail(format!("unexpected closing tag '{closing}'")))?;
                    if section.name != closing {
                        return Err(fail(format!(
                            "section '{}' closed by '{closing}'",
                            section.name
                        )));
                    }
                    builder.current().push(Node::Section {
                        name: section.name,
                        inverted: section.inverted,
                        children: section.children,
                    });
                }
                Some('&') => {
                    let variable = inner[1..].trim();
                    builder
                        .current()
                        .push(Node::Variable { name: variable.to_string(), escape: false });
                }
                _ => {
                    if inner.is_empty() {
                        return Err(fail(format!("empty tag at byte {start}")));
                    }
                    builder
                        .current()
                        .push(Node::Variable { name: inner.to_string(), escape: !triple });
                }
            }
        }

        builder.push_text(&source[pos..]);

        if let Some(section) = builder.open.last() {
            return Err(fail(format!("section '{}' is never closed", section.name)));
        }

        Ok(Self { name: name.to_string(), nodes: builder.root })
    }

    /// Template name given at compile time.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against a JSON context.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::RenderFailed`] when a referenced key is
    /// missing or a variable resolves to an array or object.
    pub fn render(&self, context: &Value) -> Result<String, TemplateError> {
        let mut out = String::new();
        let mut stack = vec![context];
        self.render_nodes(&self.nodes, &mut stack, &mut out)?;
        Ok(out)
    }

    fn render_nodes<'v>(
        &self,
        nodes: &[Node],
        stack: &mut Vec<&'v Value>,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Variable { name, escape } => {
                    let value = self.lookup(stack, name)?;
                    let rendered = self.scalar(name, value)?;
                    if *escape {
                        push_escaped(out, &rendered);
                    } else {
                        out.push_str(&rendered);
                    }
                }
                Node::Section { name, inverted, children } => {
                    let value = self.lookup(stack, name)?;
                    if *inverted {
                        if !is_truthy(value) {
                            self.render_nodes(children, stack, out)?;
                        }
                        continue;
                    }
                    match value {
                        Value::Array(items) => {
                            for item in items {
                                stack.push(item);
                                self.render_nodes(children, stack, out)?;
                                stack.pop();
                            }
                        }
                        Value::Bool(true) => self.render_nodes(children, stack, out)?,
                        other if is_truthy(other) => {
                            stack.push(other);
                            self.render_nodes(children, stack, out)?;
                            stack.pop();
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn lookup<'v>(&self, stack: &[&'v Value], name: &str) -> Result<&'v Value, TemplateError> {
        if name == "." {
            return stack.last().copied().ok_or_else(|| self.missing(name));
        }

        let mut parts = name.split('.');
        let head = parts.next().unwrap_or_default();
        let frame = stack
            .iter()
            .rev()
            .copied()
            .find_map(|frame| frame.as_object().and_then(|map| map.get(head)))
            .ok_or_else(|| self.missing(name))?;

        parts.try_fold(frame, |value, part| value.get(part).ok_or_else(|| self.missing(name)))
    }

    fn scalar(&self, name: &str, value: &Value) -> Result<String, TemplateError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Bool(flag) => Ok(flag.to_string()),
            Value::Number(number) => Ok(number.to_string()),
            Value::String(text) => Ok(text.clone()),
            Value::Array(_) | Value::Object(_) => Err(TemplateError::RenderFailed {
                template: self.name.clone(),
                reason: format!("variable '{name}' is not a scalar"),
            }),
        }
    }

    fn missing(&self, name: &str) -> TemplateError {
        TemplateError::RenderFailed {
            template: self.name.clone(),
            reason: format!("context has no value for '{name}'"),
        }
    }
}

#[derive(Default)]
struct Builder {
    root: Vec<Node>,
    open: Vec<OpenSection>,
}

struct OpenSection {
    name: String,
    inverted: bool,
    children: Vec<Node>,
}

impl Builder {
    fn current(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(section) => &mut section.children,
            None => &mut self.root,
        }
    }

    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.current().push(Node::Text(text.to_string()));
        }
    }
}

/// If the tag spanning `start..end` is alone on its line, return the end of
/// the preceding text and the position after the line break.
fn standalone_bounds(source: &str, pos: usize, start: usize, end: usize) -> Option<(usize, usize)> {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    if line_start < pos || !source[line_start..start].trim().is_empty() {
        return None;
    }

    let rest = &source[end..];
    let line_end = rest.find('\n').map_or(source.len(), |i| end + i + 1);
    if !source[end..line_end].trim().is_empty() {
        return None;
    }

    Some((line_start, line_end))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Object(_) => true,
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
}
