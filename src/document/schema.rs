//! Inline content schema registered with the host editor.
//!
//! A schema lists the custom inline content types the editor accepts. Each
//! type declares its prop schema, an optional Markdown match rule used to
//! turn typed text into the widget, and a render function producing the
//! widget's visible text.

use std::fmt;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{ButtonProps, InlineItem};

/// `[` followed by one or more non-`]` characters followed by `]`.
pub const BUTTON_PATTERN: &str = r"\[([^\]]+)\]";

static BUTTON_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(BUTTON_PATTERN).expect("button pattern is a valid regex"));

/// One prop of an inline content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropSpec {
    pub name: &'static str,
    pub default: &'static str,
}

/// A single match of a Markdown rule inside a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Byte range of the whole match.
    pub range: Range<usize>,
    /// Captured label (group 1).
    pub label: String,
}

/// Markdown match rule: a pattern whose first capture group is the label.
#[derive(Clone)]
pub struct MarkdownRule {
    pattern: Regex,
}

impl MarkdownRule {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// The `[label]` rule used by inline buttons.
    pub fn button() -> Self {
        Self::new(BUTTON_REGEX.clone())
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// First match in `text`, if any.
    pub fn find(&self, text: &str) -> Option<RuleMatch> {
        let caps = self.pattern.captures(text)?;
        let whole = caps.get(0)?;
        let label = caps.get(1).map_or("", |m| m.as_str());
        Some(RuleMatch {
            range: whole.range(),
            label: label.to_string(),
        })
    }

    /// Remove every match from `text`.
    pub fn strip_all(&self, text: &str) -> String {
        self.pattern.replace_all(text, "").into_owned()
    }
}

impl fmt::Debug for MarkdownRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MarkdownRule")
            .field(&self.pattern.as_str())
            .finish()
    }
}

/// Definition of a custom inline content type.
#[derive(Debug, Clone)]
pub struct InlineContentSpec {
    pub kind: &'static str,
    pub props: &'static [PropSpec],
    pub markdown: Option<MarkdownRule>,
    pub render: fn(&ButtonProps) -> String,
}

const BUTTON_PROPS: &[PropSpec] = &[PropSpec {
    name: "title",
    default: "",
}];

fn render_button(props: &ButtonProps) -> String {
    props.title.clone()
}

impl InlineContentSpec {
    /// The `inlineButton` type: a titled button typed as `[title]`.
    pub fn inline_button() -> Self {
        Self {
            kind: "inlineButton",
            props: BUTTON_PROPS,
            markdown: Some(MarkdownRule::button()),
            render: render_button,
        }
    }

    /// Props filled with the declared defaults.
    pub fn default_props(&self) -> ButtonProps {
        let title = self
            .props
            .iter()
            .find(|p| p.name == "title")
            .map_or("", |p| p.default);
        ButtonProps {
            title: title.to_string(),
        }
    }

    /// Build the widget for a Markdown match.
    pub fn widget_from_match(&self, found: &RuleMatch) -> InlineItem {
        let mut props = self.default_props();
        props.title.clone_from(&found.label);
        InlineItem::InlineButton { props }
    }
}

/// The set of inline content types the editor accepts besides plain text.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    inline_specs: Vec<InlineContentSpec>,
}

impl Schema {
    /// Schema with only the built-in text type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema with the inline button registered.
    pub fn with_inline_button() -> Self {
        Self::new().register(InlineContentSpec::inline_button())
    }

    /// Register a custom inline content type, replacing one of the same kind.
    #[must_use]
    pub fn register(mut self, spec: InlineContentSpec) -> Self {
        self.inline_specs.retain(|s| s.kind != spec.kind);
        self.inline_specs.push(spec);
        self
    }

    pub fn inline_spec(&self, kind: &str) -> Option<&InlineContentSpec> {
        self.inline_specs.iter().find(|s| s.kind == kind)
    }

    /// Whether an inline item's type is known to this schema.
    pub fn accepts(&self, item: &InlineItem) -> bool {
        match item {
            InlineItem::Text { .. } => true,
            other => self.inline_spec(other.type_name()).is_some(),
        }
    }

    /// Render a widget's visible text.
    pub fn render_widget(&self, props: &ButtonProps) -> String {
        self.inline_spec("inlineButton")
            .map_or_else(|| props.title.clone(), |spec| (spec.render)(props))
    }

    /// The Markdown rule of the inline button, if registered.
    pub fn button_rule(&self) -> Option<&MarkdownRule> {
        self.inline_spec("inlineButton")
            .and_then(|spec| spec.markdown.as_ref())
    }
}
