// src/template.rs

use regex::Regex;
use std::sync::LazyLock;

use crate::error::LauncherError;

/// `$$`, `$name`, `${name}`, or a bare `$` that is none of those.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$(?:(?P<escaped>\$)|(?P<named>[_a-zA-Z][_a-zA-Z0-9]*)|\{(?P<braced>[_a-zA-Z][_a-zA-Z0-9]*)\}|(?P<invalid>))",
    )
    .expect("placeholder pattern is a valid regex")
});

/// A fixed set of named values a template is rendered with.
///
/// Every name in `NAMES` must appear in the template at least once.
pub trait Slots {
    const NAMES: &'static [&'static str];

    fn value(&self, name: &str) -> Option<&str>;
}

/// The slots of the master `fluent.conf` template.
#[derive(Debug, Clone, Copy)]
pub struct FluentConfSlots<'a> {
    /// Rendered `<match **>` block, or empty when no servers are configured.
    pub match_out_forward: &'a str,
}

impl Slots for FluentConfSlots<'_> {
    const NAMES: &'static [&'static str] = &["MATCH_OUT_FORWARD"];

    fn value(&self, name: &str) -> Option<&str> {
        match name {
            "MATCH_OUT_FORWARD" => Some(self.match_out_forward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed template: literal text interleaved with named placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

fn position_of(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

impl Template {
    pub fn parse(text: &str) -> Result<Self, LauncherError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        // Literal text accumulates until the next placeholder closes it off.
        for caps in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            literal.push_str(&text[last..whole.start()]);
            last = whole.end();

            // `$$` folds into the surrounding literal as a single `$`.
            if caps.name("escaped").is_some() {
                literal.push('$');
                continue;
            }
            if let Some(name) = caps.name("named").or_else(|| caps.name("braced")) {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name.as_str().to_string()));
                continue;
            }

            // 🛡️ A stray `$` is a packaging defect; point at it instead of guessing.
            let (line, column) = position_of(text, whole.start());
            return Err(LauncherError::InvalidPlaceholder { line, column });
        }

        literal.push_str(&text[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder verbatim.
    ///
    /// Fails when a slot never appears in the template, or when the template
    /// names a placeholder the slot set does not provide.
    pub fn render<S: Slots>(&self, slots: &S) -> Result<String, LauncherError> {
        // 🛡️ Every slot must be placed somewhere, or its content is lost.
        if let Some(slot) = S::NAMES
            .iter()
            .find(|slot| !self.placeholders().any(|p| p == **slot))
        {
            return Err(LauncherError::MissingPlaceholder { slot: *slot });
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    // Inserted verbatim: slot values are never re-scanned for `$`.
                    let value = slots
                        .value(name)
                        .ok_or_else(|| LauncherError::UnknownPlaceholder { name: name.clone() })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}
