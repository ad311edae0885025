//! Text template engine.
//!
//! Rendering runs three passes over the whole text, each one over the output
//! of the previous:
//!
//! 1. loops: `{{#each key}}...{{/each}}`
//! 2. conditionals: `{{#if key}}...{{/if}}`
//! 3. scalars: `{{key}}`
//!
//! Blocks do not nest (the first close tag ends a block) and there is no
//! escaping. Rendering never fails; anything that does not resolve is left in
//! the output as literal text.

pub mod scanner;
pub mod value;

use serde_json::{Map, Value};

use scanner::{segments, substitute, BlockKind, Segment};
pub use value::{display_value, is_scalar, truthy};

/// Key -> value mapping fed into one render call
pub type RenderContext = Map<String, Value>;

/// Placeholder bound to the current element when looping over scalars
const THIS: &str = "this";

/// Stateless renderer
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, template: &str, context: &RenderContext) -> String {
        render(template, context)
    }
}

pub fn render(template: &str, context: &RenderContext) -> String {
    let text = expand_loops(template, context);
    let text = apply_conditionals(&text, context);
    substitute_scalars(&text, context)
}

/// Loop pass. A block over a non-array value renders as nothing.
fn expand_loops(input: &str, context: &RenderContext) -> String {
    let mut out = String::with_capacity(input.len());

    for segment in segments(input, BlockKind::Each) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Block { name, body } => {
                if let Some(Value::Array(elements)) = context.get(name) {
                    for element in elements {
                        out.push_str(&instantiate(body, element));
                    }
                }
            }
        }
    }

    out
}

/// One loop iteration. Object elements bind their own keys in key order;
/// scalar elements bind `{{this}}`. Unbound placeholders stay literal.
fn instantiate(body: &str, element: &Value) -> String {
    match element {
        Value::Null => body.to_string(),
        Value::Object(fields) => fields.iter().fold(body.to_string(), |text, (key, value)| {
            substitute(&text, key, &display_value(value))
        }),
        Value::Array(values) => values
            .iter()
            .enumerate()
            .fold(body.to_string(), |text, (index, value)| {
                substitute(&text, &index.to_string(), &display_value(value))
            }),
        scalar => substitute(body, THIS, &display_value(scalar)),
    }
}

/// Conditional pass. No else branch.
fn apply_conditionals(input: &str, context: &RenderContext) -> String {
    let mut out = String::with_capacity(input.len());

    for segment in segments(input, BlockKind::If) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Block { name, body } => {
                if context.get(name).map_or(false, truthy) {
                    out.push_str(body);
                }
            }
        }
    }

    out
}

/// Scalar pass, one context entry at a time in insertion order
fn substitute_scalars(input: &str, context: &RenderContext) -> String {
    context
        .iter()
        .filter(|(_, value)| is_scalar(value))
        .fold(input.to_string(), |text, (key, value)| {
            substitute(&text, key, &display_value(value))
        })
}
