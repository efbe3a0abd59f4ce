use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// A user-tunable value exposed by a background's project description.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    name: String,
    text: String,
    order: i64,
    value: PropertyValue,
    applied_override: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    Slider {
        value: f64,
        min: f64,
        max: f64,
        step: f64,
    },
    /// Normalized RGB.
    Color([f32; 3]),
    Combo {
        value: String,
        options: Vec<ComboOption>,
    },
    /// Static label; carries no value.
    Text,
    TextInput(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComboOption {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PropertyError {
    InvalidValue { name: String, raw: String, expected: &'static str },
    ReadOnly(String),
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue {
                name,
                raw,
                expected,
            } => write!(
                f,
                "invalid value '{}' for property '{}', expected {}",
                raw, name, expected
            ),
            Self::ReadOnly(name) => {
                write!(f, "property '{}' cannot be overridden", name)
            }
        }
    }
}

impl std::error::Error for PropertyError {}

#[derive(Deserialize)]
struct RawProperty {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    order: i64,
    #[serde(default)]
    value: Value,
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Deserialize)]
struct RawOption {
    #[serde(default)]
    label: String,
    #[serde(default)]
    value: Value,
}

impl Property {
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            order: 0,
            value,
            applied_override: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builds a property from its JSON entry. Returns `None` for kinds the
    /// orchestrator does not expose (file pickers, scene textures, ...).
    pub fn from_json(name: &str, json: &Value) -> Option<Self> {
        let raw: RawProperty = match serde_json::from_value(json.clone()) {
            Ok(raw) => raw,
            Err(err) => {
                log::debug!("skipping malformed property '{}': {}", name, err);
                return None;
            }
        };

        let value = match raw.kind.as_str() {
            "bool" => PropertyValue::Boolean(value_as_bool(&raw.value)),
            "slider" => {
                let min = raw.min.unwrap_or(0.0);
                let max = raw.max.unwrap_or(1.0).max(min);
                let value = value_as_f64(&raw.value).unwrap_or(min);
                PropertyValue::Slider {
                    value: value.clamp(min, max),
                    min,
                    max,
                    step: raw.step.unwrap_or(0.0),
                }
            }
            "color" => PropertyValue::Color(
                value_as_string(&raw.value)
                    .as_deref()
                    .and_then(parse_color)
                    .unwrap_or([0.0; 3]),
            ),
            "combo" => PropertyValue::Combo {
                value: value_as_string(&raw.value).unwrap_or_default(),
                options: raw
                    .options
                    .into_iter()
                    .map(|option| ComboOption {
                        label: option.label,
                        value: value_as_string(&option.value)
                            .unwrap_or_default(),
                    })
                    .collect(),
            },
            "text" => PropertyValue::Text,
            "textinput" => PropertyValue::TextInput(
                value_as_string(&raw.value).unwrap_or_default(),
            ),
            other => {
                log::debug!(
                    "skipping property '{}' of unsupported type '{}'",
                    name,
                    other
                );
                return None;
            }
        };

        Some(Self {
            name: name.to_string(),
            text: raw.text,
            order: raw.order,
            value,
            applied_override: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn applied_override(&self) -> Option<&str> {
        self.applied_override.as_deref()
    }

    /// Replaces the current value with one parsed from `raw`. On error the
    /// property is left untouched. Applying the same `raw` twice leaves the
    /// same state as applying it once.
    pub fn update(&mut self, raw: &str) -> Result<(), PropertyError> {
        let trimmed = raw.trim();
        let invalid = |expected| PropertyError::InvalidValue {
            name: self.name.clone(),
            raw: raw.to_string(),
            expected,
        };

        let next = match &self.value {
            PropertyValue::Boolean(_) => match trimmed {
                "1" | "true" | "yes" | "on" => PropertyValue::Boolean(true),
                "0" | "false" | "no" | "off" => PropertyValue::Boolean(false),
                _ => return Err(invalid("a boolean")),
            },
            PropertyValue::Slider { min, max, step, .. } => {
                let value: f64 =
                    trimmed.parse().map_err(|_| invalid("a number"))?;
                if !value.is_finite() {
                    return Err(invalid("a finite number"));
                }
                PropertyValue::Slider {
                    value: value.clamp(*min, *max),
                    min: *min,
                    max: *max,
                    step: *step,
                }
            }
            PropertyValue::Color(_) => PropertyValue::Color(
                parse_color(trimmed).ok_or_else(|| invalid("'r g b'"))?,
            ),
            PropertyValue::Combo { options, .. } => {
                let selected = options
                    .iter()
                    .find(|option| option.value == trimmed)
                    .or_else(|| {
                        options.iter().find(|option| option.label == trimmed)
                    })
                    .ok_or_else(|| invalid("one of the combo options"))?;
                PropertyValue::Combo {
                    value: selected.value.clone(),
                    options: options.clone(),
                }
            }
            PropertyValue::Text => {
                return Err(PropertyError::ReadOnly(self.name.clone()));
            }
            PropertyValue::TextInput(_) => {
                PropertyValue::TextInput(raw.to_string())
            }
        };

        self.value = next;
        self.applied_override = Some(raw.to_string());
        Ok(())
    }

    /// Human-readable description used by the list-properties mode.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let kind = match &self.value {
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::Slider { .. } => "Slider",
            PropertyValue::Color(_) => "Color",
            PropertyValue::Combo { .. } => "Combo",
            PropertyValue::Text => "Text",
            PropertyValue::TextInput(_) => "Text input",
        };

        out.push_str(&format!("{} property: {}\n", kind, self.name));
        out.push_str(&format!("\tDescription: {}\n", self.text));

        match &self.value {
            PropertyValue::Boolean(value) => {
                out.push_str(&format!("\tValue: {}\n", value));
            }
            PropertyValue::Slider {
                value,
                min,
                max,
                step,
            } => {
                out.push_str(&format!("\tValue: {}\n", value));
                out.push_str(&format!("\tMinimum value: {}\n", min));
                out.push_str(&format!("\tMaximum value: {}\n", max));
                out.push_str(&format!("\tStep: {}\n", step));
            }
            PropertyValue::Color([r, g, b]) => {
                out.push_str(&format!("\tR: {} G: {} B: {}\n", r, g, b));
            }
            PropertyValue::Combo { value, options } => {
                out.push_str(&format!("\tValue: {}\n", value));
                out.push_str("\tPossible values:\n");
                for option in options {
                    out.push_str(&format!(
                        "\t\t{} -> {}\n",
                        option.label, option.value
                    ));
                }
            }
            PropertyValue::Text => {}
            PropertyValue::TextInput(value) => {
                out.push_str(&format!("\tValue: {}\n", value));
            }
        }

        out
    }
}

fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts `"r g b"` or `"r,g,b"`. Components above 1 are treated as
/// 0-255 values.
pub fn parse_color(raw: &str) -> Option<[f32; 3]> {
    let components: Vec<f32> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    let [r, g, b] = components.as_slice() else {
        return None;
    };

    if [r, g, b].iter().any(|c| !c.is_finite() || **c < 0.0) {
        return None;
    }

    let scale = if [r, g, b].iter().any(|c| **c > 1.0) {
        255.0
    } else {
        1.0
    };

    Some([
        (r / scale).min(1.0),
        (g / scale).min(1.0),
        (b / scale).min(1.0),
    ])
}
