use crate::identifiers::json_type_name;
use crate::{KeChainError, KeChainResult};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::OnceLock;

/// Tolerance used when checking that a value lies on a step
pub const STEP_TOLERANCE: f64 = 1e-6;

/// Pattern used by regex rules without a configured pattern
pub const DEFAULT_PATTERN: &str = ".+";

/// Pattern an e-mail address must match
pub const EMAIL_PATTERN: &str = r"(^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$)";

/// Outcome of a single check: pass/fail and the reason shown to the user
pub(crate) type Verdict = (bool, String);

/// Render a value the way reasons quote it: strings bare, anything else as JSON
pub(crate) fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn optional_number(config: &Map<String, Value>, key: &str) -> KeChainResult<Option<f64>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(KeChainError::illegal_argument(format!(
            "`{}` must be a number, got type {}",
            key,
            json_type_name(other)
        ))),
    }
}

fn insert_number(config: &mut Map<String, Value>, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        config.insert(key.to_string(), json!(value));
    }
}

/// Bounds and optional step of a numeric range rule.
///
/// `None` bounds are unbounded. The invariants `min <= max`, `step > 0` and
/// "enforcing requires a step" hold for every constructed value.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRange {
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
    enforce_step: bool,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> KeChainResult<Self> {
        Self::with_step(min, max, None, false)
    }

    pub fn with_step(
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        enforce_step: bool,
    ) -> KeChainResult<Self> {
        for (name, bound) in [("minvalue", min), ("maxvalue", max), ("stepsize", step)] {
            if bound.is_some_and(f64::is_nan) {
                return Err(KeChainError::illegal_argument(format!("`{}` must not be NaN", name)));
            }
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(KeChainError::illegal_argument(format!(
                    "`minvalue` ({}) must be less than or equal to `maxvalue` ({})",
                    min, max
                )));
            }
        }
        if let Some(step) = step {
            if step <= 0.0 || step.is_infinite() {
                return Err(KeChainError::illegal_argument(format!(
                    "`stepsize` must be a positive number, got {}",
                    step
                )));
            }
        }
        if enforce_step && step.is_none() {
            return Err(KeChainError::illegal_argument(
                "`enforce_stepsize` requires a `stepsize`",
            ));
        }
        Ok(Self {
            min,
            max,
            step,
            enforce_step,
        })
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn step(&self) -> Option<f64> {
        self.step
    }

    pub fn enforce_step(&self) -> bool {
        self.enforce_step
    }

    fn lower(&self) -> f64 {
        self.min.unwrap_or(f64::NEG_INFINITY)
    }

    fn upper(&self) -> f64 {
        self.max.unwrap_or(f64::INFINITY)
    }

    /// True when `value` is a whole number of steps away from the minimum
    pub fn on_step(&self, value: f64) -> bool {
        match (self.step, self.enforce_step) {
            (Some(step), true) => {
                let steps = match self.min {
                    Some(min) => (value - min) / step,
                    None => value / step,
                };
                (steps - steps.round()).abs() < STEP_TOLERANCE
            }
            _ => true,
        }
    }

    pub(crate) fn check(&self, value: f64) -> Verdict {
        let (lower, upper) = (self.lower(), self.upper());
        let in_range = lower <= value && value <= upper;
        let on_step = self.on_step(value);

        let reason = if !on_step {
            format!(
                "Value '{}' is not along the stepsize of {} from min {}",
                value,
                self.step.unwrap_or_default(),
                self.min.unwrap_or(0.0)
            )
        } else if !in_range {
            format!("Value '{}' should be between {} and {}", value, lower, upper)
        } else {
            format!("Value '{}' is between {} and {}", value, lower, upper)
        };
        (in_range && on_step, reason)
    }

    pub(crate) fn from_config(config: &Map<String, Value>) -> KeChainResult<Self> {
        let enforce = match config.get("enforce_stepsize") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(KeChainError::illegal_argument(format!(
                    "`enforce_stepsize` must be a boolean, got type {}",
                    json_type_name(other)
                )))
            }
        };
        Self::with_step(
            optional_number(config, "minvalue")?,
            optional_number(config, "maxvalue")?,
            optional_number(config, "stepsize")?,
            enforce,
        )
    }

    pub(crate) fn write_config(&self, config: &mut Map<String, Value>) {
        insert_number(config, "minvalue", self.min);
        insert_number(config, "maxvalue", self.max);
        insert_number(config, "stepsize", self.step);
        if self.step.is_some() {
            config.insert("enforce_stepsize".to_string(), json!(self.enforce_step));
        }
    }
}

/// A compiled pattern matched from the start of a string
#[derive(Clone)]
pub struct RegexString {
    pattern: Option<String>,
    regex: Regex,
}

impl RegexString {
    /// Compile `pattern`, or [`DEFAULT_PATTERN`] when `None`
    pub fn new(pattern: Option<&str>) -> KeChainResult<Self> {
        let source = pattern.unwrap_or(DEFAULT_PATTERN);
        let regex = Regex::new(&format!(r"\A(?:{})", source)).map_err(|err| {
            KeChainError::illegal_argument(format!("`pattern` '{}' is not a valid regex: {}", source, err))
        })?;
        Ok(Self {
            pattern: pattern.map(str::to_string),
            regex,
        })
    }

    /// The configured pattern, `None` when the default applies
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn effective_pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(DEFAULT_PATTERN)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub(crate) fn check(&self, value: &Value) -> Verdict {
        match value.as_str() {
            Some(text) if self.is_match(text) => (
                true,
                format!("Value '{}' matches the pattern '{}'", text, self.effective_pattern()),
            ),
            Some(text) => (
                false,
                format!(
                    "Value '{}' does not match the pattern '{}'",
                    text,
                    self.effective_pattern()
                ),
            ),
            None => (
                false,
                format!("Value '{}' is not a text value", quoted(value)),
            ),
        }
    }

    pub(crate) fn from_config(config: &Map<String, Value>) -> KeChainResult<Self> {
        match config.get("pattern") {
            None | Some(Value::Null) => Self::new(None),
            Some(Value::String(pattern)) => Self::new(Some(pattern)),
            Some(other) => Err(KeChainError::illegal_argument(format!(
                "`pattern` must be a string, got type {}",
                json_type_name(other)
            ))),
        }
    }
}

impl fmt::Debug for RegexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexString")
            .field("pattern", &self.effective_pattern())
            .finish()
    }
}

impl PartialEq for RegexString {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

fn email_regex() -> &'static RegexString {
    static EMAIL: OnceLock<RegexString> = OnceLock::new();
    EMAIL.get_or_init(|| {
        RegexString::new(Some(EMAIL_PATTERN)).unwrap_or_else(|err| panic!("e-mail pattern: {}", err))
    })
}

pub(crate) fn check_email(value: &Value) -> Verdict {
    match value.as_str() {
        Some(text) if email_regex().is_match(text) => {
            (true, format!("Value '{}' is a valid email address", text))
        }
        _ => (
            false,
            format!("Value '{}' is not a valid email address", quoted(value)),
        ),
    }
}

/// Maximum size in bytes of an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileSize {
    max_size: Option<f64>,
}

impl FileSize {
    pub fn new(max_size: Option<f64>) -> KeChainResult<Self> {
        if let Some(max) = max_size {
            if max.is_nan() || max < 0.0 {
                return Err(KeChainError::illegal_argument(format!(
                    "`maxSize` must be a non-negative number, got {}",
                    max
                )));
            }
        }
        Ok(Self { max_size })
    }

    pub fn max_size(&self) -> Option<f64> {
        self.max_size
    }

    pub(crate) fn check(&self, value: &Value) -> Verdict {
        let Some(size) = value.as_f64() else {
            return (false, format!("Value '{}' is not a file size", quoted(value)));
        };
        match self.max_size {
            Some(max) if size > max => (
                false,
                format!("File size of {} bytes exceeds the maximum of {} bytes", size, max),
            ),
            Some(max) => (
                true,
                format!("File size of {} bytes is within the maximum of {} bytes", size, max),
            ),
            None => (true, format!("File size of {} bytes has no maximum", size)),
        }
    }

    pub(crate) fn from_config(config: &Map<String, Value>) -> KeChainResult<Self> {
        Self::new(optional_number(config, "maxSize")?)
    }

    pub(crate) fn write_config(&self, config: &mut Map<String, Value>) {
        insert_number(config, "maxSize", self.max_size);
    }
}

pub(crate) fn check_required(value: &Value) -> Verdict {
    match value {
        Value::Null => (false, "Value is required".to_string()),
        Value::String(s) if s.is_empty() => (false, "Value is required".to_string()),
        other => (true, format!("Value '{}' is present", quoted(other))),
    }
}

pub(crate) fn check_boolean(value: &Value) -> Verdict {
    match value {
        Value::Bool(b) => (true, format!("Value '{}' is a boolean", b)),
        other => (false, format!("Value '{}' is not a boolean", quoted(other))),
    }
}

/// Parity check after truncating to an integer
pub(crate) fn check_parity(value: &Value, even: bool) -> Verdict {
    let parity = if even { "even" } else { "odd" };
    let Some(number) = value.as_f64().filter(|n| n.is_finite()) else {
        return (false, format!("Value '{}' is not a number", quoted(value)));
    };
    let truncated = number.trunc();
    let is_even = truncated % 2.0 == 0.0;
    if is_even == even {
        (true, format!("Value '{}' is {}", value, parity))
    } else {
        (false, format!("Value '{}' is not {}", value, parity))
    }
}

pub(crate) fn check_single_reference(value: &Value) -> Verdict {
    match value {
        Value::Array(items) if items.len() <= 1 => {
            (true, "Value holds at most one reference".to_string())
        }
        Value::Array(items) => (
            false,
            format!("Value holds {} references, at most one is allowed", items.len()),
        ),
        other => (
            false,
            format!("Value '{}' is not a list of references", quoted(other)),
        ),
    }
}
