//! Display representations of property values and objects.
//!
//! A [`Representation`] is serialized as `{rtype, config}` where `config`
//! carries one value key that depends on the kind. Values are checked before
//! they are stored: a rejected value leaves the representation untouched.

use crate::identifiers::json_type_name;
use crate::models::PropertyType;
use crate::schemas::{SchemaKind, SchemaRegistry};
use crate::{KeChainError, KeChainResult};
use serde_json::{json, Map, Value};
use std::fmt;

const DISPLAY_ICON_MODE: &str = "displayIconMode";

/// Tags of the supported representation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    DecimalPlaces,
    SignificantDigits,
    ThousandsSeparator,
    LinkTarget,
    ButtonRepresentation,
    CustomIcon,
    Autofill,
    GeoCoordinate,
    UsePropertyName,
    CameraScannerInput,
}

impl RepresentationKind {
    pub const ALL: [RepresentationKind; 10] = [
        RepresentationKind::DecimalPlaces,
        RepresentationKind::SignificantDigits,
        RepresentationKind::ThousandsSeparator,
        RepresentationKind::LinkTarget,
        RepresentationKind::ButtonRepresentation,
        RepresentationKind::CustomIcon,
        RepresentationKind::Autofill,
        RepresentationKind::GeoCoordinate,
        RepresentationKind::UsePropertyName,
        RepresentationKind::CameraScannerInput,
    ];

    /// The `rtype` tag on the wire
    pub fn tag(&self) -> &'static str {
        match self {
            RepresentationKind::DecimalPlaces => "decimalPlaces",
            RepresentationKind::SignificantDigits => "significantDigits",
            RepresentationKind::ThousandsSeparator => "thousandsSeparator",
            RepresentationKind::LinkTarget => "linkTarget",
            RepresentationKind::ButtonRepresentation => "buttonRepresentation",
            RepresentationKind::CustomIcon => "customIcon",
            RepresentationKind::Autofill => "autofill",
            RepresentationKind::GeoCoordinate => "geoCoordinate",
            RepresentationKind::UsePropertyName => "usePropertyName",
            RepresentationKind::CameraScannerInput => "cameraScannerInput",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Config key holding the value; `None` for the thousands separator which carries no data
    pub fn value_key(&self) -> Option<&'static str> {
        match self {
            RepresentationKind::DecimalPlaces | RepresentationKind::SignificantDigits => {
                Some("amount")
            }
            RepresentationKind::ThousandsSeparator => None,
            RepresentationKind::LinkTarget => Some("target"),
            RepresentationKind::ButtonRepresentation => Some("buttonRepresentation"),
            RepresentationKind::CustomIcon => Some("displayIcon"),
            RepresentationKind::Autofill => Some("autofill"),
            RepresentationKind::GeoCoordinate => Some("geoCoordinate"),
            RepresentationKind::UsePropertyName => Some("usePropertyName"),
            RepresentationKind::CameraScannerInput => Some("camera_scanner"),
        }
    }

    /// Whether this kind may decorate `target`
    pub fn applies_to(&self, target: RepresentationTarget) -> bool {
        use PropertyType::*;
        match (self, target) {
            (RepresentationKind::CustomIcon, target) => matches!(
                target,
                RepresentationTarget::Activity | RepresentationTarget::Scope
            ),
            (_, RepresentationTarget::Property(property_type)) => match self {
                RepresentationKind::DecimalPlaces | RepresentationKind::SignificantDigits => {
                    property_type == FloatValue
                }
                RepresentationKind::ThousandsSeparator => {
                    matches!(property_type, IntValue | FloatValue)
                }
                RepresentationKind::LinkTarget => property_type == LinkValue,
                RepresentationKind::ButtonRepresentation => {
                    matches!(property_type, SingleSelectValue | MultiSelectValue)
                }
                RepresentationKind::Autofill => matches!(
                    property_type,
                    DatetimeValue | DateValue | TimeValue | UserReferencesValue
                ),
                RepresentationKind::GeoCoordinate => property_type == GeojsonValue,
                RepresentationKind::UsePropertyName => property_type.is_reference(),
                RepresentationKind::CameraScannerInput => {
                    matches!(property_type, TextValue | CharValue)
                }
                RepresentationKind::CustomIcon => false,
            },
            _ => false,
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What a representation is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationTarget {
    Property(PropertyType),
    Activity,
    Scope,
}

impl fmt::Display for RepresentationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepresentationTarget::Property(property_type) => {
                write!(f, "a {} property", property_type.as_str())
            }
            RepresentationTarget::Activity => f.write_str("an activity"),
            RepresentationTarget::Scope => f.write_str("a scope"),
        }
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.as_str() == value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// Where a link opens
    LinkTarget {
        SameTab => "_self",
        NewTab => "_blank",
    }
);

string_enum!(
    /// How a select list is rendered
    SelectListRepresentation {
        Dropdown => "dropdown",
        Checkboxes => "checkboxes",
        Buttons => "buttons",
    }
);

string_enum!(
    /// Display format of geographic coordinates
    GeoCoordinateFormat {
        RdAmersfoort => "rd_amersfoort",
        DecimalDegrees => "dd",
        DegreesMinutesSeconds => "dms",
        ApproximateAddress => "approx_address",
    }
);

string_enum!(
    /// FontAwesome icon style
    FontAwesomeMode {
        Regular => "regular",
        Solid => "solid",
        Light => "light",
    }
);

impl Default for FontAwesomeMode {
    fn default() -> Self {
        FontAwesomeMode::Regular
    }
}

fn enum_value<E>(kind: RepresentationKind, value: &Value, parse: fn(&str) -> Option<E>, all: &[E]) -> KeChainResult<()>
where
    E: fmt::Display,
{
    match value.as_str().and_then(parse) {
        Some(_) => Ok(()),
        None => {
            let options: Vec<String> = all.iter().map(|option| format!("'{}'", option)).collect();
            Err(KeChainError::illegal_argument(format!(
                "{} value must be one of {}, got {}",
                kind,
                options.join(", "),
                value
            )))
        }
    }
}

/// A display directive with its kind-checked value
#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    kind: RepresentationKind,
    config: Map<String, Value>,
}

impl Representation {
    /// Create a representation, checking `value` against the kind
    pub fn new(kind: RepresentationKind, value: Value) -> KeChainResult<Self> {
        let mut representation = Self {
            kind,
            config: Map::new(),
        };
        representation.set_value(value)?;
        if kind == RepresentationKind::CustomIcon {
            representation.set_display_mode(FontAwesomeMode::default());
        }
        Ok(representation)
    }

    pub fn decimal_places(amount: u32) -> Self {
        Self::with_value(RepresentationKind::DecimalPlaces, json!(amount))
    }

    pub fn significant_digits(amount: u32) -> Self {
        Self::with_value(RepresentationKind::SignificantDigits, json!(amount))
    }

    pub fn thousands_separator() -> Self {
        Self {
            kind: RepresentationKind::ThousandsSeparator,
            config: Map::new(),
        }
    }

    pub fn link_target(target: LinkTarget) -> Self {
        Self::with_value(RepresentationKind::LinkTarget, json!(target.as_str()))
    }

    pub fn button_representation(style: SelectListRepresentation) -> Self {
        Self::with_value(
            RepresentationKind::ButtonRepresentation,
            json!(style.as_str()),
        )
    }

    pub fn custom_icon(icon: impl Into<String>, mode: FontAwesomeMode) -> Self {
        let mut representation = Self::with_value(RepresentationKind::CustomIcon, json!(icon.into()));
        representation.set_display_mode(mode);
        representation
    }

    pub fn autofill(enabled: bool) -> Self {
        Self::with_value(RepresentationKind::Autofill, json!(enabled))
    }

    pub fn geo_coordinate(format: GeoCoordinateFormat) -> Self {
        Self::with_value(RepresentationKind::GeoCoordinate, json!(format.as_str()))
    }

    pub fn use_property_name(enabled: bool) -> Self {
        Self::with_value(RepresentationKind::UsePropertyName, json!(enabled))
    }

    pub fn camera_scanner_input(enabled: bool) -> Self {
        Self::with_value(RepresentationKind::CameraScannerInput, json!(enabled))
    }

    // Only for values the typed constructors already guarantee
    fn with_value(kind: RepresentationKind, value: Value) -> Self {
        let mut config = Map::new();
        if let Some(key) = kind.value_key() {
            config.insert(key.to_string(), value);
        }
        Self { kind, config }
    }

    pub fn kind(&self) -> RepresentationKind {
        self.kind
    }

    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Current value, `None` when unset or for the thousands separator
    pub fn value(&self) -> Option<&Value> {
        self.kind
            .value_key()
            .and_then(|key| self.config.get(key))
            .filter(|value| !value.is_null())
    }

    /// Check `value` against the kind without storing it
    pub fn check_value(kind: RepresentationKind, value: &Value) -> KeChainResult<()> {
        let type_error = |expected: &str| {
            Err(KeChainError::illegal_argument(format!(
                "{} value must be {}, got type {}",
                kind,
                expected,
                json_type_name(value)
            )))
        };
        match kind {
            RepresentationKind::DecimalPlaces | RepresentationKind::SignificantDigits => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    type_error("an integer")
                }
            }
            RepresentationKind::ThousandsSeparator => {
                if value.is_null() {
                    Ok(())
                } else {
                    type_error("null")
                }
            }
            RepresentationKind::LinkTarget => {
                enum_value(kind, value, LinkTarget::parse, LinkTarget::ALL)
            }
            RepresentationKind::ButtonRepresentation => enum_value(
                kind,
                value,
                SelectListRepresentation::parse,
                SelectListRepresentation::ALL,
            ),
            RepresentationKind::GeoCoordinate => enum_value(
                kind,
                value,
                GeoCoordinateFormat::parse,
                GeoCoordinateFormat::ALL,
            ),
            RepresentationKind::CustomIcon => {
                if value.is_string() {
                    Ok(())
                } else {
                    type_error("a string")
                }
            }
            RepresentationKind::Autofill
            | RepresentationKind::UsePropertyName
            | RepresentationKind::CameraScannerInput => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    type_error("a boolean")
                }
            }
        }
    }

    /// Replace the value after checking it; a rejected value changes nothing
    pub fn set_value(&mut self, value: Value) -> KeChainResult<()> {
        Self::check_value(self.kind, &value)?;
        if let Some(key) = self.kind.value_key() {
            self.config.insert(key.to_string(), value);
        }
        Ok(())
    }

    /// Icon style of a custom icon, keeping the other config keys
    pub fn display_mode(&self) -> Option<FontAwesomeMode> {
        match self.kind {
            RepresentationKind::CustomIcon => Some(
                self.config
                    .get(DISPLAY_ICON_MODE)
                    .and_then(Value::as_str)
                    .and_then(FontAwesomeMode::parse)
                    .unwrap_or_default(),
            ),
            _ => None,
        }
    }

    /// Merge a new icon style into a custom icon; other kinds are left alone
    pub fn set_display_mode(&mut self, mode: FontAwesomeMode) {
        if self.kind == RepresentationKind::CustomIcon {
            self.config
                .insert(DISPLAY_ICON_MODE.to_string(), json!(mode.as_str()));
        }
    }

    /// Fail unless this kind may decorate `target`
    pub fn check_applicable(&self, target: RepresentationTarget) -> KeChainResult<()> {
        if self.kind.applies_to(target) {
            Ok(())
        } else {
            Err(KeChainError::illegal_argument(format!(
                "representation '{}' can not be applied to {}",
                self.kind, target
            )))
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "rtype": self.kind.tag(),
            "config": Value::Object(self.config.clone()),
        })
    }

    /// Parse a serialized `{rtype, config}` document.
    ///
    /// An unknown `rtype` is a [`KeChainError::UnknownType`], distinct from the
    /// [`KeChainError::IllegalArgument`] raised for a bad value.
    pub fn parse(document: &Value, schemas: &SchemaRegistry) -> KeChainResult<Self> {
        let object = document.as_object().ok_or_else(|| {
            KeChainError::illegal_argument(format!(
                "a representation must be a JSON object, got type {}",
                json_type_name(document)
            ))
        })?;
        let tag = object.get("rtype").and_then(Value::as_str).ok_or_else(|| {
            KeChainError::Value("representation document has no `rtype`".to_string())
        })?;
        let kind = RepresentationKind::from_tag(tag).ok_or_else(|| {
            KeChainError::UnknownType(format!("unknown representation type '{}'", tag))
        })?;
        schemas.validate(SchemaKind::Representation, document)?;

        let mut config = object
            .get("config")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        if let Some(value) = kind.value_key().and_then(|key| config.get(key)) {
            if !value.is_null() {
                Self::check_value(kind, value)?;
            }
        }
        if kind == RepresentationKind::CustomIcon {
            match config.get(DISPLAY_ICON_MODE) {
                Some(mode) => {
                    enum_value(kind, mode, FontAwesomeMode::parse, FontAwesomeMode::ALL)?;
                }
                None => {
                    config.insert(
                        DISPLAY_ICON_MODE.to_string(),
                        json!(FontAwesomeMode::default().as_str()),
                    );
                }
            }
        }
        Ok(Self { kind, config })
    }

    pub fn parse_list(document: &Value, schemas: &SchemaRegistry) -> KeChainResult<Vec<Self>> {
        match document {
            Value::Array(items) => items.iter().map(|item| Self::parse(item, schemas)).collect(),
            other => Err(KeChainError::illegal_argument(format!(
                "representations must be a list, got type {}",
                json_type_name(other)
            ))),
        }
    }
}
