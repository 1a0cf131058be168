//! # KE-chain customization engine
//!
//! **Validators, representations and widgets for KE-chain properties and activities**
//!
//! This crate builds and checks the JSON documents the KE-chain front end
//! consumes: property validation rules with their effects, display
//! representations, activity widget customizations and scope sidebars. It talks
//! to the platform only through the [`Client`] trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kechain::{Engine, MemoryClient, PropertyGridOptions};
//! use kechain::validators::{NumericRange, ValidationRule};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MemoryClient::from_json(&std::fs::read_to_string("bike.json")?)?;
//!     let engine = Engine::new(client);
//!
//!     // Evaluate a rule locally
//!     let rule = ValidationRule::numeric_range(NumericRange::new(Some(0.0), Some(10.0))?);
//!     assert_eq!(rule.evaluate(&json!(4)).result, Some(true));
//!
//!     // Add a property grid to an activity and push the whole widget list
//!     let mut customization = engine.customization("0c5a6f39-8c38-4d33-a1b0-b2ff7c8f4f5a")?;
//!     customization.add_property_grid_widget(
//!         "a9f2e8c1-55a5-4d16-9c55-0d7a0e0e4f10",
//!         PropertyGridOptions::default(),
//!     )?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Validation rules
//! A rule checks a candidate property value and answers pass, fail or "not
//! applicable" with a reason. Rules carry effects for both outcomes.
//!
//! ### Representations
//! Display directives such as decimal places or link targets. Every kind checks
//! its value before accepting it.
//!
//! ### Widgets
//! Panels configured on an activity. Each widget is a paired `config` and
//! `meta` document; the full list is replaced on every change.
//!
//! ### Sidebars
//! Custom navigation buttons of a scope, managed by one manager per scope.

pub mod client;
pub mod engine;
pub mod error;
pub mod identifiers;
pub mod models;
pub mod options;
pub mod representations;
pub mod schemas;
pub mod sidebar;
pub mod validators;
pub mod widgets;

pub use client::{ApiResponse, Client, Lookup, MemoryClient, Push};
pub use engine::Engine;
pub use error::KeChainError;
pub use identifiers::{is_uuid, ObjectId, ObjectRef, UUID_PATTERN};
pub use models::{Activity, Category, Part, Property, PropertyType, Scope, ScriptType, Service};
pub use options::{PropertyEditor, PropertyOptions};
pub use representations::{
    FontAwesomeMode, Representation, RepresentationKind, RepresentationTarget,
};
pub use schemas::{SchemaKind, SchemaRegistry};
pub use sidebar::{
    ButtonKey, KeChainPage, SideBarButton, SideBarHandle, SideBarManager, SubprocessDisplayMode,
    UriTarget,
};
pub use validators::{Effect, EffectKind, Evaluation, NumericRange, Rule, RuleKind, ValidationRule};
pub use widgets::{
    Alignment, AttachmentViewerOptions, CustomTitle, ExtCustomization, FilteredGridOptions,
    GridOptions, MultiColumnOptions, PropertyGridOptions, ScriptOptions, SortDirection,
    TextOptions, Widget, WidgetName,
};

/// Result type for KE-chain engine operations
pub type KeChainResult<T> = Result<T, KeChainError>;

#[cfg(test)]
mod tests;
