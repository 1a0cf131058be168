//! The entry point tying a [`Client`] to the schema registry and the sidebar registry.

use crate::client::Client;
use crate::identifiers::{ObjectId, ObjectRef};
use crate::models::{Activity, Property, Scope};
use crate::options::{PropertyEditor, PropertyOptions};
use crate::representations::Representation;
use crate::schemas::{SchemaKind, SchemaRegistry};
use crate::sidebar::{SideBarHandle, SideBarManager};
use crate::validators::{Effect, ValidationRule};
use crate::widgets::ExtCustomization;
use crate::KeChainResult;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Customization engine bound to one client.
///
/// Compiles the built-in schemas once at construction. Not `Sync`: the engine
/// is meant for one caller at a time.
pub struct Engine<C: Client> {
    client: C,
    schemas: SchemaRegistry,
    side_bars: RefCell<HashMap<ObjectId, Rc<RefCell<SideBarManager>>>>,
}

impl<C: Client> fmt::Debug for Engine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("schemas", &self.schemas)
            .field("side_bars", &self.side_bars.borrow().len())
            .finish()
    }
}

impl<C: Client> Engine<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            schemas: SchemaRegistry::new(),
            side_bars: RefCell::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Check a document against one of the built-in schemas
    pub fn validate_document(&self, kind: SchemaKind, document: &Value) -> KeChainResult<()> {
        self.schemas.validate(kind, document)
    }

    pub fn parse_effect(&self, document: &Value) -> KeChainResult<Effect> {
        Effect::parse(document, &self.schemas)
    }

    pub fn parse_validator(&self, document: &Value) -> KeChainResult<ValidationRule> {
        ValidationRule::parse(document, &self.schemas)
    }

    pub fn parse_validators(&self, document: &Value) -> KeChainResult<Vec<ValidationRule>> {
        ValidationRule::parse_list(document, &self.schemas)
    }

    pub fn parse_representation(&self, document: &Value) -> KeChainResult<Representation> {
        Representation::parse(document, &self.schemas)
    }

    pub fn parse_property_options(&self, document: &Value) -> KeChainResult<PropertyOptions> {
        PropertyOptions::parse(document, &self.schemas)
    }

    /// Widget customization of an activity, loaded from its current document
    pub fn customization<'a>(
        &self,
        activity: impl Into<ObjectRef<'a, Activity>>,
    ) -> KeChainResult<ExtCustomization<'_, C>> {
        let activity = activity
            .into()
            .resolve("activity", &self.client)?
            .into_owned();
        ExtCustomization::new(&self.client, &self.schemas, activity)
    }

    /// Editor for the validators and representations of a property
    pub fn property_editor<'a>(
        &self,
        property: impl Into<ObjectRef<'a, Property>>,
    ) -> KeChainResult<PropertyEditor<'_, C>> {
        let property = property
            .into()
            .resolve("property", &self.client)?
            .into_owned();
        PropertyEditor::new(&self.client, &self.schemas, property)
    }

    /// Sidebar of a scope. Every call for the same scope drives the same manager.
    pub fn side_bar<'a>(
        &self,
        scope: impl Into<ObjectRef<'a, Scope>>,
    ) -> KeChainResult<SideBarHandle<'_, C>> {
        let scope = scope.into();
        let scope_id = scope.resolve_id("scope")?;
        if let Some(manager) = self.side_bars.borrow().get(&scope_id) {
            return Ok(SideBarHandle::new(&self.client, Rc::clone(manager)));
        }

        let scope = scope.resolve("scope", &self.client)?;
        let manager = Rc::new(RefCell::new(SideBarManager::load(&scope)?));
        debug!(scope = %scope_id, "created side-bar manager");
        self.side_bars
            .borrow_mut()
            .insert(scope_id, Rc::clone(&manager));
        Ok(SideBarHandle::new(&self.client, manager))
    }
}
