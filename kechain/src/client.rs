//! The seam to the remote platform.
//!
//! The engine never speaks HTTP itself. It asks a [`Client`] to resolve
//! identifiers and to replace whole configuration documents, and inspects the
//! returned [`ApiResponse`] status.

use crate::identifiers::ObjectId;
use crate::models::{Activity, Part, Property, Scope, Service};
use crate::{KeChainError, KeChainResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Status and body of a push answered by the remote platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    #[serde(default)]
    pub body: String,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: String::new(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.is_empty() {
            write!(f, "status {}", self.status)
        } else {
            write!(f, "status {}: {}", self.status, self.body)
        }
    }
}

/// Turn a refused push into an [`KeChainError::Api`] carrying the response
pub(crate) fn ensure_success(response: ApiResponse, message: &str) -> KeChainResult<()> {
    if response.is_success() {
        Ok(())
    } else {
        warn!(status = response.status, "{}", message);
        Err(KeChainError::api(message, response))
    }
}

/// Remote collaborator used to resolve identifiers and persist configuration.
///
/// Lookups return [`KeChainError::NotFound`] for unknown identifiers. Updates
/// replace the complete document; a transport failure is an `Err`, a refusal
/// by the platform is an `Ok` response with a non-success status.
pub trait Client {
    fn part(&self, id: &ObjectId) -> KeChainResult<Part>;

    fn property(&self, id: &ObjectId) -> KeChainResult<Property>;

    fn activity(&self, id: &ObjectId) -> KeChainResult<Activity>;

    fn service(&self, id: &ObjectId) -> KeChainResult<Service>;

    fn scope(&self, id: &ObjectId) -> KeChainResult<Scope>;

    /// Replace the customization of an activity; `None` clears it
    fn update_activity_customization(
        &self,
        activity_id: &ObjectId,
        customization: Option<&Value>,
    ) -> KeChainResult<ApiResponse>;

    /// Replace the options document of a scope
    fn update_scope_options(
        &self,
        scope_id: &ObjectId,
        options: &Map<String, Value>,
    ) -> KeChainResult<ApiResponse>;

    /// Replace the options document of a property
    fn update_property_options(
        &self,
        property_id: &ObjectId,
        options: &Map<String, Value>,
    ) -> KeChainResult<ApiResponse>;
}

macro_rules! forward_client {
    ($($wrapper:ty),*) => {
        $(
            impl<C: Client + ?Sized> Client for $wrapper {
                fn part(&self, id: &ObjectId) -> KeChainResult<Part> {
                    (**self).part(id)
                }

                fn property(&self, id: &ObjectId) -> KeChainResult<Property> {
                    (**self).property(id)
                }

                fn activity(&self, id: &ObjectId) -> KeChainResult<Activity> {
                    (**self).activity(id)
                }

                fn service(&self, id: &ObjectId) -> KeChainResult<Service> {
                    (**self).service(id)
                }

                fn scope(&self, id: &ObjectId) -> KeChainResult<Scope> {
                    (**self).scope(id)
                }

                fn update_activity_customization(
                    &self,
                    activity_id: &ObjectId,
                    customization: Option<&Value>,
                ) -> KeChainResult<ApiResponse> {
                    (**self).update_activity_customization(activity_id, customization)
                }

                fn update_scope_options(
                    &self,
                    scope_id: &ObjectId,
                    options: &Map<String, Value>,
                ) -> KeChainResult<ApiResponse> {
                    (**self).update_scope_options(scope_id, options)
                }

                fn update_property_options(
                    &self,
                    property_id: &ObjectId,
                    options: &Map<String, Value>,
                ) -> KeChainResult<ApiResponse> {
                    (**self).update_property_options(property_id, options)
                }
            }
        )*
    };
}

forward_client!(&C, Box<C>, Arc<C>);

/// Remote objects that can be fetched by identifier
pub trait Lookup: Sized + Clone {
    fn lookup<C: Client + ?Sized>(client: &C, id: &ObjectId) -> KeChainResult<Self>;
}

impl Lookup for Part {
    fn lookup<C: Client + ?Sized>(client: &C, id: &ObjectId) -> KeChainResult<Self> {
        client.part(id)
    }
}

impl Lookup for Property {
    fn lookup<C: Client + ?Sized>(client: &C, id: &ObjectId) -> KeChainResult<Self> {
        client.property(id)
    }
}

impl Lookup for Activity {
    fn lookup<C: Client + ?Sized>(client: &C, id: &ObjectId) -> KeChainResult<Self> {
        client.activity(id)
    }
}

impl Lookup for Service {
    fn lookup<C: Client + ?Sized>(client: &C, id: &ObjectId) -> KeChainResult<Self> {
        client.service(id)
    }
}

impl Lookup for Scope {
    fn lookup<C: Client + ?Sized>(client: &C, id: &ObjectId) -> KeChainResult<Self> {
        client.scope(id)
    }
}

/// A document pushed to a [`MemoryClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum Push {
    Customization {
        activity_id: ObjectId,
        customization: Option<Value>,
    },
    ScopeOptions {
        scope_id: ObjectId,
        options: Map<String, Value>,
    },
    PropertyOptions {
        property_id: ObjectId,
        options: Map<String, Value>,
    },
}

/// Objects to preload into a [`MemoryClient`]
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
}

/// In-process [`Client`] holding its objects in memory.
///
/// Every push is recorded, and successful pushes are applied to the stored
/// objects. [`MemoryClient::fail_next_push`] makes the next push answer with
/// the given status instead.
#[derive(Debug, Default)]
pub struct MemoryClient {
    parts: RefCell<HashMap<ObjectId, Part>>,
    properties: RefCell<HashMap<ObjectId, Property>>,
    activities: RefCell<HashMap<ObjectId, Activity>>,
    services: RefCell<HashMap<ObjectId, Service>>,
    scopes: RefCell<HashMap<ObjectId, Scope>>,
    pushes: RefCell<Vec<Push>>,
    fail_next: Cell<Option<u16>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client from a fixture document
    pub fn from_fixture(fixture: Fixture) -> Self {
        let client = Self::new();
        for part in fixture.parts {
            client.insert_part(part);
        }
        for property in fixture.properties {
            client.insert_property(property);
        }
        for activity in fixture.activities {
            client.insert_activity(activity);
        }
        for service in fixture.services {
            client.insert_service(service);
        }
        for scope in fixture.scopes {
            client.insert_scope(scope);
        }
        client
    }

    /// Parse a fixture from JSON text
    pub fn from_json(json: &str) -> KeChainResult<Self> {
        let fixture: Fixture = serde_json::from_str(json)?;
        Ok(Self::from_fixture(fixture))
    }

    pub fn insert_part(&self, part: Part) {
        self.parts.borrow_mut().insert(part.id.clone(), part);
    }

    pub fn insert_property(&self, property: Property) {
        self.properties
            .borrow_mut()
            .insert(property.id.clone(), property);
    }

    pub fn insert_activity(&self, activity: Activity) {
        self.activities
            .borrow_mut()
            .insert(activity.id.clone(), activity);
    }

    pub fn insert_service(&self, service: Service) {
        self.services.borrow_mut().insert(service.id.clone(), service);
    }

    pub fn insert_scope(&self, scope: Scope) {
        self.scopes.borrow_mut().insert(scope.id.clone(), scope);
    }

    /// Answer the next push with `status` without applying it
    pub fn fail_next_push(&self, status: u16) {
        self.fail_next.set(Some(status));
    }

    /// All pushes received so far, oldest first
    pub fn pushes(&self) -> Vec<Push> {
        self.pushes.borrow().clone()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.borrow().len()
    }

    fn record(&self, push: Push) -> Option<ApiResponse> {
        self.pushes.borrow_mut().push(push);
        self.fail_next
            .take()
            .map(|status| ApiResponse::with_status(status, "push refused"))
    }
}

fn not_found(kind: &str, id: &ObjectId) -> KeChainError {
    KeChainError::NotFound(format!("{} with id '{}' does not exist", kind, id))
}

impl Client for MemoryClient {
    fn part(&self, id: &ObjectId) -> KeChainResult<Part> {
        self.parts
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Part", id))
    }

    fn property(&self, id: &ObjectId) -> KeChainResult<Property> {
        self.properties
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Property", id))
    }

    fn activity(&self, id: &ObjectId) -> KeChainResult<Activity> {
        self.activities
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Activity", id))
    }

    fn service(&self, id: &ObjectId) -> KeChainResult<Service> {
        self.services
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Service", id))
    }

    fn scope(&self, id: &ObjectId) -> KeChainResult<Scope> {
        self.scopes
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("Scope", id))
    }

    fn update_activity_customization(
        &self,
        activity_id: &ObjectId,
        customization: Option<&Value>,
    ) -> KeChainResult<ApiResponse> {
        if !self.activities.borrow().contains_key(activity_id) {
            return Err(not_found("Activity", activity_id));
        }
        let refused = self.record(Push::Customization {
            activity_id: activity_id.clone(),
            customization: customization.cloned(),
        });
        if let Some(response) = refused {
            return Ok(response);
        }
        if let Some(activity) = self.activities.borrow_mut().get_mut(activity_id) {
            activity.customization = customization.cloned();
        }
        Ok(ApiResponse::ok())
    }

    fn update_scope_options(
        &self,
        scope_id: &ObjectId,
        options: &Map<String, Value>,
    ) -> KeChainResult<ApiResponse> {
        if !self.scopes.borrow().contains_key(scope_id) {
            return Err(not_found("Scope", scope_id));
        }
        let refused = self.record(Push::ScopeOptions {
            scope_id: scope_id.clone(),
            options: options.clone(),
        });
        if let Some(response) = refused {
            return Ok(response);
        }
        if let Some(scope) = self.scopes.borrow_mut().get_mut(scope_id) {
            scope.options = options.clone();
        }
        Ok(ApiResponse::ok())
    }

    fn update_property_options(
        &self,
        property_id: &ObjectId,
        options: &Map<String, Value>,
    ) -> KeChainResult<ApiResponse> {
        if !self.properties.borrow().contains_key(property_id) {
            return Err(not_found("Property", property_id));
        }
        let refused = self.record(Push::PropertyOptions {
            property_id: property_id.clone(),
            options: options.clone(),
        });
        if let Some(response) = refused {
            return Ok(response);
        }
        if let Some(property) = self.properties.borrow_mut().get_mut(property_id) {
            property.options = options.clone();
        }
        Ok(ApiResponse::ok())
    }
}
