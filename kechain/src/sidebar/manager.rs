use super::{KeChainPage, SideBarButton, SubprocessDisplayMode, UriTarget};
use crate::client::{ensure_success, Client};
use crate::identifiers::{ObjectId, ObjectRef};
use crate::models::{Activity, Scope};
use crate::{KeChainError, KeChainResult};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::OnceLock;
use tracing::debug;

const CUSTOM_NAVIGATION: &str = "customNavigation";
const OVERRIDE_SIDEBAR: &str = "overrideSideBar";

/// Icon used for task buttons when none is given
pub const DEFAULT_TASK_ICON: &str = "tasks";

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("URL pattern is a valid regex")
    })
}

/// Selects a sidebar button by position or by display name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKey<'a> {
    Index(usize),
    Name(&'a str),
}

impl From<usize> for ButtonKey<'_> {
    fn from(index: usize) -> Self {
        ButtonKey::Index(index)
    }
}

impl<'a> From<&'a str> for ButtonKey<'a> {
    fn from(name: &'a str) -> Self {
        ButtonKey::Name(name)
    }
}

impl fmt::Display for ButtonKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonKey::Index(index) => write!(f, "{}", index),
            ButtonKey::Name(name) => f.write_str(name),
        }
    }
}

/// Sidebar state of one scope: its options document and the custom buttons.
///
/// Obtained through [`crate::Engine::side_bar`], which keeps at most one
/// manager per scope so two managers never replace each other's list.
#[derive(Debug, Clone)]
pub struct SideBarManager {
    scope_id: ObjectId,
    options: Map<String, Value>,
    buttons: Vec<SideBarButton>,
    override_sidebar: bool,
    deferred: usize,
}

impl SideBarManager {
    /// Read the custom buttons out of the scope options
    pub fn load(scope: &Scope) -> KeChainResult<Self> {
        let buttons = match scope.options.get(CUSTOM_NAVIGATION) {
            Some(Value::Array(items)) => items
                .iter()
                .map(SideBarButton::parse)
                .collect::<KeChainResult<Vec<_>>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(KeChainError::illegal_argument(format!(
                    "`{}` of scope '{}' must be a list",
                    CUSTOM_NAVIGATION, scope.name
                )))
            }
        };
        Ok(Self {
            scope_id: scope.id.clone(),
            options: scope.options.clone(),
            buttons,
            override_sidebar: scope
                .options
                .get(OVERRIDE_SIDEBAR)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            deferred: 0,
        })
    }

    pub fn scope_id(&self) -> &ObjectId {
        &self.scope_id
    }

    pub fn buttons(&self) -> &[SideBarButton] {
        &self.buttons
    }

    pub fn override_sidebar(&self) -> bool {
        self.override_sidebar
    }

    pub fn position(&self, key: ButtonKey<'_>) -> Option<usize> {
        match key {
            ButtonKey::Index(index) => (index < self.buttons.len()).then_some(index),
            ButtonKey::Name(name) => self
                .buttons
                .iter()
                .position(|button| button.display_name == name),
        }
    }

    /// The scope options with the current buttons and override flag merged in
    pub fn document(&self) -> Map<String, Value> {
        let mut options = self.options.clone();
        let navigation: Vec<Value> = self
            .buttons
            .iter()
            .enumerate()
            .map(|(order, button)| {
                let mut button = button.clone();
                button.order = order;
                button.to_json()
            })
            .collect();
        options.insert(CUSTOM_NAVIGATION.to_string(), Value::Array(navigation));
        options.insert(OVERRIDE_SIDEBAR.to_string(), json!(self.override_sidebar));
        options
    }

    fn renumber(&mut self) {
        for (order, button) in self.buttons.iter_mut().enumerate() {
            button.order = order;
        }
    }
}

/// Mutating view on a [`SideBarManager`]. Every change replaces the complete
/// `customNavigation` list remotely, unless it runs inside [`SideBarHandle::bulk`].
pub struct SideBarHandle<'e, C: Client> {
    client: &'e C,
    manager: Rc<RefCell<SideBarManager>>,
}

impl<C: Client> fmt::Debug for SideBarHandle<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SideBarHandle")
            .field("manager", &self.manager.borrow())
            .finish()
    }
}

impl<'e, C: Client> SideBarHandle<'e, C> {
    pub(crate) fn new(client: &'e C, manager: Rc<RefCell<SideBarManager>>) -> Self {
        Self { client, manager }
    }

    /// True when both handles drive the same manager
    pub fn same_manager(&self, other: &SideBarHandle<'_, C>) -> bool {
        Rc::ptr_eq(&self.manager, &other.manager)
    }

    pub fn scope_id(&self) -> ObjectId {
        self.manager.borrow().scope_id.clone()
    }

    pub fn buttons(&self) -> Vec<SideBarButton> {
        self.manager.borrow().buttons.clone()
    }

    pub fn len(&self) -> usize {
        self.manager.borrow().buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn override_sidebar(&self) -> bool {
        self.manager.borrow().override_sidebar
    }

    /// Look up a button by index or display name
    pub fn button<'k>(&self, key: impl Into<ButtonKey<'k>>) -> KeChainResult<SideBarButton> {
        let key = key.into();
        let manager = self.manager.borrow();
        manager
            .position(key)
            .map(|index| manager.buttons[index].clone())
            .ok_or_else(|| not_found(key))
    }

    fn update(&self) -> KeChainResult<()> {
        let (scope_id, document) = {
            let mut manager = self.manager.borrow_mut();
            if manager.deferred > 0 {
                return Ok(());
            }
            manager.renumber();
            let document = manager.document();
            manager.options = document.clone();
            (manager.scope_id.clone(), document)
        };
        debug!(scope = %scope_id, "pushing side-bar buttons");
        let response = self.client.update_scope_options(&scope_id, &document)?;
        ensure_success(response, "Could not update the side-bar of the scope")
    }

    /// Insert `button` at `order` (default: last) and push
    pub fn create_button(
        &self,
        button: SideBarButton,
        order: Option<usize>,
    ) -> KeChainResult<SideBarButton> {
        let index = {
            let mut manager = self.manager.borrow_mut();
            let len = manager.buttons.len();
            let index = order.unwrap_or(len);
            if index > len {
                return Err(KeChainError::illegal_argument(format!(
                    "`order` {} is out of range, the side-bar has {} buttons",
                    index, len
                )));
            }
            manager.buttons.insert(index, button);
            index
        };
        self.update()?;
        Ok(self.manager.borrow().buttons[index].clone())
    }

    /// Add a button opening an activity; external when the activity lives in another scope
    pub fn add_task_button<'a>(
        &self,
        activity: impl Into<ObjectRef<'a, Activity>>,
        title: Option<&str>,
        icon: Option<&str>,
        display_mode: SubprocessDisplayMode,
    ) -> KeChainResult<SideBarButton> {
        let activity = activity.into().resolve("activity", self.client)?;
        let scope_id = self.scope_id();
        let uri = format!(
            "#/scopes/{}/{}/{}",
            scope_id,
            display_mode.as_str(),
            activity.id
        );
        let uri_target = if activity.scope_id == scope_id {
            UriTarget::Internal
        } else {
            UriTarget::External
        };
        let button = SideBarButton::new(
            title.unwrap_or(activity.name.as_str()),
            icon.unwrap_or(DEFAULT_TASK_ICON),
            uri,
            uri_target,
        )?;
        self.create_button(button, None)
    }

    /// Add a button to one of the built-in pages of the scope
    pub fn add_ke_chain_page(
        &self,
        page: KeChainPage,
        title: Option<&str>,
        icon: Option<&str>,
    ) -> KeChainResult<SideBarButton> {
        let uri = format!("#/scopes/{}/{}", self.scope_id(), page.path());
        let button = SideBarButton::new(
            title.unwrap_or(page.label()),
            icon.unwrap_or(page.icon()),
            uri,
            UriTarget::Internal,
        )?;
        self.create_button(button, None)
    }

    /// Add a button to an external web page
    pub fn add_external_button(
        &self,
        url: &str,
        title: &str,
        icon: &str,
    ) -> KeChainResult<SideBarButton> {
        if !url_regex().is_match(url) {
            return Err(KeChainError::illegal_argument(format!(
                "`url` should be a valid URL, '{}' is not",
                url
            )));
        }
        let button = SideBarButton::new(title, icon, url, UriTarget::External)?;
        self.create_button(button, None)
    }

    /// Append buttons from stored documents and set the override flag, pushing once
    pub fn add_buttons(
        &self,
        buttons: &[Value],
        override_sidebar: bool,
    ) -> KeChainResult<Vec<SideBarButton>> {
        let parsed = buttons
            .iter()
            .map(SideBarButton::parse)
            .collect::<KeChainResult<Vec<_>>>()?;
        {
            let mut manager = self.manager.borrow_mut();
            manager.buttons.extend(parsed);
            manager.override_sidebar = override_sidebar;
        }
        self.update()?;
        Ok(self.buttons())
    }

    /// Place `button` at `index`, moving it if an equal button is already present
    pub fn insert(&self, index: usize, button: SideBarButton) -> KeChainResult<()> {
        {
            let mut manager = self.manager.borrow_mut();
            if let Some(existing) = manager.buttons.iter().position(|candidate| {
                candidate.display_name == button.display_name && candidate.uri == button.uri
            }) {
                manager.buttons.remove(existing);
            }
            let index = index.min(manager.buttons.len());
            manager.buttons.insert(index, button);
        }
        self.update()
    }

    /// Remove a button selected by index or display name
    pub fn delete_button<'k>(&self, key: impl Into<ButtonKey<'k>>) -> KeChainResult<()> {
        let key = key.into();
        {
            let mut manager = self.manager.borrow_mut();
            let index = manager.position(key).ok_or_else(|| not_found(key))?;
            manager.buttons.remove(index);
        }
        self.update()
    }

    /// Hide (`true`) or show the built-in sidebar entries
    pub fn set_override_sidebar(&self, override_sidebar: bool) -> KeChainResult<()> {
        self.manager.borrow_mut().override_sidebar = override_sidebar;
        self.update()
    }

    /// Run `changes` with pushes deferred, then push the final list once.
    ///
    /// The push happens even when `changes` fails; its error is returned first.
    pub fn bulk<T>(
        &self,
        changes: impl FnOnce(&Self) -> KeChainResult<T>,
    ) -> KeChainResult<T> {
        self.manager.borrow_mut().deferred += 1;
        let result = changes(self);
        self.manager.borrow_mut().deferred -= 1;
        let pushed = self.update();
        let value = result?;
        pushed?;
        Ok(value)
    }

    /// Reload the scope options through the client, discarding local changes
    pub fn refresh(&self) -> KeChainResult<()> {
        let scope = self.client.scope(&self.scope_id())?;
        let reloaded = SideBarManager::load(&scope)?;
        let mut manager = self.manager.borrow_mut();
        let deferred = manager.deferred;
        *manager = SideBarManager {
            deferred,
            ..reloaded
        };
        Ok(())
    }
}

fn not_found(key: ButtonKey<'_>) -> KeChainError {
    KeChainError::NotFound(format!(
        "Could not find button with index or name '{}'",
        key
    ))
}
