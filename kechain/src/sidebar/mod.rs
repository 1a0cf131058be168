//! Custom navigation buttons in the sidebar of a scope.
//!
//! The buttons live in the scope options under `customNavigation`, next to the
//! `overrideSideBar` flag that hides the built-in sidebar entries.

mod button;
mod manager;

pub use button::{SideBarButton, TRANSLATION_KEYS};
pub use manager::{ButtonKey, SideBarHandle, SideBarManager};

use std::fmt;

/// Whether a sidebar link stays inside KE-chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UriTarget {
    #[default]
    Internal,
    External,
}

impl UriTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            UriTarget::Internal => "internal",
            UriTarget::External => "external",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "internal" => Some(UriTarget::Internal),
            "external" => Some(UriTarget::External),
            _ => None,
        }
    }
}

impl fmt::Display for UriTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a subprocess opens when its sidebar button is clicked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubprocessDisplayMode {
    #[default]
    Activities,
    TreeView,
}

impl SubprocessDisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubprocessDisplayMode::Activities => "activities",
            SubprocessDisplayMode::TreeView => "treeview",
        }
    }
}

/// Built-in pages of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeChainPage {
    Detail,
    Forms,
    Tasks,
    WorkBreakdown,
    CatalogForms,
    Contexts,
    Workflows,
    DataModel,
    Explorer,
    Services,
}

impl KeChainPage {
    pub const ALL: [KeChainPage; 10] = [
        KeChainPage::Detail,
        KeChainPage::Forms,
        KeChainPage::Tasks,
        KeChainPage::WorkBreakdown,
        KeChainPage::CatalogForms,
        KeChainPage::Contexts,
        KeChainPage::Workflows,
        KeChainPage::DataModel,
        KeChainPage::Explorer,
        KeChainPage::Services,
    ];

    /// Path segment of the page under `#/scopes/{scope}/`
    pub fn path(&self) -> &'static str {
        match self {
            KeChainPage::Detail => "detail",
            KeChainPage::Forms => "forms",
            KeChainPage::Tasks => "activities",
            KeChainPage::WorkBreakdown => "activitytree",
            KeChainPage::CatalogForms => "catalogforms",
            KeChainPage::Contexts => "contexts",
            KeChainPage::Workflows => "workflows",
            KeChainPage::DataModel => "productmodel",
            KeChainPage::Explorer => "explorer",
            KeChainPage::Services => "scripts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KeChainPage::Detail => "Project details",
            KeChainPage::Forms => "Forms",
            KeChainPage::Tasks => "Tasks",
            KeChainPage::WorkBreakdown => "Work Breakdown",
            KeChainPage::CatalogForms => "Catalog forms",
            KeChainPage::Contexts => "Contexts",
            KeChainPage::Workflows => "Workflows",
            KeChainPage::DataModel => "Data model",
            KeChainPage::Explorer => "Explorer",
            KeChainPage::Services => "Scripts",
        }
    }

    /// FontAwesome icon shown by default
    pub fn icon(&self) -> &'static str {
        match self {
            KeChainPage::Detail => "bookmark",
            KeChainPage::Forms => "file-contract",
            KeChainPage::Tasks => "edit",
            KeChainPage::WorkBreakdown => "sitemap",
            KeChainPage::CatalogForms => "file-invoice",
            KeChainPage::Contexts => "tags",
            KeChainPage::Workflows => "project-diagram",
            KeChainPage::DataModel => "cube",
            KeChainPage::Explorer => "folder",
            KeChainPage::Services => "file-code",
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.path() == path)
    }
}

impl fmt::Display for KeChainPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
