//! Static entry points surfaced through the host's context menu.

pub const PROJECT_HOME_URL: &str = "https://github.com/tabshot/tabshot";
pub const DISCUSSIONS_URL: &str =
    "https://github.com/tabshot/tabshot/discussions?discussions_q=label%3APromptStarter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    About,
    PromptStarters,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::About, MenuItem::PromptStarters];

    pub fn id(self) -> &'static str {
        match self {
            MenuItem::About => "about",
            MenuItem::PromptStarters => "prompt-starters",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MenuItem::About => "About Tabshot",
            MenuItem::PromptStarters => "Prompt Starters",
        }
    }

    /// Link opened in a new tab when the item is selected.
    pub fn url(self) -> &'static str {
        match self {
            MenuItem::About => PROJECT_HOME_URL,
            MenuItem::PromptStarters => DISCUSSIONS_URL,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.id() == id)
    }
}
