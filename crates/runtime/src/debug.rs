//! Named zero-argument actions shown in the debug panel.

/// Something the debug panel can trigger.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DebugAction {
    CreateSphere,
    CreateBox,
    Reset,
}

impl DebugAction {
    pub const ALL: [Self; 3] = [Self::CreateSphere, Self::CreateBox, Self::Reset];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::CreateSphere => "Create Sphere",
            Self::CreateBox => "Create Box",
            Self::Reset => "Reset Scene",
        }
    }

    /// Keyboard shortcut, matched case-insensitively.
    #[must_use]
    pub fn shortcut(self) -> char {
        match self {
            Self::CreateSphere => '1',
            Self::CreateBox => '2',
            Self::Reset => 'r',
        }
    }

    #[must_use]
    pub fn from_shortcut(key: char) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|action| action.shortcut() == key)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugEntry {
    pub action: DebugAction,
    pub label: String,
}

/// Ordered list of actions, each drawn as one button.
#[derive(Clone, Debug, Default)]
pub struct DebugPanel {
    entries: Vec<DebugEntry>,
}

impl DebugPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The panel with all three actions under their default labels.
    #[must_use]
    pub fn standard() -> Self {
        let mut panel = Self::new();
        for action in DebugAction::ALL {
            panel.add(action);
        }
        panel
    }

    /// Register `action` under its default label.
    pub fn add(&mut self, action: DebugAction) -> &mut Self {
        self.entries.push(DebugEntry {
            action,
            label: action.label().to_owned(),
        });
        self
    }

    /// Rename the most recently added action.
    pub fn name(&mut self, label: impl Into<String>) -> &mut Self {
        if let Some(entry) = self.entries.last_mut() {
            entry.label = label.into();
        }
        self
    }

    #[must_use]
    pub fn actions(&self) -> &[DebugEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_panel_lists_actions_in_order() {
        let panel = DebugPanel::standard();
        let labels: Vec<_> = panel.actions().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Create Sphere", "Create Box", "Reset Scene"]);
    }

    #[test]
    fn name_relabels_the_last_action() {
        let mut panel = DebugPanel::new();
        panel.add(DebugAction::Reset).name("Clear").add(DebugAction::CreateBox);
        assert_eq!(panel.actions()[0].label, "Clear");
        assert_eq!(panel.actions()[1].label, "Create Box");
    }

    #[test]
    fn shortcuts_map_back_to_actions() {
        assert_eq!(DebugAction::from_shortcut('1'), Some(DebugAction::CreateSphere));
        assert_eq!(DebugAction::from_shortcut('R'), Some(DebugAction::Reset));
        assert_eq!(DebugAction::from_shortcut('x'), None);
    }
}
