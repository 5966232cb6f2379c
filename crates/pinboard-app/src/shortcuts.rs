//! Keyboard shortcut registry and documentation.

use pinboard_core::Registry;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Switch to a registered tool.
    SetTool(&'static str),
    /// Cancel the current tool's interaction.
    Cancel,
    OpenPdf,
    ExportPdf,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
    pub action: ShortcutAction,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
        action: ShortcutAction,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
            action,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+O").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.key.eq_ignore_ascii_case(key) && self.ctrl == ctrl && self.shift == shift
    }
}

/// Registry of all keyboard shortcuts.
#[derive(Debug, Clone, Default)]
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutRegistry {
    /// Tool shortcuts from the registered tools' key bindings, then the fixed ones.
    pub fn from_registry(registry: &Registry) -> Self {
        let mut shortcuts: Vec<Shortcut> = registry
            .tool_descriptors()
            .into_iter()
            .map(|tool| {
                Shortcut::new(
                    tool.kbd,
                    false,
                    false,
                    tool.label,
                    ShortcutAction::SetTool(tool.id),
                )
            })
            .collect();
        shortcuts.extend([
            Shortcut::new("O", true, false, "Open PDF", ShortcutAction::OpenPdf),
            Shortcut::new("E", true, false, "Export PDF", ShortcutAction::ExportPdf),
            Shortcut::new(
                "Escape",
                false,
                false,
                "Cancel current action",
                ShortcutAction::Cancel,
            ),
        ]);
        Self { shortcuts }
    }

    /// Get all registered shortcuts.
    pub fn all(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// The shortcut bound to a key press, if any.
    pub fn find(&self, key: &str, ctrl: bool, shift: bool) -> Option<&Shortcut> {
        self.shortcuts
            .iter()
            .find(|shortcut| shortcut.matches(key, ctrl, shift))
    }

    /// Print all shortcuts to console.
    pub fn print_all(&self) {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in &self.shortcuts {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinboard_core::PinboardConfig;

    fn registry() -> ShortcutRegistry {
        ShortcutRegistry::from_registry(&Registry::with_defaults(&PinboardConfig::default()))
    }

    #[test]
    fn test_tool_shortcuts() {
        let shortcuts = registry();
        assert_eq!(
            shortcuts.find("1", false, false).map(|s| s.action),
            Some(ShortcutAction::SetTool("size-button"))
        );
        assert_eq!(
            shortcuts.find("2", false, false).map(|s| s.action),
            Some(ShortcutAction::SetTool("pin"))
        );
        assert_eq!(
            shortcuts.find("3", false, false).map(|s| s.description),
            Some("Screen Shot")
        );
        assert!(shortcuts.find("3", true, false).is_none());
    }

    #[test]
    fn test_fixed_shortcuts() {
        let shortcuts = registry();
        assert_eq!(
            shortcuts.find("o", true, false).map(|s| s.action),
            Some(ShortcutAction::OpenPdf)
        );
        assert_eq!(
            shortcuts.find("escape", false, false).map(|s| s.action),
            Some(ShortcutAction::Cancel)
        );
    }

    #[test]
    fn test_format() {
        let shortcuts = registry();
        let export = shortcuts.find("E", true, false).unwrap();
        assert_eq!(export.format(), "Ctrl+E");
        assert_eq!(shortcuts.all()[0].format(), "1");
    }
}
