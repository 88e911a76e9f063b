//! Tool registration table and discovery.
//!
//! Tools register themselves with a [`ToolRegistry`] at startup. Discovery
//! validates every registration, drops the invalid ones with a diagnostic,
//! and returns the survivors in display order.

use crate::adapters::Console;
use crate::error::{MtbxError, Result};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Glyph used when a tool does not provide one.
pub const DEFAULT_GLYPH: &str = "🔧";

/// Order used when a tool does not set one.
pub const DEFAULT_ORDER: i32 = 99;

/// Identity and presentation metadata of one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Unique display name.
    pub name: String,

    /// One-line description shown next to the name.
    pub description: String,

    /// Glyph shown before the name.
    pub glyph: String,

    /// Sort key; ties are broken by name.
    pub order: i32,
}

impl ToolDescriptor {
    /// Creates a descriptor with the default glyph and order.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            glyph: DEFAULT_GLYPH.to_string(),
            order: DEFAULT_ORDER,
        }
    }

    /// Sets the display glyph.
    #[must_use]
    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = glyph.into();
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// A pluggable unit of console functionality.
///
/// `run` owns its operator interaction and returns control to the menu when
/// done. An `Err` is reported by the dispatcher and never ends the session.
pub trait Tool: Send + Sync {
    /// Metadata used for validation and display.
    fn descriptor(&self) -> ToolDescriptor;

    /// Performs the tool's work.
    fn run(&self, console: &mut dyn Console) -> Result<()>;
}

/// A tool defined by a descriptor and a closure.
pub struct FnTool<F> {
    descriptor: ToolDescriptor,
    entry: F,
}

impl<F> FnTool<F>
where
    F: Fn(&mut dyn Console) -> Result<()> + Send + Sync,
{
    /// Binds `entry` to `descriptor`.
    pub fn new(descriptor: ToolDescriptor, entry: F) -> Self {
        Self { descriptor, entry }
    }
}

impl<F> Tool for FnTool<F>
where
    F: Fn(&mut dyn Console) -> Result<()> + Send + Sync,
{
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    fn run(&self, console: &mut dyn Console) -> Result<()> {
        (self.entry)(console)
    }
}

/// A validated tool with its descriptor captured at discovery time.
#[derive(Clone)]
pub struct RegisteredTool {
    descriptor: ToolDescriptor,
    tool: Arc<dyn Tool>,
}

impl RegisteredTool {
    /// Descriptor as validated during discovery.
    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Invokes the tool's entry point.
    pub fn run(&self, console: &mut dyn Console) -> Result<()> {
        self.tool.run(console)
    }
}

impl fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("descriptor", &self.descriptor)
            .field("tool", &"Arc<dyn Tool>")
            .finish()
    }
}

/// Why a registration was excluded from discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryDiagnostic {
    /// Tool name, or its registration slot when the name is missing.
    pub tool: String,

    /// Reason for exclusion.
    pub reason: String,
}

impl fmt::Display for RegistryDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tool, self.reason)
    }
}

/// Result of a discovery pass.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Valid tools in display order.
    pub tools: Vec<RegisteredTool>,

    /// Registrations that were excluded.
    pub diagnostics: Vec<RegistryDiagnostic>,
}

/// Registration table for console tools.
#[derive(Default)]
pub struct ToolRegistry {
    registrations: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool to the registration table.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> &mut Self {
        self.registrations.push(Arc::new(tool));
        self
    }

    /// Number of registrations, valid or not.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Validates every registration and returns the valid tools in order.
    ///
    /// A registration is valid when its name and description are non-empty
    /// and its name has not been taken by an earlier registration. Tools are
    /// ordered by ascending `order`, then by name.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::RegistryEmpty` if no registration is valid.
    pub fn discover(&self) -> Result<Discovery> {
        let mut tools = Vec::with_capacity(self.registrations.len());
        let mut diagnostics = Vec::new();
        let mut seen = HashSet::new();

        for (slot, tool) in self.registrations.iter().enumerate() {
            let mut descriptor = tool.descriptor();
            descriptor.name = descriptor.name.trim().to_string();
            descriptor.description = descriptor.description.trim().to_string();

            let reason = if descriptor.name.is_empty() {
                Some("missing name")
            } else if descriptor.description.is_empty() {
                Some("missing description")
            } else if seen.contains(&descriptor.name) {
                Some("duplicate name")
            } else {
                None
            };

            if let Some(reason) = reason {
                let label = if descriptor.name.is_empty() {
                    format!("<registration #{}>", slot + 1)
                } else {
                    descriptor.name.clone()
                };
                tracing::warn!(tool = %label, reason, "excluding tool from menu");
                diagnostics.push(RegistryDiagnostic {
                    tool: label,
                    reason: reason.to_string(),
                });
                continue;
            }

            if descriptor.glyph.trim().is_empty() {
                descriptor.glyph = DEFAULT_GLYPH.to_string();
            }

            seen.insert(descriptor.name.clone());
            tools.push(RegisteredTool {
                descriptor,
                tool: Arc::clone(tool),
            });
        }

        if tools.is_empty() {
            return Err(MtbxError::RegistryEmpty);
        }

        tools.sort_by(|a, b| {
            a.descriptor
                .order
                .cmp(&b.descriptor.order)
                .then_with(|| a.descriptor.name.cmp(&b.descriptor.name))
        });

        tracing::debug!(
            tools = tools.len(),
            excluded = diagnostics.len(),
            "tool discovery finished"
        );

        Ok(Discovery { tools, diagnostics })
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str, description: &str, order: i32) -> impl Tool + 'static {
        FnTool::new(
            ToolDescriptor::new(name, description).with_order(order),
            |_: &mut dyn Console| Ok(()),
        )
    }

    fn names(discovery: &Discovery) -> Vec<&str> {
        discovery
            .tools
            .iter()
            .map(|t| t.descriptor().name.as_str())
            .collect()
    }

    #[test]
    fn test_orders_by_order_then_name() {
        let mut registry = ToolRegistry::new();
        registry
            .register(noop("Zeta", "z", 1))
            .register(noop("Health", "h", 2))
            .register(noop("Alpha", "a", 1));

        let discovery = registry.discover().unwrap();
        assert_eq!(names(&discovery), ["Alpha", "Zeta", "Health"]);
        assert!(discovery.diagnostics.is_empty());
    }

    #[test]
    fn test_excludes_tool_missing_description() {
        let mut registry = ToolRegistry::new();
        registry
            .register(noop("Brew", "updates", 1))
            .register(noop("Broken", "  ", 2))
            .register(noop("Cleaner", "junk", 3));

        let discovery = registry.discover().unwrap();
        assert_eq!(names(&discovery), ["Brew", "Cleaner"]);
        assert_eq!(
            discovery.diagnostics,
            [RegistryDiagnostic {
                tool: "Broken".to_string(),
                reason: "missing description".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_name_uses_slot_label() {
        let mut registry = ToolRegistry::new();
        registry.register(noop("Brew", "updates", 1)).register(noop("", "x", 0));

        let discovery = registry.discover().unwrap();
        assert_eq!(discovery.diagnostics[0].tool, "<registration #2>");
        assert_eq!(discovery.diagnostics[0].reason, "missing name");
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let mut registry = ToolRegistry::new();
        registry
            .register(noop("Brew", "first", 5))
            .register(noop("Brew", "second", 1));

        let discovery = registry.discover().unwrap();
        assert_eq!(discovery.tools.len(), 1);
        assert_eq!(discovery.tools[0].descriptor().description, "first");
        assert_eq!(discovery.diagnostics[0].reason, "duplicate name");
    }

    #[test]
    fn test_empty_glyph_gets_default() {
        let mut registry = ToolRegistry::new();
        registry.register(FnTool::new(
            ToolDescriptor::new("Plain", "no glyph").with_glyph(""),
            |_: &mut dyn Console| Ok(()),
        ));

        let discovery = registry.discover().unwrap();
        assert_eq!(discovery.tools[0].descriptor().glyph, DEFAULT_GLYPH);
    }

    #[test]
    fn test_all_invalid_is_registry_empty() {
        let mut registry = ToolRegistry::new();
        registry.register(noop("", "", 1));

        assert!(matches!(registry.discover(), Err(MtbxError::RegistryEmpty)));
        assert!(matches!(
            ToolRegistry::new().discover(),
            Err(MtbxError::RegistryEmpty)
        ));
    }

    #[test]
    fn test_discovery_is_repeatable() {
        let mut registry = ToolRegistry::new();
        registry.register(noop("B", "b", 1)).register(noop("A", "a", 1));

        let first = registry.discover().unwrap();
        let second = registry.discover().unwrap();
        assert_eq!(names(&first), names(&second));
        assert_eq!(registry.len(), 2);
    }
}
