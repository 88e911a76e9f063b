//! Integration tests for tool registration and discovery.

use mtbx_core::adapters::Console;
use mtbx_core::adapters::shell_mock::MockShellAdapter;
use mtbx_core::registry::DEFAULT_ORDER;
use mtbx_core::{FnTool, MtbxConfig, MtbxError, Tool, ToolDescriptor, ToolRegistry, builtin_registry};
use std::sync::Arc;

fn tool(name: &str, description: &str) -> impl Tool + 'static {
    FnTool::new(ToolDescriptor::new(name, description), |_: &mut dyn Console| Ok(()))
}

struct HealthCheck;

impl Tool for HealthCheck {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("Health Check", "Network, Disk, Battery")
            .with_glyph("🩺")
            .with_order(2)
    }

    fn run(&self, console: &mut dyn Console) -> mtbx_core::Result<()> {
        console.print("all good")
    }
}

#[test]
fn test_one_invalid_tool_excludes_only_that_tool() {
    let mut registry = builtin_registry(Arc::new(MockShellAdapter::new()), &MtbxConfig::default());
    registry
        .register(tool("Junk Cleaner", ""))
        .register(HealthCheck)
        .register(tool("Disk Usage", "Largest folders"));

    let discovery = registry.discover().unwrap();

    let names: Vec<&str> = discovery
        .tools
        .iter()
        .map(|t| t.descriptor().name.as_str())
        .collect();
    assert_eq!(names, ["Brew Manager", "Health Check", "Disk Usage"]);
    assert_eq!(discovery.diagnostics.len(), 1);
    assert_eq!(discovery.diagnostics[0].tool, "Junk Cleaner");
    assert_eq!(discovery.diagnostics[0].to_string(), "Junk Cleaner: missing description");
}

#[test]
fn test_default_order_sorts_last() {
    let mut registry = ToolRegistry::new();
    registry.register(tool("Alpha", "a")).register(HealthCheck);

    let discovery = registry.discover().unwrap();

    assert_eq!(discovery.tools[0].descriptor().name, "Health Check");
    assert_eq!(discovery.tools[1].descriptor().order, DEFAULT_ORDER);
}

#[test]
fn test_registry_of_only_invalid_tools_is_empty() {
    let mut registry = ToolRegistry::new();
    registry.register(tool("", "nameless")).register(tool("Quiet", " "));

    assert!(matches!(registry.discover(), Err(MtbxError::RegistryEmpty)));
}
