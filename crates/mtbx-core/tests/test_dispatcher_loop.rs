//! Integration tests for the console loop.
//!
//! Drives full sessions through a scripted console.

use mtbx_core::adapters::Console;
use mtbx_core::adapters::console_mock::ScriptedConsole;
use mtbx_core::{DispatchState, Dispatcher, FnTool, MtbxError, ToolDescriptor, ToolRegistry};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Fixture {
    dispatcher: Dispatcher,
    runs: Arc<AtomicUsize>,
}

fn fixture() -> Fixture {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut registry = ToolRegistry::new();

    let counter = Arc::clone(&runs);
    registry.register(FnTool::new(
        ToolDescriptor::new("Counter", "counts").with_order(1),
        move |console: &mut dyn Console| {
            counter.fetch_add(1, Ordering::SeqCst);
            console.print("counted")
        },
    ));
    registry.register(FnTool::new(
        ToolDescriptor::new("Failing", "returns an error").with_order(2),
        |_: &mut dyn Console| Err(MtbxError::ToolExecutionError("disk scan failed".to_string())),
    ));
    registry.register(FnTool::new(
        ToolDescriptor::new("Panicking", "panics").with_order(3),
        |_: &mut dyn Console| -> mtbx_core::Result<()> { panic!("index out of bounds") },
    ));

    let discovery = registry.discover().unwrap();
    Fixture {
        dispatcher: Dispatcher::new(discovery.tools, "Test Toolbox"),
        runs,
    }
}

#[test]
fn test_empty_selection_exits_without_invoking() {
    let mut f = fixture();
    let mut console = ScriptedConsole::new([""]);

    let summary = f.dispatcher.run(&mut console).unwrap();

    assert_eq!(summary.tools_run, 0);
    assert_eq!(f.runs.load(Ordering::SeqCst), 0);
    assert!(console.contains("Goodbye!"));
}

#[test]
fn test_menu_lists_tools_in_order() {
    let mut f = fixture();
    let mut console = ScriptedConsole::new(["q"]);

    f.dispatcher.run(&mut console).unwrap();

    assert!(console.contains("Test Toolbox"));
    let output = console.output();
    let counter = output.find("Counter").unwrap();
    let failing = output.find("Failing").unwrap();
    let panicking = output.find("Panicking").unwrap();
    assert!(counter < failing && failing < panicking);
    assert!(console.contains("[Q] Quit"));
}

#[test]
fn test_tool_runs_and_menu_returns() {
    let mut f = fixture();
    let mut console = ScriptedConsole::new(["1", "1", ""]);

    let summary = f.dispatcher.run(&mut console).unwrap();

    assert_eq!(f.runs.load(Ordering::SeqCst), 2);
    assert_eq!(summary.tools_run, 2);
    assert_eq!(summary.tool_failures, 0);
    assert_eq!(console.clear_count(), 3);
}

#[test]
fn test_tool_error_is_contained() {
    let mut f = fixture();
    // select the failing tool, acknowledge the pause, then run the counter
    let mut console = ScriptedConsole::new(["2", "", "1", ""]);

    let summary = f.dispatcher.run(&mut console).unwrap();

    assert!(console.contains("disk scan failed"));
    assert_eq!(summary.tool_failures, 1);
    assert_eq!(f.runs.load(Ordering::SeqCst), 1);
    assert!(console.prompts().iter().any(|p| p == "Press Enter to continue..."));
}

#[test]
fn test_tool_panic_is_contained() {
    let mut f = fixture();
    let mut console = ScriptedConsole::new(["3", "", ""]);

    let summary = f.dispatcher.run(&mut console).unwrap();

    assert!(console.contains("tool panicked: index out of bounds"));
    assert_eq!(summary.tools_run, 1);
    assert_eq!(summary.tool_failures, 1);
    assert!(console.contains("Goodbye!"));
}

#[test]
fn test_out_of_range_selection_reprompts() {
    let mut f = fixture();
    let mut console = ScriptedConsole::new(["4", "abc", "0", ""]);

    let summary = f.dispatcher.run(&mut console).unwrap();

    assert_eq!(summary.tools_run, 0);
    assert_eq!(console.prompts().len(), 4);
    assert!(console.contains("invalid selection: '4'"));
    assert!(console.contains("invalid selection: 'abc'"));
    assert!(console.contains("invalid selection: '0'"));
}

#[test]
fn test_end_of_input_is_quit() {
    let mut f = fixture();
    let mut console = ScriptedConsole::default();

    let next = f.dispatcher.step(&mut console, DispatchState::Menu).unwrap();
    assert_eq!(next, DispatchState::Exiting);
}
