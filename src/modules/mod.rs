// Module exports for pure logic
pub mod backoff;             // Reconnect delays
pub mod deletion;            // Bulk close planning + saga
pub mod drag;                // Drag gesture state machine
pub mod drag_selection;      // Tabs that move together
pub mod filter;              // Search box
pub mod keymap;              // Keyboard dispatch table
pub mod notices;             // User-visible errors
pub mod range;               // Shift-click ranges
pub mod selection;           // Checkbox (bulk close) selection
pub mod tabs;                // Move planning
