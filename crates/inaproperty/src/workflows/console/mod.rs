//! Admin console: tabbed view over both request collections with approve/reject actions.

pub mod backend;
pub mod render;
pub mod state;


pub use backend::{ConsoleBackend, ConsoleError, HttpConsoleBackend, ServiceConsoleBackend};
pub use render::{render_html, render_text, DECIDE_PATH};
pub use state::{empty_message, status_badge, AdminConsole, ConsoleRow, ConsoleView, TabSummary};
