mod session;
mod session_behavior;
mod session_command;

pub use session::{RoomMembership, RoomSession, SessionState};
pub use session_behavior::{NoopBehavior, SessionBehavior};
pub use session_command::SessionCommand;
