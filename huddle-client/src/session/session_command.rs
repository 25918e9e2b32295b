use huddle_core::RoomId;

/// Commands from the embedding application (the join form, the hang-up
/// button).
#[derive(Debug)]
pub enum SessionCommand {
    /// Ask the server to admit us to a room. Valid before any room is
    /// joined; also clears a remembered media denial so the user can retry.
    Join { room_id: RoomId, username: String },

    /// Announce departure and tear the session down.
    Leave,
}
