// src/models/mod.rs
pub mod game;

// Re-export commonly used types so other modules can use `crate::models::X`
pub use game::{
    ApiResponse,
    ContactAck,
    ContactMessage,
    ContactRequest,
    GameRoom,
    JoinEligibilityRequest,
    JoinQuote,
    RoomLevel,
    RoomStatus,
    RoomTier,
};
