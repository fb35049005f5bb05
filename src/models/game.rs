use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== CONTACT ====================
/// Raw contact form body. Every field is optional here so that a missing
/// field is reported as a validation failure instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Validated contact submission. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ContactAck {
    pub message: String,
}

// ==================== GAME ROOMS ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRoom {
    pub id: &'static str,
    pub name: &'static str,
    pub players: u32,
    pub max_players: u32,
    pub entry_fee: u64,
    pub status: RoomStatus,
}

impl GameRoom {
    pub fn is_full(&self) -> bool {
        self.players >= self.max_players
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomTier {
    pub level: RoomLevel,
    pub rooms: Vec<GameRoom>,
}

#[derive(Debug, Deserialize)]
pub struct JoinEligibilityRequest {
    #[serde(default)]
    pub snr_balance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinQuote {
    pub room_id: String,
    pub room_name: String,
    pub entry_fee: u64,
    pub potential_reward: f64,
    pub seats: String,
}

// ==================== API RESPONSE ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
