use thiserror::Error;

use crate::{
    constants::{ROOM_REWARD_MULTIPLIER, SNR_TOKEN_SYMBOL},
    error::AppError,
    models::{GameRoom, JoinQuote, RoomLevel, RoomStatus, RoomTier},
};

/// Why a player may not join a room.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JoinRejection {
    #[error("Room is full; please choose another room")]
    RoomFull,

    #[error("Game has already started; please choose another room")]
    AlreadyPlaying,

    #[error("Game has already finished")]
    RoomClosed,

    #[error("You need {required} {symbol} to join this room", symbol = SNR_TOKEN_SYMBOL)]
    InsufficientBalance { required: u64 },
}

impl From<JoinRejection> for AppError {
    fn from(rejection: JoinRejection) -> Self {
        AppError::BadRequest(rejection.to_string())
    }
}

/// Static room list shown on the dashboard.
pub fn fixture_rooms() -> Vec<RoomTier> {
    vec![
        RoomTier {
            level: RoomLevel::Beginner,
            rooms: vec![
                room("b1", "Beginner Room #1", 3, 4, 10, RoomStatus::Waiting),
                room("b2", "Beginner Room #2", 2, 2, 10, RoomStatus::Playing),
                room("b3", "Beginner Tournament", 6, 8, 10, RoomStatus::Waiting),
            ],
        },
        RoomTier {
            level: RoomLevel::Intermediate,
            rooms: vec![
                room("i1", "Intermediate Room #1", 1, 2, 50, RoomStatus::Waiting),
                room("i2", "Intermediate Room #2", 2, 2, 50, RoomStatus::Playing),
            ],
        },
        RoomTier {
            level: RoomLevel::Advanced,
            rooms: vec![
                room("a1", "Advanced Room #1", 1, 2, 100, RoomStatus::Waiting),
                room("a2", "Pro Tournament", 12, 16, 100, RoomStatus::Playing),
            ],
        },
    ]
}

fn room(
    id: &'static str,
    name: &'static str,
    players: u32,
    max_players: u32,
    entry_fee: u64,
    status: RoomStatus,
) -> GameRoom {
    GameRoom {
        id,
        name,
        players,
        max_players,
        entry_fee,
        status,
    }
}

pub fn find_room(room_id: &str) -> Option<GameRoom> {
    fixture_rooms()
        .into_iter()
        .flat_map(|tier| tier.rooms)
        .find(|room| room.id == room_id)
}

/// Runs the dashboard's join checks in order: capacity, status, balance.
///
/// Nothing is reserved or deducted; a successful check only quotes the
/// entry fee and the prize shown to the player.
pub fn check_join(room: &GameRoom, snr_balance: Option<&str>) -> Result<JoinQuote, JoinRejection> {
    if room.is_full() {
        return Err(JoinRejection::RoomFull);
    }
    match room.status {
        RoomStatus::Playing => return Err(JoinRejection::AlreadyPlaying),
        RoomStatus::Completed => return Err(JoinRejection::RoomClosed),
        RoomStatus::Waiting => {}
    }

    let balance = snr_balance
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite());
    match balance {
        Some(value) if value >= room.entry_fee as f64 => {}
        _ => {
            return Err(JoinRejection::InsufficientBalance {
                required: room.entry_fee,
            })
        }
    }

    Ok(JoinQuote {
        room_id: room.id.to_string(),
        room_name: room.name.to_string(),
        entry_fee: room.entry_fee,
        potential_reward: potential_reward(room.entry_fee),
        seats: format!("{}/{}", room.players, room.max_players),
    })
}

// Internal helper that supports `potential_reward` operations.
fn potential_reward(entry_fee: u64) -> f64 {
    entry_fee as f64 * ROOM_REWARD_MULTIPLIER
}
