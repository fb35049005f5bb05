/// Application constants

// SNR token (ERC-20) used by the game
pub const SNR_TOKEN_ADDRESS: &str = "0xB7486846F0d1464eDE9dd4a1EF818E2c982aC7aD";
pub const SNR_TOKEN_SYMBOL: &str = "SNR";

// Native currency precision (wei -> ether)
pub const NATIVE_DECIMALS: u8 = 18;

// EIP-1193 error code for a request the user declined
pub const EIP1193_USER_REJECTED: i64 = 4001;

// Characters kept on each side when shortening an address for display
pub const SHORT_ADDRESS_CHARS: usize = 4;

// Game rooms
pub const ROOM_REWARD_MULTIPLIER: f64 = 1.5;

// API version
pub const API_VERSION: &str = "v1";

// Background service intervals
pub const WALLET_POLL_INTERVAL_SECS: u64 = 4;

// Provider event fan-out buffer
pub const PROVIDER_EVENT_BUFFER: usize = 32;
pub const NOTICE_BUFFER: usize = 32;
