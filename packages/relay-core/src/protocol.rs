//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by the Yamaha Extended Control API and by the
//! receiver's observed event-subscription behavior. Changing them breaks
//! protocol compliance.

// ─────────────────────────────────────────────────────────────────────────────
// Extended Control API
// ─────────────────────────────────────────────────────────────────────────────

/// Root path of the receiver's control API. The event-subscription announce
/// is addressed here.
pub const DEVICE_API_ROOT: &str = "/YamahaExtendedControl/v1";

/// Main-zone status query path.
pub const STATUS_PATH: &str = "/YamahaExtendedControl/v1/main/getStatus";

/// Main-zone power setter path (query parameter `power=on|standby`).
pub const SET_POWER_PATH: &str = "/YamahaExtendedControl/v1/main/setPower";

/// Main-zone volume setter path (query parameters `volume=up|down`, `step`).
pub const SET_VOLUME_PATH: &str = "/YamahaExtendedControl/v1/main/setVolume";

/// Main-zone mute setter path (query parameter `enable=true|false`).
pub const SET_MUTE_PATH: &str = "/YamahaExtendedControl/v1/main/setMute";

/// Main-zone input setter path (query parameter `input`).
pub const SET_INPUT_PATH: &str = "/YamahaExtendedControl/v1/main/setInput";

/// Application-level success sentinel in every Extended Control JSON body.
pub const OK_RESPONSE_CODE: i64 = 0;

/// Accept header the receiver expects on control calls.
pub const MUSICCAST_ACCEPT: &str = "application/vnd.musiccast.v1+json";

/// Input name of the primary (TV) source on the reference receiver.
pub const PRIMARY_INPUT: &str = "bd_dvd";

/// Power values used by the Extended Control API.
pub const POWER_ON: &str = "on";
pub const POWER_STANDBY: &str = "standby";

// ─────────────────────────────────────────────────────────────────────────────
// Event Subscription
// ─────────────────────────────────────────────────────────────────────────────

/// Application identity sent with the subscription announce.
pub const SUBSCRIBE_APP_NAME: &str = "MusicCast/1";

/// Header carrying our application identity on the announce call.
pub const HEADER_APP_NAME: &str = "X-AppName";

/// Header carrying our UDP listening port on the announce call.
pub const HEADER_APP_PORT: &str = "X-AppPort";

/// Interval between subscription announces (seconds).
///
/// Must stay strictly shorter than the receiver's own subscription timeout,
/// or event delivery silently stops between renewals.
pub const SUBSCRIBE_INTERVAL_SECS: u64 = 300;

// ─────────────────────────────────────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────────────────────────────────────

/// Timeout for control/query calls to the receiver (seconds).
pub const DEVICE_TIMEOUT_SECS: u64 = 5;

/// Receive buffer for event datagrams (bytes). Notifications are small JSON
/// objects; 8 KiB leaves generous headroom.
pub const EVENT_DATAGRAM_BUFFER_SIZE: usize = 8192;

/// User-Agent sent on control calls.
pub const RELAY_USER_AGENT: &str = "musiccast-relay";

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default UDP port for incoming receiver event notifications.
pub const DEFAULT_EVENT_PORT: u16 = 41100;

/// Default port for the viewer-facing HTTP API.
pub const DEFAULT_HTTP_PORT: u16 = 4000;
