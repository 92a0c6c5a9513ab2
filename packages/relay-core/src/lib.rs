//! Core library for the MusicCast event relay.
//!
//! The relay sits between one Yamaha MusicCast receiver and any number of
//! browser viewers:
//!
//! - `device` — Extended Control HTTP client, command forwarding and the
//!   event-subscription lease
//! - `events` — normalization of raw receiver notifications into tagged
//!   events
//! - `relay` — UDP ingestion and fan-out to registered viewer streams
//! - `api` — the HTTP surface (server-sent events + command endpoint)
//!
//! Data flow: receiver UDP datagram → normalize → broadcast → every open
//! `/api/events` stream.

#![warn(clippy::all)]

pub mod api;
pub mod device;
pub mod error;
pub mod events;
pub mod protocol;
pub mod relay;

pub use api::{serve, AppState};
pub use device::{
    Command, DeviceClient, DeviceError, DeviceLink, DeviceStatus, SubscriptionLease,
};
pub use error::{RelayError, RelayResult};
pub use events::{normalize, TaggedEvent};
pub use relay::{ClientRegistry, EventIngester};
