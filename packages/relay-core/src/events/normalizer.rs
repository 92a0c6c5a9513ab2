//! Normalizes raw receiver notifications into tagged events.

use serde_json::Value;

use super::TaggedEvent;
use crate::protocol::{POWER_ON, PRIMARY_INPUT};

/// Maps a raw UDP notification body to a [`TaggedEvent`].
///
/// The receiver nests changed fields under `main` and in practice sends
/// exactly one field per message. Dispatch checks volume, then mute, then
/// input, then power; the first present field wins. This priority order is
/// authoritative: it matches the receiver's actual payload shapes and must
/// be preserved even if future firmware were to bundle several fields into
/// one message.
///
/// A present field with an unexpected JSON type, or a body with no known
/// field, yields [`TaggedEvent::Unknown`] carrying the raw payload.
pub fn normalize(body: &Value) -> TaggedEvent {
    let Some(main) = body.get("main") else {
        return TaggedEvent::Unknown(body.clone());
    };

    if let Some(volume) = main.get("volume") {
        return match volume.as_u64() {
            Some(volume) => TaggedEvent::Volume(volume),
            None => TaggedEvent::Unknown(body.clone()),
        };
    }

    if let Some(mute) = main.get("mute") {
        return match mute.as_bool() {
            Some(muted) => TaggedEvent::Mute(muted),
            None => TaggedEvent::Unknown(body.clone()),
        };
    }

    if let Some(input) = main.get("input") {
        return match input.as_str() {
            Some(input) => TaggedEvent::Tv(input == PRIMARY_INPUT),
            None => TaggedEvent::Unknown(body.clone()),
        };
    }

    if let Some(power) = main.get("power") {
        return match power.as_str() {
            Some(power) => TaggedEvent::Power(power == POWER_ON),
            None => TaggedEvent::Unknown(body.clone()),
        };
    }

    TaggedEvent::Unknown(body.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn volume_notification_becomes_volume_event() {
        let event = normalize(&json!({ "main": { "volume": 23 } }));
        assert_eq!(event, TaggedEvent::Volume(23));
    }

    #[test]
    fn mute_notification_becomes_mute_event() {
        assert_eq!(
            normalize(&json!({ "main": { "mute": true } })),
            TaggedEvent::Mute(true)
        );
        assert_eq!(
            normalize(&json!({ "main": { "mute": false } })),
            TaggedEvent::Mute(false)
        );
    }

    #[test]
    fn input_notification_maps_to_tv_flag() {
        assert_eq!(
            normalize(&json!({ "main": { "input": "bd_dvd" } })),
            TaggedEvent::Tv(true)
        );
        assert_eq!(
            normalize(&json!({ "main": { "input": "net_radio" } })),
            TaggedEvent::Tv(false)
        );
    }

    #[test]
    fn power_notification_maps_to_power_flag() {
        assert_eq!(
            normalize(&json!({ "main": { "power": "on" } })),
            TaggedEvent::Power(true)
        );
        assert_eq!(
            normalize(&json!({ "main": { "power": "standby" } })),
            TaggedEvent::Power(false)
        );
    }

    #[test]
    fn volume_wins_when_multiple_fields_are_present() {
        let body = json!({ "main": { "power": "on", "mute": true, "volume": 9, "input": "bd_dvd" } });
        assert_eq!(normalize(&body), TaggedEvent::Volume(9));
    }

    #[test]
    fn mute_wins_over_input_and_power() {
        let body = json!({ "main": { "power": "on", "input": "bd_dvd", "mute": false } });
        assert_eq!(normalize(&body), TaggedEvent::Mute(false));
    }

    #[test]
    fn input_wins_over_power() {
        let body = json!({ "main": { "power": "standby", "input": "tuner" } });
        assert_eq!(normalize(&body), TaggedEvent::Tv(false));
    }

    #[test]
    fn body_without_main_is_unknown() {
        let body = json!({ "zone2": { "volume": 1 } });
        assert_eq!(normalize(&body), TaggedEvent::Unknown(body));
    }

    #[test]
    fn main_without_known_fields_is_unknown() {
        let body = json!({ "main": { "signal_info": { "audio": "pcm" } } });
        assert_eq!(normalize(&body), TaggedEvent::Unknown(body));
    }

    #[test]
    fn wrongly_typed_field_is_unknown() {
        let body = json!({ "main": { "volume": "loud" } });
        assert_eq!(normalize(&body), TaggedEvent::Unknown(body));

        let body = json!({ "main": { "mute": "yes" } });
        assert_eq!(normalize(&body), TaggedEvent::Unknown(body));
    }
}
