//! Recording test double for [`DeviceClient`].

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::client::{DeviceClient, DeviceResult};

/// One recorded `query` invocation.
pub(crate) struct RecordedCall {
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub ignore_response_code: bool,
}

/// Records every query and replays canned responses in order.
///
/// With an empty response queue every call succeeds with a bare ok body,
/// which keeps tests that don't care about payloads short.
pub(crate) struct MockDevice {
    pub calls: Mutex<Vec<RecordedCall>>,
    pub responses: Mutex<VecDeque<DeviceResult<Value>>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_responses(responses: Vec<DeviceResult<Value>>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        }
    }

    /// A plausible ok getStatus body.
    pub fn ok_status(power_on: bool, volume: u64) -> Value {
        json!({
            "response_code": 0,
            "power": if power_on { "on" } else { "standby" },
            "input": "bd_dvd",
            "mute": false,
            "volume": volume,
        })
    }

    /// Paths of all recorded calls, in order.
    pub fn paths(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.path.clone()).collect()
    }
}

#[async_trait]
impl DeviceClient for MockDevice {
    async fn query(
        &self,
        path: &str,
        extra_headers: &[(&'static str, String)],
        ignore_response_code: bool,
    ) -> DeviceResult<Value> {
        self.calls.lock().push(RecordedCall {
            path: path.to_string(),
            headers: extra_headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            ignore_response_code,
        });

        match self.responses.lock().pop_front() {
            Some(result) => result,
            None => Ok(json!({ "response_code": 0 })),
        }
    }
}
