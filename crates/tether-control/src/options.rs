//! Options passed through `close`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Options forwarded to a facade's close override.
///
/// The delay is never enforced by the facade itself; it is up to the close
/// override to honor it (e.g. as a drain window).
///
/// Serialized as `{ "delay_ms": <u64> }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseOptions {
    /// How long the override should wait before releasing the client.
    #[serde(default, rename = "delay_ms", with = "delay_millis")]
    pub delay: Option<Duration>,
}

impl CloseOptions {
    /// Options with no delay.
    #[must_use]
    pub const fn new() -> Self {
        Self { delay: None }
    }

    /// Options carrying a delay.
    #[must_use]
    pub const fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay) }
    }

    /// The delay, or zero if none was given.
    #[must_use]
    pub fn delay_or_zero(&self) -> Duration {
        self.delay.unwrap_or_default()
    }
}

mod delay_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(delay: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match delay {
            Some(delay) => {
                serializer.serialize_some(&u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_delay() {
        let options = CloseOptions::default();
        assert_eq!(options, CloseOptions::new());
        assert_eq!(options.delay_or_zero(), Duration::ZERO);
    }

    #[test]
    fn delay_in_milliseconds() {
        let options: CloseOptions = serde_json::from_str(r#"{"delay_ms": 50}"#).unwrap();
        assert_eq!(options.delay, Some(Duration::from_millis(50)));

        let json = serde_json::to_value(CloseOptions::with_delay(Duration::from_secs(2))).unwrap();
        assert_eq!(json, serde_json::json!({ "delay_ms": 2000 }));
    }

    #[test]
    fn missing_delay_is_none() {
        let options: CloseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.delay, None);
    }
}
