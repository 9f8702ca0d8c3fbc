use serde::de::IgnoredAny;
use serde::Deserialize;
use tracing::warn;

use super::config::{FrameRateLimit, SettingValue};

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawSetting {
    Text(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawFrameRateLimit {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

pub(crate) fn resolve_setting<T: SettingValue>(raw: RawSetting) -> T {
    let fallback = T::default();
    match raw {
        RawSetting::Text(text) => match T::parse(&text) {
            Some(value) => value,
            None => {
                warn!(
                    setting = T::KIND,
                    value = text.as_str(),
                    fallback = fallback.as_str(),
                    "unknown_setting_value"
                );
                fallback
            }
        },
        RawSetting::Other(_) => {
            warn!(
                setting = T::KIND,
                fallback = fallback.as_str(),
                "non_text_setting_value"
            );
            fallback
        }
    }
}

pub(crate) fn resolve_frame_rate_limit(raw: RawFrameRateLimit) -> FrameRateLimit {
    let fallback = FrameRateLimit::default();
    match raw {
        RawFrameRateLimit::Int(fps) => FrameRateLimit::from_fps(fps),
        RawFrameRateLimit::Float(fps) if fps.is_finite() => {
            FrameRateLimit::from_fps(fps.round() as i64)
        }
        RawFrameRateLimit::Text(text) => match FrameRateLimit::parse(&text) {
            Some(limit) => limit,
            None => {
                warn!(
                    setting = "FrameRateLimit",
                    value = text.as_str(),
                    fallback = %fallback,
                    "unknown_setting_value"
                );
                fallback
            }
        },
        RawFrameRateLimit::Float(_) | RawFrameRateLimit::Other(_) => {
            warn!(
                setting = "FrameRateLimit",
                fallback = %fallback,
                "non_numeric_setting_value"
            );
            fallback
        }
    }
}
