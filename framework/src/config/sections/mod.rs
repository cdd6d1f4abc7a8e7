mod app;
mod server;

pub use app::AppConfig;
pub use server::ServerConfig;

use serde::{de, Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

/// Deserialize a field from either its typed form or its text form
///
/// Whole `${KEY}` placeholders resolve to strings, so `port: ${SERVER_PORT}`
/// arrives as `"8080"` and is parsed here.
pub(crate) fn typed_or_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Typed(T),
        Text(String),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Typed(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}
