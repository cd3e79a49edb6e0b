//! Alert (notification) records.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};

use crate::types::{AlertId, UserId};

/// An alert addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    /// Recipient.
    #[serde(rename = "usuario")]
    pub user: UserId,
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "visible_default", deserialize_with = "bool_or_int")]
    pub visible: bool,
}

const fn visible_default() -> bool {
    true
}

/// Accepts `true`/`false` as well as `1`/`0`.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct Flag;

    impl Visitor<'_> for Flag {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a boolean or 0/1")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Signed(v), &self)),
            }
        }
    }

    deserializer.deserialize_any(Flag)
}

/// Payload for `POST alertas/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlert {
    #[serde(rename = "usuario")]
    pub user: UserId,
    #[serde(rename = "mensaje")]
    pub message: String,
}

/// Payload for `PUT alertas/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertUpdate {
    #[serde(rename = "mensaje")]
    pub message: String,
}

/// Payload for `PATCH alertas/update-visibility/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityUpdate {
    pub ids: Vec<AlertId>,
}
