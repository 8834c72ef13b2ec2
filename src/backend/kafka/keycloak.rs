//! User events emitted by Keycloak's event listener.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeycloakEventType {
    Login,
    Logout,
    Register,
}

impl FromStr for KeycloakEventType {
    type Err = String;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOGIN" => Ok(Self::Login),
            "LOGOUT" => Ok(Self::Logout),
            "REGISTER" => Ok(Self::Register),
            _ => Err(format!("unknown keycloak event type: {}", s)),
        }
    }
}

impl fmt::Display for KeycloakEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Register => "REGISTER",
        })
    }
}

impl<'de> Deserialize<'de> for KeycloakEventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Unknown keys are ignored
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeycloakUserEvent {
    pub id: String,
    /// Epoch milliseconds
    pub time: i64,
    #[serde(rename = "type")]
    pub event_type: KeycloakEventType,
    pub realm_id: String,
    pub client_id: Option<String>,
    pub user_id: String,
    pub session_id: Option<String>,
    pub ip_address: String,
    pub error: Option<String>,
    pub details: HashMap<String, String>,
}
