//! Data models for Dentoria.

use serde::{Deserialize, Serialize};

/// A doctor's gender, as stored in the database and in create payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "MALE")]
    Male,
    #[serde(rename = "FEMALE")]
    Female,
}

impl Gender {
    /// Returns the canonical database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }

    /// Parses the database representation back into a `Gender`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MALE" => Some(Gender::Male),
            "FEMALE" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Represents a doctor in the practice.
///
/// A draft doctor (not yet persisted) carries `id: 0` and an empty
/// `created_at`; both are assigned by the database on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    /// The doctor's unique ID (0 until persisted).
    #[serde(default)]
    pub id: i64,
    /// The doctor's display name.
    pub name: String,
    /// The doctor's unique email address.
    pub email: String,
    /// Phone number in the "(XXX) XXX-XXXX" display mask, possibly partial.
    pub phone: String,
    /// Free-text speciality, e.g. "Orthodontics".
    pub speciality: String,
    /// The doctor's gender.
    pub gender: Gender,
    /// Whether the doctor currently takes appointments.
    pub is_active: bool,
    /// Empty, or a `data:image/...;base64,` URI for the avatar.
    pub image_url: String,
    /// Creation timestamp, assigned by the database.
    #[serde(default)]
    pub created_at: String,
}
