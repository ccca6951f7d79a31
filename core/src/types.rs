//! Records exchanged with the table API.
//!
//! # Design
//! Row types (`User`, `DataRecord`) are what the remote returns; payload
//! types (`NewUser`, `NewRecord`, `RecordPatch`) are what we send. Field names
//! follow the remote column names (`hashed_password`, `user_id`).
//!
//! The remote may key rows with uuid strings or bigint serials, so ids are
//! accepted as either and kept as `String`.

use serde::{Deserialize, Deserializer, Serialize};

/// A registered user as returned by login. The stored digest is never part of
/// this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub login: String,
}

/// One row of the `data` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub content: String,
    #[serde(default, deserialize_with = "optional_id_from_string_or_number")]
    pub user_id: Option<String>,
}

/// Insert payload for the `users` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub login: String,
    pub hashed_password: String,
}

/// Insert payload for the `data` table. `user_id` is sent as `null` when
/// absent.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecord {
    pub content: String,
    pub user_id: Option<String>,
}

/// Partial update payload for the `data` table. Only `content` is mutable.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPatch {
    pub content: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

/// Accepts `"abc"` or `42` and yields a `String`.
pub fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// Like [`id_from_string_or_number`] but also accepts `null`.
pub fn optional_id_from_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
