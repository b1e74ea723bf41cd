//! Core types for the toy store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a toy.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToyId(pub String);

impl ToyId {
    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ToyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ToyId({})", self.0)
    }
}

impl fmt::Display for ToyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToyId {
    fn from(s: &str) -> Self {
        ToyId(s.to_string())
    }
}

impl From<String> for ToyId {
    fn from(s: String) -> Self {
        ToyId(s)
    }
}

/// Identifier of a message, unique within its parent toy only.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        MessageId(s)
    }
}

/// Milliseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time. A clock set before the epoch reads as zero.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Timestamp(millis)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// Reference to a user. Opaque to the store; never validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
}

impl UserRef {
    /// Reference a user by id only.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fullname: None,
        }
    }

    /// Set the display name.
    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }
}

/// A note attached to a toy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub txt: String,
    pub by: UserRef,
    pub created_at: Timestamp,
}

/// A catalog item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toy {
    /// Unique identifier (assigned by store).
    #[serde(rename = "_id", alias = "id")]
    pub id: ToyId,

    pub name: String,

    pub price: f64,

    pub in_stock: bool,

    #[serde(default)]
    pub labels: Vec<String>,

    /// When the toy was created. Never changed afterwards.
    pub created_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserRef>,

    /// Attached messages, oldest first.
    #[serde(default, rename = "msgs", alias = "messages")]
    pub messages: Vec<Message>,
}

impl Toy {
    /// Check whether the toy carries `label` exactly.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Input for creating a new toy (before id and timestamp are assigned).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToyDraft {
    pub name: String,
    pub price: f64,
    /// Defaults to in stock when absent.
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ToyDraft {
    /// Draft with no labels and the default stock state.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            in_stock: None,
            labels: Vec::new(),
        }
    }

    /// Set the labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the stock state explicitly.
    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }
}

/// Partial update for an existing toy. Absent fields are preserved.
///
/// `createdAt`, `owner` and messages are not patchable.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToyPatch {
    #[serde(rename = "_id", alias = "id")]
    pub id: ToyId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl ToyPatch {
    /// Patch for `id` that changes nothing yet.
    pub fn new(id: impl Into<ToyId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            price: None,
            in_stock: None,
            labels: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// True when the patch carries no field to change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.in_stock.is_none() && self.labels.is_none()
    }
}

/// Input for a new message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageDraft {
    pub txt: String,
    pub by: UserRef,
}

impl MessageDraft {
    /// Message text written by `by`.
    pub fn new(txt: impl Into<String>, by: UserRef) -> Self {
        Self { txt: txt.into(), by }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toy_wire_shape() {
        let toy = Toy {
            id: ToyId::from("a1"),
            name: "Robot".into(),
            price: 10.0,
            in_stock: true,
            labels: vec!["tech".into()],
            created_at: Timestamp(100),
            owner: Some(UserRef::new("u1")),
            messages: vec![],
        };

        let value = serde_json::to_value(&toy).unwrap();
        assert_eq!(value["_id"], "a1");
        assert_eq!(value["inStock"], true);
        assert_eq!(value["createdAt"], 100);
        assert_eq!(value["owner"]["_id"], "u1");
        assert_eq!(value["msgs"], json!([]));
    }

    #[test]
    fn test_toy_accepts_aliases_and_defaults() {
        let toy: Toy = serde_json::from_value(json!({
            "id": "t9",
            "name": "Kite",
            "price": 3.5,
            "inStock": false,
            "createdAt": 42
        }))
        .unwrap();

        assert_eq!(toy.id, ToyId::from("t9"));
        assert!(toy.labels.is_empty());
        assert!(toy.messages.is_empty());
        assert!(toy.owner.is_none());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ToyPatch::new("a").is_empty());
        assert!(!ToyPatch::new("a").price(1.0).is_empty());
    }

    #[test]
    fn test_timestamp_now_is_positive() {
        assert!(Timestamp::now().0 > 0);
    }
}
