//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Chat roles understood by the completion provider.
///
/// Serialized in lowercase, the form chat-completion APIs expect.
///
/// # Examples
///
/// ```
/// use postforge_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "system");
/// assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System messages carry persona and output contract
    #[display("system")]
    System,
    /// User messages carry the task
    #[display("user")]
    User,
    /// Assistant messages are prior model output
    #[display("assistant")]
    Assistant,
}
