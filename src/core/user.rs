use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a user of the lending system.
///
/// A user can be a borrower applying for loans, a loan officer
/// reviewing applications, or an administrator.
///
/// # Examples
///
/// ```
/// use lending_engine::core::user::UserId;
///
/// let alice = UserId::new("CUST-0001");
/// let officer = UserId::new("OFF-0007");
/// assert_ne!(alice, officer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a new user identifier.
    ///
    /// Convention: a role prefix followed by a sequence number
    /// (e.g., "CUST-0001", "OFF-0007", "ADM-0001").
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this user ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Role assigned to a user by the external identity provider.
///
/// The engine trusts the role it is handed and consults the
/// capability table in `lifecycle::permissions` for each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Officer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Customer => "customer",
            Role::Officer => "officer",
            Role::Admin => "admin",
        };
        write!(f, "{}", name)
    }
}

/// An authenticated actor performing an engine operation.
///
/// Authentication happens outside the engine; the identity provider
/// supplies the id and role, and the engine enforces role guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    /// The actor this user acts as.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role)
    }
}
