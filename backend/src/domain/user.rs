//! User aggregate and the value objects used to create, change and page it.

use std::fmt;

use chrono::{DateTime, Utc};

/// Default page size for user listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Database-assigned user identifier.
///
/// # Examples
/// ```
/// use user_service::domain::UserId;
///
/// let id = UserId::new(42);
/// assert_eq!(id.get(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Clear-text password as stored by the service.
///
/// Hashing is out of scope; the wrapper only keeps the value out of `Debug`
/// output and log fields.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wrap a password value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the stored value to persistence adapters.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Persisted user record.
///
/// ## Invariants
/// - `id` is assigned by storage and never changes.
/// - `updated_at` is never earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub password: Password,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub password: Password,
}

/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub password: Option<Password>,
}

impl UserChanges {
    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.surname.is_none() && self.password.is_none()
    }

    /// Apply the change set to an in-memory user.
    ///
    /// Timestamps are left to the caller; storage owns them.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(surname) = &self.surname {
            user.surname.clone_from(surname);
        }
        if let Some(password) = &self.password {
            user.password = password.clone();
        }
    }
}

/// Offset/limit window over the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    /// Build a page, applying defaults for missing values.
    ///
    /// # Examples
    /// ```
    /// use user_service::domain::Page;
    ///
    /// let page = Page::new(None, Some(5));
    /// assert_eq!((page.skip, page.limit), (0, 5));
    /// ```
    #[must_use]
    pub fn new(skip: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn ada() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(1),
            name: "Ada".to_owned(),
            surname: "Lovelace".to_owned(),
            password: Password::new("analytical"),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn password_is_redacted_in_debug(ada: User) {
        let rendered = format!("{ada:?}");
        assert!(!rendered.contains("analytical"));
        assert!(rendered.contains("Password(***)"));
    }

    #[rstest]
    fn apply_to_only_touches_supplied_fields(mut ada: User) {
        let changes = UserChanges {
            surname: Some("King".to_owned()),
            ..UserChanges::default()
        };
        changes.apply_to(&mut ada);
        assert_eq!(ada.name, "Ada");
        assert_eq!(ada.surname, "King");
        assert_eq!(ada.password.expose(), "analytical");
    }

    #[rstest]
    fn empty_changes_are_detected() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            password: Some(Password::new("new")),
            ..UserChanges::default()
        };
        assert!(!changes.is_empty());
    }

    #[rstest]
    #[case(None, None, 0, DEFAULT_PAGE_LIMIT)]
    #[case(Some(10), None, 10, DEFAULT_PAGE_LIMIT)]
    #[case(Some(3), Some(7), 3, 7)]
    fn page_defaults(
        #[case] skip: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected_skip: u32,
        #[case] expected_limit: u32,
    ) {
        let page = Page::new(skip, limit);
        assert_eq!(page.skip, expected_skip);
        assert_eq!(page.limit, expected_limit);
    }
}
