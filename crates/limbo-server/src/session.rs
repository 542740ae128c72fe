//! Per-connection authentication state.

use limbo_core::User;

/// Authentication state of one connection.
///
/// Starts anonymous. Only a successful login authenticates; only logout (or
/// a later successful login) changes the bound user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    /// Not logged in
    #[default]
    Anonymous,
    /// Logged in as this user
    Authenticated(User),
}

impl Session {
    /// The logged-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    /// Whether a user is bound.
    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// Bind `user` to the session.
    pub fn log_in(&mut self, user: User) {
        *self = Self::Authenticated(user);
    }

    /// Return to anonymous.
    pub fn log_out(&mut self) {
        *self = Self::Anonymous;
    }
}
