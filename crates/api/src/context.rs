use eventdesk_core::UserId;

/// Authenticated session for a request (verified token subject).
///
/// Inserted by the auth middleware and passed to handlers explicitly; the
/// role is not part of it and is resolved from the profile store per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
    email: Option<String>,
}

impl SessionContext {
    pub fn new(user_id: UserId, email: Option<String>) -> Self {
        Self { user_id, email }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
