//! User update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Default)]
pub struct UserUpdateBuilder(UserUpdate);

impl UserUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(UserUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.0.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn build(self) -> UserUpdate {
        self.0
    }
}
