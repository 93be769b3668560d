use outlet_dashboard_client::{NewUser, Role};
use secrecy::SecretString;

use super::{FieldErrors, is_valid_email};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Raw input of the "create user" form.
#[derive(Clone, Debug, Default)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub role: String,
}

impl UserForm {
    pub fn validate(&self) -> FieldErrors {
        self.to_new_user().err().unwrap_or_default()
    }

    pub fn to_new_user(&self) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required.");
        } else if name.chars().count() > 100 {
            errors.add("name", "Name may not be longer than 100 characters.");
        }

        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            errors.add("email", "Email is required.");
        } else if !is_valid_email(&email) {
            errors.add("email", "Email format is invalid.");
        }

        if self.password.is_empty() {
            errors.add("password", "Password is required.");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters."),
            );
        }
        if self.password != self.password_confirmation {
            errors.add("password_confirmation", "Passwords do not match.");
        }

        let role = match self.role.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            "" => {
                errors.add("role", "Role is required.");
                None
            }
            _ => {
                errors.add("role", "Role must be admin or user.");
                None
            }
        };

        let user = role.map(|role| NewUser {
            name: name.to_string(),
            email,
            password: SecretString::new(self.password.clone().into()),
            role,
        });
        match user {
            Some(user) => errors.into_result(user),
            None => Err(errors),
        }
    }
}
