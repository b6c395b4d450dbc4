//! Session
//!
//! A mock sign-in: any non-blank email and password are accepted. The session owns the cart
//! for as long as the app runs, and signing out empties it.

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::info;

use crate::cart::Cart;

/// Session errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Email or password was left blank.
    #[error("email and password are required")]
    MissingCredentials,
}

/// The signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Handle derived from the email, e.g. `jane` for `jane@example.com`
    pub name: String,

    /// Email as entered
    pub email: String,

    /// Handle with its first letter capitalised, e.g. `Jane`
    pub display_name: String,
}

impl User {
    /// Derive a user from an email address.
    pub fn from_email(email: &str) -> Self {
        let email = email.trim();
        let name = email
            .split_once('@')
            .map_or(email, |(local, _)| local)
            .to_string();

        let mut chars = name.chars();
        let display_name = chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_default();

        Self {
            name,
            email: email.to_string(),
            display_name,
        }
    }
}

/// Session
#[derive(Debug)]
pub struct Session<'a> {
    user: Option<User>,
    cart: Cart<'a>,
}

impl<'a> Session<'a> {
    /// Start a signed-out session with an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            user: None,
            cart: Cart::new(currency),
        }
    }

    /// Sign in. Signing in again replaces the current user and keeps the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingCredentials`] if either field is blank.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, SessionError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(SessionError::MissingCredentials);
        }

        let user = User::from_email(email);

        info!(user = %user.name, "signed in");

        Ok(self.user.insert(user))
    }

    /// Sign out, emptying the cart. Returns the user that was signed in.
    pub fn logout(&mut self) -> Option<User> {
        let user = self.user.take()?;

        self.cart.clear();

        info!(user = %user.name, "signed out");

        Some(user)
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether someone is signed in.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// The cart.
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// The cart, for adding or changing items.
    pub fn cart_mut(&mut self) -> &mut Cart<'a> {
        &mut self.cart
    }
}
