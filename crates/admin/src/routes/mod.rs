//! Dashboard routes and the sign-in guard.
//!
//! `/auth` and `/` are public. Everything else sits behind the guard, which
//! sends visitors without a token to `/auth`.

use core::fmt;

use tracing::debug;

use crate::services::AuthService;

/// A page the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Auth,
    Home,
    Product,
    Category,
    Store,
}

impl Route {
    pub const ALL: [Self; 5] = [
        Self::Auth,
        Self::Home,
        Self::Product,
        Self::Category,
        Self::Store,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Auth => "/auth",
            Self::Home => "/",
            Self::Product => "/product",
            Self::Category => "/category",
            Self::Store => "/store",
        }
    }

    /// Match a location path. Trailing slashes are ignored; anything
    /// unknown is `None` (not found).
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Header title shown above the page.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Product => "Product Management",
            Self::Category => "Category Management",
            Self::Auth | Self::Home | Self::Store => "Dashboard",
        }
    }

    #[must_use]
    pub const fn requires_auth(self) -> bool {
        matches!(self, Self::Product | Self::Category | Self::Store)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Resolve where a visit to `route` actually lands.
///
/// Only token presence is checked; an expired token is caught by the first
/// request the page makes.
pub async fn guard(route: Route, auth: &AuthService) -> Route {
    if route.requires_auth() && !auth.is_authenticated().await {
        debug!(requested = %route, "Redirecting to sign-in");
        return Route::Auth;
    }
    route
}
