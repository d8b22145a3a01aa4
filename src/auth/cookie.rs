use axum_extra::extract::cookie::{Cookie, SameSite};

/// Name of the cookie carrying the identity token.
pub const TOKEN_COOKIE: &str = "token";

/// Attributes applied to the token cookie when it is set and when it is cleared.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn token_cookie(&self, token: String) -> Cookie<'static> {
        self.base(token)
    }

    /// Empty token cookie with `Max-Age=0`, carrying the same attributes so browsers drop the original.
    pub fn cleared_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.base(String::new());
        cookie.make_removal();
        cookie
    }

    fn base(&self, value: String) -> Cookie<'static> {
        // Browsers drop SameSite=None cookies that are not also Secure.
        let same_site = if self.secure { SameSite::None } else { SameSite::Lax };
        Cookie::build((TOKEN_COOKIE, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(same_site)
            .build()
    }
}
