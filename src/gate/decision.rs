use crate::session::Principal;

/// Terminal outcome of one gate evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Pass the request through, with the principal when one was resolved.
    Allow(Option<Principal>),
    /// No usable session for a protected page.
    RedirectLogin,
    /// Already signed in, no reason to show the login page.
    RedirectHome,
    /// Serve the maintenance page under the original URL.
    RewriteMaintenance,
    /// The path cannot be resolved safely; refuse it.
    RejectPath,
}

impl Decision {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Allow(_) => "allow",
            Self::RedirectLogin => "redirect_login",
            Self::RedirectHome => "redirect_home",
            Self::RewriteMaintenance => "rewrite_maintenance",
            Self::RejectPath => "reject_path",
        }
    }

    #[must_use]
    pub const fn is_allow(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}
