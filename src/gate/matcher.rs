//! Path classification for the route gate.
//!
//! A single [`RouteMatcher`] describes the whole site layout: where the
//! protected area starts, which page is the login page, where maintenance
//! requests are rewritten to, and which paths are never gated.

use thiserror::Error;

pub const DEFAULT_PROTECTED_PREFIX: &str = "/admin";
pub const DEFAULT_LOGIN_PATH: &str = "/admin/login";
pub const DEFAULT_MAINTENANCE_PATH: &str = "/maintenance";
pub const DEFAULT_EXCLUDED: &[&str] = &[
    "/static/*",
    "/_assets/*",
    "/images/*",
    "/favicon.ico",
    "/robots.txt",
    "/api/auth/*",
    "/health",
];
pub const DEFAULT_LOGIN_ASSETS: &[&str] = &["/admin/login-bg.jpg"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatcherError {
    #[error("path `{0}` must start with `/`")]
    NotAbsolute(String),
    #[error("login path `{login}` is outside the protected area `{protected}`")]
    LoginOutsideProtected { login: String, protected: String },
    #[error("maintenance path `{0}` must not be inside the protected area")]
    MaintenanceInsideProtected(String),
}

/// An exact path, or a prefix written as `/dir/*`.
///
/// Prefixes match on segment boundaries: `/static/*` matches `/static` and
/// `/static/app.css` but not `/staticfiles`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
}

impl PathPattern {
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        match pattern.strip_suffix("/*") {
            Some(base) => Self::Prefix(normalize(base).to_string()),
            None => Self::Exact(normalize(pattern).to_string()),
        }
    }

    fn base(&self) -> &str {
        match self {
            Self::Exact(path) | Self::Prefix(path) => path,
        }
    }

    /// `path` must already be normalized.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Prefix(base) => under(path, base),
        }
    }
}

/// Drop one trailing slash so `/admin/login/` and `/admin/login` are the same page.
#[must_use]
pub fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Resolve a request path to the file-system view the static file service
/// takes: percent-decoded, empty and `.` segments dropped, `..` applied.
///
/// Returns `None` when the path does not decode to UTF-8.
#[must_use]
pub fn canonical_path(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw).ok()?;
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    Some(format!("/{}", segments.join("/")))
}

fn under(path: &str, base: &str) -> bool {
    if base == "/" {
        return true;
    }
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// How the gate treats a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteClass {
    /// Ordinary public page; subject to maintenance mode.
    Public,
    /// Static assets, auth API, health, the maintenance page itself.
    Excluded,
    /// Inside the protected area; needs a principal.
    Protected,
    /// The login page.
    Login,
    /// Asset inside the protected area that the login page needs.
    LoginAsset,
}

#[derive(Clone, Debug)]
pub struct RouteMatcher {
    protected_prefix: String,
    login_path: String,
    maintenance_path: String,
    excluded: Vec<PathPattern>,
    login_assets: Vec<PathPattern>,
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self {
            protected_prefix: DEFAULT_PROTECTED_PREFIX.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            maintenance_path: DEFAULT_MAINTENANCE_PATH.to_string(),
            excluded: DEFAULT_EXCLUDED.iter().map(|p| PathPattern::parse(p)).collect(),
            login_assets: DEFAULT_LOGIN_ASSETS
                .iter()
                .map(|p| PathPattern::parse(p))
                .collect(),
        }
    }
}

impl RouteMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_protected_prefix(mut self, prefix: &str) -> Self {
        self.protected_prefix = normalize(prefix.trim()).to_string();
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: &str) -> Self {
        self.login_path = normalize(path.trim()).to_string();
        self
    }

    #[must_use]
    pub fn with_maintenance_path(mut self, path: &str) -> Self {
        self.maintenance_path = normalize(path.trim()).to_string();
        self
    }

    /// Replace the excluded patterns. Empty entries are skipped.
    #[must_use]
    pub fn with_excluded<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded = parse_patterns(patterns);
        self
    }

    /// Replace the login-page assets allowed inside the protected area.
    #[must_use]
    pub fn with_login_assets<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.login_assets = parse_patterns(patterns);
        self
    }

    /// Check that the layout is coherent.
    ///
    /// # Errors
    /// Returns an error if a path is relative, the login page is outside the
    /// protected area, or the maintenance page is inside it.
    pub fn validate(&self) -> Result<(), MatcherError> {
        let paths = [
            &self.protected_prefix,
            &self.login_path,
            &self.maintenance_path,
        ];
        let patterns = self.excluded.iter().chain(&self.login_assets).map(PathPattern::base);
        for path in paths.into_iter().map(String::as_str).chain(patterns) {
            if !path.starts_with('/') {
                return Err(MatcherError::NotAbsolute(path.to_string()));
            }
        }
        if !under(&self.login_path, &self.protected_prefix) {
            return Err(MatcherError::LoginOutsideProtected {
                login: self.login_path.clone(),
                protected: self.protected_prefix.clone(),
            });
        }
        if under(&self.maintenance_path, &self.protected_prefix) {
            return Err(MatcherError::MaintenanceInsideProtected(
                self.maintenance_path.clone(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Landing page of the protected area.
    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.protected_prefix
    }

    #[must_use]
    pub fn maintenance_path(&self) -> &str {
        &self.maintenance_path
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize(path);

        if under(path, &self.protected_prefix) {
            if self.login_assets.iter().any(|p| p.matches(path)) {
                RouteClass::LoginAsset
            } else if path == self.login_path {
                RouteClass::Login
            } else {
                RouteClass::Protected
            }
        } else if path == self.maintenance_path || self.excluded.iter().any(|p| p.matches(path)) {
            RouteClass::Excluded
        } else {
            RouteClass::Public
        }
    }
}

fn parse_patterns<I, S>(patterns: I) -> Vec<PathPattern>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .filter(|p| !p.as_ref().trim().is_empty())
        .map(|p| PathPattern::parse(p.as_ref()))
        .collect()
}
