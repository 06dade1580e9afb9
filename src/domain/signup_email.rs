use once_cell::sync::Lazy;
use regex::Regex;

// Shape check only: non-empty local part, a single "@", a dot somewhere in the
// domain, no whitespace anywhere. The relay does its own deliverability checks.
static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern"));

#[derive(Debug, Clone)]
pub struct SignupEmail(String);

impl SignupEmail {
    pub fn parse(s: String) -> Result<SignupEmail, String> {
        if EMAIL_SHAPE.is_match(&s) {
            Ok(Self(s))
        } else {
            Err(format!("{} is not a valid signup email.", s))
        }
    }
}

impl AsRef<str> for SignupEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignupEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
