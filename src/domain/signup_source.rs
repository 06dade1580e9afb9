/// Form id of the primary above-the-fold placement; every other form id is
/// treated as a secondary call-to-action placement.
pub const HERO_FORM_ID: &str = "waitlist-hero";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupSource {
    Hero,
    Cta,
}

impl SignupSource {
    pub fn from_form_id(form_id: &str) -> Self {
        if form_id == HERO_FORM_ID {
            Self::Hero
        } else {
            Self::Cta
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Cta => "cta",
        }
    }
}

impl std::fmt::Display for SignupSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
