mod signup_email;
mod signup_request;
mod signup_source;

pub use signup_email::SignupEmail;
pub use signup_request::SignupRequest;
pub use signup_source::{SignupSource, HERO_FORM_ID};
