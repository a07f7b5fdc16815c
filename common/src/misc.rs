use std::fmt;

#[derive(PartialEq)]
pub enum UserVerificationOrigin {
    Email,
    OAuth,
}

impl fmt::Display for UserVerificationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserVerificationOrigin::Email => write!(f, "email"),
            UserVerificationOrigin::OAuth => write!(f, "oauth"),
        }
    }
}
