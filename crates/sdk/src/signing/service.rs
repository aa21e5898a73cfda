use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The API a request is signed for. Each service shapes its init options
/// differently; names outside the known set take the generic envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Service {
    Items,
    Assess,
    Questions,
    Author,
    Reports,
    AuthorAide,
    Data,
    Other(String),
}

impl Service {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Items => "items",
            Self::Assess => "assess",
            Self::Questions => "questions",
            Self::Author => "author",
            Self::Reports => "reports",
            Self::AuthorAide => "authoraide",
            Self::Data => "data",
            Self::Other(name) => name,
        }
    }

    /// Whether the serialized request is part of the signature.
    pub fn signs_request(&self) -> bool {
        !matches!(self, Self::Assess | Self::Questions)
    }

    /// Services that share their signature with the Events API and so need
    /// a `user_id` in the security packet.
    pub fn shares_user_identity(&self) -> bool {
        matches!(self, Self::Author | Self::Items | Self::Reports)
    }
}

impl From<&str> for Service {
    fn from(name: &str) -> Self {
        match name {
            "items" => Self::Items,
            "assess" => Self::Assess,
            "questions" => Self::Questions,
            "author" => Self::Author,
            "reports" => Self::Reports,
            "authoraide" => Self::AuthorAide,
            "data" => Self::Data,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for Service {
    type Err = Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(name))
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_roundtrip() {
        for name in [
            "items",
            "assess",
            "questions",
            "author",
            "reports",
            "authoraide",
            "data",
        ] {
            let service: Service = name.parse().unwrap();
            assert!(!matches!(service, Service::Other(_)), "{name} should be known");
            assert_eq!(service.to_string(), name);
        }
    }

    #[test]
    fn unknown_name_is_kept() {
        let service = Service::from("events");
        assert_eq!(service, Service::Other("events".into()));
        assert_eq!(service.as_str(), "events");
    }

    #[test]
    fn assess_and_questions_do_not_sign_request() {
        assert!(!Service::Assess.signs_request());
        assert!(!Service::Questions.signs_request());
        assert!(Service::Data.signs_request());
        assert!(Service::Other("events".into()).signs_request());
    }

    #[test]
    fn user_identity_services() {
        assert!(Service::Author.shares_user_identity());
        assert!(Service::Items.shares_user_identity());
        assert!(Service::Reports.shares_user_identity());
        assert!(!Service::AuthorAide.shares_user_identity());
        assert!(!Service::Questions.shares_user_identity());
    }
}
