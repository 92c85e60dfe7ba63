use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Rss,
    Atom,
    Json,
}

impl FeedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Rss => "rss",
            FeedType::Atom => "atom",
            FeedType::Json => "json",
        }
    }
}

impl From<&feed_rs::model::FeedType> for FeedType {
    fn from(feed_type: &feed_rs::model::FeedType) -> Self {
        match feed_type {
            feed_rs::model::FeedType::Atom => FeedType::Atom,
            feed_rs::model::FeedType::JSON => FeedType::Json,
            _ => FeedType::Rss,
        }
    }
}

impl std::str::FromStr for FeedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rss" => Ok(FeedType::Rss),
            "atom" => Ok(FeedType::Atom),
            "json" => Ok(FeedType::Json),
            _ => Err(format!("Unknown feed type: {}", s)),
        }
    }
}

impl std::fmt::Display for FeedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification handed back by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Blog,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Blog => "blog",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_type_round_trips_through_str() {
        for feed_type in [FeedType::Rss, FeedType::Atom, FeedType::Json] {
            assert_eq!(feed_type.as_str().parse::<FeedType>(), Ok(feed_type));
        }
        assert!("opml".parse::<FeedType>().is_err());
    }

    #[test]
    fn test_feed_rs_mapping() {
        assert_eq!(FeedType::from(&feed_rs::model::FeedType::Atom), FeedType::Atom);
        assert_eq!(FeedType::from(&feed_rs::model::FeedType::RSS2), FeedType::Rss);
        assert_eq!(FeedType::from(&feed_rs::model::FeedType::RSS1), FeedType::Rss);
    }
}
