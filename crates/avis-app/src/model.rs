// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub const ALL: [Self; 2] = [Self::Positive, Self::Negative];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// A customer record. Always server-assigned; create requests carry only the
/// email, so an id-less client never exists in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub email: String,
}

/// A feedback entry. The owning client is fixed at creation time; `client_id`
/// is `None` for backend rows whose reference was never set or has been
/// stripped, which the resolver renders as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    pub id: SentimentId,
    pub text: String,
    pub polarity: Polarity,
    pub client_id: Option<ClientId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKind {
    Clients,
    Sentiments,
}

impl TabKind {
    pub const ALL: [Self; 2] = [Self::Clients, Self::Sentiments];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Sentiments => "sentiments",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Nav,
    Form,
}

#[cfg(test)]
mod tests {
    use super::Polarity;

    #[test]
    fn polarity_string_round_trip() {
        for polarity in Polarity::ALL {
            let parsed = Polarity::parse(polarity.as_str()).expect("label should parse back");
            assert_eq!(parsed, polarity);
        }
        assert_eq!(Polarity::parse("POSITIF"), None);
    }

    #[test]
    fn polarity_toggle_alternates() {
        assert_eq!(Polarity::Positive.toggled(), Polarity::Negative);
        assert_eq!(Polarity::Negative.toggled().toggled(), Polarity::Negative);
    }
}
