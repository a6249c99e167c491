// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use avis_app::{
    Client, ClientGateway, ClientId, Polarity, Sentiment, SentimentGateway, SentimentId,
};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Noor", "Riley", "Morgan", "Casey", "Imani", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Sasha", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martinez", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Okafor", "Bennett", "Price", "Morris", "Foster", "Nguyen",
];
const MAIL_DOMAINS: [&str; 5] = [
    "example.com",
    "corp.example.net",
    "mailbox.test",
    "acme-industries.com",
    "clientdesk.io",
];

const POSITIVE_REMARKS: [&str; 12] = [
    "Support resolved my ticket within the hour",
    "Onboarding was quick and the docs were clear",
    "Billing questions were answered the same day",
    "The dashboard makes weekly reporting painless",
    "Renewal was straightforward and fairly priced",
    "Exports run noticeably faster since the update",
    "The account team checks in without being pushy",
    "Setup took minutes instead of the week we budgeted",
    "Uptime has been flawless all quarter",
    "The API documentation covers every edge we hit",
    "Training sessions got the whole team productive",
    "Feature requests actually ship within a release or two",
];
const NEGATIVE_REMARKS: [&str; 12] = [
    "Invoices keep arriving after the due date",
    "Support tickets sit unanswered for days",
    "The search feature misses obvious matches",
    "Exports time out on anything over a thousand rows",
    "Pricing changed twice this year without notice",
    "The mobile view is unusable on small screens",
    "Password resets loop back to the login page",
    "Release notes never mention breaking changes",
    "The integration drops events under load",
    "Onboarding assumed knowledge we did not have",
    "Session timeouts log us out mid-form",
    "The status page stayed green through the outage",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for client and review fixtures.
#[derive(Debug, Clone)]
pub struct ReviewFaker {
    rng: DeterministicRng,
}

impl ReviewFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn email(&mut self) -> String {
        let first = self.pick(&FIRST_NAMES).to_ascii_lowercase();
        let last = self.pick(&LAST_NAMES).to_ascii_lowercase();
        let domain = self.pick(&MAIL_DOMAINS);
        format!("{first}.{last}@{domain}")
    }

    pub fn polarity(&mut self) -> Polarity {
        Polarity::ALL[self.rng.int_n(Polarity::ALL.len())]
    }

    pub fn review_text(&mut self, polarity: Polarity) -> String {
        let pool: &[&str] = match polarity {
            Polarity::Positive => &POSITIVE_REMARKS,
            Polarity::Negative => &NEGATIVE_REMARKS,
        };
        self.pick(pool).to_owned()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// In-memory stand-in for the review data service. Ids grow monotonically and
/// rows survive only as long as the value, like the real backend within one run.
#[derive(Debug, Clone)]
pub struct MemoryService {
    clients: Vec<Client>,
    sentiments: Vec<Sentiment>,
    next_client_id: i64,
    next_sentiment_id: i64,
}

impl MemoryService {
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
            sentiments: Vec::new(),
            next_client_id: 1,
            next_sentiment_id: 1,
        }
    }

    /// Service preloaded with faked rows. Every seeded sentiment references a
    /// seeded client, so resolution starts out fully known.
    pub fn seeded(seed: u64, client_count: usize, sentiment_count: usize) -> Result<Self> {
        let mut faker = ReviewFaker::new(seed);
        let mut service = Self::new();

        let mut client_ids = Vec::with_capacity(client_count);
        for _ in 0..client_count {
            let client = ClientGateway::create(&mut service, &faker.email())?;
            client_ids.push(client.id);
        }

        if sentiment_count > 0 && client_ids.is_empty() {
            bail!("seeding sentiments requires at least one client");
        }
        for _ in 0..sentiment_count {
            let owner = client_ids[faker.int_n(client_ids.len())];
            let polarity = faker.polarity();
            let text = faker.review_text(polarity);
            SentimentGateway::create(&mut service, &text, polarity, owner)?;
        }

        Ok(service)
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn sentiments(&self) -> &[Sentiment] {
        &self.sentiments
    }
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientGateway for MemoryService {
    fn list(&mut self) -> Result<Vec<Client>> {
        Ok(self.clients.clone())
    }

    fn create(&mut self, email: &str) -> Result<Client> {
        let client = Client {
            id: ClientId::new(self.next_client_id),
            email: email.to_owned(),
        };
        self.next_client_id += 1;
        self.clients.push(client.clone());
        Ok(client)
    }

    fn update(&mut self, id: ClientId, email: &str) -> Result<Client> {
        let client = self
            .clients
            .iter_mut()
            .find(|client| client.id == id)
            .with_context(|| format!("no client with id {}", id.get()))?;
        client.email = email.to_owned();
        Ok(client.clone())
    }

    // No cascade: sentiments keep their owner id after the client is gone,
    // and the console renders those references as unknown.
    fn remove(&mut self, id: ClientId) -> Result<()> {
        let before = self.clients.len();
        self.clients.retain(|client| client.id != id);
        if self.clients.len() == before {
            bail!("no client with id {}", id.get());
        }
        Ok(())
    }
}

impl SentimentGateway for MemoryService {
    fn list(&mut self) -> Result<Vec<Sentiment>> {
        Ok(self.sentiments.clone())
    }

    fn create(&mut self, text: &str, polarity: Polarity, client_id: ClientId) -> Result<Sentiment> {
        if !self.clients.iter().any(|client| client.id == client_id) {
            bail!("no client with id {}", client_id.get());
        }
        let sentiment = Sentiment {
            id: SentimentId::new(self.next_sentiment_id),
            text: text.to_owned(),
            polarity,
            client_id: Some(client_id),
        };
        self.next_sentiment_id += 1;
        self.sentiments.push(sentiment.clone());
        Ok(sentiment)
    }

    fn update(&mut self, id: SentimentId, text: &str, polarity: Polarity) -> Result<Sentiment> {
        let sentiment = self
            .sentiments
            .iter_mut()
            .find(|sentiment| sentiment.id == id)
            .with_context(|| format!("no sentiment with id {}", id.get()))?;
        sentiment.text = text.to_owned();
        sentiment.polarity = polarity;
        Ok(sentiment.clone())
    }

    fn remove(&mut self, id: SentimentId) -> Result<()> {
        let before = self.sentiments.len();
        self.sentiments.retain(|sentiment| sentiment.id != id);
        if self.sentiments.len() == before {
            bail!("no sentiment with id {}", id.get());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryService, NEGATIVE_REMARKS, POSITIVE_REMARKS, ReviewFaker};
    use avis_app::{ClientGateway, ClientId, Polarity, SentimentGateway};
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = ReviewFaker::new(42);
        let mut right = ReviewFaker::new(42);

        assert_eq!(left.email(), right.email());
        let polarity = left.polarity();
        assert_eq!(polarity, right.polarity());
        assert_eq!(left.review_text(polarity), right.review_text(polarity));
    }

    #[test]
    fn zero_seed_still_generates() {
        let mut faker = ReviewFaker::new(0);
        assert!(faker.email().contains('@'));
    }

    #[test]
    fn email_is_lowercase_with_domain() {
        let mut faker = ReviewFaker::new(11);
        let email = faker.email();
        assert_eq!(email, email.to_ascii_lowercase());
        let (local, domain) = email.split_once('@').expect("email should have a domain");
        assert!(local.contains('.'));
        assert!(!domain.is_empty());
    }

    #[test]
    fn variety_across_seeds() {
        let mut emails = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let mut faker = ReviewFaker::new(seed);
            emails.insert(faker.email());
        }
        assert!(emails.len() >= 10, "got {}", emails.len());
    }

    #[test]
    fn polarity_covers_both_values() {
        let mut faker = ReviewFaker::new(7);
        let mut seen = BTreeSet::new();
        for _ in 0..50 {
            seen.insert(faker.polarity().as_str());
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn review_text_comes_from_matching_pool() {
        let mut faker = ReviewFaker::new(3);
        let praise = faker.review_text(Polarity::Positive);
        let complaint = faker.review_text(Polarity::Negative);
        assert!(POSITIVE_REMARKS.contains(&praise.as_str()));
        assert!(NEGATIVE_REMARKS.contains(&complaint.as_str()));
    }

    #[test]
    fn int_n() {
        let mut faker = ReviewFaker::new(42);
        for _ in 0..100 {
            let value = faker.int_n(5);
            assert!(value < 5);
        }
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let mut service = MemoryService::new();
        let first =
            ClientGateway::create(&mut service, "a@test.com").expect("create should succeed");
        let second =
            ClientGateway::create(&mut service, "b@test.com").expect("create should succeed");
        assert_eq!(first.id.get(), 1);
        assert_eq!(second.id.get(), 2);
    }

    #[test]
    fn update_missing_client_fails() {
        let mut service = MemoryService::new();
        let error = ClientGateway::update(&mut service, ClientId::new(9), "x@test.com")
            .expect_err("update should fail");
        assert!(error.to_string().contains("no client with id 9"));
    }

    #[test]
    fn sentiment_creation_requires_existing_owner() {
        let mut service = MemoryService::new();
        let error =
            SentimentGateway::create(&mut service, "text", Polarity::Positive, ClientId::new(1))
                .expect_err("create should fail without the owner");
        assert!(error.to_string().contains("no client with id 1"));
    }

    #[test]
    fn removing_client_keeps_owned_sentiments() {
        let mut service = MemoryService::new();
        let owner =
            ClientGateway::create(&mut service, "a@test.com").expect("create should succeed");
        SentimentGateway::create(&mut service, "slow invoices", Polarity::Negative, owner.id)
            .expect("create should succeed");

        ClientGateway::remove(&mut service, owner.id).expect("remove should succeed");

        let rows = SentimentGateway::list(&mut service).expect("list should succeed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].client_id, Some(owner.id));
    }

    #[test]
    fn seeded_is_deterministic() {
        let left = MemoryService::seeded(42, 4, 9).expect("seeding should succeed");
        let right = MemoryService::seeded(42, 4, 9).expect("seeding should succeed");
        assert_eq!(left.clients(), right.clients());
        assert_eq!(left.sentiments(), right.sentiments());
    }

    #[test]
    fn seeded_rows_reference_seeded_clients() {
        let service = MemoryService::seeded(7, 3, 12).expect("seeding should succeed");
        assert_eq!(service.clients().len(), 3);
        assert_eq!(service.sentiments().len(), 12);
        for sentiment in service.sentiments() {
            let owner = sentiment.client_id.expect("seeded rows are owned");
            assert!(service.clients().iter().any(|client| client.id == owner));
        }
    }

    #[test]
    fn seeding_sentiments_without_clients_fails() {
        let error = MemoryService::seeded(1, 0, 3).expect_err("seeding should fail");
        assert!(error.to_string().contains("at least one client"));
    }
}
