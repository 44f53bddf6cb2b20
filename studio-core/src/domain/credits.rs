//! Credit ledger types
//!
//! The API is not consistent about field names, so synonyms are kept as
//! separate optional fields and resolved by accessor methods.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Current credit balance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub balance: Option<i64>,
    #[serde(default)]
    pub credits: Option<i64>,
}

impl Balance {
    pub fn amount(&self) -> Option<i64> {
        self.balance.or(self.credits)
    }
}

/// Cost of one generation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub endpoint: String,
    #[serde(default)]
    pub credits_per_call: Option<i64>,
    #[serde(default)]
    pub credits_per_image: Option<i64>,
}

impl PricingEntry {
    pub fn cost(&self) -> Option<i64> {
        self.credits_per_image.or(self.credits_per_call)
    }

    /// Seed generation is internal to character creation and not priced for users
    pub fn is_listed(&self) -> bool {
        self.endpoint != "seed"
    }

    /// User facing name of the endpoint
    pub fn label(&self) -> &str {
        match self.endpoint.as_str() {
            "create" => "Generate",
            "turnaround" => "SetChar",
            "random" => "Random",
            other => other,
        }
    }
}

/// Pricing arrives either as a bare list or as `{ "pricing": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PricingList {
    List(Vec<PricingEntry>),
    Keyed { pricing: Vec<PricingEntry> },
}

impl PricingList {
    pub fn into_entries(self) -> Vec<PricingEntry> {
        match self {
            PricingList::List(entries) | PricingList::Keyed { pricing: entries } => entries,
        }
    }
}

/// One credit ledger line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub credits: Option<i64>,
    #[serde(default)]
    pub balance_after: Option<i64>,
    #[serde(default)]
    pub balance: Option<i64>,
}

impl Transaction {
    pub fn label(&self) -> &str {
        self.kind
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("-")
    }

    pub fn delta(&self) -> i64 {
        self.amount.or(self.credits).unwrap_or(0)
    }

    pub fn balance_after(&self) -> Option<i64> {
        self.balance_after.or(self.balance)
    }
}

/// Reads a timestamp that may lack a timezone; naive times are taken as UTC.
/// Anything unparseable becomes `None` instead of failing the whole record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum Raw {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let Some(Raw::Text(text)) = Option::<Raw>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(parse_timestamp(text.trim()))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// A purchasable credit bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub credits: Option<i64>,
    #[serde(default)]
    pub price_in_usd: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Bundle {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Bundle")
    }

    pub fn display_price(&self) -> String {
        match self.price_in_usd {
            Some(price) => format!("${:.2}", price),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleList {
    #[serde(default)]
    pub bundles: Vec<Bundle>,
}

/// Checkout session created for a bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    #[serde(default)]
    pub payment_id: Option<i64>,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Checkout {
    pub fn payment_url(&self) -> Option<&str> {
        self.payment_url
            .as_deref()
            .or(self.checkout_url.as_deref())
            .or(self.url.as_deref())
    }
}

/// State of a payment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatus {
    #[serde(default)]
    pub payment_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub credits: Option<i64>,
}
