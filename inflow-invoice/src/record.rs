use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema;
use crate::DEFAULT_TOKEN;

/// Network an invoice is settled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Stacks,
    Ethereum,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Stacks => "stacks",
            Network::Ethereum => "ethereum",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stacks" => Ok(Network::Stacks),
            "ethereum" => Ok(Network::Ethereum),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

fn default_token() -> String {
    DEFAULT_TOKEN.to_string()
}

/// The invoice carried inside a pay link.
///
/// Field order here is the JSON field order, which fixes the token bytes.
/// Absent optional fields are left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    pub recipient: String,
    /// Decimal string, at most 6 fractional digits
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default = "default_token")]
    pub token: String,
    #[serde(default)]
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_network: Option<Network>,
    /// RFC 3339 timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl InvoiceRecord {
    /// Record with only the required fields; everything else defaulted.
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            invoice_id: None,
            recipient: recipient.into(),
            amount: amount.into(),
            memo: None,
            token: default_token(),
            network: Network::default(),
            target_network: None,
            created_at: None,
        }
    }

    /// Check the record against the invoice schema.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let value = serde_json::to_value(self)
            .map_err(|e| SchemaError::single("$", e.to_string()))?;
        schema::validate(&value).map(|_| ())
    }

    /// Network the funds arrive on, falling back to the settlement network.
    pub fn destination(&self) -> Network {
        self.target_network.unwrap_or(self.network)
    }

    /// Whether the payment crosses the bridge
    pub fn is_cross_chain(&self) -> bool {
        self.destination() != self.network
    }
}

/// Fluent construction of a validated [`InvoiceRecord`]
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    record: InvoiceRecord,
}

impl InvoiceBuilder {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            record: InvoiceRecord::new(recipient, amount),
        }
    }

    pub fn invoice_id(mut self, id: impl Into<String>) -> Self {
        self.record.invoice_id = Some(id.into());
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.record.memo = Some(memo.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.record.token = token.into();
        self
    }

    pub fn network(mut self, network: Network) -> Self {
        self.record.network = network;
        self
    }

    pub fn target_network(mut self, network: Network) -> Self {
        self.record.target_network = Some(network);
        self
    }

    /// Stamp `createdAt` with the given instant, millisecond precision, `Z` suffix.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.record.created_at = Some(at.to_rfc3339_opts(SecondsFormat::Millis, true));
        self
    }

    pub fn created_now(self) -> Self {
        self.created_at(Utc::now())
    }

    pub fn build(self) -> Result<InvoiceRecord, SchemaError> {
        self.record.validate()?;
        Ok(self.record)
    }
}
