//! Pay-per-call gate
//!
//! A gate sits in front of a priced resource. For each request it either
//! answers with the [`PaymentTerms`] the caller must satisfy (which convert
//! directly into an invoice and a pay link) or with the receipt of a payment
//! it accepted. The transport carrying requests is up to the implementor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::record::{InvoiceBuilder, InvoiceRecord, Network};
use crate::token::build_shareable_url;
use crate::MAX_MEMO_LEN;

/// What a caller has to pay to get through the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTerms {
    pub pay_to: String,
    /// Decimal token amount
    pub amount: String,
    pub token: String,
    pub network: Network,
    /// Resource the payment unlocks
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PaymentTerms {
    /// Invoice asking for these terms. The description becomes the memo,
    /// cut to the memo limit.
    pub fn to_invoice(&self) -> Result<InvoiceRecord, SchemaError> {
        let mut builder = InvoiceBuilder::new(&self.pay_to, &self.amount)
            .token(&self.token)
            .network(self.network);
        if let Some(description) = &self.description {
            builder = builder.memo(truncate_utf16(description, MAX_MEMO_LEN));
        }
        builder.created_now().build()
    }

    pub fn pay_link(&self, base_origin: &str) -> Result<String, SchemaError> {
        Ok(build_shareable_url(&self.to_invoice()?, base_origin))
    }
}

fn truncate_utf16(text: &str, max_units: usize) -> String {
    let mut units = 0;
    text.chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= max_units
        })
        .collect()
}

/// Proof of an accepted payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub tx_id: String,
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentCheck {
    /// Payment missing or insufficient
    Required(PaymentTerms),
    Passed(PaymentReceipt),
}

impl PaymentCheck {
    pub fn is_passed(&self) -> bool {
        matches!(self, PaymentCheck::Passed(_))
    }
}

#[async_trait]
pub trait PaymentGate: Send + Sync {
    /// Whatever the transport hands the gate (headers, a request object, ...)
    type Request: Send + Sync;

    async fn check_payment(&self, request: &Self::Request) -> PaymentCheck;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> PaymentTerms {
        PaymentTerms {
            pay_to: "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".to_string(),
            amount: "0.25".to_string(),
            token: "USDC".to_string(),
            network: Network::Stacks,
            resource: "/api/report".to_string(),
            description: Some(
                "Premium market report for the current trading week ahead".to_string(),
            ),
        }
    }

    #[test]
    fn test_terms_to_invoice() {
        let invoice = terms().to_invoice().unwrap();
        assert_eq!(invoice.amount, "0.25");
        assert_eq!(invoice.memo.as_deref().map(|m| m.len()), Some(MAX_MEMO_LEN));
        assert!(invoice.created_at.is_some());
    }

    #[test]
    fn test_pay_link() {
        let link = terms().pay_link("https://inflow.app").unwrap();
        assert!(link.starts_with("https://inflow.app/pay?i="));
        let decoded = crate::decode_invoice_url(&link).unwrap();
        assert_eq!(decoded.recipient, terms().pay_to);
        assert_eq!(decoded.amount, "0.25");
    }

    #[test]
    fn test_truncate_utf16() {
        assert_eq!(truncate_utf16("abc", 2), "ab");
        assert_eq!(truncate_utf16("a\u{1F600}", 2), "a");
        assert_eq!(truncate_utf16("", 5), "");
    }

    #[test]
    fn test_terms_json() {
        let json = serde_json::to_value(terms()).unwrap();
        assert_eq!(json["payTo"], "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
        assert_eq!(json["network"], "stacks");
    }
}
