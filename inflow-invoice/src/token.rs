use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::Value;
use url::Url;

use crate::error::{InvalidInvoice, SchemaError};
use crate::record::InvoiceRecord;
use crate::schema;
use crate::{PAY_PATH, TOKEN_QUERY_PARAM};

/// Standard alphabet, tolerant of missing padding and non-zero trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Pack a record into a URL-safe token.
///
/// Base64url without padding over the compact UTF-8 JSON. The record is not
/// validated here; use [`InvoiceBuilder`](crate::InvoiceBuilder) for that.
pub fn encode_invoice(record: &InvoiceRecord) -> String {
    // string keys with string and unit-enum values; serializing cannot fail
    let json = serde_json::to_vec(record).expect("invoice record serializes");
    URL_SAFE_NO_PAD.encode(json)
}

/// Unpack a token produced by [`encode_invoice`] (or by anyone else).
///
/// Never panics. Whitespace around the token is ignored; padding is optional.
pub fn decode_invoice(token: &str) -> Result<InvoiceRecord, InvalidInvoice> {
    let result = decode_token(token);
    if let Err(e) = &result {
        tracing::debug!("rejected invoice token ({} bytes): {}", token.len(), e);
    }
    result
}

/// Decode the raw query value, treating a missing parameter as invalid.
pub fn decode_invoice_param(param: Option<&str>) -> Result<InvoiceRecord, InvalidInvoice> {
    match param {
        Some(token) => decode_invoice(token),
        None => Err(InvalidInvoice::Empty),
    }
}

fn decode_token(token: &str) -> Result<InvoiceRecord, InvalidInvoice> {
    let token = token.trim();
    if token.is_empty() {
        return Err(InvalidInvoice::Empty);
    }

    let mut standard: String = token
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    while standard.len() % 4 != 0 {
        standard.push('=');
    }

    let bytes = LENIENT
        .decode(standard.as_bytes())
        .map_err(|e| InvalidInvoice::Base64(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| InvalidInvoice::Utf8(e.to_string()))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|e| InvalidInvoice::Json(e.to_string()))?;

    let normalized = schema::validate(&value)?;
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| InvalidInvoice::Schema(SchemaError::single("$", e.to_string())))
}

/// Pay-page link for a record: `<origin>/pay?i=<token>`.
pub fn build_shareable_url(record: &InvoiceRecord, base_origin: &str) -> String {
    format!(
        "{}{}?{}={}",
        base_origin.trim_end_matches('/'),
        PAY_PATH,
        TOKEN_QUERY_PARAM,
        encode_invoice(record)
    )
}

/// Extract the token from a pay link, if it carries one.
pub fn token_from_url(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Decode the invoice carried by a full pay link.
pub fn decode_invoice_url(link: &str) -> Result<InvoiceRecord, InvalidInvoice> {
    decode_invoice_param(token_from_url(link).as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Network;

    const RECIPIENT: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    const TOKEN: &str = "eyJyZWNpcGllbnQiOiJTVDFQUUhRS1YwUkpYWkZZMURHWDhNTlNOWVZFM1ZHWkpTUlRQR1pHTSIsImFtb3VudCI6IjEwMC4wMCIsInRva2VuIjoiVVNEQyIsIm5ldHdvcmsiOiJzdGFja3MifQ";

    #[test]
    fn test_encode_known_token() {
        let record = InvoiceRecord::new(RECIPIENT, "100.00");
        let token = encode_invoice(&record);
        assert_eq!(token, TOKEN);
        assert!(!token.contains(['+', '/', '=']));
    }

    #[test]
    fn test_decode_known_token() {
        let record = decode_invoice(TOKEN).unwrap();
        assert_eq!(record.recipient, RECIPIENT);
        assert_eq!(record.amount, "100.00");
        assert_eq!(record.network, Network::Stacks);
    }

    #[test]
    fn test_decode_tolerates_padding_and_whitespace() {
        let padded = format!("  {}==\n", TOKEN);
        assert_eq!(decode_invoice(&padded).unwrap(), decode_invoice(TOKEN).unwrap());
    }

    #[test]
    fn test_decode_failures() {
        assert_eq!(decode_invoice(""), Err(InvalidInvoice::Empty));
        assert_eq!(decode_invoice_param(None), Err(InvalidInvoice::Empty));
        assert!(matches!(decode_invoice("!!!"), Err(InvalidInvoice::Base64(_))));
        // "/w" decodes to a lone 0xff byte
        assert!(matches!(decode_invoice("_w"), Err(InvalidInvoice::Utf8(_))));
        // "aGVsbG8" is "hello"
        assert!(matches!(decode_invoice("aGVsbG8"), Err(InvalidInvoice::Json(_))));
        // {"recipient":"short"}
        assert!(matches!(
            decode_invoice("eyJyZWNpcGllbnQiOiJzaG9ydCJ9"),
            Err(InvalidInvoice::Schema(_))
        ));
    }

    #[test]
    fn test_shareable_url() {
        let record = InvoiceRecord::new(RECIPIENT, "100.00");
        let link = build_shareable_url(&record, "https://inflow.app/");
        assert_eq!(link, format!("https://inflow.app/pay?i={}", TOKEN));

        assert_eq!(token_from_url(&link).as_deref(), Some(TOKEN));
        assert_eq!(decode_invoice_url(&link).unwrap(), record);
    }

    #[test]
    fn test_link_without_token() {
        assert_eq!(token_from_url("https://inflow.app/pay"), None);
        assert_eq!(token_from_url("not a url"), None);
        assert_eq!(
            decode_invoice_url("https://inflow.app/pay?x=1"),
            Err(InvalidInvoice::Empty)
        );
    }
}
