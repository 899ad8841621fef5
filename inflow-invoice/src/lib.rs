//! # Inflow invoice links
//!
//! An invoice is a small JSON record (recipient, amount, token, networks and
//! an optional memo). To share it, the record is packed into a single URL-safe
//! token and carried in the query string of a pay page:
//!
//! ```text
//! https://inflow.app/pay?i=eyJyZWNpcGllbnQiOiJTVDFQUUhRS1YwUkpY...
//! ```
//!
//! The token is Base64url (no padding) over the UTF-8 JSON. Decoding is the
//! trust boundary for anything a stranger can put in a link, so it never
//! panics: every failure comes back as [`InvalidInvoice`], and a record is
//! only returned after passing the declarative [`schema`].
//!
//! The crate also carries the invoice history store and the contract of the
//! pay-per-call gate that hands out invoices.

mod error;
pub mod gate;
pub mod history;
mod record;
pub mod schema;
mod token;

pub use error::{HistoryError, InvalidInvoice, SchemaError, SchemaIssue};
pub use gate::{PaymentCheck, PaymentGate, PaymentReceipt, PaymentTerms};
pub use history::{HistoryEntry, HistoryEvent, HistoryStore, MemoryHistoryStore};
pub use record::{InvoiceBuilder, InvoiceRecord, Network};
pub use token::{
    build_shareable_url, decode_invoice, decode_invoice_param, decode_invoice_url,
    encode_invoice, token_from_url,
};

/// Token symbol used when a record does not name one
pub const DEFAULT_TOKEN: &str = "USDC";

/// Path of the pay page
pub const PAY_PATH: &str = "/pay";

/// Query parameter carrying the invoice token
pub const TOKEN_QUERY_PARAM: &str = "i";

/// Maximum memo length in UTF-16 code units
pub const MAX_MEMO_LEN: usize = 50;

/// Shortest accepted recipient address
pub const MIN_RECIPIENT_LEN: usize = 20;

/// Maximum fractional digits in an invoice amount
pub const MAX_AMOUNT_DECIMALS: usize = 6;
