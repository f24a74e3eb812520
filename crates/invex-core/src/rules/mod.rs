//! Rule-based validators and calculators for invoice fields.

pub mod amounts;
pub mod dates;
pub mod derived;
pub mod patterns;
pub mod terms;
pub mod validators;

pub use amounts::{
    format_amount, is_currency_amount, normalize_amount, normalize_signed_amount, parse_amount,
};
pub use dates::{find_date, format_date, normalize_date, parse_date};
pub use derived::{
    apply_credit_sign, calculate_discount_due_date, calculate_discounted_total,
    discount_due_date, discounted_total, net_days,
};
pub use terms::{CREDIT_LABELS, is_credit_label, is_credit_title, normalize_terms};
pub use validators::{Validator, clean_identifier, clean_value, is_invoice_number, is_po_number};
