//! Extraction output.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Output fields of an [`InvoiceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    VendorName,
    InvoiceNumber,
    PoNumber,
    InvoiceDate,
    DiscountTerms,
    DiscountDueDate,
    DiscountedTotal,
    ShippingCost,
    TotalAmount,
}

impl Field {
    /// Every field, in extraction order.
    pub const ALL: [Field; 9] = [
        Field::VendorName,
        Field::InvoiceNumber,
        Field::PoNumber,
        Field::InvoiceDate,
        Field::DiscountTerms,
        Field::TotalAmount,
        Field::ShippingCost,
        Field::DiscountDueDate,
        Field::DiscountedTotal,
    ];

    /// Column name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::VendorName => "vendor_name",
            Field::InvoiceNumber => "invoice_number",
            Field::PoNumber => "po_number",
            Field::InvoiceDate => "invoice_date",
            Field::DiscountTerms => "discount_terms",
            Field::DiscountDueDate => "discount_due_date",
            Field::DiscountedTotal => "discounted_total",
            Field::ShippingCost => "shipping_cost",
            Field::TotalAmount => "total_amount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column order of the exported field array.
pub const COLUMNS: [&str; 7] = [
    "vendor_name",
    "invoice_number",
    "invoice_date",
    "discount_terms",
    "discount_due_date",
    "discounted_total",
    "total_amount",
];

/// Column order of the extended field array.
pub const EXTENDED_COLUMNS: [&str; 9] = [
    "vendor_name",
    "invoice_number",
    "invoice_date",
    "discount_terms",
    "discount_due_date",
    "discounted_total",
    "total_amount",
    "po_number",
    "shipping_cost",
];

/// Fields extracted from one document. An empty string means "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    /// Source file name.
    pub file_name: String,
    pub vendor_name: String,
    pub invoice_number: String,
    pub po_number: String,
    /// Invoice date as `MM/DD/YY`.
    pub invoice_date: String,
    pub discount_terms: String,
    /// Due date for the discount as `MM/DD/YY`.
    pub discount_due_date: String,
    pub discounted_total: String,
    pub shipping_cost: String,
    pub total_amount: String,
}

impl InvoiceRecord {
    /// An all-empty record for the given file.
    pub fn empty(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// Fields in [`COLUMNS`] order.
    pub fn columns(&self) -> [String; 7] {
        [
            self.vendor_name.clone(),
            self.invoice_number.clone(),
            self.invoice_date.clone(),
            self.discount_terms.clone(),
            self.discount_due_date.clone(),
            self.discounted_total.clone(),
            self.total_amount.clone(),
        ]
    }

    /// Fields in [`EXTENDED_COLUMNS`] order.
    pub fn extended_columns(&self) -> [String; 9] {
        let [a, b, c, d, e, f, g] = self.columns();
        [
            a,
            b,
            c,
            d,
            e,
            f,
            g,
            self.po_number.clone(),
            self.shipping_cost.clone(),
        ]
    }

    /// Mutable access to one field.
    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::VendorName => &mut self.vendor_name,
            Field::InvoiceNumber => &mut self.invoice_number,
            Field::PoNumber => &mut self.po_number,
            Field::InvoiceDate => &mut self.invoice_date,
            Field::DiscountTerms => &mut self.discount_terms,
            Field::DiscountDueDate => &mut self.discount_due_date,
            Field::DiscountedTotal => &mut self.discounted_total,
            Field::ShippingCost => &mut self.shipping_cost,
            Field::TotalAmount => &mut self.total_amount,
        }
    }

    /// True when no field was found.
    pub fn is_empty(&self) -> bool {
        self.extended_columns().iter().all(|v| v.is_empty())
    }
}
