use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FieldProblem;

/// Opaque product identifier. The inventory may hand it out as a JSON string
/// or a number; both are kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawItemId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawItemId::deserialize(deserializer)? {
            RawItemId::Text(text) => Self(text),
            RawItemId::Number(number) => Self(number.to_string()),
        })
    }
}

/// One catalog record as returned by the inventory endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "ItemId")]
    pub item_id: ItemId,
    pub name: String,
    #[serde(default)]
    pub stock: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Product {
    /// Price with two decimals, or `N/A` when the inventory has none.
    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => format!("${price:.2}"),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderField {
    ItemId,
    Quantity,
    CustomerEmail,
}

impl OrderField {
    pub const ALL: [OrderField; 3] = [
        OrderField::ItemId,
        OrderField::Quantity,
        OrderField::CustomerEmail,
    ];

    /// Form name of the field, matching the JSON key on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderField::ItemId => "item_id",
            OrderField::Quantity => "quantity",
            OrderField::CustomerEmail => "customer_email",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderField {
    type Err = FieldProblem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FieldProblem::UnknownField(s.to_string()))
    }
}

/// A single-field change to an [`OrderDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    ItemId(String),
    Quantity(i64),
    CustomerEmail(String),
}

impl FieldEdit {
    /// Builds an edit from raw form input, the way a text field reports it.
    pub fn from_input(name: &str, value: &str) -> Result<Self, FieldProblem> {
        match name.parse::<OrderField>()? {
            OrderField::ItemId => Ok(FieldEdit::ItemId(value.to_string())),
            OrderField::CustomerEmail => Ok(FieldEdit::CustomerEmail(value.to_string())),
            OrderField::Quantity => value
                .trim()
                .parse::<i64>()
                .map(FieldEdit::Quantity)
                .map_err(|_| FieldProblem::QuantityNotInteger(value.to_string())),
        }
    }

    pub fn field(&self) -> OrderField {
        match self {
            FieldEdit::ItemId(_) => OrderField::ItemId,
            FieldEdit::Quantity(_) => OrderField::Quantity,
            FieldEdit::CustomerEmail(_) => OrderField::CustomerEmail,
        }
    }
}

/// The user-editable order record. Serializes to the order endpoint's body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub item_id: String,
    pub quantity: i64,
    pub customer_email: String,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            item_id: String::new(),
            quantity: 1,
            customer_email: String::new(),
        }
    }
}

impl OrderDraft {
    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::ItemId(value) => self.item_id = value,
            FieldEdit::Quantity(value) => self.quantity = value,
            FieldEdit::CustomerEmail(value) => self.customer_email = value,
        }
    }

    /// Checks every required field. All problems are reported, in field order.
    pub fn validate(&self) -> Result<(), Vec<FieldProblem>> {
        let mut problems = Vec::new();
        if self.item_id.is_empty() {
            problems.push(FieldProblem::MissingItemId);
        }
        if self.quantity < 1 {
            problems.push(FieldProblem::QuantityBelowMinimum(self.quantity));
        }
        if !is_valid_email(&self.customer_email) {
            problems.push(FieldProblem::MalformedEmail(self.customer_email.clone()));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// Minimal email shape: a local part, one `@`, and a domain whose labels are
/// non-empty. Single-label hosts such as `localhost` are accepted.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)*$").expect("email pattern is valid")
    });
    regex.is_match(email)
}
