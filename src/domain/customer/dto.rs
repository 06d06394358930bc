use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One page of `GET /customers`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPage {
    #[serde(default)]
    pub list: Vec<Value>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumerList {
    pub consumers: Vec<Consumer>,
    pub total: i64,
}

/// Coupon or privilege attached to a member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Benefit {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub is_valid: bool,
    /// Enabled flag; the backend sends a bool, a 0/1 number or a string
    #[serde(default)]
    pub status: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Benefit {
    pub fn is_available(&self) -> bool {
        self.is_valid && is_truthy(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitFilters {
    #[serde(rename = "type", default)]
    pub benefit_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Default for BenefitFilters {
    fn default() -> Self {
        Self {
            benefit_type: None,
            status: Some("active".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Benefits {
    #[serde(default)]
    pub coupons: Vec<Benefit>,
    #[serde(default)]
    pub privileges: Vec<Benefit>,
    #[serde(default)]
    pub coupons_count: i64,
    #[serde(default)]
    pub privileges_count: i64,
    #[serde(default)]
    pub total_count: i64,
    #[serde(default)]
    pub filters: BenefitFilters,
}

impl Benefits {
    pub fn has_benefits(&self) -> bool {
        !self.coupons.is_empty() || !self.privileges.is_empty()
    }

    pub fn available_coupons(&self) -> usize {
        self.coupons.iter().filter(|c| c.is_available()).count()
    }

    pub fn available_privileges(&self) -> usize {
        self.privileges.iter().filter(|p| p.is_available()).count()
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
