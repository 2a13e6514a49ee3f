//! A recorded access of the consumer's file by a third party (spec §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inquiry {
    pub creditor_name: String,
    #[serde(default)]
    pub type_of_business: String,
    #[serde(default)]
    pub date_of_inquiry: String,
    #[serde(default)]
    pub credit_bureau: String,
}
