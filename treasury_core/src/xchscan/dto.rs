use serde::Deserialize;

use crate::helpers::lenient;

#[derive(Debug, Clone, Deserialize)]
pub struct AccountBalance {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub xch: f64,
}
