pub mod identity;
pub mod network;
pub mod registry;
pub mod source;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-(exchange, symbol) trading metadata. The metadata ingestion side
/// publishes one blob per exchange with these compact field names; a blob
/// replaces the previous one wholesale on every refresh.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExchangeMetadata {
    #[serde(rename = "s", default)]
    pub symbol: String,
    #[serde(rename = "w", default)]
    pub wallet: Option<WalletInfo>,
    #[serde(rename = "f", default)]
    pub futures: Option<FuturesInfo>,
    #[serde(rename = "fees", default)]
    pub fees: Option<FeeInfo>,
    #[serde(rename = "ts", default)]
    pub loaded_at: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WalletInfo {
    #[serde(default)]
    pub deposit: bool,
    #[serde(default)]
    pub withdraw: bool,
    #[serde(default)]
    pub networks: Option<HashMap<String, NetworkDetail>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDetail {
    #[serde(default)]
    pub deposit: bool,
    #[serde(default)]
    pub withdraw: bool,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub withdraw_fee: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesInfo {
    #[serde(default)]
    pub max_cost: Option<f64>,
    #[serde(default)]
    pub funding_rate: Option<f64>,
    #[serde(default)]
    pub next_funding_time: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeeInfo {
    #[serde(default)]
    pub taker: Option<f64>,
    #[serde(default)]
    pub maker: Option<f64>,
}
