use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Canonical short names for differently-labelled blockchain networks.
    /// Exchanges report the same rail under wildly different labels; every
    /// comparison between two venues' networks goes through this table.
    static ref NETWORK_ALIASES: HashMap<&'static str, &'static str> = {
        let mut aliases = HashMap::new();

        aliases.insert("eth", "eth");
        aliases.insert("erc20", "eth");
        aliases.insert("ethereum", "eth");

        aliases.insert("trx", "trx");
        aliases.insert("trc20", "trx");
        aliases.insert("tron", "trx");

        aliases.insert("bsc", "bsc");
        aliases.insert("bep20", "bsc");
        aliases.insert("bsc (bep20)", "bsc");

        aliases.insert("sol", "sol");
        aliases.insert("solana", "sol");

        aliases.insert("matic", "matic");
        aliases.insert("polygon", "matic");
        aliases.insert("erc20 (polygon)", "matic");

        aliases.insert("arb", "arb");
        aliases.insert("arbitrum", "arb");
        aliases.insert("arbone", "arb");

        aliases.insert("op", "op");
        aliases.insert("optimism", "op");

        aliases.insert("avax", "avax");
        aliases.insert("avaxc", "avax");
        aliases.insert("c-chain", "avax");

        aliases
    };
}

/// Map an exchange-reported network label to its canonical short name.
/// Labels not in the alias table pass through lower-cased and trimmed.
pub fn normalize_network(raw: &str) -> String {
    let lower = raw.to_lowercase().trim().to_string();
    match NETWORK_ALIASES.get(lower.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => lower,
    }
}
