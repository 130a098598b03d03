use core_types::Provider;
use serde_json::Value;

/// Pulls the USD price out of a provider's raw price response.
///
/// Each provider nests the value differently, so the path is dispatched on
/// the provider tag. Returns `None` when the path is missing or the value is
/// not coercible to a finite number, a normal outcome for partial
/// responses, never an error.
pub fn extract_price(provider: Provider, raw: &Value) -> Option<f64> {
    let value = match provider {
        // {"data":[{"prices":[{"value":"1.0006"}]}]}
        Provider::Alchemy => raw
            .get("data")?
            .get(0)?
            .get("prices")?
            .get(0)?
            .get("value")?,
        // {"data":{"price":1.0006}}
        Provider::Mobula => raw.get("data")?.get("price")?,
        // {"data":{"getTokenPrices":[{"priceUsd":1.0006}]}}
        Provider::Codex => raw
            .get("data")?
            .get("getTokenPrices")?
            .get(0)?
            .get("priceUsd")?,
        // {"tether":{"usd":1.0006}} -- keyed by coin id, so take the first entry.
        Provider::Coingecko => raw.as_object()?.values().next()?.get("usd")?,
    };
    coerce_number(value)
}

/// Pulls a balance-presence indicator (the number of token entries) out of a
/// provider's raw wallet response. Same contract as `extract_price`.
pub fn extract_wallet_balance(provider: Provider, raw: &Value) -> Option<f64> {
    let items = match provider {
        // {"result":{"tokenBalances":[...]}}
        Provider::Alchemy => raw.get("result")?.get("tokenBalances")?,
        // {"data":{"assets":[...]}}
        Provider::Mobula => raw.get("data")?.get("assets")?,
        // {"data":{"balances":{"items":[...]}}}
        Provider::Codex => raw.get("data")?.get("balances")?.get("items")?,
        // The oracle has no wallet endpoint.
        Provider::Coingecko => return None,
    };
    items.as_array().map(|a| a.len() as f64)
}

/// Coerces a JSON value to a finite f64. Providers disagree on whether
/// prices arrive as numbers or strings, so both are accepted.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alchemy_price_is_a_nested_string() {
        let raw = json!({"data": [{"symbol": "USDT", "prices": [{"currency": "usd", "value": "1.0006"}]}]});
        assert_eq!(extract_price(Provider::Alchemy, &raw), Some(1.0006));
    }

    #[test]
    fn mobula_price_is_a_nested_number() {
        let raw = json!({"data": {"price": 3021.55, "market_cap": 1.0}});
        assert_eq!(extract_price(Provider::Mobula, &raw), Some(3021.55));
    }

    #[test]
    fn codex_price_comes_from_graphql_data() {
        let raw = json!({"data": {"getTokenPrices": [{"priceUsd": 0.9998}]}});
        assert_eq!(extract_price(Provider::Codex, &raw), Some(0.9998));
    }

    #[test]
    fn coingecko_price_is_keyed_by_coin_id() {
        let raw = json!({"tether": {"usd": 1.001}});
        assert_eq!(extract_price(Provider::Coingecko, &raw), Some(1.001));
    }

    #[test]
    fn missing_path_yields_none() {
        let raw = json!({"data": {}});
        assert_eq!(extract_price(Provider::Alchemy, &raw), None);
        assert_eq!(extract_price(Provider::Mobula, &raw), None);
        assert_eq!(extract_price(Provider::Codex, &raw), None);
    }

    #[test]
    fn non_numeric_values_yield_none() {
        let raw = json!({"data": {"price": "not-a-price"}});
        assert_eq!(extract_price(Provider::Mobula, &raw), None);
        let raw = json!({"data": {"price": null}});
        assert_eq!(extract_price(Provider::Mobula, &raw), None);
    }

    #[test]
    fn wallet_balance_counts_token_entries() {
        let raw = json!({"result": {"tokenBalances": [{}, {}, {}]}});
        assert_eq!(extract_wallet_balance(Provider::Alchemy, &raw), Some(3.0));

        let raw = json!({"data": {"assets": []}});
        assert_eq!(extract_wallet_balance(Provider::Mobula, &raw), Some(0.0));

        let raw = json!({"data": {"balances": {"items": [{}]}}});
        assert_eq!(extract_wallet_balance(Provider::Codex, &raw), Some(1.0));
    }

    #[test]
    fn oracle_has_no_wallet_endpoint() {
        let raw = json!({"anything": true});
        assert_eq!(extract_wallet_balance(Provider::Coingecko, &raw), None);
    }
}
