//! Quote and profile payloads.
//!
//! Every field is optional because the upstream provider omits fields
//! freely. Absent fields are skipped on serialization so a payload passes
//! through the proxy unchanged.

use serde::{Deserialize, Serialize};

/// A quote snapshot in the provider's short-field format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotePayload {
    /// Current price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<f64>,
    /// Absolute change since previous close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<f64>,
    /// Percent change since previous close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<f64>,
    /// Day high.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    /// Day low.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<f64>,
    /// Day open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o: Option<f64>,
    /// Previous close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pc: Option<f64>,
    /// Quote timestamp (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<i64>,
}

impl QuotePayload {
    /// Build a synthetic quote from a bare exchange rate.
    ///
    /// Change fields are zero since the rate source has no intraday history.
    #[must_use]
    pub const fn from_rate(rate: f64, timestamp_secs: i64) -> Self {
        Self {
            c: Some(rate),
            d: Some(0.0),
            dp: Some(0.0),
            h: None,
            l: None,
            o: None,
            pc: None,
            t: Some(timestamp_secs),
        }
    }

    /// Current price, if present and strictly positive.
    #[must_use]
    pub fn usable_price(&self) -> Option<f64> {
        self.c.filter(|c| c.is_finite() && *c > 0.0)
    }
}

/// Company metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Company name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Logo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Ticker as listed by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Listing exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    /// Country of incorporation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Reporting currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Provider industry classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finnhub_industry: Option<String>,
    /// IPO date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipo: Option<String>,
    /// Market capitalization (millions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_capitalization: Option<f64>,
    /// Shares outstanding (millions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_outstanding: Option<f64>,
    /// Company website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weburl: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CompanyProfile {
    /// Whether the profile carries a non-empty name worth caching.
    #[must_use]
    pub fn has_usable_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// A value held by the quote cache.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketPayload {
    /// Price quote (stock or forex).
    Quote(QuotePayload),
    /// Company profile.
    Profile(CompanyProfile),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_not_serialized() {
        let quote = QuotePayload {
            c: Some(150.2),
            d: Some(1.1),
            dp: Some(0.73),
            ..Default::default()
        };
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json, serde_json::json!({"c": 150.2, "d": 1.1, "dp": 0.73}));
    }

    #[test]
    fn missing_fields_deserialize_to_none() {
        let quote: QuotePayload = serde_json::from_str(r#"{"c": 10.5}"#).unwrap();
        assert_eq!(quote.c, Some(10.5));
        assert!(quote.d.is_none());
        assert!(quote.t.is_none());
    }

    #[test]
    fn usable_price_requires_positive() {
        let mut quote = QuotePayload::default();
        assert!(quote.usable_price().is_none());
        quote.c = Some(0.0);
        assert!(quote.usable_price().is_none());
        quote.c = Some(-3.0);
        assert!(quote.usable_price().is_none());
        quote.c = Some(12.0);
        assert_eq!(quote.usable_price(), Some(12.0));
    }

    #[test]
    fn rate_quote_shape() {
        let quote = QuotePayload::from_rate(1.08, 1_700_000_000);
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"c": 1.08, "d": 0.0, "dp": 0.0, "t": 1_700_000_000})
        );
    }

    #[test]
    fn profile_uses_provider_field_names() {
        let profile: CompanyProfile = serde_json::from_str(
            r#"{"name":"Apple Inc","finnhubIndustry":"Technology","marketCapitalization":3000000.5}"#,
        )
        .unwrap();
        assert_eq!(profile.finnhub_industry.as_deref(), Some("Technology"));
        assert!(profile.has_usable_name());

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("finnhubIndustry").is_some());
        assert!(json.get("logo").is_none());
    }

    #[test]
    fn blank_name_is_not_usable() {
        let profile = CompanyProfile {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!profile.has_usable_name());
        assert!(!CompanyProfile::default().has_usable_name());
    }
}
