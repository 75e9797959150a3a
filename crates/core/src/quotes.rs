//! Per-source price quotes
//!
//! A [`Quote`] is what a source adapter hands to the aggregation engine. The
//! valid/invalid split is carried by [`Observation`] so the engine can match
//! on it exhaustively instead of checking a nullable price.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Confidence assumed when an adapter does not report one
pub const DEFAULT_SOURCE_CONFIDENCE: f64 = 0.5;

/// Outcome of a single source lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Strictly positive, finite price with the source's confidence in [0, 1]
    Valid { price: f64, confidence: f64 },
    /// No usable price; `reason` explains why
    Invalid { reason: String },
}

/// Key the adapter used for its price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Price,
    PriceUsd,
}

impl PriceField {
    fn key(self) -> &'static str {
        match self {
            PriceField::Price => "price",
            PriceField::PriceUsd => "price_usd",
        }
    }
}

/// Fields exactly as the adapter sent them, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct Reported {
    /// `None` when the record carried no price key at all
    pub price_field: Option<PriceField>,
    pub price: Option<f64>,
    pub confidence: Option<f64>,
    pub error: Option<String>,
}

/// Price quote from one source plus opaque provenance fields.
///
/// The engine reads [`Observation`]; the wire form is rebuilt from
/// [`Reported`] and `extra`, so a quote serializes the way it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub source: String,
    pub observation: Observation,
    pub reported: Reported,
    /// Provenance (method, market data, liquidity). Passed through untouched.
    pub extra: Map<String, Value>,
}

impl Quote {
    /// Normalize raw adapter output.
    ///
    /// A present, finite, strictly positive price becomes [`Observation::Valid`];
    /// anything else becomes [`Observation::Invalid`] with the adapter's error
    /// (or a generated description) as reason.
    pub fn new(
        source: impl Into<String>,
        price: Option<f64>,
        confidence: Option<f64>,
        error: Option<String>,
    ) -> Self {
        Self::from_reported(
            source.into(),
            Reported {
                price_field: Some(PriceField::Price),
                price,
                confidence,
                error,
            },
            Map::new(),
        )
    }

    fn from_reported(source: String, reported: Reported, extra: Map<String, Value>) -> Self {
        let observation = match reported.price {
            Some(p) if p.is_finite() && p > 0.0 => Observation::Valid {
                price: p,
                confidence: normalize_confidence(reported.confidence),
            },
            Some(p) => Observation::Invalid {
                reason: reported
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("Non-positive price reported: {p}")),
            },
            None => Observation::Invalid {
                reason: reported
                    .error
                    .clone()
                    .unwrap_or_else(|| "No price reported".to_string()),
            },
        };

        Self {
            source,
            observation,
            reported,
            extra,
        }
    }

    pub fn valid(source: impl Into<String>, price: f64, confidence: f64) -> Self {
        Self::new(source, Some(price), Some(confidence), None)
    }

    pub fn failed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(source, None, None, Some(reason.into()))
    }

    /// Attach a provenance field
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Attach a provenance field only when a value is present
    pub fn with_optional_extra<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with_extra(key, v),
            None => self,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.observation, Observation::Valid { .. })
    }

    pub fn price(&self) -> Option<f64> {
        match self.observation {
            Observation::Valid { price, .. } => Some(price),
            Observation::Invalid { .. } => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self.observation {
            Observation::Valid { confidence, .. } => Some(confidence),
            Observation::Invalid { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.observation {
            Observation::Valid { .. } => None,
            Observation::Invalid { reason } => Some(reason),
        }
    }

    /// Numeric provenance field, if present
    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }
}

fn normalize_confidence(confidence: Option<f64>) -> f64 {
    match confidence {
        Some(c) if !c.is_nan() => c.clamp(0.0, 1.0),
        _ => DEFAULT_SOURCE_CONFIDENCE,
    }
}

// Wire shape: `{source, price|price_usd, confidence?, error?, ...extra}`

impl Serialize for Quote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("source", &self.source)?;
        if let Some(field) = self.reported.price_field {
            map.serialize_entry(field.key(), &self.reported.price)?;
        }
        if let Some(confidence) = self.reported.confidence {
            map.serialize_entry("confidence", &confidence)?;
        }
        if let Some(error) = &self.reported.error {
            map.serialize_entry("error", error)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Quote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut record = Map::<String, Value>::deserialize(deserializer)?;

        let source = match record.remove("source") {
            Some(Value::String(source)) => source,
            Some(other) => return Err(de::Error::custom(format!("source must be a string, got {other}"))),
            None => return Err(de::Error::missing_field("source")),
        };

        let (price_field, price) = if let Some(value) = record.remove("price") {
            (Some(PriceField::Price), number("price", value)?)
        } else if let Some(value) = record.remove("price_usd") {
            (Some(PriceField::PriceUsd), number("price_usd", value)?)
        } else {
            (None, None)
        };

        let confidence = match record.remove("confidence") {
            Some(value) => number("confidence", value)?,
            None => None,
        };

        let error = match record.remove("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(error)) => Some(error),
            Some(other) => Some(other.to_string()),
        };

        let reported = Reported {
            price_field,
            price,
            confidence,
            error,
        };
        Ok(Quote::from_reported(source, reported, record))
    }
}

fn number<E: de::Error>(key: &str, value: Value) -> Result<Option<f64>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        other => Err(E::custom(format!("{key} must be a number or null, got {other}"))),
    }
}
