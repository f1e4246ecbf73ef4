//! OLPC canonical JSON encoding

use olpc_cjson::CanonicalFormatter;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::{Error, Result};

// 2^64 and -2^63, exactly representable as f64
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;
const I64_MIN: f64 = -9_223_372_036_854_775_808.0;

/// Encode a JSON value in canonical form.
///
/// Floats with an integral value are written as integers, so `5.0` and `5`
/// encode identically. Any other float is rejected.
pub fn canonicalize(value: &Value) -> Result<Vec<u8>> {
    let normalized = normalize(value)?;
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, CanonicalFormatter::new());
    normalized
        .serialize(&mut ser)
        .map_err(|e| Error::Encoding(e.to_string()))?;
    Ok(buf)
}

/// Copy of `value` with every number in integer form
fn normalize(value: &Value) -> Result<Value> {
    Ok(match value {
        Value::Number(n) => Value::Number(integral(n)?),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect::<Result<_>>()?),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), normalize(v)?)))
                .collect::<Result<_>>()?,
        ),
        other => other.clone(),
    })
}

fn integral(n: &Number) -> Result<Number> {
    if n.is_u64() || n.is_i64() {
        return Ok(n.clone());
    }
    let f = n
        .as_f64()
        .ok_or_else(|| Error::Encoding(format!("unsupported number {}", n)))?;
    if !f.is_finite() || f.fract() != 0.0 {
        return Err(Error::Encoding(format!("non-integral number {}", n)));
    }
    if (0.0..U64_LIMIT).contains(&f) {
        Ok(Number::from(f as u64))
    } else if (I64_MIN..0.0).contains(&f) {
        Ok(Number::from(f as i64))
    } else {
        Err(Error::Encoding(format!("number {} is out of integer range", n)))
    }
}
