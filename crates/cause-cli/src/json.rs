// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON bindings for free variables.

use cause_interp::Value;
use indexmap::IndexMap;

/// Convert a JSON document to an interpreter value.
pub fn to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(s.as_str()),
        serde_json::Value::Array(items) => Value::array(items.iter().map(to_value).collect()),
        serde_json::Value::Object(entries) => Value::object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), to_value(v)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

/// Parse `name=<json>`. A right side that is not valid JSON is taken as a
/// plain string.
pub fn parse_binding(arg: &str) -> Result<(String, serde_json::Value), String> {
    let (name, json) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=JSON, got {:?}", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in {:?}", arg));
    }
    let json = serde_json::from_str(json).unwrap_or_else(|_| serde_json::Value::String(json.to_string()));
    Ok((name.to_string(), json))
}

/// A function that looks its first argument up in `table` and returns
/// the entry as State.
pub fn lookup(name: &str, table: &serde_json::Value) -> Value {
    let table = to_value(table);
    Value::native(name, move |interp, args| {
        let key = args.first().map(cause_interp::operators::property_key).unwrap_or_default();
        let found = cause_interp::operators::get_property(&table, &key)?;
        Ok(interp.namespace().success(found))
    })
}
