use crate::models::{Endpoint, ParamInfo, ParamMap, Parameters};
use serde_json::Value;

/// Rewrite list-shaped parameters into a mapping keyed by `name`.
///
/// Numeric and boolean names are keyed by their text. Records that are not
/// objects, or whose `name` is missing, null or structured, are dropped.
/// Mappings pass through untouched, so applying this twice is a no-op.
pub fn normalize_parameters(endpoint: &mut Endpoint) {
    let Parameters::List(records) = &mut endpoint.parameters else {
        return;
    };

    let mut map = ParamMap::new();
    for record in records.drain(..) {
        let Value::Object(mut fields) = record else {
            tracing::debug!(path = %endpoint.path, "dropping parameter record that is not an object");
            continue;
        };
        let Some(name) = fields.remove("name").and_then(param_name) else {
            tracing::debug!(path = %endpoint.path, "dropping parameter record without a name");
            continue;
        };
        let info: ParamInfo = fields;
        map.insert(name, Value::Object(info));
    }
    endpoint.parameters = Parameters::Map(map);
}

fn param_name(name: Value) -> Option<String> {
    match name {
        Value::String(name) => Some(name),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub fn normalize_all(endpoints: &mut [Endpoint]) {
    endpoints.iter_mut().for_each(normalize_parameters);
}
