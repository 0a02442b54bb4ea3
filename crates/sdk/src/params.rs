//! Named-parameter encoding
//!
//! Every daemon method takes one JSON object; authenticated methods carry the
//! session token next to their own fields.

use crate::error::{Result, SdkError};
use jsonrpsee::core::params::ObjectParams;
use serde::Serialize;
use serde_json::Value;

pub(crate) fn object<T: Serialize>(request: &T) -> Result<ObjectParams> {
    let fields = match serde_json::to_value(request)? {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(SdkError::Other(format!(
                "Request must encode as an object, got {}",
                other
            )))
        }
    };

    let mut params = ObjectParams::new();
    for (name, value) in fields {
        params.insert(&name, value)?;
    }
    Ok(params)
}

pub(crate) fn authed<T: Serialize>(token: &str, request: &T) -> Result<ObjectParams> {
    let mut params = object(request)?;
    params.insert("session_token", token)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::core::traits::ToRpcParams;
    use serde_json::json;

    fn encoded(params: ObjectParams) -> Value {
        let raw = params.to_rpc_params().unwrap().unwrap();
        serde_json::from_str(raw.get()).unwrap()
    }

    #[test]
    fn test_authed_merges_token() {
        let params = authed("tok-1", &json!({ "venture_id": "v-1" })).unwrap();
        assert_eq!(encoded(params), json!({ "venture_id": "v-1", "session_token": "tok-1" }));
    }

    #[test]
    fn test_unit_request_is_token_only() {
        let params = authed("tok-1", &()).unwrap();
        assert_eq!(encoded(params), json!({ "session_token": "tok-1" }));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(object(&json!([1, 2])).is_err());
    }
}
