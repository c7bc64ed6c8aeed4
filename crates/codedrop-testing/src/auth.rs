//! Mock identity helpers for integration tests.
//!
//! Services receive `x-operator-id`, `x-operator-name` and `x-operator-handle` headers from
//! the chat bridge. In tests, `MockOperator` produces these headers directly so no bridge is
//! needed.

use http::{HeaderMap, HeaderName, HeaderValue};

use codedrop_auth_types::identity::{
    OPERATOR_HANDLE_HEADER, OPERATOR_ID_HEADER, OPERATOR_NAME_HEADER,
};

/// Configurable operator identity injected into test requests.
#[derive(Debug, Clone)]
pub struct MockOperator {
    pub id: i64,
    pub display_name: Option<String>,
    pub handle: Option<String>,
}

impl MockOperator {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            display_name: None,
            handle: None,
        }
    }

    pub fn named(id: i64, display_name: &str, handle: &str) -> Self {
        Self {
            id,
            display_name: Some(display_name.to_owned()),
            handle: Some(handle.to_owned()),
        }
    }

    /// Return headers as if the chat bridge injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(OPERATOR_ID_HEADER),
            HeaderValue::from(self.id),
        );
        if let Some(name) = &self.display_name {
            if let Ok(value) = HeaderValue::from_bytes(name.as_bytes()) {
                map.insert(HeaderName::from_static(OPERATOR_NAME_HEADER), value);
            }
        }
        if let Some(handle) = &self.handle {
            if let Ok(value) = HeaderValue::from_str(handle) {
                map.insert(HeaderName::from_static(OPERATOR_HANDLE_HEADER), value);
            }
        }
        map
    }
}
