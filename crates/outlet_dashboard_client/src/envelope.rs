//! Response envelope decoding.
//!
//! The backend answers either `{"success": true, "data": ...}` or the bare
//! payload. List endpoints may additionally wrap rows in a paginator object
//! (`{"data": [...], "current_page": 1, ...}`). Every shape is decoded here
//! into one canonical value; anything else is a [`ClientError::Decode`].

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::ClientError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped {
        success: bool,
        #[serde(default)]
        message: Option<String>,
        #[serde(default = "Option::default")]
        data: Option<T>,
    },
    Bare(T),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Items(Vec<T>),
    Page {
        data: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl<T> ListPayload<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Items(items) => items,
            ListPayload::Page { data, total } => {
                tracing::trace!(rows = data.len(), ?total, "unwrapped paginated list");
                data
            }
        }
    }
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, ClientError> {
    match envelope {
        Envelope::Bare(payload) => Ok(payload),
        Envelope::Wrapped {
            success: false,
            message,
            ..
        } => Err(ClientError::Rejected(message.unwrap_or_default())),
        Envelope::Wrapped {
            data: Some(payload),
            ..
        } => Ok(payload),
        Envelope::Wrapped { data: None, .. } => Err(ClientError::Decode(
            "successful envelope without a data field".into(),
        )),
    }
}

/// Decode a list endpoint body into its rows.
pub fn decode_list<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, ClientError> {
    let envelope: Envelope<ListPayload<T>> = serde_json::from_slice(body)
        .map_err(|e| ClientError::Decode(format!("unrecognized list envelope: {e}")))?;
    unwrap_envelope(envelope).map(ListPayload::into_items)
}

/// Decode a single-object endpoint body.
pub fn decode_one<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    let envelope: Envelope<T> = serde_json::from_slice(body)
        .map_err(|e| ClientError::Decode(format!("unrecognized object envelope: {e}")))?;
    unwrap_envelope(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn wrapped_and_bare_lists_decode_the_same() {
        let wrapped = br#"{"success": true, "data": [{"id": 1}, {"id": 2}]}"#;
        let bare = br#"[{"id": 1}, {"id": 2}]"#;
        let a: Vec<Item> = decode_list(wrapped).expect("wrapped");
        let b: Vec<Item> = decode_list(bare).expect("bare");
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn paginated_list_decodes() {
        let body =
            br#"{"success": true, "data": {"current_page": 1, "data": [{"id": 3}], "total": 1}}"#;
        let items: Vec<Item> = decode_list(body).expect("paginated");
        assert_eq!(items, vec![Item { id: 3 }]);
    }

    #[test]
    fn empty_bare_list_decodes() {
        let items: Vec<Item> = decode_list(b"[]").expect("empty");
        assert!(items.is_empty());
    }

    #[test]
    fn unsuccessful_envelope_surfaces_message() {
        let body = br#"{"success": false, "message": "Outlet tidak ditemukan"}"#;
        let err = decode_list::<Item>(body).unwrap_err();
        match err {
            ClientError::Rejected(msg) => assert_eq!(msg, "Outlet tidak ditemukan"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_shape_is_a_decode_error() {
        let err = decode_list::<Item>(br#"{"rows": [{"id": 1}]}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
        let err = decode_list::<Item>(b"not json").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn single_object_wrapped_or_bare() {
        let a: Item = decode_one(br#"{"success": true, "data": {"id": 9}}"#).expect("wrapped");
        let b: Item = decode_one(br#"{"id": 9}"#).expect("bare");
        assert_eq!(a, b);
    }

    #[test]
    fn success_without_data_is_a_decode_error() {
        let err = decode_one::<Item>(br#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
