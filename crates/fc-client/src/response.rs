//! Response metadata shared by every operation output.

use bytes::Bytes;
use std::collections::BTreeMap;

pub const HEADER_REQUEST_ID: &str = "x-fc-request-id";
pub const HEADER_ETAG: &str = "etag";
pub const HEADER_LOG_RESULT: &str = "x-fc-log-result";
pub const HEADER_ERROR_TYPE: &str = "x-fc-error-type";

/// Raw response as returned by the dispatcher. Header names are lowercased.
#[derive(Debug, Clone)]
pub struct FcResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl FcResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(HEADER_REQUEST_ID)
    }

    pub fn meta(&self) -> ResponseMeta {
        ResponseMeta {
            status: self.status,
            request_id: self.request_id().map(String::from),
            etag: self.header(HEADER_ETAG).map(String::from),
            headers: self.headers.clone(),
        }
    }
}

/// Metadata every typed output carries.
#[derive(Debug, Clone, Default)]
pub struct ResponseMeta {
    pub status: u16,
    pub request_id: Option<String>,
    pub etag: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl ResponseMeta {
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }
}

/// Implemented by every operation output.
pub trait FcOutput {
    fn meta(&self) -> &ResponseMeta;

    /// Value of `x-fc-request-id`.
    fn request_id(&self) -> Option<&str> {
        self.meta().request_id()
    }

    /// `ETag` of the returned resource, usable with `with_if_match`.
    fn etag(&self) -> Option<&str> {
        self.meta().etag()
    }
}

macro_rules! impl_fc_output {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::response::FcOutput for $ty {
                fn meta(&self) -> &$crate::response::ResponseMeta {
                    &self.meta
                }
            }
        )+
    };
}
pub(crate) use impl_fc_output;
