//! Response URIs: where and how a wallet delivers its response.

use serde::{Deserialize, Serialize};

use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// How the wallet delivers a response to the given URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseUriKind {
    /// The wallet appends the response as a URL parameter and redirects.
    Redirect,
    /// The wallet issues an HTTP POST of the response body to the URI.
    Post,
}

impl ResponseUriKind {
    /// Wire ordinal of this kind.
    pub fn ordinal(self) -> u8 {
        match self {
            ResponseUriKind::Redirect => 1,
            ResponseUriKind::Post => 2,
        }
    }

    fn from_ordinal(v: u8) -> Result<Self, PrimitivesError> {
        match v {
            1 => Ok(ResponseUriKind::Redirect),
            2 => Ok(ResponseUriKind::Post),
            other => Err(PrimitivesError::InvalidValue(format!(
                "unknown response URI kind {other}"
            ))),
        }
    }
}

/// A typed response destination inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseUri {
    /// Delivery mechanism.
    pub kind: ResponseUriKind,
    /// Destination URI.
    pub uri: String,
}

impl ResponseUri {
    /// Create a response URI of the given kind.
    pub fn from_uri_string(uri: &str, kind: ResponseUriKind) -> Self {
        ResponseUri {
            kind,
            uri: uri.to_string(),
        }
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) {
        w.write_u8(self.kind.ordinal());
        w.write_var_string(&self.uri);
    }

    pub(crate) fn read(r: &mut ByteReader<'_>) -> Result<Self, PrimitivesError> {
        let kind = ResponseUriKind::from_ordinal(r.read_u8()?)?;
        let uri = r.read_var_string()?;
        Ok(ResponseUri { kind, uri })
    }

    /// JSON view of the response URI.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind.ordinal(),
            "uri": self.uri,
        })
    }
}
