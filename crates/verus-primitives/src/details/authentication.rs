//! Authentication request details and recipient constraints.

use crate::address::CompactIdentityReference;
use crate::util::{ByteReader, ByteWriter};
use crate::PrimitivesError;

/// Which relationship a recipient identity must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// The recipient must be exactly this identity.
    RequiredId,
    /// The recipient must belong to this system.
    RequiredSystem,
    /// The recipient must be a child of this parent identity.
    RequiredParent,
}

impl ConstraintKind {
    /// Wire ordinal of this constraint kind.
    pub fn ordinal(self) -> u8 {
        match self {
            ConstraintKind::RequiredId => 1,
            ConstraintKind::RequiredSystem => 2,
            ConstraintKind::RequiredParent => 3,
        }
    }

    /// Parse a constraint kind from its wire ordinal.
    pub fn from_ordinal(v: u64) -> Result<Self, PrimitivesError> {
        match v {
            1 => Ok(ConstraintKind::RequiredId),
            2 => Ok(ConstraintKind::RequiredSystem),
            3 => Ok(ConstraintKind::RequiredParent),
            other => Err(PrimitivesError::InvalidValue(format!(
                "unknown recipient constraint kind {other}"
            ))),
        }
    }
}

/// A constraint on who may answer an authentication request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientConstraint {
    /// The relationship the recipient must satisfy.
    pub kind: ConstraintKind,
    /// The identity the relationship is evaluated against.
    pub identity: CompactIdentityReference,
}

impl RecipientConstraint {
    fn write(&self, w: &mut ByteWriter) {
        w.write_u8(self.kind.ordinal());
        self.identity.write(w);
    }

    fn read(r: &mut ByteReader<'_>) -> Result<Self, PrimitivesError> {
        let kind = ConstraintKind::from_ordinal(r.read_u8()? as u64)?;
        let identity = CompactIdentityReference::read(r)?;
        Ok(RecipientConstraint { kind, identity })
    }

    /// JSON view of the constraint.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind.ordinal(),
            "identity": self.identity.to_json(),
        })
    }
}

/// Authentication request details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationDetails {
    /// Record version.
    pub version: u64,
    /// The request id the response must echo.
    pub request_id: Option<CompactIdentityReference>,
    /// Unix time after which the request is void.
    pub expiry_time: Option<u64>,
    /// Constraints on who may answer, evaluated in order.
    pub recipient_constraints: Vec<RecipientConstraint>,
}

impl AuthenticationDetails {
    /// Default record version.
    pub const DEFAULT_VERSION: u64 = 1;

    const FLAG_HAS_REQUEST_ID: u64 = 1;
    const FLAG_HAS_EXPIRY: u64 = 2;

    /// Create authentication details.
    pub fn new(
        request_id: Option<CompactIdentityReference>,
        expiry_time: Option<u64>,
        recipient_constraints: Vec<RecipientConstraint>,
    ) -> Self {
        AuthenticationDetails {
            version: Self::DEFAULT_VERSION,
            request_id,
            expiry_time,
            recipient_constraints,
        }
    }

    /// Serialize to bytes.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut flags = 0u64;
        if self.request_id.is_some() {
            flags |= Self::FLAG_HAS_REQUEST_ID;
        }
        if self.expiry_time.is_some() {
            flags |= Self::FLAG_HAS_EXPIRY;
        }

        let mut w = ByteWriter::new();
        w.write_varint(self.version);
        w.write_varint(flags);
        if let Some(id) = &self.request_id {
            id.write(&mut w);
        }
        if let Some(expiry) = self.expiry_time {
            w.write_varint(expiry);
        }
        w.write_varint(self.recipient_constraints.len() as u64);
        for constraint in &self.recipient_constraints {
            constraint.write(&mut w);
        }
        w.into_bytes()
    }

    /// Deserialize from bytes.
    pub fn from_buffer(data: &[u8]) -> Result<Self, PrimitivesError> {
        let mut r = ByteReader::new(data);
        let version = r.read_varint()?;
        let flags = r.read_varint()?;
        let request_id = if flags & Self::FLAG_HAS_REQUEST_ID != 0 {
            Some(CompactIdentityReference::read(&mut r)?)
        } else {
            None
        };
        let expiry_time = if flags & Self::FLAG_HAS_EXPIRY != 0 {
            Some(r.read_varint()?)
        } else {
            None
        };
        let count = r.read_count()?;
        let mut recipient_constraints = Vec::with_capacity(count);
        for _ in 0..count {
            recipient_constraints.push(RecipientConstraint::read(&mut r)?);
        }
        Ok(AuthenticationDetails {
            version,
            request_id,
            expiry_time,
            recipient_constraints,
        })
    }

    /// JSON view of the record.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "version": self.version,
            "recipientConstraints": self
                .recipient_constraints
                .iter()
                .map(RecipientConstraint::to_json)
                .collect::<Vec<_>>(),
        });
        if let Some(id) = &self.request_id {
            obj["requestId"] = id.to_json();
        }
        if let Some(expiry) = self.expiry_time {
            obj["expiryTime"] = expiry.into();
        }
        obj
    }
}
