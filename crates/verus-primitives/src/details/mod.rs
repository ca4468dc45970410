//! The six request detail record types.

pub mod identity_update;
pub mod authentication;
pub mod invoice;
pub mod data_packet;
pub mod app_encryption;
pub mod user_data;

pub use app_encryption::AppEncryptionDetails;
pub use authentication::{AuthenticationDetails, ConstraintKind, RecipientConstraint};
pub use data_packet::DataPacketDetails;
pub use identity_update::IdentityUpdateDetails;
pub use invoice::{InvoiceDetails, InvoiceFlagOptions, TransferDestination};
pub use user_data::UserDataDetails;
