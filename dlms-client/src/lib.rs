//! DLMS/COSEM client engine
//!
//! The engine is sans-IO: every operation turns a [`Session`] plus its
//! arguments into frames ready for the transport, or folds received bytes
//! back into the session. The caller owns the transport and decides when
//! to send and receive.
//!
//! # Modules
//!
//! - [`session`]: the session state, its configuration and the association
//!   state machine (SNRM/UA, AARQ/AARE, HLS, release and disconnect)
//! - [`request`]: read, write, method and profile requests
//! - [`reply`]: unframing and decoding of received data
//! - [`directory`]: association view and capture column parsing
//! - [`push`]: unsolicited data notification decoding
//! - [`coercion`]: value type changes and attribute updates
//! - [`obis_catalog`]: standard OBIS descriptions and type hints
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use bytes::BytesMut;
//! use dlms_client::{Session, SessionConfig, Target};
//! use dlms_interface::ObjectType;
//!
//! # fn main() -> dlms_core::DlmsResult<()> {
//! let mut session = Session::new(SessionConfig::default().with_server_address(1));
//!
//! // SNRM, then feed the UA reply back
//! let snrm = session.begin_physical_connect()?;
//! # let ua: Vec<u8> = snrm.clone();
//! session.complete_physical_connect(&ua)?;
//!
//! // AARQ, then the AARE
//! for frame in session.build_association_request()? {
//!     // transport.send(&frame)
//! #   let _ = frame;
//! }
//! # let reply: Vec<u8> = Vec::new();
//! let mut segments = BytesMut::new();
//! let aare = session.get_data(&reply, &mut segments)?;
//! session.parse_association_reply(&aare.data)?;
//!
//! // Read the clock
//! let clock = Target::logical(ObjectType::Clock, "0.0.1.0.0.255")?;
//! let frames = session.read(clock, 2, None)?;
//! # let _ = frames;
//! # Ok(())
//! # }
//! ```

pub mod coercion;
pub mod directory;
pub mod obis_catalog;
pub mod push;
pub mod reply;
pub mod request;
pub mod session;

pub use coercion::{change_type, get_value, update_value, update_values};
pub use obis_catalog::{ObisCatalog, ObisEntry};
pub use reply::{MoreData, ReplyData};
pub use request::{AccessSelector, ReadItem, Target, WriteItem};
pub use session::{Session, SessionConfig};

pub use dlms_core::{DlmsError, DlmsResult};
