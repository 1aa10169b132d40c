mod alt;
mod atv;
mod btc;
mod endorsement;
mod ids;
mod popdata;
mod vbk;
mod vtb;

pub use alt::{AltHeader, SimpleAltHeader};
pub use atv::Atv;
pub use btc::BtcHeader;
pub use endorsement::Endorsement;
pub use ids::{AtvId, VbkId, VtbId};
pub use popdata::PopData;
pub use vbk::{VbkBlock, VbkHeader, VbkMerkleRoot};
pub use vtb::Vtb;
