//! Route logic shared by the HTTP server and the one-shot reports.

pub mod congress;
pub mod donations;
pub mod members;
pub mod proxy;
pub mod white_house;

pub use congress::{CongressQuery, CongressService};
pub use donations::DonationsService;
pub use members::MemberService;
pub use proxy::ProxyService;
pub use white_house::white_house;
