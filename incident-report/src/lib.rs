//! Load, show and edit a single incident report over the IMS JSON API.

mod edits;
mod error;
mod model;
mod page;
mod reports_url;
pub mod transport;
mod view;

pub use edits::*;
pub use error::*;
pub use model::*;
pub use page::*;
pub use reports_url::*;
pub use transport::{HttpTransport, JsonResponse, JsonTransport, TransportError};
pub use view::ReportView;
