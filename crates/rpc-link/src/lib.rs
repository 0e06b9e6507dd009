//! Link layer: turns payload bytes into framed, checksummed frames for
//! the PHY, and turns a stream of raw PHY bytes back into payloads.

mod decode;
mod frame;

pub use decode::{Decoder, FeedEvent};
pub use frame::encode_frame;
