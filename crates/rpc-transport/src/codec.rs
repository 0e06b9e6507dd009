//! Encodes and decodes the payload bytes that travel inside a link-layer
//! frame.
//!
//! ```text
//! Req/Stream:  type(1) seq(1) name(..) NUL(1) args(..)
//! Resp:        type(1) seq(1) result(..)
//! Err:         type(1) seq(1) tag(1)
//! ```
//!
//! Name and args share one variable-length region separated by a NUL,
//! since `MAX_NAME` and `ARGS_MAX` are both fixed but a handler rarely
//! uses the full name budget — a length-prefixed encoding would waste a
//! byte on every call for no benefit here.

use rpc_core::constants::{ARGS_MAX, MAX_NAME, MIN_NAME};
use rpc_core::error::{ErrorTag, TransportError};
use rpc_core::message::MessageType;
use rpc_core::payload::PayloadBuf;

pub struct RequestMsg {
    pub msg_type: MessageType,
    pub seq: u8,
    pub name: String,
    pub args: PayloadBuf,
}

pub enum ResponseMsg {
    Resp { seq: u8, data: PayloadBuf },
    Err { seq: u8, tag: ErrorTag },
}

pub fn build_call(msg_type: MessageType, seq: u8, name: &str, args: &[u8]) -> Result<PayloadBuf, TransportError> {
    if name.len() < MIN_NAME || name.len() > MAX_NAME {
        return Err(TransportError::BadName);
    }
    if args.len() > ARGS_MAX {
        return Err(TransportError::ArgsOverflow);
    }
    let mut buf = PayloadBuf::new();
    buf.push(msg_type.as_u8()).map_err(TransportError::from)?;
    buf.push(seq).map_err(TransportError::from)?;
    for b in name.bytes() {
        buf.push(b).map_err(TransportError::from)?;
    }
    buf.push(0u8).map_err(TransportError::from)?;
    for &b in args {
        buf.push(b).map_err(TransportError::from)?;
    }
    Ok(buf)
}

pub fn parse_request(payload: &[u8]) -> Result<RequestMsg, TransportError> {
    let mut it = payload.iter().copied();
    let type_byte = it.next().ok_or(TransportError::Link(rpc_core::error::LinkError::Framing))?;
    let msg_type = MessageType::from_u8(type_byte)
        .filter(|t| matches!(t, MessageType::Req | MessageType::Stream))
        .ok_or(TransportError::Link(rpc_core::error::LinkError::Framing))?;
    let seq = it.next().ok_or(TransportError::Link(rpc_core::error::LinkError::Framing))?;

    let rest: Vec<u8> = it.collect();
    let nul_at = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(TransportError::BadName)?;
    let name = String::from_utf8(rest[..nul_at].to_vec()).map_err(|_| TransportError::BadName)?;
    if name.len() < MIN_NAME || name.len() > MAX_NAME {
        return Err(TransportError::BadName);
    }
    let args = &rest[nul_at + 1..];
    if args.len() > ARGS_MAX {
        return Err(TransportError::ArgsOverflow);
    }
    let args = PayloadBuf::from_slice(args)?;

    Ok(RequestMsg { msg_type, seq, name, args })
}

pub fn build_resp(seq: u8, data: &[u8]) -> Result<PayloadBuf, TransportError> {
    let mut buf = PayloadBuf::new();
    buf.push(MessageType::Resp.as_u8()).map_err(TransportError::from)?;
    buf.push(seq).map_err(TransportError::from)?;
    for &b in data {
        buf.push(b).map_err(TransportError::from)?;
    }
    Ok(buf)
}

pub fn build_err(seq: u8, tag: ErrorTag) -> Result<PayloadBuf, TransportError> {
    let mut buf = PayloadBuf::new();
    buf.push(MessageType::Err.as_u8()).map_err(TransportError::from)?;
    buf.push(seq).map_err(TransportError::from)?;
    buf.push(tag.as_u8()).map_err(TransportError::from)?;
    Ok(buf)
}

pub fn parse_response(payload: &[u8]) -> Result<ResponseMsg, TransportError> {
    let mut it = payload.iter().copied();
    let type_byte = it.next().ok_or(TransportError::Link(rpc_core::error::LinkError::Framing))?;
    let seq = it.next().ok_or(TransportError::Link(rpc_core::error::LinkError::Framing))?;
    match MessageType::from_u8(type_byte) {
        Some(MessageType::Resp) => {
            let data: Vec<u8> = it.collect();
            Ok(ResponseMsg::Resp { seq, data: PayloadBuf::from_slice(&data)? })
        }
        Some(MessageType::Err) => {
            let tag_byte = it.next().ok_or(TransportError::Link(rpc_core::error::LinkError::Framing))?;
            let tag = ErrorTag::from_u8(tag_byte).ok_or(TransportError::Link(rpc_core::error::LinkError::Framing))?;
            Ok(ResponseMsg::Err { seq, tag })
        }
        _ => Err(TransportError::Link(rpc_core::error::LinkError::Framing)),
    }
}
