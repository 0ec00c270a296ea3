//! OSC wire codec for the message shapes Augmenta sends.
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┬──────────────────────┐
//! │ Address (OSC string) │ Type tags (",iff..") │ Arguments            │
//! │ NUL padded to 4      │ NUL padded to 4      │ Big-endian, 4-aligned│
//! └──────────────────────┴──────────────────────┴──────────────────────┘
//! ```
//!
//! Bundles start with the OSC string `#bundle`, an 8 byte time tag, then any
//! number of `(i32 size, element)` pairs where each element is a message or
//! a nested bundle.
//!
//! Supported tags: `i f s b h d T F N I`. Anything else rejects the packet.

use crate::error::OscError;
use serde::Serialize;

const BUNDLE_TAG: &str = "#bundle";

/// One typed OSC argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    String(String),
    Blob(Vec<u8>),
    Long(i64),
    Double(f64),
    True,
    False,
    Nil,
    Impulse,
}

impl OscArg {
    /// Name of the argument's OSC type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            OscArg::Int(_) => "int32",
            OscArg::Float(_) => "float32",
            OscArg::String(_) => "string",
            OscArg::Blob(_) => "blob",
            OscArg::Long(_) => "int64",
            OscArg::Double(_) => "float64",
            OscArg::True | OscArg::False => "bool",
            OscArg::Nil => "nil",
            OscArg::Impulse => "impulse",
        }
    }

    fn tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::String(_) => 's',
            OscArg::Blob(_) => 'b',
            OscArg::Long(_) => 'h',
            OscArg::Double(_) => 'd',
            OscArg::True => 'T',
            OscArg::False => 'F',
            OscArg::Nil => 'N',
            OscArg::Impulse => 'I',
        }
    }
}

/// An address pattern with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>, args: Vec<OscArg>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Serializes the message to its wire form.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.args.len() * 4);
        write_string(&mut out, &self.address);

        let mut tags = String::with_capacity(self.args.len() + 1);
        tags.push(',');
        tags.extend(self.args.iter().map(OscArg::tag));
        write_string(&mut out, &tags);

        for arg in &self.args {
            match arg {
                OscArg::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
                OscArg::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
                OscArg::String(v) => write_string(&mut out, v),
                OscArg::Blob(v) => {
                    out.extend_from_slice(&(v.len() as i32).to_be_bytes());
                    out.extend_from_slice(v);
                    pad(&mut out);
                }
                OscArg::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
                OscArg::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
                OscArg::True | OscArg::False | OscArg::Nil | OscArg::Impulse => {}
            }
        }
        out
    }
}

/// A decoded datagram.
#[derive(Debug, Clone, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle { timetag: u64, content: Vec<OscPacket> },
}

impl OscPacket {
    /// Flattens bundles into their messages, in wire order.
    pub fn into_messages(self) -> Vec<OscMessage> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(self, out: &mut Vec<OscMessage>) {
        match self {
            OscPacket::Message(message) => out.push(message),
            OscPacket::Bundle { content, .. } => {
                for packet in content {
                    packet.collect_into(out);
                }
            }
        }
    }

    /// Serializes the packet to its wire form.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            OscPacket::Message(message) => message.encode(),
            OscPacket::Bundle { timetag, content } => {
                let mut out = Vec::new();
                write_string(&mut out, BUNDLE_TAG);
                out.extend_from_slice(&timetag.to_be_bytes());
                for packet in content {
                    let element = packet.encode();
                    out.extend_from_slice(&(element.len() as i32).to_be_bytes());
                    out.extend_from_slice(&element);
                }
                out
            }
        }
    }
}

/// Deepest bundle nesting accepted in one datagram.
pub const MAX_BUNDLE_DEPTH: usize = 16;

/// Parses one datagram.
pub fn decode_packet(data: &[u8]) -> Result<OscPacket, OscError> {
    decode_element(data, 0)
}

fn decode_element(data: &[u8], depth: usize) -> Result<OscPacket, OscError> {
    let mut reader = Reader::new(data);
    if data.starts_with(b"#bundle\0") {
        if depth >= MAX_BUNDLE_DEPTH {
            return Err(OscError::BundleTooDeep(MAX_BUNDLE_DEPTH));
        }
        decode_bundle(&mut reader, depth)
    } else {
        decode_message(&mut reader).map(OscPacket::Message)
    }
}

fn decode_bundle(reader: &mut Reader<'_>, depth: usize) -> Result<OscPacket, OscError> {
    reader.read_string()?;
    let timetag = u64::from_be_bytes(reader.take_array::<8>()?);

    let mut content = Vec::new();
    while !reader.is_empty() {
        let size = reader.read_i32()?;
        if size < 0 || size as usize > reader.remaining() {
            return Err(OscError::InvalidBundleSize(size));
        }
        let element = reader.take(size as usize)?;
        content.push(decode_element(element, depth + 1)?);
    }

    Ok(OscPacket::Bundle { timetag, content })
}

fn decode_message(reader: &mut Reader<'_>) -> Result<OscMessage, OscError> {
    let address = reader.read_string()?;
    if !address.starts_with('/') {
        return Err(OscError::InvalidAddress(address));
    }

    // Some senders omit the type tag string for argument-less messages.
    if reader.is_empty() {
        return Ok(OscMessage::new(address, Vec::new()));
    }

    let tags = reader.read_string()?;
    let Some(tags) = tags.strip_prefix(',') else {
        return Err(OscError::MissingTypeTags(address));
    };

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let arg = match tag {
            'i' => OscArg::Int(reader.read_i32()?),
            'f' => OscArg::Float(f32::from_be_bytes(reader.take_array::<4>()?)),
            's' | 'S' => OscArg::String(reader.read_string()?),
            'b' => {
                let len = reader.read_i32()?;
                if len < 0 {
                    return Err(OscError::InvalidBlobSize(len));
                }
                let blob = reader.take(len as usize)?.to_vec();
                reader.skip_padding(len as usize)?;
                OscArg::Blob(blob)
            }
            'h' => OscArg::Long(i64::from_be_bytes(reader.take_array::<8>()?)),
            'd' => OscArg::Double(f64::from_be_bytes(reader.take_array::<8>()?)),
            'T' => OscArg::True,
            'F' => OscArg::False,
            'N' => OscArg::Nil,
            'I' => OscArg::Impulse,
            other => {
                return Err(OscError::UnsupportedType {
                    address,
                    tag: other,
                })
            }
        };
        args.push(arg);
    }

    Ok(OscMessage { address, args })
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], OscError> {
        if self.remaining() < len {
            return Err(OscError::UnexpectedEof {
                offset: self.offset,
                wanted: len,
            });
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], OscError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_i32(&mut self) -> Result<i32, OscError> {
        Ok(i32::from_be_bytes(self.take_array::<4>()?))
    }

    fn skip_padding(&mut self, len: usize) -> Result<(), OscError> {
        let padding = (4 - len % 4) % 4;
        self.take(padding).map(|_| ())
    }

    fn read_string(&mut self) -> Result<String, OscError> {
        let start = self.offset;
        let rest = &self.data[start..];
        let nul = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(OscError::InvalidString(start))?;
        let text = std::str::from_utf8(&rest[..nul])
            .map_err(|_| OscError::InvalidString(start))?
            .to_string();

        // Content plus at least one NUL, rounded up to a multiple of four.
        let padded = (nul + 4) & !3;
        self.take(padded)?;
        Ok(text)
    }
}

fn write_string(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(value.as_bytes());
    out.push(0);
    pad(out);
}

fn pad(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}
