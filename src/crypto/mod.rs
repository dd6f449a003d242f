//! Optional session crypto for IoT v2 devices: an RSA handshake that
//! negotiates an AES session key, then AES-CTR/CBC frame wrapping for the
//! life of the connection. Absent on v1 devices, which talk MODBUS in the
//! clear.
//!
//! Feature-gated behind `crypto` (on by default); everything else in the
//! crate compiles and is exercised without it.

#![cfg(feature = "crypto")]

pub mod aes_session;
pub mod handshake;

use zeroize::Zeroize;

/// The negotiated AES-128 session key. Zeroized on drop; never `Debug`- or
/// `Display`-formatted.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SessionKey(pub [u8; 16]);
