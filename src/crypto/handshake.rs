//! The two-phase RSA/AES handshake that precedes MODBUS traffic on an IoT
//! v2 device: the device hands back an RSA public key, the client replies
//! with an AES key+IV pair encrypted under it, and everything after that is
//! wrapped per [`super::aes_session`].

use crate::error::ReaderError;
use crate::transport::Transport;
use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};

/// Negotiated AES-128 key and CTR/CBC initialization vector.
pub struct SessionMaterial {
    pub key: [u8; 16],
    pub iv: [u8; 16],
}

/// Byte that opens the handshake on the write characteristic before any
/// MODBUS request is sent.
const HANDSHAKE_REQUEST: &[u8] = &[0x00];

/// Run the handshake over an already-connected transport. The device's
/// public key arrives as a single notification, PKCS#1 DER-encoded over
/// either a 1024-bit (128-byte) or 2048-bit (256-byte) modulus.
pub async fn perform(transport: &mut dyn Transport) -> Result<SessionMaterial, ReaderError> {
    transport.write(HANDSHAKE_REQUEST).await?;
    let key_der = transport.recv_notification().await?;

    let public_key = RsaPublicKey::from_pkcs1_der(&key_der)
        .map_err(|e| ReaderError::Handshake(format!("bad device public key: {e}")))?;

    let mut material = [0u8; 32];
    rand::RngCore::fill_bytes(&mut OsRng, &mut material);

    let encrypted = public_key
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, &material)
        .map_err(|e| ReaderError::Handshake(format!("rsa encryption failed: {e}")))?;

    transport.write(&encrypted).await?;

    let mut key = [0u8; 16];
    let mut iv = [0u8; 16];
    key.copy_from_slice(&material[..16]);
    iv.copy_from_slice(&material[16..]);
    Ok(SessionMaterial { key, iv })
}
