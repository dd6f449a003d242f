//! Frame wrapping for an established AES session. CTR is a stream cipher
//! so wrapped frames keep their exact length; CBC pads to the block
//! boundary and the unwrap side must trim it back off.

use super::SessionKey;
use crate::error::ReaderError;
use crate::schema::EncryptionMode;
use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher};

type CtrCipher = ctr::Ctr128BE<Aes128>;
type CbcEncryptor = cbc::Encryptor<Aes128>;
type CbcDecryptor = cbc::Decryptor<Aes128>;

/// A live AES session wrapping MODBUS frames for one connection.
pub struct AesSession {
    key: SessionKey,
    iv: [u8; 16],
    mode: EncryptionMode,
}

impl AesSession {
    pub fn new(key: SessionKey, iv: [u8; 16], mode: EncryptionMode) -> Self {
        Self { key, iv, mode }
    }

    pub fn wrap(&self, frame: &[u8]) -> Result<Vec<u8>, ReaderError> {
        match self.mode {
            EncryptionMode::None => Ok(frame.to_vec()),
            EncryptionMode::Ctr => {
                let mut buf = frame.to_vec();
                let mut cipher = CtrCipher::new((&self.key.0).into(), (&self.iv).into());
                cipher.apply_keystream(&mut buf);
                Ok(buf)
            }
            EncryptionMode::Cbc => {
                let encryptor = CbcEncryptor::new((&self.key.0).into(), (&self.iv).into());
                Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(frame))
            }
        }
    }

    pub fn unwrap(&self, wrapped: &[u8]) -> Result<Vec<u8>, ReaderError> {
        match self.mode {
            EncryptionMode::None => Ok(wrapped.to_vec()),
            EncryptionMode::Ctr => {
                let mut buf = wrapped.to_vec();
                let mut cipher = CtrCipher::new((&self.key.0).into(), (&self.iv).into());
                cipher.apply_keystream(&mut buf);
                Ok(buf)
            }
            EncryptionMode::Cbc => {
                let decryptor = CbcDecryptor::new((&self.key.0).into(), (&self.iv).into());
                decryptor
                    .decrypt_padded_vec_mut::<Pkcs7>(wrapped)
                    .map_err(|_| ReaderError::Handshake("bad CBC padding".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctr_round_trips() {
        let session = AesSession::new(SessionKey([0x42; 16]), [0x01; 16], EncryptionMode::Ctr);
        let frame = vec![0x01, 0x03, 0x00, 0x0A, 0x00, 0x03, 0x05, 0xCB];
        let wrapped = session.wrap(&frame).unwrap();
        assert_ne!(wrapped, frame);
        assert_eq!(session.unwrap(&wrapped).unwrap(), frame);
    }

    #[test]
    fn cbc_round_trips_with_padding() {
        let session = AesSession::new(SessionKey([0x11; 16]), [0x22; 16], EncryptionMode::Cbc);
        let frame = vec![0x01, 0x03, 0x00, 0x0A, 0x00, 0x03, 0x05, 0xCB];
        let wrapped = session.wrap(&frame).unwrap();
        assert_eq!(wrapped.len() % 16, 0);
        assert_eq!(session.unwrap(&wrapped).unwrap(), frame);
    }

    #[test]
    fn none_mode_passes_through() {
        let session = AesSession::new(SessionKey([0; 16]), [0; 16], EncryptionMode::None);
        let frame = vec![0xAA, 0xBB];
        assert_eq!(session.wrap(&frame).unwrap(), frame);
    }
}
