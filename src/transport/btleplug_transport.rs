//! Concrete [`Transport`] over a real BLE adapter via `btleplug`. Gated
//! behind the `btleplug-transport` feature; the reader, recognizer, and
//! their tests never depend on it.

use super::{Notification, Transport};
use crate::constants::{
    ATT_HEADER_OVERHEAD, GATT_NOTIFY_CHARACTERISTIC_UUID, GATT_WRITE_CHARACTERISTIC_UUID,
};
use crate::error::ReaderError;
use async_trait::async_trait;
use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, WriteType};
use btleplug::platform::{Manager, Peripheral};
use futures::StreamExt;
use std::str::FromStr;
use tokio::sync::mpsc;
use uuid::Uuid;

const DEFAULT_MTU: usize = 20;

pub struct BtleplugTransport {
    peripheral: Peripheral,
    write_char: Characteristic,
    notify_char: Characteristic,
    notifications: mpsc::Receiver<Notification>,
    mtu: usize,
}

impl BtleplugTransport {
    /// Scan for and connect to the first adapter's peripheral matching
    /// `address`, subscribing to the vendor notify characteristic.
    pub async fn connect_to(address: &str) -> Result<Self, ReaderError> {
        let manager = Manager::new()
            .await
            .map_err(|e| ReaderError::Connection(e.to_string()))?;
        let adapters = manager
            .adapters()
            .await
            .map_err(|e| ReaderError::Connection(e.to_string()))?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| ReaderError::Connection("no BLE adapter found".into()))?;

        let peripherals = adapter
            .peripherals()
            .await
            .map_err(|e| ReaderError::Connection(e.to_string()))?;
        let mut found = None;
        for p in peripherals {
            if let Ok(Some(props)) = p.properties().await {
                if props.address.to_string() == address {
                    found = Some(p);
                    break;
                }
            }
        }
        let peripheral =
            found.ok_or_else(|| ReaderError::Connection(format!("device {address} not found")))?;

        peripheral
            .connect()
            .await
            .map_err(|e| ReaderError::Connection(e.to_string()))?;
        peripheral
            .discover_services()
            .await
            .map_err(|e| ReaderError::Connection(e.to_string()))?;

        let notify_uuid = Uuid::from_str(GATT_NOTIFY_CHARACTERISTIC_UUID)
            .map_err(|e| ReaderError::Other(e.to_string()))?;
        let write_uuid = Uuid::from_str(GATT_WRITE_CHARACTERISTIC_UUID)
            .map_err(|e| ReaderError::Other(e.to_string()))?;

        let chars = peripheral.characteristics();
        let notify_char = chars
            .iter()
            .find(|c| c.uuid == notify_uuid)
            .cloned()
            .ok_or_else(|| ReaderError::Connection("notify characteristic missing".into()))?;
        let write_char = chars
            .iter()
            .find(|c| c.uuid == write_uuid)
            .cloned()
            .ok_or_else(|| ReaderError::Connection("write characteristic missing".into()))?;

        peripheral
            .subscribe(&notify_char)
            .await
            .map_err(|e| ReaderError::Connection(e.to_string()))?;

        let (tx, rx) = mpsc::channel(32);
        let mut stream = peripheral
            .notifications()
            .await
            .map_err(|e| ReaderError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                if tx.send(event.value).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            peripheral,
            write_char,
            notify_char,
            notifications: rx,
            mtu: DEFAULT_MTU - ATT_HEADER_OVERHEAD,
        })
    }
}

#[async_trait]
impl Transport for BtleplugTransport {
    async fn connect(&mut self) -> Result<(), ReaderError> {
        // Connection is established in `connect_to`; nothing further to do.
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), ReaderError> {
        self.peripheral
            .write(&self.write_char, data, WriteType::WithoutResponse)
            .await
            .map_err(|e| ReaderError::Connection(e.to_string()))
    }

    async fn recv_notification(&mut self) -> Result<Notification, ReaderError> {
        self.notifications
            .recv()
            .await
            .ok_or(ReaderError::Timeout)
    }

    fn mtu(&self) -> usize {
        self.mtu
    }

    async fn disconnect(&mut self) -> Result<(), ReaderError> {
        let _ = self.peripheral.unsubscribe(&self.notify_char).await;
        self.peripheral
            .disconnect()
            .await
            .map_err(|e| ReaderError::Connection(e.to_string()))
    }
}
