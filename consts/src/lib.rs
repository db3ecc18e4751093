#![no_std]

/// Maximum payload of one data notification, in bytes.
/// Fixed per deployment; the tuner peer sizes its reassembly window from the
/// fragment count announced in the init notice, not from this value.
pub const NOTIFICATION_PKT_SIZE: usize = 492;

/// Size of the init notice sent when the peer enables notifications:
/// tuner structure size (2 bytes, little-endian) plus fragment count (1 byte).
pub const INIT_NOTICE_SIZE: usize = 3;

/// Size of an inbound tuner patch command:
/// length (1), offset big-endian (2), data (4).
pub const PATCH_COMMAND_SIZE: usize = 7;

/// Maximum number of data bytes one patch command may carry.
pub const MAX_PATCH_DATA: usize = 4;

/// Full device name advertised over BLE.
/// This is the complete name that will appear when scanning for the device.
pub const DEVICE_NAME: &str = "Touch Tuner Bridge";

/// Short device name used in limited advertising data, to stay within the
/// 31-byte advertising data size limit.
pub const SHORT_NAME: &str = "Tuner";

/// UUID of the tuner bridge GATT service.
pub const TUNER_SERVICE_UUID: u128 = 0x0003CAB5_0000_1000_8000_00805F9B0131;

/// UUID of the tuner data characteristic. Carries the init notice and the
/// data fragments as notifications, and receives patch commands as
/// write-without-response.
pub const TUNER_DATA_CHAR_UUID: u128 = 0x0003CAB5_0001_1000_8000_00805F9B0131;

/// List of BLE service UUIDs advertised by this device.
pub const SERVICES_LIST: [[u8; 16]; 1] = [TUNER_SERVICE_UUID.to_le_bytes()];
