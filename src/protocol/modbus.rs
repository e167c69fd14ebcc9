// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register layout of the Daikin indoor-unit block behind the RS-485 bridge.
//!
//! Each indoor unit exposes six input words starting at `2000 + 6 * id`
//! and accepts three holding words at `2000 + 3 * id`. Fields are packed as
//! bit ranges; [`decode16bit`] extracts any of them given its mask.
//!
//! Temperatures are sign-magnitude tenths: bit 15 is the sign and the low
//! fifteen bits the magnitude. Communication errors of units 0 to 15 are
//! flagged bit by bit in input register 5, the next sixteen in register 6
//! and so on.

/// Base register address of the unit blocks.
pub const REGISTER_BASE: u16 = 2000;

/// Number of input words per indoor unit.
pub const INPUT_WORDS: u16 = 6;

/// Number of holding words per indoor unit.
pub const HOLDING_WORDS: u16 = 3;

/// Modbus function code used to read the input block.
pub const READ_FUNCTION: u8 = 3;

/// Function code the bridge uses to write the holding block.
pub const WRITE_FUNCTION: u8 = 4;

/// Flag OR-ed into the first holding byte to apply the new settings.
const APPLY_FLAG: u8 = 0x60;

/// First input register of the communication-error bitmap.
pub const COMM_STATUS_REGISTER: u16 = 5;

/// Mode code of heating.
pub const MODE_HEAT: u16 = 1;

/// Mode code of cooling.
pub const MODE_COOL: u16 = 2;

const SIGN_BIT: u16 = 0x8000;
const MAGNITUDE: u16 = 0x7FFF;

/// Location of a packed field: word index plus bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Index of the word in the input block.
    pub word: usize,
    /// Bits of that word occupied by the field.
    pub mask: u16,
}

impl Field {
    /// Power on/off.
    pub const ON_OFF: Self = Self::new(0, 0x0001);
    /// Fan direction (swing).
    pub const FAN_DIRECTION: Self = Self::new(0, 0x0700);
    /// Fan volume.
    pub const FAN_VOLUME: Self = Self::new(0, 0x7000);
    /// Operation mode.
    pub const MODE: Self = Self::new(1, 0x000F);
    /// Operation status.
    pub const STATUS: Self = Self::new(1, 0x0F00);
    /// Heat master flag.
    pub const HEAT_MASTER: Self = Self::new(1, 0xC000);
    /// Target temperature, tenths of a degree.
    pub const TARGET_TEMPERATURE: Self = Self::new(2, 0xFFFF);
    /// Room temperature, tenths of a degree.
    pub const TEMPERATURE: Self = Self::new(4, 0xFFFF);

    const fn new(word: usize, mask: u16) -> Self {
        Self { word, mask }
    }

    /// Extracts this field from a decoded block, if the word exists.
    #[must_use]
    pub fn read(&self, words: &[u16]) -> Option<u16> {
        words.get(self.word).map(|w| decode16bit(*w, self.mask))
    }
}

/// Extracts the bits of `z` covered by `mask`, right-aligned.
///
/// The shift is the mask's trailing-zero count; an empty mask yields 0.
///
/// # Examples
///
/// ```
/// use cyltek_lib::protocol::decode16bit;
///
/// assert_eq!(decode16bit(0x7000, 0x7000), 0x7);
/// assert_eq!(decode16bit(0x0C00, 0xFF00), 0x0C);
/// assert_eq!(decode16bit(0xFFFF, 0), 0);
/// ```
#[must_use]
pub const fn decode16bit(z: u16, mask: u16) -> u16 {
    if mask == 0 {
        return 0;
    }
    (z & mask) >> mask.trailing_zeros()
}

/// Assembles little-endian byte pairs into words.
///
/// A trailing odd byte is dropped.
#[must_use]
pub fn words_from_bytes(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// First input register of unit `id`.
#[must_use]
pub const fn input_start(id: u16) -> u16 {
    REGISTER_BASE + INPUT_WORDS * id
}

/// First holding register of unit `id`.
#[must_use]
pub const fn holding_start(id: u16) -> u16 {
    REGISTER_BASE + HOLDING_WORDS * id
}

/// Register holding the communication-error bit of unit `id`.
#[must_use]
pub const fn comm_status_register(id: u16) -> u16 {
    COMM_STATUS_REGISTER + id / 16
}

/// Returns `true` if `status` (the word at [`comm_status_register`])
/// flags unit `id` as unreachable.
///
/// # Examples
///
/// ```
/// use cyltek_lib::protocol::modbus::comm_error;
///
/// assert!(comm_error(0x0002, 1));
/// assert!(!comm_error(0x0002, 0));
/// assert!(comm_error(0x0001, 16));
/// ```
#[must_use]
pub const fn comm_error(status: u16, id: u16) -> bool {
    status & (1 << (id % 16)) != 0
}

/// Returns the mode a cool/heat system must leave to enter `mode`.
///
/// Only heating and cooling exclude each other; other modes yield `None`.
#[must_use]
pub const fn opposite_mode(mode: u16) -> Option<u16> {
    match mode {
        MODE_HEAT => Some(MODE_COOL),
        MODE_COOL => Some(MODE_HEAT),
        _ => None,
    }
}

/// Decodes a sign-magnitude temperature word into tenths of a degree.
///
/// # Examples
///
/// ```
/// use cyltek_lib::protocol::modbus::signed_tenths;
///
/// assert_eq!(signed_tenths(230), 230);
/// assert_eq!(signed_tenths(0x8037), -55);
/// ```
#[must_use]
pub fn signed_tenths(word: u16) -> i32 {
    let magnitude = i32::from(word & MAGNITUDE);
    if word & SIGN_BIT == 0 { magnitude } else { -magnitude }
}

/// Encodes tenths of a degree as a sign-magnitude word.
///
/// The magnitude saturates at fifteen bits.
#[must_use]
pub fn tenths_word(tenths: i32) -> u16 {
    let magnitude = u16::try_from(tenths.unsigned_abs()).map_or(MAGNITUDE, |m| m.min(MAGNITUDE));
    if tenths < 0 { magnitude | SIGN_BIT } else { magnitude }
}

/// Decoded state of one indoor unit, as raw field codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitRegisters {
    /// Power code.
    pub power: u16,
    /// Fan direction code.
    pub direction: u16,
    /// Fan volume code.
    pub volume: u16,
    /// Mode code.
    pub mode: u16,
    /// Operation status code.
    pub status: u16,
    /// Heat master code.
    pub heat_master: u16,
    /// Target temperature word, see [`signed_tenths`].
    pub setpoint: u16,
    /// Room temperature word, see [`signed_tenths`].
    pub temperature: u16,
}

impl UnitRegisters {
    /// Decodes the input block of one unit.
    ///
    /// Returns `None` if the block is shorter than the room temperature word.
    #[must_use]
    pub fn decode(words: &[u16]) -> Option<Self> {
        Some(Self {
            power: Field::ON_OFF.read(words)?,
            direction: Field::FAN_DIRECTION.read(words)?,
            volume: Field::FAN_VOLUME.read(words)?,
            mode: Field::MODE.read(words)?,
            status: Field::STATUS.read(words)?,
            heat_master: Field::HEAT_MASTER.read(words)?,
            setpoint: Field::TARGET_TEMPERATURE.read(words)?,
            temperature: Field::TEMPERATURE.read(words)?,
        })
    }

    /// Encodes the holding block that applies these settings.
    ///
    /// Layout: `[power | 0x60, direction | volume << 4, mode, status,
    /// setpoint low, setpoint high]`.
    #[must_use]
    pub fn holding_bytes(&self) -> [u8; 6] {
        let mut bytes = self.sync_bytes();
        bytes[0] |= APPLY_FLAG;
        bytes
    }

    /// Encodes the holding block that mirrors these settings without
    /// applying them.
    ///
    /// Written before a change so the holding block starts from the
    /// unit's current state.
    #[must_use]
    pub fn sync_bytes(&self) -> [u8; 6] {
        let [sp_lo, sp_hi] = self.setpoint.to_le_bytes();
        [
            low_byte(self.power),
            low_byte(self.direction) | (low_byte(self.volume) << 4),
            low_byte(self.mode),
            low_byte(self.status),
            sp_lo,
            sp_hi,
        ]
    }

    /// Returns `true` if the unit decides cool/heat for its system.
    ///
    /// That is the top bit of the heat master field.
    #[must_use]
    pub const fn is_master(&self) -> bool {
        self.heat_master & 0x2 != 0
    }

    /// Returns `true` if every writable field equals `other`'s.
    ///
    /// Status, heat master and room temperature are reported by the unit
    /// and ignored.
    #[must_use]
    pub const fn settings_match(&self, other: &Self) -> bool {
        self.power == other.power
            && self.direction == other.direction
            && self.volume == other.volume
            && self.mode == other.mode
            && self.setpoint == other.setpoint
    }
}

fn low_byte(v: u16) -> u8 {
    v.to_le_bytes()[0]
}
