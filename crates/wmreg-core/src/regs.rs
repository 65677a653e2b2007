//! WM8960 register map reference
//!
//! Register addresses and the bit fields used by the built-in macros.
//! Only the fields the tool needs are spelled out; everything else can still
//! be written as a raw 9-bit value.

use bitflags::bitflags;

/// Default device address (CSB/ADDR strap low)
pub const DEVICE_ADDR: u8 = 0x1A;

/// Alternate device address seen on some boards
pub const DEVICE_ADDR_ALT: u8 = 0x1B;

/// Register addresses
pub mod addr {
    /// Left input PGA volume
    pub const LEFT_IN_VOL: u8 = 0x00;
    /// Right input PGA volume
    pub const RIGHT_IN_VOL: u8 = 0x01;
    /// LOUT1 (left headphone) volume
    pub const LOUT1_VOL: u8 = 0x02;
    /// ROUT1 (right headphone) volume
    pub const ROUT1_VOL: u8 = 0x03;
    /// Clocking 1
    pub const CLOCK1: u8 = 0x04;
    /// ADC and DAC control 1
    pub const ADC_DAC_CTRL1: u8 = 0x05;
    /// ADC and DAC control 2
    pub const ADC_DAC_CTRL2: u8 = 0x06;
    /// Audio interface 1
    pub const AUDIO_IFACE1: u8 = 0x07;
    /// Clocking 2
    pub const CLOCK2: u8 = 0x08;
    /// Audio interface 2
    pub const AUDIO_IFACE2: u8 = 0x09;
    /// Left DAC digital volume
    pub const LEFT_DAC_VOL: u8 = 0x0A;
    /// Right DAC digital volume
    pub const RIGHT_DAC_VOL: u8 = 0x0B;
    /// Software reset (any write resets)
    pub const RESET: u8 = 0x0F;
    /// 3D control
    pub const CTRL_3D: u8 = 0x10;
    /// ALC 1
    pub const ALC1: u8 = 0x11;
    /// ALC 2
    pub const ALC2: u8 = 0x12;
    /// ALC 3
    pub const ALC3: u8 = 0x13;
    /// Noise gate
    pub const NOISE_GATE: u8 = 0x14;
    /// Left ADC volume
    pub const LEFT_ADC_VOL: u8 = 0x15;
    /// Right ADC volume
    pub const RIGHT_ADC_VOL: u8 = 0x16;
    /// Additional control 1
    pub const ADDITIONAL_CTRL1: u8 = 0x17;
    /// Additional control 2
    pub const ADDITIONAL_CTRL2: u8 = 0x18;
    /// Power management 1
    pub const POWER_MGMT1: u8 = 0x19;
    /// Power management 2
    pub const POWER_MGMT2: u8 = 0x1A;
    /// Additional control 3
    pub const ADDITIONAL_CTRL3: u8 = 0x1B;
    /// Anti-pop 1
    pub const ANTI_POP1: u8 = 0x1C;
    /// Anti-pop 2
    pub const ANTI_POP2: u8 = 0x1D;
    /// ADCL signal path
    pub const ADCL_SIGNAL_PATH: u8 = 0x20;
    /// ADCR signal path
    pub const ADCR_SIGNAL_PATH: u8 = 0x21;
    /// Left output mixer
    pub const LEFT_OUT_MIX: u8 = 0x22;
    /// Right output mixer
    pub const RIGHT_OUT_MIX: u8 = 0x25;
    /// Mono out mixer 1
    pub const MONO_OUT_MIX1: u8 = 0x26;
    /// Mono out mixer 2
    pub const MONO_OUT_MIX2: u8 = 0x27;
    /// LOUT2 (left speaker) volume
    pub const LOUT2_VOL: u8 = 0x28;
    /// ROUT2 (right speaker) volume
    pub const ROUT2_VOL: u8 = 0x29;
    /// Mono out volume
    pub const MONO_OUT_VOL: u8 = 0x2A;
    /// Input boost mixer 1
    pub const INPUT_BOOST_MIX1: u8 = 0x2B;
    /// Input boost mixer 2
    pub const INPUT_BOOST_MIX2: u8 = 0x2C;
    /// Bypass 1
    pub const BYPASS1: u8 = 0x2D;
    /// Bypass 2
    pub const BYPASS2: u8 = 0x2E;
    /// Power management 3
    pub const POWER_MGMT3: u8 = 0x2F;
    /// Additional control 4
    pub const ADDITIONAL_CTRL4: u8 = 0x30;
    /// Class D control 1
    pub const CLASS_D_CTRL1: u8 = 0x31;
    /// Class D control 3
    pub const CLASS_D_CTRL3: u8 = 0x33;
    /// PLL 1
    pub const PLL1: u8 = 0x34;
    /// PLL 2
    pub const PLL2: u8 = 0x35;
    /// PLL 3
    pub const PLL3: u8 = 0x36;
    /// PLL 4
    pub const PLL4: u8 = 0x37;
}

bitflags! {
    /// Power management 1 (R25)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Power1: u16 {
        /// VMID divider 2 x 50k (playback/record)
        const VMID_50K   = 0b01 << 7;
        /// VMID divider 2 x 250k (low power standby)
        const VMID_250K  = 0b10 << 7;
        /// VMID divider 2 x 5k (fast start-up)
        const VMID_5K    = 0b11 << 7;
        /// VREF enable
        const VREF       = 1 << 6;
        /// Left analogue input PGA and boost
        const AINL       = 1 << 5;
        /// Right analogue input PGA and boost
        const AINR       = 1 << 4;
        /// Left ADC
        const ADCL       = 1 << 3;
        /// Right ADC
        const ADCR       = 1 << 2;
        /// Microphone bias
        const MICB       = 1 << 1;
        /// Master clock disable
        const DIGENB     = 1 << 0;
    }
}

bitflags! {
    /// Power management 2 (R26)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Power2: u16 {
        /// Left DAC
        const DACL   = 1 << 8;
        /// Right DAC
        const DACR   = 1 << 7;
        /// LOUT1 output buffer
        const LOUT1  = 1 << 6;
        /// ROUT1 output buffer
        const ROUT1  = 1 << 5;
        /// Left speaker output
        const SPKL   = 1 << 4;
        /// Right speaker output
        const SPKR   = 1 << 3;
        /// OUT3 output buffer
        const OUT3   = 1 << 1;
        /// PLL
        const PLL_EN = 1 << 0;
    }
}

bitflags! {
    /// Power management 3 (R47)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Power3: u16 {
        /// Left input PGA
        const LMIC  = 1 << 5;
        /// Right input PGA
        const RMIC  = 1 << 4;
        /// Left output mixer
        const LOMIX = 1 << 3;
        /// Right output mixer
        const ROMIX = 1 << 2;
    }
}

bitflags! {
    /// Left/right output mixer (R34 / R37)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OutMix: u16 {
        /// DAC to output mixer
        const DAC_TO_MIX   = 1 << 8;
        /// Input boost (LINPUT3/RINPUT3) to output mixer
        const INPUT_TO_MIX = 1 << 7;
    }
}

/// Output volume registers (R2, R3, R40, R41)
pub mod out_vol {
    /// Volume update: latch both channels at once
    pub const VU: u16 = 1 << 8;
    /// Zero cross enable
    pub const ZC: u16 = 1 << 7;
    /// Volume code mask
    pub const VOL_MASK: u16 = 0x7F;
    /// 0 dB
    pub const VOL_0DB: u16 = 0x79;
}

/// DAC digital volume registers (R10, R11)
pub mod dac_vol {
    /// Volume update
    pub const VU: u16 = 1 << 8;
    /// 0 dB
    pub const VOL_0DB: u16 = 0xFF;
}

/// Input PGA volume registers (R0, R1)
pub mod in_vol {
    /// Input PGA volume update
    pub const IPVU: u16 = 1 << 8;
    /// Input PGA analogue mute
    pub const INMUTE: u16 = 1 << 7;
    /// Input PGA zero cross detector
    pub const IZC: u16 = 1 << 6;
    /// Volume code mask
    pub const VOL_MASK: u16 = 0x3F;
    /// 0 dB
    pub const VOL_0DB: u16 = 0x17;
    /// +30 dB
    pub const VOL_30DB: u16 = 0x3F;
}

/// ADC and DAC control 1 (R5)
pub mod adc_dac_ctrl1 {
    /// DAC digital soft mute
    pub const DACMU: u16 = 1 << 3;
}

/// Audio interface 1 (R7)
pub mod audio_iface {
    /// Master mode (codec drives BCLK/LRCLK)
    pub const MASTER: u16 = 1 << 6;
    /// Word length 16 bits
    pub const WL_16: u16 = 0b00 << 2;
    /// Word length 20 bits
    pub const WL_20: u16 = 0b01 << 2;
    /// Word length 24 bits
    pub const WL_24: u16 = 0b10 << 2;
    /// Word length 32 bits
    pub const WL_32: u16 = 0b11 << 2;
    /// Right justified
    pub const FMT_RIGHT_J: u16 = 0b00;
    /// Left justified
    pub const FMT_LEFT_J: u16 = 0b01;
    /// I2S
    pub const FMT_I2S: u16 = 0b10;
    /// DSP mode
    pub const FMT_DSP: u16 = 0b11;
}

/// Clocking 1 (R4)
pub mod clock1 {
    /// SYSCLK from PLL instead of MCLK
    pub const CLKSEL_PLL: u16 = 1 << 0;
    /// SYSCLK from MCLK
    pub const CLKSEL_MCLK: u16 = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_fields_match_datasheet_values() {
        assert_eq!((Power1::VMID_50K | Power1::VREF).bits(), 0x0C0);
        assert_eq!(
            (Power2::DACL | Power2::DACR | Power2::LOUT1 | Power2::ROUT1).bits(),
            0x1E0
        );
        assert_eq!((Power3::LOMIX | Power3::ROMIX).bits(), 0x00C);
    }

    #[test]
    fn test_interface_format_codes() {
        assert_eq!(audio_iface::WL_32 | audio_iface::FMT_I2S, 0x00E);
        assert_eq!(out_vol::VU | out_vol::VOL_0DB, 0x179);
    }
}
