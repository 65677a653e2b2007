//! Compiled-in register write sequences
//!
//! Each macro is a fixed list of writes that brings the codec into a known
//! state. Order matters: the WM8960 needs VMID/VREF and the analogue blocks
//! powered before the mixers are routed and the outputs unmuted.

use crate::batch::{self, BatchOutcome};
use crate::error::{Error, Result};
use crate::regs::{
    adc_dac_ctrl1, addr, audio_iface, clock1, dac_vol, out_vol, OutMix, Power1, Power2, Power3,
};
use crate::transport::I2cMaster;

/// One write in a macro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroStep {
    /// Register address
    pub register: u8,
    /// Value to write (9 bits)
    pub value: u16,
    /// What the write does
    pub description: &'static str,
}

/// A named write sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroDefinition {
    /// Name used with the `macro` command
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// One-line summary
    pub summary: &'static str,
    /// Writes, in execution order
    pub steps: &'static [MacroStep],
}

const fn step(register: u8, value: u16, description: &'static str) -> MacroStep {
    MacroStep {
        register,
        value,
        description,
    }
}

/// Headphone playback over I2S with MCLK as SYSCLK
const HP_I2S_INIT: &[MacroStep] = &[
    step(addr::RESET, 0x000, "Reset"),
    step(
        addr::POWER_MGMT1,
        Power1::VMID_50K.bits() | Power1::VREF.bits(),
        "Power1: VREF up + VMID=50k",
    ),
    step(
        addr::POWER_MGMT2,
        Power2::DACL.bits() | Power2::DACR.bits() | Power2::LOUT1.bits() | Power2::ROUT1.bits(),
        "Power2: DACL/DACR + LOUT1/ROUT1 on",
    ),
    step(
        addr::POWER_MGMT3,
        Power3::LOMIX.bits() | Power3::ROMIX.bits(),
        "Power3: enable L/R output mixers",
    ),
    step(
        addr::LEFT_OUT_MIX,
        OutMix::DAC_TO_MIX.bits(),
        "Route left DAC to left out mixer",
    ),
    step(
        addr::RIGHT_OUT_MIX,
        OutMix::DAC_TO_MIX.bits(),
        "Route right DAC to right out mixer",
    ),
    step(
        addr::LOUT1_VOL,
        out_vol::VU | out_vol::VOL_0DB,
        "LOUT1 volume 0 dB, update",
    ),
    step(
        addr::ROUT1_VOL,
        out_vol::VU | out_vol::VOL_0DB,
        "ROUT1 volume 0 dB, update",
    ),
    step(addr::LEFT_DAC_VOL, dac_vol::VOL_0DB, "Left DAC volume 0 dB"),
    step(addr::RIGHT_DAC_VOL, dac_vol::VOL_0DB, "Right DAC volume 0 dB"),
    step(addr::ADC_DAC_CTRL1, 0x000, "Unmute DAC digital soft mute"),
    step(
        addr::AUDIO_IFACE1,
        audio_iface::WL_32 | audio_iface::FMT_I2S,
        "Audio IF: I2S slave, 32-bit (change for your width)",
    ),
    step(addr::CLOCK1, clock1::CLKSEL_MCLK, "CLK1: SYSCLK from MCLK"),
];

const RESET: &[MacroStep] = &[step(addr::RESET, 0x000, "Reset")];

const DAC_MUTE: &[MacroStep] = &[step(
    addr::ADC_DAC_CTRL1,
    adc_dac_ctrl1::DACMU,
    "Enable DAC digital soft mute",
)];

const DAC_UNMUTE: &[MacroStep] = &[step(
    addr::ADC_DAC_CTRL1,
    0x000,
    "Release DAC digital soft mute",
)];

/// All macros, in listing order
pub const CATALOG: &[MacroDefinition] = &[
    MacroDefinition {
        name: "hp_i2s_init",
        aliases: &["bringup"],
        summary: "Reset, power up DACs and headphone outputs, I2S slave playback",
        steps: HP_I2S_INIT,
    },
    MacroDefinition {
        name: "reset",
        aliases: &[],
        summary: "Software reset to power-on defaults",
        steps: RESET,
    },
    MacroDefinition {
        name: "dac_mute",
        aliases: &[],
        summary: "Soft-mute the DAC",
        steps: DAC_MUTE,
    },
    MacroDefinition {
        name: "dac_unmute",
        aliases: &[],
        summary: "Release DAC soft mute",
        steps: DAC_UNMUTE,
    },
];

/// Primary names of all macros
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|m| m.name)
}

/// Look up a macro by name or alias
pub fn find(name: &str) -> Result<&'static MacroDefinition> {
    CATALOG
        .iter()
        .find(|m| m.name == name || m.aliases.iter().any(|a| *a == name))
        .ok_or(Error::UnknownMacro)
}

/// Run a macro against the device, stopping at the first failed write
///
/// `on_step` sees every attempted step with its result.
pub fn run<M, F>(
    bus: &mut M,
    device: u8,
    definition: &MacroDefinition,
    mut on_step: F,
) -> BatchOutcome
where
    M: I2cMaster + ?Sized,
    F: FnMut(usize, &MacroStep, Result<()>),
{
    log::debug!(
        "Running macro '{}' ({} writes) on device {:#04x}",
        definition.name,
        definition.steps.len(),
        device
    );

    batch::write_sequence(
        bus,
        device,
        definition.steps.iter().map(|s| (s.register, s.value)),
        |i, _, _, result| on_step(i, &definition.steps[i], result),
    )
}
