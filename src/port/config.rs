//! Link parameters with a per-field "unspecified" state.
//!
//! A field left at `None` means "leave the port's current setting untouched"
//! when the config is applied. Getters never substitute a default.

use crate::diagnostics::track;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
    Nine,
}

impl DataBits {
    pub const fn bits(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
        }
    }
}

impl TryFrom<u8> for DataBits {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            9 => Ok(Self::Nine),
            other => Err(Error::invalid_arg(format!(
                "data bits must be between 5 and 9, got {other}"
            ))),
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    None,
    Odd,
    Even,
    Mark,
    Space,
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    pub const fn bits(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl TryFrom<u8> for StopBits {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(Error::invalid_arg(format!(
                "stop bits must be 1 or 2, got {other}"
            ))),
        }
    }
}

/// RTS line behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rts {
    Off,
    On,
    FlowControl,
}

/// CTS line behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cts {
    Ignore,
    FlowControl,
}

/// DTR line behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dtr {
    Off,
    On,
    FlowControl,
}

/// DSR line behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dsr {
    Ignore,
    FlowControl,
}

/// Software flow control direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XonXoff {
    Disabled,
    In,
    Out,
    InOut,
}

/// Standard flow-control presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowControl {
    None,
    XonXoff,
    RtsCts,
    DtrDsr,
}

/// Names one field of a [`PortConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    BaudRate,
    DataBits,
    Parity,
    StopBits,
    Rts,
    Cts,
    Dtr,
    Dsr,
    XonXoff,
}

/// Serial link parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    baud_rate: Option<NonZeroU32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_bits: Option<DataBits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parity: Option<Parity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_bits: Option<StopBits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rts: Option<Rts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cts: Option<Cts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dtr: Option<Dtr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dsr: Option<Dsr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xon_xoff: Option<XonXoff>,
}

impl PortConfig {
    /// A config with every field unspecified.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field is specified.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate.map(NonZeroU32::get)
    }

    pub fn data_bits(&self) -> Option<DataBits> {
        self.data_bits
    }

    pub fn parity(&self) -> Option<Parity> {
        self.parity
    }

    pub fn stop_bits(&self) -> Option<StopBits> {
        self.stop_bits
    }

    pub fn rts(&self) -> Option<Rts> {
        self.rts
    }

    pub fn cts(&self) -> Option<Cts> {
        self.cts
    }

    pub fn dtr(&self) -> Option<Dtr> {
        self.dtr
    }

    pub fn dsr(&self) -> Option<Dsr> {
        self.dsr
    }

    pub fn xon_xoff(&self) -> Option<XonXoff> {
        self.xon_xoff
    }

    /// Set the baud rate. Zero is rejected.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        track("set_config_baudrate", || {
            let baud_rate = NonZeroU32::new(baud_rate)
                .ok_or_else(|| Error::invalid_arg("baud rate must be greater than zero"))?;
            self.baud_rate = Some(baud_rate);
            Ok(())
        })
    }

    pub fn set_data_bits(&mut self, bits: DataBits) {
        self.data_bits = Some(bits);
    }

    pub fn set_parity(&mut self, parity: Parity) {
        self.parity = Some(parity);
    }

    pub fn set_stop_bits(&mut self, stop_bits: StopBits) {
        self.stop_bits = Some(stop_bits);
    }

    pub fn set_rts(&mut self, rts: Rts) {
        self.rts = Some(rts);
    }

    pub fn set_cts(&mut self, cts: Cts) {
        self.cts = Some(cts);
    }

    pub fn set_dtr(&mut self, dtr: Dtr) {
        self.dtr = Some(dtr);
    }

    pub fn set_dsr(&mut self, dsr: Dsr) {
        self.dsr = Some(dsr);
    }

    pub fn set_xon_xoff(&mut self, xon_xoff: XonXoff) {
        self.xon_xoff = Some(xon_xoff);
    }

    /// Set the flow-control fields together from a preset.
    ///
    /// Leaving a hardware preset turns its output line from flow control into a
    /// plain asserted line and stops honouring its input line.
    pub fn set_flow_control(&mut self, preset: FlowControl) {
        self.xon_xoff = Some(if preset == FlowControl::XonXoff {
            XonXoff::InOut
        } else {
            XonXoff::Disabled
        });

        if preset == FlowControl::RtsCts {
            self.rts = Some(Rts::FlowControl);
            self.cts = Some(Cts::FlowControl);
        } else {
            if self.rts == Some(Rts::FlowControl) {
                self.rts = Some(Rts::On);
            }
            self.cts = Some(Cts::Ignore);
        }

        if preset == FlowControl::DtrDsr {
            self.dtr = Some(Dtr::FlowControl);
            self.dsr = Some(Dsr::FlowControl);
        } else {
            if self.dtr == Some(Dtr::FlowControl) {
                self.dtr = Some(Dtr::On);
            }
            self.dsr = Some(Dsr::Ignore);
        }
    }

    /// The preset these fields describe, if they describe exactly one.
    pub fn flow_control(&self) -> Option<FlowControl> {
        let rts_flow = self.rts == Some(Rts::FlowControl);
        let cts_flow = self.cts? == Cts::FlowControl;
        let dtr_flow = self.dtr == Some(Dtr::FlowControl);
        let dsr_flow = self.dsr? == Dsr::FlowControl;
        let xon = self.xon_xoff?;

        match (rts_flow && cts_flow, dtr_flow && dsr_flow, xon) {
            (true, false, XonXoff::Disabled) if !dtr_flow && !dsr_flow => Some(FlowControl::RtsCts),
            (false, true, XonXoff::Disabled) if !rts_flow && !cts_flow => Some(FlowControl::DtrDsr),
            (false, false, XonXoff::InOut)
                if !rts_flow && !cts_flow && !dtr_flow && !dsr_flow =>
            {
                Some(FlowControl::XonXoff)
            }
            (false, false, XonXoff::Disabled)
                if !rts_flow && !cts_flow && !dtr_flow && !dsr_flow =>
            {
                Some(FlowControl::None)
            }
            _ => None,
        }
    }

    /// Copy every field `other` specifies over this config.
    pub fn merge(&mut self, other: &PortConfig) {
        self.baud_rate = other.baud_rate.or(self.baud_rate);
        self.data_bits = other.data_bits.or(self.data_bits);
        self.parity = other.parity.or(self.parity);
        self.stop_bits = other.stop_bits.or(self.stop_bits);
        self.rts = other.rts.or(self.rts);
        self.cts = other.cts.or(self.cts);
        self.dtr = other.dtr.or(self.dtr);
        self.dsr = other.dsr.or(self.dsr);
        self.xon_xoff = other.xon_xoff.or(self.xon_xoff);
    }

    /// Return `field` to the unspecified state.
    pub fn unset(&mut self, field: ConfigField) {
        match field {
            ConfigField::BaudRate => self.baud_rate = None,
            ConfigField::DataBits => self.data_bits = None,
            ConfigField::Parity => self.parity = None,
            ConfigField::StopBits => self.stop_bits = None,
            ConfigField::Rts => self.rts = None,
            ConfigField::Cts => self.cts = None,
            ConfigField::Dtr => self.dtr = None,
            ConfigField::Dsr => self.dsr = None,
            ConfigField::XonXoff => self.xon_xoff = None,
        }
    }

    /// This config with `other` merged over it.
    pub fn merged(&self, other: &PortConfig) -> PortConfig {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Result<Self> {
        self.set_baud_rate(baud_rate)?;
        Ok(self)
    }

    pub fn with_data_bits(mut self, bits: DataBits) -> Self {
        self.data_bits = Some(bits);
        self
    }

    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = Some(parity);
        self
    }

    pub fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = Some(stop_bits);
        self
    }

    pub fn with_rts(mut self, rts: Rts) -> Self {
        self.rts = Some(rts);
        self
    }

    pub fn with_cts(mut self, cts: Cts) -> Self {
        self.cts = Some(cts);
        self
    }

    pub fn with_dtr(mut self, dtr: Dtr) -> Self {
        self.dtr = Some(dtr);
        self
    }

    pub fn with_dsr(mut self, dsr: Dsr) -> Self {
        self.dsr = Some(dsr);
        self
    }

    pub fn with_xon_xoff(mut self, xon_xoff: XonXoff) -> Self {
        self.xon_xoff = Some(xon_xoff);
        self
    }

    pub fn with_flow_control(mut self, preset: FlowControl) -> Self {
        self.set_flow_control(preset);
        self
    }
}
