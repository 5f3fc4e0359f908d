//! Core types used throughout catlink.
//!
//! These describe what a caller asks of a rig (VFOs, modes, levels,
//! functions) independently of how any vendor encodes it on the wire.
//! Most enums come with a matching bit set (e.g. [`ModeSet`]) so that
//! capability descriptors can declare support as compact masks.

use std::fmt;
use std::str::FromStr;

/// Declares a `u32`-backed set type over a fieldless enum that has an
/// `ALL` slice in declaration order.
macro_rules! flag_set {
    ($(#[$doc:meta])* $set:ident of $item:ident) => {
        impl $item {
            /// Bit assigned to this member inside its set type.
            pub const fn bit(self) -> u32 {
                1 << (self as u32)
            }
        }

        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $set(u32);

        impl $set {
            /// The empty set.
            pub const EMPTY: $set = $set(0);

            /// Build a set from a list of members.
            pub const fn of(items: &[$item]) -> Self {
                let mut bits = 0u32;
                let mut i = 0;
                while i < items.len() {
                    bits |= items[i].bit();
                    i += 1;
                }
                $set(bits)
            }

            /// Every member of the underlying enum.
            pub const fn all() -> Self {
                Self::of($item::ALL)
            }

            pub const fn contains(self, item: $item) -> bool {
                self.0 & item.bit() != 0
            }

            pub const fn union(self, other: Self) -> Self {
                $set(self.0 | other.0)
            }

            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Raw bit representation.
            pub const fn bits(self) -> u32 {
                self.0
            }

            /// Members in declaration order.
            pub fn iter(self) -> impl Iterator<Item = $item> {
                $item::ALL.iter().copied().filter(move |m| self.contains(*m))
            }
        }

        impl std::ops::BitOr for $set {
            type Output = $set;

            fn bitor(self, rhs: $set) -> $set {
                self.union(rhs)
            }
        }

        impl FromIterator<$item> for $set {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                iter.into_iter().fold($set::EMPTY, |set, m| $set(set.0 | m.bit()))
            }
        }
    };
}

// ---------------------------------------------------------------
// VFOs
// ---------------------------------------------------------------

/// A tuning channel inside the rig.
///
/// `Current` is a placeholder that the session resolves to whichever VFO
/// is selected; it is never stored as the session's current VFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vfo {
    A,
    B,
    Main,
    Sub,
    Memory,
    Current,
}

impl Vfo {
    pub const ALL: &'static [Vfo] = &[
        Vfo::A,
        Vfo::B,
        Vfo::Main,
        Vfo::Sub,
        Vfo::Memory,
        Vfo::Current,
    ];
}

flag_set!(
    /// Set of VFOs a model can address.
    VfoSet of Vfo
);

impl fmt::Display for Vfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Vfo::A => "VFOA",
            Vfo::B => "VFOB",
            Vfo::Main => "Main",
            Vfo::Sub => "Sub",
            Vfo::Memory => "MEM",
            Vfo::Current => "currVFO",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string cannot be parsed into one of the enums in
/// this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTypeError {
    what: &'static str,
    input: String,
}

impl ParseTypeError {
    fn new(what: &'static str, input: &str) -> Self {
        ParseTypeError {
            what,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ParseTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.what, self.input)
    }
}

impl std::error::Error for ParseTypeError {}

impl FromStr for Vfo {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" | "VFOA" => Ok(Vfo::A),
            "B" | "VFOB" => Ok(Vfo::B),
            "MAIN" => Ok(Vfo::Main),
            "SUB" => Ok(Vfo::Sub),
            "MEM" | "MEMORY" => Ok(Vfo::Memory),
            "CURR" | "CURRVFO" | "CURRENT" => Ok(Vfo::Current),
            _ => Err(ParseTypeError::new("VFO", s)),
        }
    }
}

// ---------------------------------------------------------------
// Modes and passbands
// ---------------------------------------------------------------

/// Operating mode of the transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Upper sideband voice.
    USB,
    /// Lower sideband voice.
    LSB,
    /// CW with the usual upper sideband offset.
    CW,
    /// CW reverse (lower sideband offset).
    CWR,
    /// Amplitude modulation.
    AM,
    /// Frequency modulation.
    FM,
    /// Radio teletype (FSK), upper sideband.
    RTTY,
    /// Radio teletype, reverse sideband.
    RTTYR,
    /// Sound-card data on upper sideband.
    DataUSB,
    /// Sound-card data on lower sideband.
    DataLSB,
    /// Data over FM.
    DataFM,
    /// Data over AM.
    DataAM,
}

impl Mode {
    pub const ALL: &'static [Mode] = &[
        Mode::USB,
        Mode::LSB,
        Mode::CW,
        Mode::CWR,
        Mode::AM,
        Mode::FM,
        Mode::RTTY,
        Mode::RTTYR,
        Mode::DataUSB,
        Mode::DataLSB,
        Mode::DataFM,
        Mode::DataAM,
    ];
}

flag_set!(
    /// Set of operating modes, used by frequency ranges, tuning steps and
    /// filter lists.
    ModeSet of Mode
);

impl ModeSet {
    /// USB and LSB.
    pub const SSB: ModeSet = ModeSet::of(&[Mode::USB, Mode::LSB]);
    /// CW in both sidebands.
    pub const CW: ModeSet = ModeSet::of(&[Mode::CW, Mode::CWR]);
    /// RTTY in both sidebands.
    pub const RTTY: ModeSet = ModeSet::of(&[Mode::RTTY, Mode::RTTYR]);
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::USB => "USB",
            Mode::LSB => "LSB",
            Mode::CW => "CW",
            Mode::CWR => "CWR",
            Mode::AM => "AM",
            Mode::FM => "FM",
            Mode::RTTY => "RTTY",
            Mode::RTTYR => "RTTYR",
            Mode::DataUSB => "DATA-USB",
            Mode::DataLSB => "DATA-LSB",
            Mode::DataFM => "DATA-FM",
            Mode::DataAM => "DATA-AM",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Mode {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USB" => Ok(Mode::USB),
            "LSB" => Ok(Mode::LSB),
            "CW" => Ok(Mode::CW),
            "CWR" => Ok(Mode::CWR),
            "AM" => Ok(Mode::AM),
            "FM" => Ok(Mode::FM),
            "RTTY" => Ok(Mode::RTTY),
            "RTTYR" => Ok(Mode::RTTYR),
            "DATA-USB" | "PKTUSB" => Ok(Mode::DataUSB),
            "DATA-LSB" | "PKTLSB" => Ok(Mode::DataLSB),
            "DATA-FM" | "PKTFM" => Ok(Mode::DataFM),
            "DATA-AM" | "PKTAM" => Ok(Mode::DataAM),
            _ => Err(ParseTypeError::new("mode", s)),
        }
    }
}

/// Receiver passband (filter width) in hertz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Passband(u32);

impl Passband {
    /// Create a passband from a width in hertz.
    pub const fn from_hz(hz: u32) -> Self {
        Passband(hz)
    }

    /// The width in hertz.
    pub const fn hz(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Passband {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

// ---------------------------------------------------------------
// Antennas
// ---------------------------------------------------------------

/// Antenna connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Antenna {
    Ant1,
    Ant2,
    Ant3,
    Ant4,
    Ant5,
}

impl Antenna {
    pub const ALL: &'static [Antenna] = &[
        Antenna::Ant1,
        Antenna::Ant2,
        Antenna::Ant3,
        Antenna::Ant4,
        Antenna::Ant5,
    ];
}

flag_set!(
    /// Set of antenna connectors a frequency range is available on.
    AntennaSet of Antenna
);

// ---------------------------------------------------------------
// Levels, functions, parameters
// ---------------------------------------------------------------

/// An analog setting or meter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Preamp gain in dB; 0 is off.
    Preamp,
    /// Attenuation in dB; 0 is off.
    Attenuator,
    /// Transmit power setting, 0.0 to 1.0.
    RfPower,
    /// Uncalibrated S-meter reading in device units.
    RawStrength,
    /// Signal strength in dB relative to S9.
    Strength,
    Swr,
    Alc,
    /// Forward power meter in watts.
    RfPowerMeter,
    /// Speech compression meter in dB.
    Compression,
    /// PA drain voltage in volts.
    DrainVoltage,
    /// PA drain current in amperes.
    DrainCurrent,
}

impl Level {
    pub const ALL: &'static [Level] = &[
        Level::Preamp,
        Level::Attenuator,
        Level::RfPower,
        Level::RawStrength,
        Level::Strength,
        Level::Swr,
        Level::Alc,
        Level::RfPowerMeter,
        Level::Compression,
        Level::DrainVoltage,
        Level::DrainCurrent,
    ];

    /// Whether values of this level are fractional.
    pub fn is_float(self) -> bool {
        !matches!(
            self,
            Level::Preamp | Level::Attenuator | Level::RawStrength | Level::Strength
        )
    }
}

flag_set!(
    /// Set of levels a model can read or write.
    LevelSet of Level
);

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Preamp => "PREAMP",
            Level::Attenuator => "ATT",
            Level::RfPower => "RFPOWER",
            Level::RawStrength => "RAWSTR",
            Level::Strength => "STRENGTH",
            Level::Swr => "SWR",
            Level::Alc => "ALC",
            Level::RfPowerMeter => "RFPOWER_METER",
            Level::Compression => "COMP_METER",
            Level::DrainVoltage => "VD_METER",
            Level::DrainCurrent => "ID_METER",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Level {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Level::ALL
            .iter()
            .copied()
            .find(|l| l.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseTypeError::new("level", s))
    }
}

/// Value carried by [`Level`] reads and writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelValue {
    Int(i32),
    Float(f32),
}

impl LevelValue {
    /// The value as an integer, rounding fractional values.
    pub fn as_int(self) -> i32 {
        match self {
            LevelValue::Int(v) => v,
            LevelValue::Float(v) => v.round() as i32,
        }
    }

    pub fn as_float(self) -> f32 {
        match self {
            LevelValue::Int(v) => v as f32,
            LevelValue::Float(v) => v,
        }
    }
}

impl fmt::Display for LevelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelValue::Int(v) => write!(f, "{v}"),
            LevelValue::Float(v) => write!(f, "{v:.3}"),
        }
    }
}

/// An on/off rig function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Func {
    /// Antenna tuner in line.
    Tuner,
    /// Dial lock.
    Lock,
    NoiseBlanker,
    Compressor,
    Vox,
}

impl Func {
    pub const ALL: &'static [Func] = &[
        Func::Tuner,
        Func::Lock,
        Func::NoiseBlanker,
        Func::Compressor,
        Func::Vox,
    ];
}

flag_set!(
    /// Set of functions a model can read or toggle.
    FuncSet of Func
);

impl FromStr for Func {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TUNER" => Ok(Func::Tuner),
            "LOCK" => Ok(Func::Lock),
            "NB" => Ok(Func::NoiseBlanker),
            "COMP" => Ok(Func::Compressor),
            "VOX" => Ok(Func::Vox),
            _ => Err(ParseTypeError::new("function", s)),
        }
    }
}

/// A rig-wide parameter (not tied to a VFO).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parm {
    Announce,
    Backlight,
    Beep,
    Time,
}

impl Parm {
    pub const ALL: &'static [Parm] = &[Parm::Announce, Parm::Backlight, Parm::Beep, Parm::Time];
}

flag_set!(
    /// Set of rig-wide parameters a model exposes.
    ParmSet of Parm
);

// ---------------------------------------------------------------
// Operations
// ---------------------------------------------------------------

/// One-shot VFO and memory operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VfoOp {
    /// Copy the active VFO to the other one (A=B).
    Copy,
    /// Exchange VFO A and B.
    Exchange,
    /// Store the VFO into the current memory channel.
    FromVfo,
    /// Load the current memory channel into the VFO.
    ToVfo,
    /// Erase the current memory channel.
    MemClear,
    /// Start an antenna tuning cycle.
    Tune,
}

impl VfoOp {
    pub const ALL: &'static [VfoOp] = &[
        VfoOp::Copy,
        VfoOp::Exchange,
        VfoOp::FromVfo,
        VfoOp::ToVfo,
        VfoOp::MemClear,
        VfoOp::Tune,
    ];
}

flag_set!(
    /// Set of VFO operations a model implements.
    VfoOpSet of VfoOp
);

/// Scan control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanOp {
    Stop,
    /// Programmed scan across the VFO band edges.
    Vfo,
    /// Scan through memory channels.
    Memory,
}

impl ScanOp {
    pub const ALL: &'static [ScanOp] = &[ScanOp::Stop, ScanOp::Vfo, ScanOp::Memory];
}

flag_set!(
    /// Set of scan operations a model implements.
    ScanSet of ScanOp
);

/// Wall-clock time held by the rig.
///
/// `utc_offset` is in `±HHMM` form, e.g. `-0500` for US Eastern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub utc_offset: i16,
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.utc_offset < 0 { '-' } else { '+' };
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{sign}{:04}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.utc_offset.unsigned_abs()
        )
    }
}

// ---------------------------------------------------------------
// Model identity
// ---------------------------------------------------------------

/// Transceiver manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manufacturer {
    Yaesu,
    Kenwood,
    Icom,
    /// RFT (Rundfunk- und Fernmeldetechnik) professional receivers.
    Rft,
}

impl Manufacturer {
    /// Thousands block used for this manufacturer's model ids.
    pub const fn model_block(self) -> u32 {
        match self {
            Manufacturer::Yaesu => 1,
            Manufacturer::Kenwood => 2,
            Manufacturer::Icom => 3,
            Manufacturer::Rft => 24,
        }
    }
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Manufacturer::Yaesu => "Yaesu",
            Manufacturer::Kenwood => "Kenwood",
            Manufacturer::Icom => "Icom",
            Manufacturer::Rft => "RFT",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Manufacturer {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaesu" => Ok(Manufacturer::Yaesu),
            "kenwood" => Ok(Manufacturer::Kenwood),
            "icom" => Ok(Manufacturer::Icom),
            "rft" => Ok(Manufacturer::Rft),
            _ => Err(ParseTypeError::new("manufacturer", s)),
        }
    }
}

/// Numeric model identifier, `manufacturer block * 1000 + number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u32);

impl ModelId {
    pub const fn new(manufacturer: Manufacturer, number: u32) -> Self {
        ModelId(manufacturer.model_block() * 1000 + number)
    }

    pub const fn from_raw(raw: u32) -> Self {
        ModelId(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ITU region, selecting which pair of frequency range lists applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// Europe, Africa, Middle East.
    #[default]
    One,
    /// The Americas.
    Two,
}

impl FromStr for Region {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "1" => Ok(Region::One),
            "2" => Ok(Region::Two),
            _ => Err(ParseTypeError::new("ITU region", s)),
        }
    }
}
