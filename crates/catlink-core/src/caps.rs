//! Capability descriptors: static per-model metadata and request validation.
//!
//! A [`CapabilityDescriptor`] says everything the engine needs to know about
//! a model before it touches the wire: which VFOs exist, which frequencies
//! and modes are legal in each ITU region, which filters and tuning steps
//! the front panel offers, how meters are calibrated, what the serial line
//! defaults are. Backends build one per model with [`DescriptorBuilder`];
//! the registry shares them read-only (`Arc`) across sessions.
//!
//! Every `check_*` method fails with [`Error::InvalidParameter`] or
//! [`Error::Unsupported`] and never performs I/O.

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::calibration::CalibrationTable;
use crate::error::{Error, Result};
use crate::framer::format_freq_mhz;
use crate::types::{
    AntennaSet, Func, FuncSet, Level, LevelSet, Manufacturer, Mode, ModeSet, ModelId, Parm,
    ParmSet, Passband, Region, ScanOp, ScanSet, Vfo, VfoOp, VfoOpSet, VfoSet,
};

// ---------------------------------------------------------------
// Frequency ranges, steps, filters
// ---------------------------------------------------------------

/// A contiguous frequency range with the modes, power limits, VFOs and
/// antennas that apply inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct FreqRange {
    /// Lower edge in hertz (inclusive).
    pub min_hz: u64,
    /// Upper edge in hertz (inclusive).
    pub max_hz: u64,
    pub modes: ModeSet,
    /// Minimum transmit power in watts; `None` for receive ranges.
    pub min_power_w: Option<f32>,
    /// Maximum transmit power in watts; `None` for receive ranges.
    pub max_power_w: Option<f32>,
    /// VFOs allowed to tune here; empty means all.
    pub vfos: VfoSet,
    pub antennas: AntennaSet,
}

impl FreqRange {
    /// A receive range.
    pub fn rx(min_hz: u64, max_hz: u64, modes: ModeSet, vfos: VfoSet) -> Self {
        FreqRange {
            min_hz,
            max_hz,
            modes,
            min_power_w: None,
            max_power_w: None,
            vfos,
            antennas: AntennaSet::EMPTY,
        }
    }

    /// A transmit range with its power limits in watts.
    pub fn tx(min_hz: u64, max_hz: u64, modes: ModeSet, watts: (f32, f32), vfos: VfoSet) -> Self {
        FreqRange {
            min_power_w: Some(watts.0),
            max_power_w: Some(watts.1),
            ..FreqRange::rx(min_hz, max_hz, modes, vfos)
        }
    }

    /// Restrict the range to a set of antenna connectors.
    pub fn antennas(mut self, antennas: AntennaSet) -> Self {
        self.antennas = antennas;
        self
    }

    pub fn contains(&self, freq_hz: u64) -> bool {
        freq_hz >= self.min_hz && freq_hz <= self.max_hz
    }

    /// Whether `vfo` may tune inside this range.
    pub fn allows_vfo(&self, vfo: Vfo) -> bool {
        self.vfos.is_empty() || vfo == Vfo::Current || self.vfos.contains(vfo)
    }
}

impl fmt::Display for FreqRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            format_freq_mhz(self.min_hz),
            format_freq_mhz(self.max_hz)
        )
    }
}

/// A tuning step available in a set of modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningStep {
    pub modes: ModeSet,
    pub step_hz: u32,
}

/// A receive filter available in a set of modes.
///
/// `bandwidth` of `None` accepts any width the caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub modes: ModeSet,
    pub bandwidth: Option<Passband>,
}

// ---------------------------------------------------------------
// Transport defaults
// ---------------------------------------------------------------

/// Physical link kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortType {
    Serial,
    Network,
}

/// Serial parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

/// Serial flow control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Handshake {
    #[default]
    None,
    /// XON/XOFF.
    Software,
    /// RTS/CTS.
    Hardware,
}

/// Line settings and timing the model expects out of the box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportDefaults {
    pub port_type: PortType,
    pub baud_min: u32,
    pub baud_max: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
    pub handshake: Handshake,
    /// Delay between consecutive bytes of one command.
    pub write_delay: Duration,
    /// Delay after the last byte of a command.
    pub post_write_delay: Duration,
    /// Deadline for each reply.
    pub timeout: Duration,
    /// Attempts per transaction, counting the first.
    pub retry: u32,
}

impl Default for TransportDefaults {
    fn default() -> Self {
        TransportDefaults {
            port_type: PortType::Serial,
            baud_min: 9600,
            baud_max: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            handshake: Handshake::None,
            write_delay: Duration::ZERO,
            post_write_delay: Duration::ZERO,
            timeout: Duration::from_millis(1000),
            retry: 3,
        }
    }
}

// ---------------------------------------------------------------
// Attenuator strategy
// ---------------------------------------------------------------

/// Position of `db` in a step list as a 1-based selector; 0 dB is index 0.
pub fn step_to_index(steps: &[u8], db: u8) -> Result<u8> {
    if db == 0 {
        return Ok(0);
    }
    steps
        .iter()
        .position(|&s| s == db)
        .map(|i| i as u8 + 1)
        .ok_or_else(|| {
            Error::InvalidParameter(format!("{db} dB is not one of the steps {steps:?}"))
        })
}

/// Step selected by a 1-based index; index 0 means off and never consults
/// the list.
pub fn index_to_step(steps: &[u8], index: u8) -> Result<u8> {
    if index == 0 {
        return Ok(0);
    }
    steps
        .get(usize::from(index) - 1)
        .copied()
        .ok_or_else(|| {
            Error::Protocol(format!(
                "rig reported step index {index}, model declares {} steps",
                steps.len()
            ))
        })
}

/// How a model encodes attenuator settings on the wire.
///
/// Most rigs send the attenuation in dB; some send a selector index into
/// their attenuator list instead. The engine always talks dB to callers and
/// asks the descriptor's map to translate.
pub trait AttenuatorMap: fmt::Debug + Send + Sync {
    /// Wire value for `db` of attenuation.
    fn encode(&self, steps: &[u8], db: u8) -> Result<u8>;

    /// Attenuation in dB for a wire value.
    fn decode(&self, steps: &[u8], raw: u8) -> Result<u8>;
}

/// The wire value is the attenuation in dB.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecibelAttenuator;

impl AttenuatorMap for DecibelAttenuator {
    fn encode(&self, steps: &[u8], db: u8) -> Result<u8> {
        step_to_index(steps, db).map(|_| db)
    }

    fn decode(&self, _steps: &[u8], raw: u8) -> Result<u8> {
        Ok(raw)
    }
}

/// The wire value is a 1-based index into the step list, 0 for off.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedAttenuator;

impl AttenuatorMap for IndexedAttenuator {
    fn encode(&self, steps: &[u8], db: u8) -> Result<u8> {
        step_to_index(steps, db)
    }

    fn decode(&self, steps: &[u8], raw: u8) -> Result<u8> {
        index_to_step(steps, raw)
    }
}

pub static DECIBEL_ATTENUATOR: DecibelAttenuator = DecibelAttenuator;
pub static INDEXED_ATTENUATOR: IndexedAttenuator = IndexedAttenuator;

// ---------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------

/// Static metadata for one rig model.
#[derive(Debug, Clone)]
pub struct CapabilityDescriptor {
    pub model_id: ModelId,
    pub manufacturer: Manufacturer,
    pub model_name: &'static str,
    pub vfos: VfoSet,
    pub rx_range_list1: Vec<FreqRange>,
    pub tx_range_list1: Vec<FreqRange>,
    pub rx_range_list2: Vec<FreqRange>,
    pub tx_range_list2: Vec<FreqRange>,
    /// Tuning steps; the first entry matching a mode is its default.
    pub tuning_steps: Vec<TuningStep>,
    /// Filters; for each mode the first matching entry is the normal width
    /// and later entries are alternatives. Order is significant.
    pub filters: Vec<Filter>,
    pub meters: Vec<(Level, CalibrationTable)>,
    pub has_get_level: LevelSet,
    pub has_set_level: LevelSet,
    pub has_get_func: FuncSet,
    pub has_set_func: FuncSet,
    pub has_get_parm: ParmSet,
    pub has_set_parm: ParmSet,
    pub vfo_ops: VfoOpSet,
    pub scan_ops: ScanSet,
    /// Preamp gains in dB, in selector order.
    pub preamp: Vec<u8>,
    /// Attenuator steps in dB, in selector order.
    pub attenuator: Vec<u8>,
    pub attenuator_map: &'static dyn AttenuatorMap,
    /// Largest RIT offset magnitude in hertz; 0 when the model has no RIT.
    pub max_rit: u32,
    pub max_xit: u32,
    pub memory_channels: Option<RangeInclusive<u32>>,
    pub transport: TransportDefaults,
    /// Default bus address for multi-drop protocols (CI-V).
    pub default_address: Option<u8>,
}

impl CapabilityDescriptor {
    /// Start building a descriptor.
    pub fn builder(
        model_id: ModelId,
        manufacturer: Manufacturer,
        model_name: &'static str,
    ) -> DescriptorBuilder {
        DescriptorBuilder {
            desc: CapabilityDescriptor {
                model_id,
                manufacturer,
                model_name,
                vfos: VfoSet::EMPTY,
                rx_range_list1: Vec::new(),
                tx_range_list1: Vec::new(),
                rx_range_list2: Vec::new(),
                tx_range_list2: Vec::new(),
                tuning_steps: Vec::new(),
                filters: Vec::new(),
                meters: Vec::new(),
                has_get_level: LevelSet::EMPTY,
                has_set_level: LevelSet::EMPTY,
                has_get_func: FuncSet::EMPTY,
                has_set_func: FuncSet::EMPTY,
                has_get_parm: ParmSet::EMPTY,
                has_set_parm: ParmSet::EMPTY,
                vfo_ops: VfoOpSet::EMPTY,
                scan_ops: ScanSet::EMPTY,
                preamp: Vec::new(),
                attenuator: Vec::new(),
                attenuator_map: &DECIBEL_ATTENUATOR,
                max_rit: 0,
                max_xit: 0,
                memory_channels: None,
                transport: TransportDefaults::default(),
                default_address: None,
            },
        }
    }

    pub fn rx_ranges(&self, region: Region) -> &[FreqRange] {
        match region {
            Region::One => &self.rx_range_list1,
            Region::Two => &self.rx_range_list2,
        }
    }

    pub fn tx_ranges(&self, region: Region) -> &[FreqRange] {
        match region {
            Region::One => &self.tx_range_list1,
            Region::Two => &self.tx_range_list2,
        }
    }

    /// Fail unless `vfo` is one the model declares. `Vfo::Current` always
    /// passes; the session resolves it before addressing the rig.
    pub fn check_vfo(&self, vfo: Vfo) -> Result<()> {
        if vfo == Vfo::Current || self.vfos.contains(vfo) {
            Ok(())
        } else {
            Err(Error::InvalidParameter(format!(
                "{} has no {vfo}",
                self.model_name
            )))
        }
    }

    /// Fail unless `freq_hz` lies in a receive range usable by `vfo`.
    pub fn check_rx_frequency(&self, region: Region, vfo: Vfo, freq_hz: u64) -> Result<()> {
        let ok = self
            .rx_ranges(region)
            .iter()
            .any(|r| r.contains(freq_hz) && r.allows_vfo(vfo));
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidParameter(format!(
                "{} is outside the receive ranges of {} for {vfo}",
                format_freq_mhz(freq_hz),
                self.model_name
            )))
        }
    }

    /// Fail unless some receive range supports `mode`.
    pub fn check_mode(&self, region: Region, mode: Mode) -> Result<()> {
        if self.rx_ranges(region).iter().any(|r| r.modes.contains(mode)) {
            Ok(())
        } else {
            Err(Error::InvalidParameter(format!(
                "{} does not support {mode}",
                self.model_name
            )))
        }
    }

    /// Fail unless `offset_hz` is within the RIT limit.
    pub fn check_rit(&self, offset_hz: i32) -> Result<()> {
        check_offset("RIT", self.max_rit, offset_hz)
    }

    /// Fail unless `offset_hz` is within the XIT limit.
    pub fn check_xit(&self, offset_hz: i32) -> Result<()> {
        check_offset("XIT", self.max_xit, offset_hz)
    }

    pub fn check_level(&self, level: Level, set: bool) -> Result<()> {
        let mask = if set { self.has_set_level } else { self.has_get_level };
        supported(mask.contains(level), || {
            format!("{} level {level}", if set { "set" } else { "get" })
        })
    }

    pub fn check_func(&self, func: Func, set: bool) -> Result<()> {
        let mask = if set { self.has_set_func } else { self.has_get_func };
        supported(mask.contains(func), || format!("function {func:?}"))
    }

    pub fn check_parm(&self, parm: Parm, set: bool) -> Result<()> {
        let mask = if set { self.has_set_parm } else { self.has_get_parm };
        supported(mask.contains(parm), || format!("parameter {parm:?}"))
    }

    pub fn check_vfo_op(&self, op: VfoOp) -> Result<()> {
        supported(self.vfo_ops.contains(op), || format!("VFO operation {op:?}"))
    }

    pub fn check_scan(&self, op: ScanOp) -> Result<()> {
        supported(self.scan_ops.contains(op), || format!("scan {op:?}"))
    }

    pub fn check_memory_channel(&self, channel: u32) -> Result<()> {
        match &self.memory_channels {
            None => Err(Error::Unsupported(format!(
                "{} has no memory channels",
                self.model_name
            ))),
            Some(range) if range.contains(&channel) => Ok(()),
            Some(range) => Err(Error::InvalidParameter(format!(
                "memory channel {channel} outside {}..={}",
                range.start(),
                range.end()
            ))),
        }
    }

    /// First tuning step declared for `mode`.
    pub fn tuning_step(&self, mode: Mode) -> Option<u32> {
        self.tuning_steps
            .iter()
            .find(|t| t.modes.contains(mode))
            .map(|t| t.step_hz)
    }

    /// Normal filter width for `mode`: the first declared filter with a
    /// concrete width that matches.
    pub fn default_filter(&self, mode: Mode) -> Option<Passband> {
        self.widths_for(mode).next()
    }

    /// The next declared width for `mode` narrower than the normal one.
    pub fn narrow_filter(&self, mode: Mode) -> Option<Passband> {
        let normal = self.default_filter(mode)?;
        self.widths_for(mode).filter(|w| *w < normal).max()
    }

    /// The next declared width for `mode` wider than the normal one.
    pub fn wide_filter(&self, mode: Mode) -> Option<Passband> {
        let normal = self.default_filter(mode)?;
        self.widths_for(mode).filter(|w| *w > normal).min()
    }

    /// Resolve a requested width for `mode`.
    ///
    /// `None` selects the normal width. A concrete width must match a
    /// declared filter for the mode, unless the mode also has an
    /// any-width entry.
    pub fn filter_for(&self, mode: Mode, requested: Option<Passband>) -> Result<Option<Passband>> {
        let Some(width) = requested else {
            return Ok(self.default_filter(mode));
        };
        let matching = self.filters.iter().filter(|f| f.modes.contains(mode));
        for filter in matching {
            match filter.bandwidth {
                Some(w) if w == width => return Ok(Some(width)),
                None => return Ok(Some(width)),
                _ => {}
            }
        }
        Err(Error::InvalidParameter(format!(
            "{} has no {width} filter for {mode}",
            self.model_name
        )))
    }

    fn widths_for(&self, mode: Mode) -> impl Iterator<Item = Passband> + '_ {
        self.filters
            .iter()
            .filter(move |f| f.modes.contains(mode))
            .filter_map(|f| f.bandwidth)
    }

    /// Calibration table for a meter level, if the model declares one.
    pub fn calibration(&self, level: Level) -> Option<&CalibrationTable> {
        self.meters.iter().find(|(l, _)| *l == level).map(|(_, t)| t)
    }

    /// Wire value for an attenuator setting in dB.
    pub fn encode_attenuator(&self, db: u8) -> Result<u8> {
        self.attenuator_map.encode(&self.attenuator, db)
    }

    /// Attenuation in dB for a wire value.
    pub fn decode_attenuator(&self, raw: u8) -> Result<u8> {
        self.attenuator_map.decode(&self.attenuator, raw)
    }

    /// Check the descriptor's own invariants: declared VFOs, well-formed
    /// ranges, ordered calibration tables, sane transport defaults.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(Error::InvalidParameter(format!("{}: {msg}", self.model_name)));

        if self.vfos.is_empty() {
            return bad("no VFOs declared".into());
        }
        if self.vfos.contains(Vfo::Current) {
            return bad("Vfo::Current is not a declarable VFO".into());
        }
        let lists = [
            &self.rx_range_list1,
            &self.tx_range_list1,
            &self.rx_range_list2,
            &self.tx_range_list2,
        ];
        for range in lists.into_iter().flatten() {
            if range.min_hz > range.max_hz {
                return bad(format!("inverted range {range}"));
            }
            if let (Some(lo), Some(hi)) = (range.min_power_w, range.max_power_w) {
                if lo > hi {
                    return bad(format!("inverted power limits in {range}"));
                }
            }
        }
        for (level, table) in &self.meters {
            if let Err(e) = table.validate() {
                return bad(format!("{level} calibration: {e}"));
            }
        }
        let t = &self.transport;
        if t.retry == 0 {
            return bad("retry must allow at least one attempt".into());
        }
        if t.baud_min > t.baud_max {
            return bad(format!("baud range {}..{} is inverted", t.baud_min, t.baud_max));
        }
        Ok(())
    }
}

fn check_offset(what: &str, max: u32, offset_hz: i32) -> Result<()> {
    if max == 0 {
        return Err(Error::Unsupported(format!("{what} offset")));
    }
    if offset_hz.unsigned_abs() > max {
        return Err(Error::InvalidParameter(format!(
            "{what} {offset_hz} Hz exceeds ±{max} Hz"
        )));
    }
    Ok(())
}

fn supported(ok: bool, what: impl FnOnce() -> String) -> Result<()> {
    if ok { Ok(()) } else { Err(Error::Unsupported(what())) }
}

// ---------------------------------------------------------------
// Builder
// ---------------------------------------------------------------

/// Fluent builder for [`CapabilityDescriptor`].
///
/// ```
/// use catlink_core::caps::{CapabilityDescriptor, FreqRange};
/// use catlink_core::types::{Manufacturer, ModeSet, ModelId, Vfo, VfoSet};
///
/// let vfos = VfoSet::of(&[Vfo::A, Vfo::B]);
/// let desc = CapabilityDescriptor::builder(
///     ModelId::new(Manufacturer::Yaesu, 999),
///     Manufacturer::Yaesu,
///     "Bench Rig",
/// )
/// .vfos(vfos)
/// .rx_range_both(FreqRange::rx(100_000, 30_000_000, ModeSet::SSB, vfos))
/// .build();
/// assert!(desc.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    desc: CapabilityDescriptor,
}

impl DescriptorBuilder {
    pub fn vfos(mut self, vfos: VfoSet) -> Self {
        self.desc.vfos = vfos;
        self
    }

    /// Add a receive range for one region.
    pub fn rx_range(mut self, region: Region, range: FreqRange) -> Self {
        match region {
            Region::One => self.desc.rx_range_list1.push(range),
            Region::Two => self.desc.rx_range_list2.push(range),
        }
        self
    }

    /// Add a transmit range for one region.
    pub fn tx_range(mut self, region: Region, range: FreqRange) -> Self {
        match region {
            Region::One => self.desc.tx_range_list1.push(range),
            Region::Two => self.desc.tx_range_list2.push(range),
        }
        self
    }

    /// Add a receive range to both regions.
    pub fn rx_range_both(self, range: FreqRange) -> Self {
        self.rx_range(Region::One, range.clone())
            .rx_range(Region::Two, range)
    }

    /// Add a transmit range to both regions.
    pub fn tx_range_both(self, range: FreqRange) -> Self {
        self.tx_range(Region::One, range.clone())
            .tx_range(Region::Two, range)
    }

    pub fn tuning_step(mut self, modes: ModeSet, step_hz: u32) -> Self {
        self.desc.tuning_steps.push(TuningStep { modes, step_hz });
        self
    }

    /// Append a filter. Call order is the tie-break order.
    pub fn filter(mut self, modes: ModeSet, width_hz: u32) -> Self {
        self.desc.filters.push(Filter {
            modes,
            bandwidth: Some(Passband::from_hz(width_hz)),
        });
        self
    }

    /// Append an any-width filter entry.
    pub fn filter_any(mut self, modes: ModeSet) -> Self {
        self.desc.filters.push(Filter {
            modes,
            bandwidth: None,
        });
        self
    }

    pub fn meter(mut self, level: Level, table: CalibrationTable) -> Self {
        self.desc.meters.push((level, table));
        self
    }

    pub fn levels(mut self, get: LevelSet, set: LevelSet) -> Self {
        self.desc.has_get_level = get;
        self.desc.has_set_level = set;
        self
    }

    pub fn funcs(mut self, get: FuncSet, set: FuncSet) -> Self {
        self.desc.has_get_func = get;
        self.desc.has_set_func = set;
        self
    }

    pub fn parms(mut self, get: ParmSet, set: ParmSet) -> Self {
        self.desc.has_get_parm = get;
        self.desc.has_set_parm = set;
        self
    }

    pub fn vfo_ops(mut self, ops: VfoOpSet) -> Self {
        self.desc.vfo_ops = ops;
        self
    }

    pub fn scan_ops(mut self, ops: ScanSet) -> Self {
        self.desc.scan_ops = ops;
        self
    }

    pub fn preamp(mut self, gains_db: &[u8]) -> Self {
        self.desc.preamp = gains_db.to_vec();
        self
    }

    /// Attenuator steps and how they are encoded on the wire.
    pub fn attenuator(mut self, steps_db: &[u8], map: &'static dyn AttenuatorMap) -> Self {
        self.desc.attenuator = steps_db.to_vec();
        self.desc.attenuator_map = map;
        self
    }

    pub fn max_rit(mut self, hz: u32) -> Self {
        self.desc.max_rit = hz;
        self
    }

    pub fn max_xit(mut self, hz: u32) -> Self {
        self.desc.max_xit = hz;
        self
    }

    pub fn memory_channels(mut self, channels: RangeInclusive<u32>) -> Self {
        self.desc.memory_channels = Some(channels);
        self
    }

    pub fn transport(mut self, transport: TransportDefaults) -> Self {
        self.desc.transport = transport;
        self
    }

    pub fn default_address(mut self, address: u8) -> Self {
        self.desc.default_address = Some(address);
        self
    }

    pub fn build(self) -> CapabilityDescriptor {
        self.desc
    }
}
