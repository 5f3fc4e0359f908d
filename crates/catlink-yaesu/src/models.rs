//! Yaesu model definitions.
//!
//! One [`CapabilityDescriptor`] per supported rig. The FT-840 speaks the
//! fixed five-byte protocol; the FT-DX101D speaks newcat. Baud rates are
//! the factory menu settings.

use std::time::Duration;

use catlink_core::calibration::{CalibrationPoint, CalibrationTable};
use catlink_core::caps::{
    CapabilityDescriptor, FreqRange, Handshake, INDEXED_ATTENUATOR, TransportDefaults,
};
use catlink_core::types::*;

/// Amateur HF allocations shared by both regions, in hertz.
const HF_BANDS: &[(u64, u64)] = &[
    (1_800_000, 2_000_000),
    (3_500_000, 4_000_000),
    (7_000_000, 7_300_000),
    (10_100_000, 10_150_000),
    (14_000_000, 14_350_000),
    (18_068_000, 18_168_000),
    (21_000_000, 21_450_000),
    (24_890_000, 24_990_000),
    (28_000_000, 29_700_000),
];

const SIX_METRES: (u64, u64) = (50_000_000, 54_000_000);

// ---------------------------------------------------------------
// FT-840
// ---------------------------------------------------------------

const FT840_S_METER: CalibrationTable = CalibrationTable::new(&[
    CalibrationPoint::new(0, -54.0),
    CalibrationPoint::new(72, 0.0),
    CalibrationPoint::new(160, 60.0),
]);

/// Yaesu FT-840: HF transceiver with two VFOs and 100 memories.
pub fn ft_840() -> CapabilityDescriptor {
    let vfos = VfoSet::of(&[Vfo::A, Vfo::B, Vfo::Memory]);
    let am = ModeSet::of(&[Mode::AM]);
    let fm = ModeSet::of(&[Mode::FM]);
    let cw = ModeSet::of(&[Mode::CW]);
    let all = ModeSet::SSB | cw | am | fm;
    let others = ModeSet::SSB | cw | fm;

    let mut builder = CapabilityDescriptor::builder(
        ModelId::new(Manufacturer::Yaesu, 11),
        Manufacturer::Yaesu,
        "FT-840",
    )
    .vfos(vfos)
    .rx_range_both(FreqRange::rx(100_000, 30_000_000, all, vfos));
    for &(lo, hi) in HF_BANDS {
        builder = builder
            .tx_range_both(FreqRange::tx(lo, hi, others, (5.0, 100.0), vfos))
            .tx_range_both(FreqRange::tx(lo, hi, am, (2.0, 25.0), vfos));
    }

    builder
        .tuning_step(ModeSet::SSB | cw, 10)
        .tuning_step(ModeSet::SSB | cw, 100)
        .tuning_step(am | fm, 100)
        .tuning_step(am | fm, 1000)
        .filter(ModeSet::SSB, 2200)
        .filter(cw, 2200)
        .filter(cw, 500)
        .filter(am, 6000)
        .filter(am, 2200)
        .filter(fm, 12000)
        .meter(Level::Strength, FT840_S_METER)
        .levels(LevelSet::of(&[Level::Strength]), LevelSet::EMPTY)
        .funcs(FuncSet::of(&[Func::Tuner]), FuncSet::of(&[Func::Tuner]))
        .vfo_ops(VfoOpSet::of(&[VfoOp::Tune]))
        .max_rit(9990)
        .memory_channels(1..=100)
        .transport(TransportDefaults {
            baud_min: 4800,
            baud_max: 4800,
            stop_bits: 2,
            write_delay: Duration::from_millis(50),
            post_write_delay: Duration::from_millis(5),
            timeout: Duration::from_millis(2000),
            retry: 1,
            ..TransportDefaults::default()
        })
        .build()
}

// ---------------------------------------------------------------
// FT-DX101D
// ---------------------------------------------------------------

const FTDX101_S_METER: CalibrationTable = CalibrationTable::new(&[
    CalibrationPoint::new(0, -54.0),
    CalibrationPoint::new(12, -48.0),
    CalibrationPoint::new(27, -42.0),
    CalibrationPoint::new(40, -36.0),
    CalibrationPoint::new(55, -30.0),
    CalibrationPoint::new(65, -24.0),
    CalibrationPoint::new(80, -18.0),
    CalibrationPoint::new(95, -12.0),
    CalibrationPoint::new(112, -6.0),
    CalibrationPoint::new(130, 0.0),
    CalibrationPoint::new(150, 10.0),
    CalibrationPoint::new(172, 20.0),
    CalibrationPoint::new(190, 30.0),
    CalibrationPoint::new(220, 40.0),
    CalibrationPoint::new(240, 50.0),
    CalibrationPoint::new(255, 60.0),
]);

/// Yaesu FT-DX101D: HF/6 m dual-receiver transceiver.
pub fn ft_dx101d() -> CapabilityDescriptor {
    let vfos = VfoSet::of(&[Vfo::A, Vfo::B]);
    let am = ModeSet::of(&[Mode::AM, Mode::DataAM]);
    let fm = ModeSet::of(&[Mode::FM, Mode::DataFM]);
    let narrow = ModeSet::CW | ModeSet::RTTY | ModeSet::of(&[Mode::DataUSB, Mode::DataLSB]);
    let others: ModeSet = Mode::ALL.iter().copied().filter(|m| !am.contains(*m)).collect();

    let mut builder = CapabilityDescriptor::builder(
        ModelId::new(Manufacturer::Yaesu, 40),
        Manufacturer::Yaesu,
        "FT-DX101D",
    )
    .vfos(vfos)
    .rx_range_both(FreqRange::rx(30_000, 60_000_000, ModeSet::all(), vfos));
    for &(lo, hi) in HF_BANDS.iter().chain(std::iter::once(&SIX_METRES)) {
        builder = builder
            .tx_range_both(FreqRange::tx(lo, hi, others, (5.0, 100.0), vfos))
            .tx_range_both(FreqRange::tx(lo, hi, am, (2.0, 25.0), vfos));
    }

    builder
        .tuning_step(ModeSet::SSB | narrow, 10)
        .tuning_step(am | fm, 100)
        .filter(narrow, 600)
        .filter(narrow, 300)
        .filter(narrow, 2400)
        .filter(narrow, 1200)
        .filter(ModeSet::SSB, 2400)
        .filter(ModeSet::SSB, 1800)
        .filter(ModeSet::SSB, 3000)
        .filter(am, 9000)
        .filter(fm, 16000)
        .meter(Level::Strength, FTDX101_S_METER)
        .levels(
            LevelSet::of(&[
                Level::Attenuator,
                Level::Preamp,
                Level::RawStrength,
                Level::Strength,
            ]),
            LevelSet::of(&[Level::Attenuator, Level::Preamp]),
        )
        .preamp(&[10, 20])
        .attenuator(&[6, 12, 18], &INDEXED_ATTENUATOR)
        .transport(TransportDefaults {
            baud_min: 4800,
            baud_max: 38400,
            handshake: Handshake::Hardware,
            timeout: Duration::from_millis(2000),
            retry: 3,
            ..TransportDefaults::default()
        })
        .build()
}

/// Every Yaesu descriptor this crate can drive.
pub fn all_models() -> Vec<CapabilityDescriptor> {
    vec![ft_840(), ft_dx101d()]
}
