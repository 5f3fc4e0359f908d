//! Icom model definitions.
//!
//! Each model carries its factory CI-V address as the descriptor's
//! default address; [`SessionConfig::with_address`] overrides it for rigs
//! reconfigured in their menus.
//!
//! [`SessionConfig::with_address`]: catlink_core::config::SessionConfig::with_address

use std::time::Duration;

use catlink_core::calibration::{CalibrationPoint, CalibrationTable};
use catlink_core::caps::{CapabilityDescriptor, FreqRange, INDEXED_ATTENUATOR, TransportDefaults};
use catlink_core::types::*;

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
    (50_000_000, 54_000_000),
];

/// US 60 m channels, region 2 only.
const US_60M: &[(u64, u64)] = &[
    (5_330_500, 5_333_500),
    (5_346_500, 5_349_500),
    (5_366_500, 5_369_500),
    (5_371_500, 5_374_500),
    (5_403_500, 5_406_500),
];

// ---------------------------------------------------------------
// IC-7800
// ---------------------------------------------------------------

const IC7800_STR: CalibrationTable = CalibrationTable::new(&[
    CalibrationPoint::new(0, -54.0),
    CalibrationPoint::new(120, 0.0),
    CalibrationPoint::new(241, 60.0),
]);

const IC7800_SWR: CalibrationTable = CalibrationTable::new(&[
    CalibrationPoint::new(0, 1.0),
    CalibrationPoint::new(48, 1.5),
    CalibrationPoint::new(80, 2.0),
    CalibrationPoint::new(120, 3.0),
    CalibrationPoint::new(240, 6.0),
]);

const IC7800_ALC: CalibrationTable = CalibrationTable::new(&[
    CalibrationPoint::new(0, 0.0),
    CalibrationPoint::new(120, 1.0),
]);

const IC7800_RFPOWER_METER: CalibrationTable = CalibrationTable::new(&[
    CalibrationPoint::new(0, 0.0),
    CalibrationPoint::new(21, 5.0),
    CalibrationPoint::new(43, 10.0),
    CalibrationPoint::new(65, 15.0),
    CalibrationPoint::new(83, 20.0),
    CalibrationPoint::new(95, 25.0),
    CalibrationPoint::new(105, 30.0),
    CalibrationPoint::new(114, 35.0),
    CalibrationPoint::new(124, 40.0),
    CalibrationPoint::new(143, 50.0),
    CalibrationPoint::new(183, 75.0),
    CalibrationPoint::new(213, 100.0),
    CalibrationPoint::new(255, 120.0),
]);

const IC7800_COMP_METER: CalibrationTable = CalibrationTable::new(&[
    CalibrationPoint::new(0, 0.0),
    CalibrationPoint::new(130, 15.0),
    CalibrationPoint::new(241, 30.0),
]);

const IC7800_VD_METER: CalibrationTable = CalibrationTable::new(&[
    CalibrationPoint::new(0, 0.0),
    CalibrationPoint::new(151, 44.0),
    CalibrationPoint::new(180, 48.0),
    CalibrationPoint::new(211, 52.0),
]);

const IC7800_ID_METER: CalibrationTable = CalibrationTable::new(&[
    CalibrationPoint::new(0, 0.0),
    CalibrationPoint::new(165, 10.0),
    CalibrationPoint::new(241, 15.0),
]);

/// Icom IC-7800: 200 W HF/6 m transceiver with main and sub receivers.
///
/// Its attenuator command takes a selector index rather than dB.
pub fn ic_7800() -> CapabilityDescriptor {
    let vfos = VfoSet::of(&[Vfo::Main, Vfo::Sub, Vfo::Memory]);
    let am = ModeSet::of(&[Mode::AM, Mode::DataAM]);
    let fm = ModeSet::of(&[Mode::FM, Mode::DataFM]);
    let ssb = ModeSet::SSB | ModeSet::of(&[Mode::DataLSB, Mode::DataUSB]);
    let others: ModeSet = Mode::ALL.iter().copied().filter(|m| !am.contains(*m)).collect();

    let mut builder = CapabilityDescriptor::builder(
        ModelId::new(Manufacturer::Icom, 56),
        Manufacturer::Icom,
        "IC-7800",
    )
    .vfos(vfos)
    .rx_range_both(FreqRange::rx(30_000, 60_000_000, ModeSet::all(), vfos));
    for &(lo, hi) in HF_BANDS {
        builder = builder
            .tx_range_both(FreqRange::tx(lo, hi, others, (5.0, 200.0), vfos))
            .tx_range_both(FreqRange::tx(lo, hi, am, (5.0, 50.0), vfos));
    }
    for &(lo, hi) in US_60M {
        builder = builder.tx_range(Region::Two, FreqRange::tx(lo, hi, others, (2.0, 100.0), vfos));
    }

    builder
        .tuning_step(ModeSet::all(), 1)
        .tuning_step(ModeSet::all(), 100)
        .tuning_step(ModeSet::all(), 1_000)
        .tuning_step(ModeSet::all(), 5_000)
        .tuning_step(ModeSet::all(), 9_000)
        .tuning_step(ModeSet::all(), 10_000)
        .tuning_step(ModeSet::all(), 12_500)
        .tuning_step(ModeSet::all(), 20_000)
        .tuning_step(ModeSet::all(), 25_000)
        .filter(ssb, 2400)
        .filter(ssb, 1800)
        .filter(ssb, 3000)
        .filter(ModeSet::CW | ModeSet::RTTY, 400)
        .filter(ModeSet::CW | ModeSet::RTTY, 50)
        .filter(ModeSet::CW, 1000)
        .filter(ModeSet::RTTY, 2400)
        .filter(am, 6000)
        .filter(am, 3000)
        .filter(am, 9000)
        .filter(fm, 12000)
        .filter(fm, 8000)
        .filter(fm, 15000)
        .meter(Level::Strength, IC7800_STR)
        .meter(Level::Swr, IC7800_SWR)
        .meter(Level::Alc, IC7800_ALC)
        .meter(Level::RfPowerMeter, IC7800_RFPOWER_METER)
        .meter(Level::Compression, IC7800_COMP_METER)
        .meter(Level::DrainVoltage, IC7800_VD_METER)
        .meter(Level::DrainCurrent, IC7800_ID_METER)
        .levels(
            LevelSet::all(),
            LevelSet::of(&[Level::Preamp, Level::Attenuator, Level::RfPower]),
        )
        .parms(ParmSet::of(&[Parm::Time]), ParmSet::of(&[Parm::Time]))
        .vfo_ops(VfoOpSet::all())
        .scan_ops(ScanSet::all())
        .preamp(&[10, 16])
        .attenuator(&[3, 6, 9, 12, 15, 18, 21], &INDEXED_ATTENUATOR)
        .max_rit(9999)
        .max_xit(9999)
        .memory_channels(1..=99)
        .transport(TransportDefaults {
            baud_min: 300,
            baud_max: 19200,
            timeout: Duration::from_millis(1000),
            retry: 3,
            ..TransportDefaults::default()
        })
        .default_address(0x6a)
        .build()
}

// ---------------------------------------------------------------
// IC-275
// ---------------------------------------------------------------

/// Icom IC-275: 2 m all-mode transceiver.
pub fn ic_275() -> CapabilityDescriptor {
    let vfos = VfoSet::of(&[Vfo::A, Vfo::B, Vfo::Memory]);
    let modes = ModeSet::SSB | ModeSet::of(&[Mode::CW, Mode::FM]);

    CapabilityDescriptor::builder(
        ModelId::new(Manufacturer::Icom, 4),
        Manufacturer::Icom,
        "IC-275",
    )
    .vfos(vfos)
    .rx_range_both(FreqRange::rx(138_000_000, 174_000_000, modes, vfos))
    .tx_range(
        Region::One,
        FreqRange::tx(144_000_000, 146_000_000, modes, (2.5, 25.0), vfos),
    )
    .tx_range(
        Region::Two,
        FreqRange::tx(144_000_000, 148_000_000, modes, (2.5, 25.0), vfos),
    )
    .tuning_step(modes, 10)
    .filter(ModeSet::SSB | ModeSet::of(&[Mode::CW]), 2200)
    .filter(ModeSet::of(&[Mode::FM]), 15000)
    .vfo_ops(VfoOpSet::of(&[VfoOp::FromVfo, VfoOp::ToVfo]))
    .memory_channels(1..=99)
    .transport(TransportDefaults {
        baud_min: 1200,
        baud_max: 9600,
        timeout: Duration::from_millis(200),
        retry: 3,
        ..TransportDefaults::default()
    })
    .default_address(0x10)
    .build()
}

pub fn all_models() -> Vec<CapabilityDescriptor> {
    vec![ic_7800(), ic_275()]
}
