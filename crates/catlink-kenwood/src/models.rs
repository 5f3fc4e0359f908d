//! Kenwood model definitions.

use std::time::Duration;

use catlink_core::caps::{CapabilityDescriptor, FreqRange, TransportDefaults};
use catlink_core::types::*;

/// Kenwood TM-D710: dual-band 2 m / 70 cm FM mobile.
///
/// Band A receives airband AM as well; band B also covers 800 MHz and up.
pub fn tm_d710() -> CapabilityDescriptor {
    let both = VfoSet::of(&[Vfo::A, Vfo::B]);
    let band_a = VfoSet::of(&[Vfo::A]);
    let band_b = VfoSet::of(&[Vfo::B]);
    let fm = ModeSet::of(&[Mode::FM]);
    let am_fm = ModeSet::of(&[Mode::AM, Mode::FM]);

    CapabilityDescriptor::builder(
        ModelId::new(Manufacturer::Kenwood, 34),
        Manufacturer::Kenwood,
        "TM-D710",
    )
    .vfos(both)
    .rx_range_both(FreqRange::rx(118_000_000, 470_000_000, am_fm, band_a))
    .rx_range_both(FreqRange::rx(136_000_000, 524_000_000, fm, band_b))
    .rx_range_both(FreqRange::rx(800_000_000, 1_300_000_000, fm, band_b))
    .tx_range(
        Region::One,
        FreqRange::tx(144_000_000, 146_000_000, fm, (5.0, 50.0), both),
    )
    .tx_range(
        Region::One,
        FreqRange::tx(430_000_000, 440_000_000, fm, (5.0, 50.0), both),
    )
    .tx_range(
        Region::Two,
        FreqRange::tx(144_000_000, 148_000_000, fm, (5.0, 50.0), both),
    )
    .tx_range(
        Region::Two,
        FreqRange::tx(430_000_000, 450_000_000, fm, (5.0, 50.0), both),
    )
    .tuning_step(am_fm, 5_000)
    .tuning_step(am_fm, 6_250)
    .tuning_step(am_fm, 10_000)
    .tuning_step(am_fm, 12_500)
    .tuning_step(am_fm, 25_000)
    .tuning_step(am_fm, 50_000)
    .tuning_step(am_fm, 100_000)
    .filter(fm, 15_000)
    .filter(fm, 6_000)
    .filter(ModeSet::of(&[Mode::AM]), 4_000)
    .transport(TransportDefaults {
        baud_min: 9600,
        baud_max: 57600,
        timeout: Duration::from_millis(1000),
        retry: 3,
        ..TransportDefaults::default()
    })
    .build()
}

pub fn all_models() -> Vec<CapabilityDescriptor> {
    vec![tm_d710()]
}
