//! RFT model definitions.

use std::time::Duration;

use catlink_core::caps::{CapabilityDescriptor, FreqRange, TransportDefaults};
use catlink_core::types::*;

/// RFT EKD-500: HF receiver, frequency control only.
pub fn ekd_500() -> CapabilityDescriptor {
    let vfos = VfoSet::of(&[Vfo::A]);
    let modes = ModeSet::SSB | ModeSet::of(&[Mode::AM, Mode::CW, Mode::FM]);

    CapabilityDescriptor::builder(
        ModelId::new(Manufacturer::Rft, 1),
        Manufacturer::Rft,
        "EKD-500",
    )
    .vfos(vfos)
    .rx_range_both(FreqRange::rx(10_000, 30_000_000, modes, vfos))
    .tuning_step(modes, 10)
    .filter(modes, 2_400)
    .transport(TransportDefaults {
        baud_min: 300,
        baud_max: 2400,
        timeout: Duration::from_millis(200),
        retry: 3,
        ..TransportDefaults::default()
    })
    .build()
}

pub fn all_models() -> Vec<CapabilityDescriptor> {
    vec![ekd_500()]
}
