//! # catlink -- transceiver control over CAT and CI-V
//!
//! `catlink` drives amateur radio transceivers and receivers through their
//! computer control ports. Every supported model is described by a
//! [`CapabilityDescriptor`] and driven through the same async [`Rig`]
//! trait, so application code can hold a `Box<dyn Rig>` and stay
//! vendor-neutral.
//!
//! ## Quick start
//!
//! ```no_run
//! use catlink::RigBuilder;
//! use catlink::types::Vfo;
//!
//! # async fn example() -> catlink::Result<()> {
//! let rig = RigBuilder::by_name("FT-840")?
//!     .serial_port("/dev/ttyUSB0")
//!     .build()
//!     .await?;
//!
//! rig.set_frequency(Vfo::A, 14_074_000).await?;
//! println!("VFO A: {} Hz", rig.get_frequency(Vfo::A).await?);
//! rig.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! | Crate               | Purpose                                           |
//! |---------------------|---------------------------------------------------|
//! | `catlink-core`      | Rig trait, descriptors, transaction engine, errors |
//! | `catlink-transport` | Serial and TCP transports                         |
//! | `catlink-yaesu`     | FT-840 fixed frames, FT-DX101D newcat             |
//! | `catlink-icom`      | CI-V: IC-7800, IC-275                             |
//! | `catlink-kenwood`   | TM-D710                                           |
//! | `catlink-rft`       | EKD-500                                           |
//! | **`catlink`**       | This crate: registry, builder, re-exports         |
//!
//! ## Feature flags
//!
//! Each backend sits behind a feature of the same name (`yaesu`, `icom`,
//! `kenwood`, `rft`), all on by default. Disabled backends are left out
//! of the [`registry()`].
//!
//! ## Errors
//!
//! Every operation returns [`Result`]. Arguments the model cannot accept
//! fail with [`Error::InvalidParameter`] before anything is written;
//! operations the model lacks fail with [`Error::Unsupported`]. Only
//! timeouts are retried, and a composite operation that fails part way is
//! not rolled back.

pub use catlink_core::*;

pub mod builder;
pub mod registry;

pub use builder::RigBuilder;
pub use registry::{Registry, RegistryEntry, RigFactory, find_by_name, registry, supported_rigs};

pub mod transports {
    pub use catlink_transport::*;
}

/// Yaesu backends: [`Ft840`](yaesu::Ft840) and
/// [`NewcatRig`](yaesu::NewcatRig).
#[cfg(feature = "yaesu")]
pub mod yaesu {
    pub use catlink_yaesu::*;
}

/// Icom CI-V backend: [`IcomRig`](icom::IcomRig).
#[cfg(feature = "icom")]
pub mod icom {
    pub use catlink_icom::*;
}

/// Kenwood backend: [`TmD710`](kenwood::TmD710).
#[cfg(feature = "kenwood")]
pub mod kenwood {
    pub use catlink_kenwood::*;
}

/// RFT backend: [`Ekd500`](rft::Ekd500).
#[cfg(feature = "rft")]
pub mod rft {
    pub use catlink_rft::*;
}
