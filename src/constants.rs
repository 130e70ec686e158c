//! Physical constants, in natural units (c = 1) with masses in GeV/c^2
//! and momenta in GeV/c

/// Proton mass
pub const PROTON_MASS: f64 = 0.938272;
/// Neutron mass
pub const NEUTRON_MASS: f64 = 0.939565;
/// Deuteron mass
pub const DEUTERON_MASS: f64 = 1.875613;
/// Helium-3 mass
pub const HELIUM_3_MASS: f64 = 2.808391;
/// Helium-4 mass
pub const HELIUM_4_MASS: f64 = 3.7264225;
/// Neutral pion mass
pub const PI_0_MASS: f64 = 0.134977;
/// Eta meson mass
pub const ETA_MASS: f64 = 0.547862;
/// Lower edge of the ramped COSY proton beam
pub const BEAM_MOMENTUM_MIN: f64 = 1.426;
/// Upper edge of the ramped COSY proton beam
pub const BEAM_MOMENTUM_MAX: f64 = 1.635;
/// Largest Fermi momentum drawn inside the target nucleus
pub const FERMI_MOMENTUM_CUTOFF: f64 = 0.4;
