// ---------------------------------------------------------------------------
// Boundary unit conversions. Everything inside the crate is SI.
// ---------------------------------------------------------------------------

pub const METERS_PER_FOOT: f64 = 0.3048;
pub const PSI_PER_ATM: f64 = 14.696;

pub fn feet_to_meters(ft: f64) -> f64 {
    ft * METERS_PER_FOOT
}

pub fn meters_to_feet(m: f64) -> f64 {
    m / METERS_PER_FOOT
}
