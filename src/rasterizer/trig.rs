//! Fixed-point sine/cosine tables
//!
//! Angles are expressed in 2048 units per full turn. Table values are scaled
//! by 65536, so `(v * sin(a)) >> 16` approximates `v * sin(a)`.

use std::sync::OnceLock;

/// Angular units per full turn
pub const ANGLE_UNITS: usize = 2048;

/// Mask applied to every angle before lookup
pub const ANGLE_MASK: i32 = ANGLE_UNITS as i32 - 1;

/// Radians per angle unit (2π / 2048, truncated the way the asset format expects)
const RADIANS_PER_UNIT: f64 = 0.0030679615;

/// Scale of the table values (16 fractional bits)
pub const TRIG_SHIFT: u32 = 16;

pub struct TrigTables {
    sine: [i32; ANGLE_UNITS],
    cosine: [i32; ANGLE_UNITS],
}

impl TrigTables {
    fn build() -> Self {
        let mut sine = [0; ANGLE_UNITS];
        let mut cosine = [0; ANGLE_UNITS];
        for i in 0..ANGLE_UNITS {
            let angle = i as f64 * RADIANS_PER_UNIT;
            // `as i32` truncates toward zero, which the tables depend on
            sine[i] = (angle.sin() * 65536.0) as i32;
            cosine[i] = (angle.cos() * 65536.0) as i32;
        }
        Self { sine, cosine }
    }

    #[inline]
    pub fn sin(&self, angle: i32) -> i32 {
        self.sine[(angle & ANGLE_MASK) as usize]
    }

    #[inline]
    pub fn cos(&self, angle: i32) -> i32 {
        self.cosine[(angle & ANGLE_MASK) as usize]
    }
}

static TRIG_TABLES: OnceLock<TrigTables> = OnceLock::new();

/// Process-wide trig tables, built on first use
pub fn trig() -> &'static TrigTables {
    TRIG_TABLES.get_or_init(TrigTables::build)
}
