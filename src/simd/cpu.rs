//! CPU capability report consumed by the backend selector.
//!
//! Detection runs once per process. The bits influence dispatch only;
//! semantics are identical across backends. SVE/SVE2 are reported for
//! completeness but no SVE kernels ship; NEON covers aarch64.

use std::sync::OnceLock;

/// Read-only capability bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuFeatures {
    pub sse41: bool,
    pub avx2: bool,
    pub neon: bool,
    pub sve: bool,
    pub sve2: bool,
}

/// Returns the process-wide capability report.
pub fn features() -> &'static CpuFeatures {
    static FEATURES: OnceLock<CpuFeatures> = OnceLock::new();
    FEATURES.get_or_init(detect)
}

#[cfg(target_arch = "x86_64")]
fn detect() -> CpuFeatures {
    CpuFeatures {
        sse41: std::arch::is_x86_feature_detected!("sse4.1"),
        avx2: std::arch::is_x86_feature_detected!("avx2"),
        ..CpuFeatures::default()
    }
}

#[cfg(target_arch = "aarch64")]
fn detect() -> CpuFeatures {
    CpuFeatures {
        neon: true,
        sve: std::arch::is_aarch64_feature_detected!("sve"),
        sve2: std::arch::is_aarch64_feature_detected!("sve2"),
        ..CpuFeatures::default()
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn detect() -> CpuFeatures {
    CpuFeatures::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_is_cached() {
        assert_eq!(features(), features());
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn neon_is_baseline_on_aarch64() {
        assert!(features().neon);
    }
}
