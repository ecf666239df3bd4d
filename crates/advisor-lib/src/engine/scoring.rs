//! Distance metric between an instance and a requirement
//!
//! Memory is compared in GiB so that one vCPU, one GiB and one GPU weigh
//! the same. The divisor is 1024, never 1000.

use crate::models::{InstanceSpec, Requirement};

/// MiB per GiB
pub const MIB_PER_GIB: f64 = 1024.0;

/// Euclidean distance in (vCPU, GiB, GPU) space. Lower is a closer match.
pub fn distance(spec: &InstanceSpec, requirement: &Requirement) -> f64 {
    let vcpu_delta = f64::from(spec.vcpus) - f64::from(requirement.vcpus);
    let mem_delta = spec.memory_mib as f64 / MIB_PER_GIB - requirement.memory_mib as f64 / MIB_PER_GIB;
    let gpu_delta = f64::from(spec.gpus) - f64::from(requirement.gpus);

    (vcpu_delta.powi(2) + mem_delta.powi(2) + gpu_delta.powi(2)).sqrt()
}
