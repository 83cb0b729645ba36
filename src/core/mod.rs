//! Compliance-balance computation, banking, pooling and comparison services.

pub mod services;
