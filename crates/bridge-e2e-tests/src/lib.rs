//! Test-only crate. The end-to-end registration tests live under `tests/`.
