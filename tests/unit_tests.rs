//! Harness for the component unit tests under `tests/unit/`.

mod unit;
