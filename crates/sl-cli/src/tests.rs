//! Runner-level tests for the controller.

mod support;
