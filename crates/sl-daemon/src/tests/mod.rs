//! Test suites for the relay daemon.

mod support;
