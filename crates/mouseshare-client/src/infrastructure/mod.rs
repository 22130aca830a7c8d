//! Infrastructure layer for the client application.
//!
//! Contains the adapters around the application layer: TCP transport, touch
//! injectors, the UI command bridge, and config persistence.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `mouseshare_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`network`** – `TcpConnector`, the tokio implementation of the
//!   transport contract: resolve, connect under a timeout, then relay raw
//!   bytes in both directions.
//!
//! - **`input_injection`** – `TouchInjector` implementations: disabled,
//!   tracing, and a recording mock for tests.
//!
//! - **`ui_bridge`** – `SessionView` (an observer that keeps a snapshot), the
//!   serializable status DTO, and the command functions a UI calls.
//!
//! - **`storage`** – TOML config file in the platform config directory.

pub mod input_injection;
pub mod network;
pub mod storage;
pub mod ui_bridge;
