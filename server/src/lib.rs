//! # Behavioral Anomaly Detection Server
//!
//! This library watches a live multiplayer session for statistically
//! suspicious gameplay and publishes what it finds to external observer
//! clients over a persistent text-line protocol.
//!
//! ## Detection engine
//!
//! Per-player sliding-window state ([`state::PlayerStateStore`]) feeds three
//! heuristics ([`detect`]):
//!
//! - **Flight**: airborne vertical gain above the legitimate maximum with no
//!   footing beneath the destination.
//! - **KillAura**: more than six attacks inside a trailing one-second
//!   window, pruned lazily on every attack.
//! - **X-Ray**: three recent diamond-ore finds on a short, flat, linear
//!   path, tracked in a bounded FIFO trail.
//!
//! Events enter through a single [`dispatch::Dispatcher::handle`] call over
//! a tagged event enum, so the engine has no dependency on any particular
//! host callback mechanism. A player's bypass capability suppresses all
//! detection; detectors never block and never perform I/O.
//!
//! ## Broadcast layer
//!
//! [`hub::ObserverHub`] owns the observer connection set. Each connection
//! has its own outbound queue drained by a dedicated writer task
//! ([`network`]), so a slow or dead observer never stalls delivery to the
//! rest. Observers can query player inventories and relay chat into the
//! game; malformed inbound lines are dropped without closing the
//! connection. [`ticker`] broadcasts a periodic session status line.
//!
//! ## Concurrency model
//!
//! Multiple producers feed the dispatcher concurrently. State is sharded
//! per player key: same-player events are serialized in arrival order,
//! different players never contend on a shared lock. The connection set
//! supports concurrent add/remove/iterate the same way.

pub mod detect;
pub mod directory;
pub mod dispatch;
pub mod hub;
pub mod network;
pub mod sim;
pub mod state;
pub mod ticker;
