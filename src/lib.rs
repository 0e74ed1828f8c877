//! # kafkalens
//!
//! A terminal dashboard for exploring a Kafka cluster: topics, consumer
//! groups and broker contexts, plus a live, filterable tail of any topic.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        UI thread (App)                           │
//! │  events ──▶ SearchCoordinator ──▶ Resource ──▶ view ──▶ ui       │
//! │     ▲              ▲                  ▲          ▲               │
//! │     │          UiEvent            UiQueue    UiQueue             │
//! └─────┼──────────────┼──────────────────┼──────────┼───────────────┘
//!       │       signal dispatcher      poller    TopicStream refresh
//!    terminal                             │          │
//!                                      Gateway ◀── consumer
//! ```
//!
//! - **[`resource`]**: cached topic/context/group listings, each refreshed by
//!   a cancellable poller
//! - **[`search`]**: the search input; switches resources or filters rows
//! - **[`stream`]**: consume + coalesced-refresh pipeline behind a topic page
//! - **[`view`]**: the retained [`TableModel`] and the renderers that fill it
//! - **[`dispatch`]** and **[`supervisor`]**: UI-thread marshaling and crash
//!   containment for background tasks
//! - **[`ui`]**: ratatui painting
//!
//! ## Usage
//!
//! ```bash
//! # Explore the cluster named in kafkalens.toml
//! kafkalens
//!
//! # Ad-hoc brokers
//! kafkalens --brokers localhost:9092
//!
//! # Built-in demo cluster with generated traffic
//! kafkalens --demo
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//! use kafkalens::resource::{Resource, ResourceHooks, ResourceKind};
//! use kafkalens::supervisor::Recovery;
//! use kafkalens::view::TableModel;
//! use kafkalens_adapters::MemoryGateway;
//!
//! # tokio_test::block_on(async {
//! let gateway = Arc::new(MemoryGateway::demo());
//! let hooks = ResourceHooks::new(gateway, Recovery::new());
//! let mut topics = Resource::new(ResourceKind::Topics, hooks);
//! topics.start_polling();
//!
//! let mut table = TableModel::new();
//! topics.render(&mut table, "");
//! topics.stop_and_wait().await;
//! # });
//! ```

pub mod app;
pub mod clipboard;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod events;
pub mod logging;
pub mod resource;
pub mod search;
pub mod stream;
pub mod supervisor;
pub mod ui;
pub mod view;

// Re-export main types for convenience
pub use app::{App, AppOptions, Page};
pub use config::AppConfig;
pub use resource::{Resource, ResourceKind};
pub use search::{SearchCoordinator, SearchMode};
pub use stream::TopicStream;
pub use supervisor::Recovery;
pub use view::TableModel;
