// Domain layer - Feed data, widgets, and derived state
pub mod cache;
pub mod error;
pub mod event;
pub mod feed;
pub mod priority;
pub mod widget;
