//! # Kernel synchronization primitives
//!
//! The boot path runs on a single context, but state it publishes (such as the
//! page-table root) outlives it and is read once other CPUs and threads exist.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod sync_once_cell;

pub use sync_once_cell::SyncOnceCell;
