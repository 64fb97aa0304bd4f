// SPDX-License-Identifier: MPL-2.0

mod controller;

pub use controller::{FeedController, LoadOutcome, PostSource};
