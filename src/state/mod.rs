// SPDX-License-Identifier: MPL-2.0

mod session;

pub use session::{SessionError, StoredToken, TokenStatus, TokenStore, now_ms};
