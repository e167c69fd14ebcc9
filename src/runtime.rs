// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Running blocking device calls from async code.

use crate::error::{Error, Result};

/// Runs a blocking call on the tokio blocking pool.
///
/// Every device and controller operation blocks on socket I/O. Async hosts
/// wrap each call in `offload` so that polling many devices does not
/// serialize behind one slow gateway.
///
/// # Errors
///
/// [`Error::TaskFailed`] if the closure panicked or the runtime is shutting
/// down; otherwise whatever the closure returned.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use cyltek_lib::controller::{Controller, ControllerSettings};
/// use cyltek_lib::device::{Power, Switch};
///
/// # async fn example() -> cyltek_lib::Result<()> {
/// let settings = ControllerSettings::default();
/// let mac = "D0:14:11:B0:01:DD".parse()?;
/// let controller =
///     cyltek_lib::offload(move || Ok(Arc::new(Controller::new(mac, None, &settings)))).await?;
///
/// let mut switch = Switch::new(controller, [("on-off", 3)].into());
/// let switch = cyltek_lib::offload(move || {
///     switch.turn_on()?;
///     Ok(switch)
/// })
/// .await?;
/// # drop(switch);
/// # Ok(())
/// # }
/// ```
pub async fn offload<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::TaskFailed(e.to_string()))?
}
