//! Periodic refresh loop for a driver shared between tasks.
//!
//! Drawing code locks the shared [`OledDriver`], renders into the
//! framebuffer and releases the lock. [`refresh_task`] wakes at a fixed
//! rate and pushes whatever changed to the panel.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::I2c;

use crate::config::RefreshConfig;
use crate::driver::OledDriver;

// ── Refresh task ─────────────────────────────────────────────────────────

/// Periodic dirty-region refresh loop.
///
/// This is a regular `async fn`, **not** an Embassy `#[task]`. Callers
/// should create a thin, concrete task wrapper that calls this function,
/// since Embassy tasks cannot be generic:
///
/// ```ignore
/// static OLED: StaticCell<Mutex<CriticalSectionRawMutex, OledDriver<MyI2c>>> = StaticCell::new();
///
/// #[embassy_executor::task]
/// async fn oled_task(
///     driver: &'static Mutex<CriticalSectionRawMutex, OledDriver<MyI2c>>,
/// ) {
///     refresh_task(driver, RefreshConfig::default()).await;
/// }
/// ```
///
/// # Control flow
///
/// Loop at `config.update_frequency_hz`:
/// 1. Lock the driver.
/// 2. Skip the cycle if the framebuffer is clean.
/// 3. Send the dirty region with [`OledDriver::display_dirty`].
///
/// The lock is held for the duration of the transfer so drawing never
/// interleaves with a partially sent frame.
///
/// # Errors
///
/// * Driver not initialised (never begun, or ended): logs and **returns**.
/// * Transfer failure: logs the error and continues to the next cycle.
pub async fn refresh_task<M, I2C>(driver: &Mutex<M, OledDriver<I2C>>, config: RefreshConfig)
where
    M: RawMutex,
    I2C: I2c,
{
    let period = Duration::from_millis(config.update_period_ms());

    #[cfg(feature = "defmt")]
    defmt::info!("OLED refresh every {} ms", config.update_period_ms());

    loop {
        Timer::after(period).await;

        let mut driver = driver.lock().await;

        if !driver.is_initialized() {
            #[cfg(feature = "defmt")]
            defmt::warn!("OLED not initialised, refresh task exiting");
            return;
        }

        if !driver.is_dirty() {
            continue;
        }

        if let Err(_e) = driver.display_dirty().await {
            #[cfg(feature = "defmt")]
            defmt::error!("OLED refresh failed: {}", _e);
            continue;
        }
    } // ← mutex released at the end of every cycle
}

// Tests for the dirty-region present are in driver.rs and framebuffer.rs.
