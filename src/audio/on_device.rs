use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::audio::strategy::{AudioStrategy, Rendition, Tier};
use crate::config::Settings;
use crate::error::AudioError;
use crate::inventory::Symbol;

/// Last resort: hand the pronunciation to a local speech engine such as
/// `espeak-ng`. Never fails; problems are logged and reported as silence.
#[derive(Default)]
pub struct OnDeviceStrategy;

impl OnDeviceStrategy {
    pub fn new() -> Self {
        Self
    }

    async fn speak(command: &str, locale: &str, text: &str) -> Result<(), AudioError> {
        let mut cmd = Command::new(command);
        if !locale.trim().is_empty() {
            cmd.arg("-v").arg(locale.trim());
        }
        let status = cmd
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await?;
        if status.success() {
            Ok(())
        } else {
            Err(AudioError::Speech(format!("{command} exited with {status}")))
        }
    }
}

#[async_trait]
impl AudioStrategy for OnDeviceStrategy {
    fn tier(&self) -> Tier {
        Tier::OnDevice
    }

    async fn attempt(&self, symbol: &Symbol, settings: &Settings) -> Result<Rendition, AudioError> {
        let command = settings.on_device_command.trim();
        if command.is_empty() {
            return Ok(Rendition::Silent);
        }
        match Self::speak(command, &settings.on_device_locale, symbol.spoken_text()).await {
            Ok(()) => Ok(Rendition::Spoken),
            Err(e) => {
                log::warn!("on-device speech for {} failed: {e}", symbol.id);
                Ok(Rendition::Silent)
            }
        }
    }
}
